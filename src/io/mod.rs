//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - CSV export of derived views (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
