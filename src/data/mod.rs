//! Data access: the process-wide, load-once observation table.

pub mod store;

pub use store::init;
