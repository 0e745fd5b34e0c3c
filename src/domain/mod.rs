//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the closed price `Sector` enum and per-sector value holder (`SectorPrices`)
//! - loaded records (`Observation`, `ObservationTable`)
//! - smoothed output rows (`SmoothedRow`) and the validated `Window`

pub mod types;

pub use types::*;
