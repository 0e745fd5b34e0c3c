//! Numeric helpers: trailing moving averages and summary statistics.

pub mod rolling;
pub mod stats;

pub use rolling::*;
pub use stats::*;
