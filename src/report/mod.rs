//! Reporting utilities: view summaries and formatted terminal output.

pub mod format;

pub use format::*;

use chrono::NaiveDate;

use crate::app::pipeline::QueryOutput;
use crate::math::{Range, describe, pearson};

/// Headline numbers for one query, computed over the raw view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSummary {
    pub rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub price: Option<Range>,
    pub production: Option<Range>,
    /// Pearson r between production and the selected price.
    pub correlation: Option<f64>,
}

/// Summarize the raw view of `output`.
pub fn summarize(output: &QueryOutput) -> ViewSummary {
    let sector = output.params.sector;
    let price: Vec<f64> = output.raw.iter().map(|r| r.price(sector)).collect();
    let production: Vec<f64> = output.raw.iter().map(|r| r.production).collect();

    ViewSummary {
        rows: output.raw.len(),
        first_date: output.raw.first().map(|r| r.date),
        last_date: output.raw.last().map(|r| r.date),
        price: describe(&price),
        production: describe(&production),
        correlation: pearson(&production, &price),
    }
}
