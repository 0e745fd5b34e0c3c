//! Shared query pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! table -> date filter (`raw`) -> trailing average of sector price and
//! production (`smoothed`)
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).
//! Nothing here touches the table it is given; every call builds fresh views.

use chrono::NaiveDate;

use crate::domain::{Observation, ObservationTable, Sector, SmoothedRow, Window};
use crate::error::DataError;
use crate::math::trailing_mean;

/// Validated inputs of a single query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryParams {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub sector: Sector,
    pub window: Window,
}

impl QueryParams {
    /// Bounds are inclusive. `start <= end` is the caller's responsibility;
    /// an inverted range simply selects nothing.
    pub fn new(start: NaiveDate, end: NaiveDate, sector: Sector, window: usize) -> Result<Self, DataError> {
        Ok(Self {
            start,
            end,
            sector,
            window: Window::new(window)?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Both derived views of one query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutput {
    pub params: QueryParams,
    /// Rows within the date bounds, unsmoothed, in table order.
    pub raw: Vec<Observation>,
    /// `raw` with the sector price and production replaced by their trailing
    /// averages. Same length and order as `raw`.
    pub smoothed: Vec<SmoothedRow>,
}

impl QueryOutput {
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Treat an empty selection as an error, for callers that need rows.
    pub fn require_rows(&self) -> Result<&Self, DataError> {
        if self.is_empty() {
            return Err(DataError::EmptyRange {
                start: self.params.start,
                end: self.params.end,
            });
        }
        Ok(self)
    }

    /// `(production, price)` pairs of the raw view for the correlation plot.
    pub fn scatter_points(&self) -> Vec<(f64, f64)> {
        let sector = self.params.sector;
        self.raw
            .iter()
            .map(|r| (r.production, r.price(sector)))
            .collect()
    }
}

/// Filter `table` to the date range and smooth the selected columns.
///
/// An empty selection is not an error: both views come back empty.
pub fn filter_and_smooth(table: &ObservationTable, params: &QueryParams) -> QueryOutput {
    let raw: Vec<Observation> = table
        .rows()
        .iter()
        .filter(|r| params.contains(r.date))
        .copied()
        .collect();

    let window = params.window.get();
    let sector = params.sector;

    let production: Vec<f64> = raw.iter().map(|r| r.production).collect();
    let price: Vec<f64> = raw.iter().map(|r| r.price(sector)).collect();
    let production_avg = trailing_mean(&production, window);
    let price_avg = trailing_mean(&price, window);

    let smoothed = raw
        .iter()
        .zip(production_avg.into_iter().zip(price_avg))
        .map(|(obs, (prod, px))| {
            let mut row = SmoothedRow::from(obs);
            row.production = prod;
            *row.prices.get_mut(sector) = px;
            row
        })
        .collect();

    tracing::debug!(
        start = %params.start,
        end = %params.end,
        sector = %sector,
        window,
        rows = raw.len(),
        "query evaluated"
    );

    QueryOutput {
        params: *params,
        raw,
        smoothed,
    }
}
