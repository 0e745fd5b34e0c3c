//! Dashboard control state: date range, sector, window, raw toggle.
//!
//! Kept free of terminal types so the control rules can be tested directly.

use chrono::NaiveDate;

use crate::app::pipeline::QueryParams;
use crate::domain::{ObservationTable, Sector, Window};
use crate::error::DataError;

/// Selectable rows of the controls panel, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Start,
    End,
    Sector,
    Window,
    ShowRaw,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Start,
        Field::End,
        Field::Sector,
        Field::Window,
        Field::ShowRaw,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn up(self) -> Self {
        Self::ALL[self.index().saturating_sub(1)]
    }

    pub fn down(self) -> Self {
        Self::ALL[(self.index() + 1).min(Self::ALL.len() - 1)]
    }
}

/// Distinct loaded dates, ascending. Date controls step along these.
#[derive(Debug, Clone)]
pub struct DateAxis {
    dates: Vec<NaiveDate>,
}

impl DateAxis {
    pub fn from_table(table: &ObservationTable) -> Self {
        let mut dates: Vec<NaiveDate> = table.rows().iter().map(|r| r.date).collect();
        dates.sort_unstable();
        dates.dedup();
        Self { dates }
    }

    pub fn min(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn max(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Move `steps` loaded dates forward (positive) or back (negative) from
    /// `from`, stopping at the ends.
    pub fn step(&self, from: NaiveDate, steps: isize) -> NaiveDate {
        if self.dates.is_empty() || steps == 0 {
            return from;
        }
        let last = self.dates.len() - 1;
        let target = if steps >= 0 {
            // First loaded date strictly after `from`, then further steps.
            let after = self.dates.partition_point(|d| *d <= from);
            if after > last {
                last
            } else {
                (after + steps.unsigned_abs() - 1).min(last)
            }
        } else {
            // Last loaded date strictly before `from`, then further steps.
            let before = self.dates.partition_point(|d| *d < from);
            before.saturating_sub(steps.unsigned_abs())
        };
        self.dates[target]
    }

    /// Clamp `date` into the loaded span.
    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        match (self.min(), self.max()) {
            (Some(lo), Some(hi)) => date.clamp(lo, hi),
            _ => date,
        }
    }
}

/// Current values of every control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub sector: Sector,
    pub window: usize,
    pub show_raw: bool,
}

impl Controls {
    pub fn new(params: &QueryParams, show_raw: bool) -> Self {
        Self {
            start: params.start,
            end: params.end,
            sector: params.sector,
            // The slider only offers the UI range; a larger CLI value is kept
            // until the user touches the slider.
            window: params.window.get(),
            show_raw,
        }
    }

    /// Pull start and end into the loaded span. Clamping is monotone, so an
    /// ordered range stays ordered.
    pub fn clamp_to(&mut self, axis: &DateAxis) {
        self.start = axis.clamp(self.start);
        self.end = axis.clamp(self.end);
    }

    pub fn params(&self) -> Result<QueryParams, DataError> {
        QueryParams::new(self.start, self.end, self.sector, self.window)
    }

    /// Step the window slider by `delta`, within the UI bounds.
    pub fn nudge_window(&mut self, delta: isize) {
        let cur = self.window.clamp(Window::UI_MIN, Window::UI_MAX) as isize;
        self.window = (cur + delta).clamp(Window::UI_MIN as isize, Window::UI_MAX as isize) as usize;
    }

    /// Set the start date, rejecting a value after the end date.
    pub fn set_start(&mut self, date: NaiveDate) -> Result<(), DataError> {
        if date > self.end {
            return Err(DataError::InvalidDateRange {
                start: date,
                end: self.end,
            });
        }
        self.start = date;
        Ok(())
    }

    /// Set the end date, rejecting a value before the start date.
    pub fn set_end(&mut self, date: NaiveDate) -> Result<(), DataError> {
        if date < self.start {
            return Err(DataError::InvalidDateRange {
                start: self.start,
                end: date,
            });
        }
        self.end = date;
        Ok(())
    }
}

/// Parse a `YYYY-MM-DD` entry from the date editor.
pub fn parse_date_input(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Observation, SectorPrices};

    fn d(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, m, 1).unwrap()
    }

    fn axis() -> DateAxis {
        let prices = SectorPrices {
            all: 1.0,
            residential: 1.0,
            commercial: 1.0,
            industrial: 1.0,
        };
        let rows = [3, 1, 2, 2, 5]
            .into_iter()
            .map(|m| Observation {
                date: d(m),
                production: 1.0,
                prices,
            })
            .collect();
        DateAxis::from_table(&ObservationTable::new(rows))
    }

    #[test]
    fn axis_is_sorted_and_deduplicated() {
        let a = axis();
        assert_eq!(a.min(), Some(d(1)));
        assert_eq!(a.max(), Some(d(5)));
    }

    #[test]
    fn step_moves_between_loaded_dates() {
        let a = axis();
        assert_eq!(a.step(d(1), 1), d(2));
        assert_eq!(a.step(d(3), 1), d(5));
        assert_eq!(a.step(d(5), 1), d(5));
        assert_eq!(a.step(d(5), -1), d(3));
        assert_eq!(a.step(d(1), -1), d(1));
        assert_eq!(a.step(d(1), 12), d(5));
        // From a date that isn't loaded.
        assert_eq!(a.step(d(4), 1), d(5));
        assert_eq!(a.step(d(4), -1), d(3));
    }

    #[test]
    fn clamp_to_span() {
        let a = axis();
        assert_eq!(a.clamp(NaiveDate::from_ymd_opt(2019, 1, 1).unwrap()), d(1));
        assert_eq!(a.clamp(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()), d(5));
        assert_eq!(a.clamp(d(4)), d(4));
    }

    #[test]
    fn field_navigation_stops_at_ends() {
        assert_eq!(Field::Start.up(), Field::Start);
        assert_eq!(Field::ShowRaw.down(), Field::ShowRaw);
        assert_eq!(Field::Sector.down(), Field::Window);
    }

    fn controls() -> Controls {
        let params = QueryParams::new(d(1), d(5), Sector::All, 3).unwrap();
        Controls::new(&params, false)
    }

    #[test]
    fn window_slider_is_bounded() {
        let mut c = controls();
        c.nudge_window(-5);
        assert_eq!(c.window, 1);
        c.nudge_window(40);
        assert_eq!(c.window, 12);
    }

    #[test]
    fn clamp_to_pulls_range_into_span() {
        let params = QueryParams::new(
            NaiveDate::from_ymd_opt(2019, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(),
            Sector::All,
            3,
        )
        .unwrap();
        let mut c = Controls::new(&params, false);
        c.clamp_to(&axis());
        assert_eq!((c.start, c.end), (d(1), d(5)));
        assert_eq!(axis().step(c.start, -1), d(1));
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let mut c = controls();
        assert!(matches!(c.set_end(NaiveDate::from_ymd_opt(2019, 12, 1).unwrap()), Err(DataError::InvalidDateRange { .. })));
        assert!(c.set_start(d(5)).is_ok());
        assert!(c.set_start(NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()).is_err());
        assert_eq!(c.start, d(5));
        assert_eq!(c.params().unwrap().start, d(5));
    }

    #[test]
    fn date_input_parsing() {
        assert_eq!(parse_date_input(" 2020-03-01 "), Ok(d(3)));
        assert!(parse_date_input("2020-13-01").is_err());
    }
}
