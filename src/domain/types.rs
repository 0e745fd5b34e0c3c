//! Shared domain types.
//!
//! These types are intentionally kept small and `Copy`-friendly so derived
//! views can be rebuilt on every UI interaction without ceremony.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::DataError;

/// Retail price sector (one price column per sector).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sector {
    All,
    Residential,
    Commercial,
    Industrial,
}

impl Sector {
    pub const ALL: [Sector; 4] = [
        Sector::All,
        Sector::Residential,
        Sector::Commercial,
        Sector::Industrial,
    ];

    /// CSV column holding this sector's price.
    pub fn column(self) -> &'static str {
        match self {
            Sector::All => "price_all",
            Sector::Residential => "price_residential",
            Sector::Commercial => "price_commercial",
            Sector::Industrial => "price_industrial",
        }
    }

    /// Human-facing label ("Residential", ...).
    pub fn display_name(self) -> &'static str {
        match self {
            Sector::All => "All",
            Sector::Residential => "Residential",
            Sector::Commercial => "Commercial",
            Sector::Industrial => "Industrial",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Sector {
    type Err = DataError;

    /// Accepts either the column name (`price_residential`) or the bare sector
    /// name (`residential`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let bare = key.strip_prefix("price_").unwrap_or(&key);
        match bare {
            "all" => Ok(Sector::All),
            "residential" => Ok(Sector::Residential),
            "commercial" => Ok(Sector::Commercial),
            "industrial" => Ok(Sector::Industrial),
            _ => Err(DataError::InvalidSector(s.to_string())),
        }
    }
}

/// One value per price sector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorPrices<T> {
    pub all: T,
    pub residential: T,
    pub commercial: T,
    pub industrial: T,
}

impl<T> SectorPrices<T> {
    pub fn get(&self, sector: Sector) -> &T {
        match sector {
            Sector::All => &self.all,
            Sector::Residential => &self.residential,
            Sector::Commercial => &self.commercial,
            Sector::Industrial => &self.industrial,
        }
    }

    pub fn get_mut(&mut self, sector: Sector) -> &mut T {
        match sector {
            Sector::All => &mut self.all,
            Sector::Residential => &mut self.residential,
            Sector::Commercial => &mut self.commercial,
            Sector::Industrial => &mut self.industrial,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> SectorPrices<U> {
        SectorPrices {
            all: f(self.all),
            residential: f(self.residential),
            commercial: f(self.commercial),
            industrial: f(self.industrial),
        }
    }
}

/// A single dated record of production and retail prices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    /// Net production (MWh).
    pub production: f64,
    /// Retail prices (¢/kWh).
    pub prices: SectorPrices<f64>,
}

impl Observation {
    pub fn price(&self, sector: Sector) -> f64 {
        *self.prices.get(sector)
    }
}

/// A row of the smoothed view.
///
/// `None` marks a cell whose trailing window has not filled yet. It is never
/// used for "zero".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedRow {
    pub date: NaiveDate,
    pub production: Option<f64>,
    pub prices: SectorPrices<Option<f64>>,
}

impl SmoothedRow {
    pub fn price(&self, sector: Sector) -> Option<f64> {
        *self.prices.get(sector)
    }
}

impl From<&Observation> for SmoothedRow {
    fn from(obs: &Observation) -> Self {
        Self {
            date: obs.date,
            production: Some(obs.production),
            prices: obs.prices.map(Some),
        }
    }
}

/// The full in-memory dataset, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    rows: Vec<Observation>,
}

impl ObservationTable {
    pub fn new(rows: Vec<Observation>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Earliest and latest date in the table.
    ///
    /// Computed over all rows, so it is correct even if the source was not
    /// sorted.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.rows.first()?.date;
        Some(self.rows.iter().fold((first, first), |(lo, hi), r| {
            (lo.min(r.date), hi.max(r.date))
        }))
    }

    /// True when dates never decrease from one row to the next.
    pub fn is_date_ordered(&self) -> bool {
        self.rows.windows(2).all(|w| w[0].date <= w[1].date)
    }
}

/// Smoothing window length in rows (always >= 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Window(usize);

impl Window {
    /// Bounds offered by the UI controls. The pipeline itself accepts any
    /// positive window.
    pub const UI_MIN: usize = 1;
    pub const UI_MAX: usize = 12;
    pub const DEFAULT: usize = 3;

    pub fn new(rows: usize) -> Result<Self, DataError> {
        if rows < 1 {
            return Err(DataError::InvalidWindow(rows));
        }
        Ok(Self(rows))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sector_parses_column_and_bare_names() {
        assert_eq!("price_all".parse::<Sector>().unwrap(), Sector::All);
        assert_eq!("Residential".parse::<Sector>().unwrap(), Sector::Residential);
        assert_eq!(" PRICE_INDUSTRIAL ".parse::<Sector>().unwrap(), Sector::Industrial);
    }

    #[test]
    fn sector_rejects_unknown_names() {
        let err = "price_transport".parse::<Sector>().unwrap_err();
        assert!(matches!(err, DataError::InvalidSector(s) if s == "price_transport"));
    }

    #[test]
    fn sector_cycle_wraps() {
        assert_eq!(Sector::Industrial.next(), Sector::All);
        assert_eq!(Sector::All.prev(), Sector::Industrial);
        for s in Sector::ALL {
            assert_eq!(s.next().prev(), s);
        }
    }

    #[test]
    fn window_rejects_zero() {
        assert!(matches!(Window::new(0), Err(DataError::InvalidWindow(0))));
        assert_eq!(Window::new(24).unwrap().get(), 24);
    }

    #[test]
    fn date_bounds_scan_all_rows() {
        let d = |m| NaiveDate::from_ymd_opt(2021, m, 1).unwrap();
        let prices = SectorPrices {
            all: 1.0,
            residential: 1.0,
            commercial: 1.0,
            industrial: 1.0,
        };
        let table = ObservationTable::new(vec![
            Observation { date: d(3), production: 1.0, prices },
            Observation { date: d(1), production: 1.0, prices },
            Observation { date: d(2), production: 1.0, prices },
        ]);
        assert_eq!(table.date_bounds(), Some((d(1), d(3))));
        assert!(!table.is_date_ordered());
        assert_eq!(ObservationTable::default().date_bounds(), None);
    }
}
