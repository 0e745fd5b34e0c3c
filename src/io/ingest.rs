//! CSV ingest.
//!
//! Turns the electricity CSV into an `ObservationTable`.
//!
//! Design goals:
//! - **Strict schema**: all six required columns must be present
//! - **All-or-nothing**: any bad row aborts the load (no partial dataset)
//! - **Order-preserving**: rows keep file order; nothing is sorted here

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::domain::{Observation, ObservationTable, Sector, SectorPrices};
use crate::error::DataError;

const DATE_COLUMN: &str = "date";
const PRODUCTION_COLUMN: &str = "production";

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    production: usize,
    prices: SectorPrices<usize>,
}

/// Load the CSV at `path`.
pub fn load_table(path: &Path) -> Result<ObservationTable, DataError> {
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_table(file)?;

    tracing::info!(
        path = %path.display(),
        rows = table.len(),
        "loaded observation table"
    );
    Ok(table)
}

/// Parse CSV content from any reader.
pub fn read_table<R: Read>(input: R) -> Result<ObservationTable, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| DataError::Csv {
            line: 1,
            message: e.to_string(),
        })?
        .clone();

    let columns = resolve_columns(&build_header_map(&headers)?)?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // Fallback when the reader has no position: records() starts after
        // the header and lines are 1-based. Quoted fields may span lines, so
        // the reader's own position is preferred.
        let fallback = idx + 2;
        let record = result.map_err(|e| DataError::Csv {
            line: e.position().map_or(fallback, |p| p.line() as usize),
            message: e.to_string(),
        })?;
        let line = record.position().map_or(fallback, |p| p.line() as usize);
        rows.push(parse_row(&record, &columns, line)?);
    }

    if rows.is_empty() {
        return Err(DataError::EmptyTable);
    }

    let table = ObservationTable::new(rows);
    if !table.is_date_ordered() {
        tracing::warn!("input dates are not ascending; rows are kept in file order");
    }
    Ok(table)
}

fn required_columns() -> [&'static str; 6] {
    [
        DATE_COLUMN,
        PRODUCTION_COLUMN,
        Sector::All.column(),
        Sector::Residential.column(),
        Sector::Commercial.column(),
        Sector::Industrial.column(),
    ]
}

/// Map normalized header names to positions.
///
/// A repeated required column is ambiguous and rejected. For other repeated
/// names the first occurrence is kept.
fn build_header_map(headers: &StringRecord) -> Result<HashMap<String, usize>, DataError> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        match map.entry(normalize_header_name(name)) {
            Entry::Vacant(slot) => {
                slot.insert(idx);
            }
            Entry::Occupied(slot) if required_columns().contains(&slot.key().as_str()) => {
                return Err(DataError::DuplicateColumn(slot.key().clone()));
            }
            Entry::Occupied(_) => {}
        }
    }
    Ok(map)
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, `date` is reported missing.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn resolve_columns(header_map: &HashMap<String, usize>) -> Result<Columns, DataError> {
    let find = |name: &str| {
        header_map
            .get(name)
            .copied()
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    };

    Ok(Columns {
        date: find(DATE_COLUMN)?,
        production: find(PRODUCTION_COLUMN)?,
        prices: SectorPrices {
            all: find(Sector::All.column())?,
            residential: find(Sector::Residential.column())?,
            commercial: find(Sector::Commercial.column())?,
            industrial: find(Sector::Industrial.column())?,
        },
    })
}

fn parse_row(record: &StringRecord, columns: &Columns, line: usize) -> Result<Observation, DataError> {
    let date_raw = record.get(columns.date).unwrap_or("");
    let date = parse_date(date_raw).ok_or_else(|| DataError::UnparseableDate {
        line,
        value: date_raw.to_string(),
    })?;

    let production = parse_number(record, columns.production, PRODUCTION_COLUMN, line)?;

    let mut prices = SectorPrices {
        all: 0.0,
        residential: 0.0,
        commercial: 0.0,
        industrial: 0.0,
    };
    for sector in Sector::ALL {
        *prices.get_mut(sector) =
            parse_number(record, *columns.prices.get(sector), sector.column(), line)?;
    }

    Ok(Observation {
        date,
        production,
        prices,
    })
}

/// Parse a calendar date.
///
/// Besides plain dates we accept datetimes and keep the date part, since
/// exports from dataframe tools often write `2020-01-01 00:00:00`.
fn parse_date(s: &str) -> Option<NaiveDate> {
    const DATE_FMTS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
    const DATETIME_FMTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    let s = s.trim();
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

fn parse_number(record: &StringRecord, idx: usize, column: &str, line: usize) -> Result<f64, DataError> {
    let raw = record.get(idx).unwrap_or("");
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DataError::UnparseableNumber {
            line,
            column: column.to_string(),
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const HEADER: &str = "date,production,price_all,price_residential,price_commercial,price_industrial";

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn reads_rows_in_file_order() {
        let csv = format!(
            "{HEADER}\n2020-01-01,10,5.0,6.0,4.0,3.0\n2020-02-01,20,6.0,7.0,5.0,4.0\n"
        );
        let table = read_table(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        let first = table.rows()[0];
        assert_eq!(first.date, d(2020, 1, 1));
        assert_eq!(first.production, 10.0);
        assert_eq!(first.price(Sector::Residential), 6.0);
        assert_eq!(first.price(Sector::Industrial), 3.0);
        assert_eq!(table.rows()[1].date, d(2020, 2, 1));
    }

    #[test]
    fn header_is_case_insensitive_and_extra_columns_are_ignored() {
        let csv = "\u{feff}Date,region,PRICE_ALL,Production,price_residential,price_commercial,price_industrial\n\
                   2020-01-01 00:00:00,TX,5.0,10,6.0,4.0,3.0\n";
        let table = read_table(csv.as_bytes()).unwrap();
        assert_eq!(table.rows()[0].date, d(2020, 1, 1));
        assert_eq!(table.rows()[0].production, 10.0);
        assert_eq!(table.rows()[0].price(Sector::All), 5.0);
    }

    #[test]
    fn missing_column_is_reported() {
        let csv = "date,production,price_all,price_residential,price_commercial\n2020-01-01,1,1,1,1\n";
        let err = read_table(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(c) if c == "price_industrial"));
    }

    #[test]
    fn duplicate_required_column_is_rejected() {
        let csv = format!("{HEADER},Production\n2020-01-01,1,1,1,1,1,2\n");
        let err = read_table(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::DuplicateColumn(c) if c == "production"));
    }

    #[test]
    fn duplicate_extra_column_is_ignored() {
        let csv = format!("{HEADER},note,note\n2020-01-01,1,1,1,1,1,a,b\n");
        let table = read_table(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn line_numbers_count_multiline_quoted_fields() {
        let csv = format!(
            "{HEADER},note\n2020-01-01,1,1,1,1,1,\"first\nsecond\"\nbad-date,1,1,1,1,1,x\n"
        );
        let err = read_table(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::UnparseableDate { line: 4, .. }), "{err}");
    }

    #[test]
    fn bad_date_aborts_load() {
        let csv = format!("{HEADER}\n2020-01-01,1,1,1,1,1\nJan 2020,1,1,1,1,1\n");
        let err = read_table(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::UnparseableDate { line: 3, .. }));
    }

    #[test]
    fn bad_number_names_the_column() {
        let csv = format!("{HEADER}\n2020-01-01,1,1,n/a,1,1\n");
        match read_table(csv.as_bytes()).unwrap_err() {
            DataError::UnparseableNumber { line, column, value } => {
                assert_eq!(line, 2);
                assert_eq!(column, "price_residential");
                assert_eq!(value, "n/a");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_numeric_cell_is_unparseable() {
        let csv = format!("{HEADER}\n2020-01-01,,1,1,1,1\n");
        assert!(matches!(
            read_table(csv.as_bytes()).unwrap_err(),
            DataError::UnparseableNumber { .. }
        ));
    }

    #[test]
    fn header_only_file_is_empty_table() {
        let csv = format!("{HEADER}\n");
        assert!(matches!(read_table(csv.as_bytes()).unwrap_err(), DataError::EmptyTable));
    }

    #[test]
    fn unsorted_dates_are_kept_in_file_order() {
        let csv = format!("{HEADER}\n2020-03-01,3,1,1,1,1\n2020-01-01,1,1,1,1,1\n");
        let table = read_table(csv.as_bytes()).unwrap();
        assert_eq!(table.rows()[0].date, d(2020, 3, 1));
        assert_eq!(table.rows()[1].date, d(2020, 1, 1));
    }

    #[test]
    fn load_table_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "2021-06-01,42.5,10.1,12.2,9.3,7.4").unwrap();
        let table = load_table(file.path()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].production, 42.5);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_table(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
