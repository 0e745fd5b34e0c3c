//! Export derived views to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts. Missing smoothed cells are written as empty fields.

use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::app::pipeline::QueryOutput;
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ExportRow {
    date: NaiveDate,
    production: f64,
    price: f64,
    production_smoothed: Option<f64>,
    price_smoothed: Option<f64>,
}

/// Write the raw and smoothed series for the selected sector to `path`.
pub fn write_view_csv(path: &Path, output: &QueryOutput) -> Result<(), AppError> {
    let file = std::fs::File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_view(file, output)?;
    tracing::info!(path = %path.display(), rows = output.raw.len(), "wrote export");
    Ok(())
}

/// Write the export to any writer.
pub fn write_view<W: Write>(out: W, output: &QueryOutput) -> Result<(), AppError> {
    let sector = output.params.sector;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);

    // Header names carry the sector column so files from different sectors
    // aren't mistaken for one another.
    let column = sector.column();
    let smoothed_column = format!("{column}_smoothed");
    writer
        .write_record([
            "date",
            "production",
            column,
            "production_smoothed",
            smoothed_column.as_str(),
        ])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (raw, smooth) in output.raw.iter().zip(&output.smoothed) {
        writer
            .serialize(ExportRow {
                date: raw.date,
                production: raw.production,
                price: raw.price(sector),
                production_smoothed: smooth.production,
                price_smoothed: smooth.price(sector),
            })
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::{QueryParams, filter_and_smooth};
    use crate::domain::{Observation, ObservationTable, Sector, SectorPrices};

    #[test]
    fn missing_cells_are_blank() {
        let d = |m| NaiveDate::from_ymd_opt(2020, m, 1).unwrap();
        let row = |m, p: f64, a: f64| Observation {
            date: d(m),
            production: p,
            prices: SectorPrices {
                all: a,
                residential: 0.0,
                commercial: 0.0,
                industrial: 0.0,
            },
        };
        let table = ObservationTable::new(vec![row(1, 10.0, 5.0), row(2, 20.0, 6.0)]);
        let params = QueryParams::new(d(1), d(2), Sector::All, 2).unwrap();
        let output = filter_and_smooth(&table, &params);

        let mut buf = Vec::new();
        write_view(&mut buf, &output).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "date,production,price_all,production_smoothed,price_all_smoothed"
        );
        assert_eq!(lines[1], "2020-01-01,10.0,5.0,,");
        assert_eq!(lines[2], "2020-02-01,20.0,6.0,15.0,5.5");
    }
}
