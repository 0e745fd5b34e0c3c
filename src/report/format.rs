//! Formatted terminal output for the `report` command.
//!
//! We keep formatting code in one place so output changes are localized.

use crate::app::pipeline::QueryOutput;
use crate::domain::Sector;
use crate::report::ViewSummary;

/// Header block: query parameters plus summary statistics.
pub fn format_summary(output: &QueryOutput, summary: &ViewSummary) -> String {
    let p = &output.params;
    let mut out = String::new();

    out.push_str("=== elec - Electricity Prices and Production ===\n");
    out.push_str(&format!("Range: {} .. {}\n", p.start, p.end));
    out.push_str(&format!(
        "Sector: {} ({})\n",
        p.sector.display_name(),
        p.sector.column()
    ));
    out.push_str(&format!("Smoothing window: {} rows\n", p.window.get()));

    if summary.rows == 0 {
        out.push_str("Rows: 0 (no rows in selected range)\n");
        return out;
    }

    out.push_str(&format!(
        "Rows: {} | dates=[{}, {}]\n",
        summary.rows,
        summary.first_date.map(|d| d.to_string()).unwrap_or_default(),
        summary.last_date.map(|d| d.to_string()).unwrap_or_default(),
    ));
    if let Some(r) = summary.price {
        out.push_str(&format!(
            "Price (¢/kWh): min={:.2} max={:.2} mean={:.2}\n",
            r.min, r.max, r.mean
        ));
    }
    if let Some(r) = summary.production {
        out.push_str(&format!(
            "Production (MWh): min={:.1} max={:.1} mean={:.1}\n",
            r.min, r.max, r.mean
        ));
    }
    match summary.correlation {
        Some(r) => out.push_str(&format!("Correlation (production vs price): r={r:.3}\n")),
        None => out.push_str("Correlation (production vs price): n/a\n"),
    }

    out
}

/// Smoothed series table: date, smoothed price, smoothed production.
pub fn format_smoothed_table(output: &QueryOutput) -> String {
    let sector = output.params.sector;
    let mut out = String::new();
    out.push_str(&format!(
        "{:<10} {:>14} {:>16}\n",
        "date",
        format!("{} price", sector.display_name().to_ascii_lowercase()),
        "production"
    ));
    out.push_str(&format!("{:-<10} {:-<14} {:-<16}\n", "", "", ""));

    for r in &output.smoothed {
        out.push_str(
            format!(
                "{:<10} {:>14} {:>16}\n",
                r.date,
                fmt_opt(r.price(sector), 3),
                fmt_opt(r.production, 1),
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Raw (unsmoothed) rows with every column.
pub fn format_raw_table(output: &QueryOutput) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<10} {:>14}", "date", "production"));
    for sector in Sector::ALL {
        out.push_str(&format!(" {:>18}", sector.column()));
    }
    out.push('\n');
    out.push_str(&format!("{:-<10} {:-<14}", "", ""));
    for _ in Sector::ALL {
        out.push_str(&format!(" {:-<18}", ""));
    }
    out.push('\n');

    for r in &output.raw {
        out.push_str(&format!("{:<10} {:>14.1}", r.date, r.production));
        for sector in Sector::ALL {
            out.push_str(&format!(" {:>18.3}", r.price(sector)));
        }
        out.push('\n');
    }
    out
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(v) => format!("{v:.decimals$}"),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::app::pipeline::{QueryParams, filter_and_smooth};
    use crate::domain::{Observation, ObservationTable, SectorPrices};
    use crate::report::summarize;

    fn output(window: usize) -> QueryOutput {
        let d = |m| NaiveDate::from_ymd_opt(2020, m, 1).unwrap();
        let row = |m, p: f64, px: f64| Observation {
            date: d(m),
            production: p,
            prices: SectorPrices {
                all: px,
                residential: px + 1.0,
                commercial: px + 2.0,
                industrial: px + 3.0,
            },
        };
        let table = ObservationTable::new(vec![row(1, 10.0, 5.0), row(2, 20.0, 6.0)]);
        let params = QueryParams::new(d(1), d(2), Sector::All, window).unwrap();
        filter_and_smooth(&table, &params)
    }

    #[test]
    fn smoothed_table_marks_missing_cells() {
        let text = format_smoothed_table(&output(2));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("2020-01-01"));
        assert!(lines[2].ends_with('-'));
        assert!(lines[3].contains("5.500"));
        assert!(lines[3].ends_with("15.0"));
    }

    #[test]
    fn raw_table_has_all_price_columns() {
        let text = format_raw_table(&output(1));
        let header = text.lines().next().unwrap();
        for sector in Sector::ALL {
            assert!(header.contains(sector.column()));
        }
        assert!(text.contains("8.000"));
    }

    #[test]
    fn summary_reports_empty_range() {
        let out = output(1);
        let empty = QueryOutput {
            raw: Vec::new(),
            smoothed: Vec::new(),
            ..out
        };
        let text = format_summary(&empty, &summarize(&empty));
        assert!(text.contains("no rows in selected range"));
    }

    #[test]
    fn summary_includes_correlation() {
        let out = output(1);
        let text = format_summary(&out, &summarize(&out));
        assert!(text.contains("Sector: All (price_all)"));
        assert!(text.contains("r=1.000"));
    }
}
