//! Command-line parsing for the electricity dashboard.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline and rendering code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{Sector, Window};

/// Environment variable consulted when `--data` is not given.
pub const DATA_PATH_ENV: &str = "ELECTRICITY_CSV";

/// Data file used when neither `--data` nor `ELECTRICITY_CSV` is set.
pub const DEFAULT_DATA_PATH: &str = "electricity.csv";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "elec", version, about = "Electricity prices vs production dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard.
    Tui(TuiArgs),
    /// Print a summary and the smoothed series for the selected view.
    Report(ReportArgs),
}

/// Options shared by every command: which file and which view.
#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    /// CSV with date, production and price_* columns.
    #[arg(short = 'f', long, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// First date to include (YYYY-MM-DD). Defaults to the earliest date.
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last date to include (YYYY-MM-DD). Defaults to the latest date.
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Price sector (all, residential, commercial, industrial).
    #[arg(short = 's', long, default_value = "price_all")]
    pub sector: Sector,

    /// Rolling average window, in rows.
    #[arg(short = 'w', long, default_value_t = Window::DEFAULT)]
    pub window: usize,

    /// Show the raw (unsmoothed) rows.
    #[arg(long)]
    pub show_raw: bool,
}

impl ViewArgs {
    /// Resolve the data file: `--data`, then `ELECTRICITY_CSV`, then the default.
    pub fn data_path(&self) -> PathBuf {
        if let Some(path) = &self.data {
            return path.clone();
        }
        std::env::var_os(DATA_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH))
    }
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Write logs to this file (the dashboard never logs to the terminal).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Export raw + smoothed series for the selected sector to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Fail when no rows fall inside the date range.
    #[arg(long)]
    pub strict: bool,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{s}' (expected YYYY-MM-DD): {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_args_parse() {
        let cli = Cli::try_parse_from([
            "elec", "report", "-f", "data.csv", "--start", "2020-01-01", "-s", "residential", "-w", "6",
            "--show-raw", "--strict",
        ])
        .unwrap();
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.view.data_path(), PathBuf::from("data.csv"));
        assert_eq!(args.view.start, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(args.view.end, None);
        assert_eq!(args.view.sector, Sector::Residential);
        assert_eq!(args.view.window, 6);
        assert!(args.view.show_raw);
        assert!(args.strict);
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["elec", "tui"]).unwrap();
        let Command::Tui(args) = cli.command else {
            panic!("expected tui");
        };
        assert_eq!(args.view.sector, Sector::All);
        assert_eq!(args.view.window, Window::DEFAULT);
        assert!(!args.view.show_raw);
        assert!(args.log_file.is_none());
    }

    #[test]
    fn unknown_sector_is_rejected() {
        let err = Cli::try_parse_from(["elec", "report", "-s", "price_nuclear"]).unwrap_err();
        assert!(err.to_string().contains("price_nuclear"));
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(Cli::try_parse_from(["elec", "report", "--end", "March"]).is_err());
    }
}
