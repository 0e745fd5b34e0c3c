//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments (and `.env`)
//! - sets up logging
//! - loads the observation table once
//! - dispatches to the report printer or the TUI

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, ReportArgs, TuiArgs, ViewArgs};
use crate::domain::ObservationTable;
use crate::error::{AppError, DataError};

pub mod pipeline;

use pipeline::QueryParams;

/// Entry point for the `elec` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // We want `elec` and `elec -s residential` to behave like `elec tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    init_logging(LogTarget::Stderr)?;

    let table = load(&args.view)?;
    let params = params_from_args(&args.view, &table)?;
    let output = pipeline::filter_and_smooth(&table, &params);
    if args.strict {
        output.require_rows()?;
    }

    let summary = crate::report::summarize(&output);
    println!("{}", crate::report::format_summary(&output, &summary));
    if !output.is_empty() {
        println!("{}", crate::report::format_smoothed_table(&output));
    }
    if args.view.show_raw && !output.is_empty() {
        println!("Raw data:");
        println!("{}", crate::report::format_raw_table(&output));
    }

    if let Some(path) = &args.export {
        crate::io::export::write_view_csv(path, &output)?;
    }
    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    // No log file, no logging: stray output would corrupt the screen.
    if let Some(path) = &args.log_file {
        init_logging(LogTarget::File(path))?;
    }

    let table = load(&args.view)?;
    let params = params_from_args(&args.view, &table)?;
    crate::tui::run(table, params, args.view.show_raw)
}

/// Load the table at startup. Failures here are fatal: there is no partial
/// dataset to fall back on.
fn load(view: &ViewArgs) -> Result<Arc<ObservationTable>, AppError> {
    let path = view.data_path();
    Ok(crate::data::init(&path)?)
}

/// Turn CLI options into query parameters, defaulting the range to the
/// table's full span.
pub fn params_from_args(view: &ViewArgs, table: &ObservationTable) -> Result<QueryParams, AppError> {
    let (min, max) = table.date_bounds().ok_or(DataError::EmptyTable)?;
    let start = view.start.unwrap_or(min);
    let end = view.end.unwrap_or(max);
    if start > end {
        return Err(DataError::InvalidDateRange { start, end }.into());
    }
    Ok(QueryParams::new(start, end, view.sector, view.window)?)
}

enum LogTarget<'a> {
    Stderr,
    File(&'a std::path::Path),
}

fn init_logging(target: LogTarget<'_>) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::new(2, format!("Failed to open log file '{}': {e}", path.display())))?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .try_init()
        }
    };
    result.map_err(|e| AppError::new(4, format!("Failed to initialize logging: {e}")))
}

/// Rewrite argv so `elec` defaults to `elec tui`.
///
/// Rules:
/// - `elec`                       -> `elec tui`
/// - `elec -s residential ...`    -> `elec tui -s residential ...`
/// - `elec --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "report");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
