//! `electricity-dashboard` library crate.
//!
//! The binary (`elec`) is a thin wrapper around this library so that:
//!
//! - the query pipeline is testable without spawning processes
//! - the CLI report and the TUI share one implementation of filter + smooth

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod report;
pub mod tui;
