//! Work phase CLI library.
//!
//! This crate provides the CLI interface for work phase reports.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, DataArgs, PhasesArgs, ReportArgs, ThresholdArgs, TimelineArgs};
pub use config::Config;
