//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Work phase reports from commit and issue activity.
///
/// Reads per-source activity records, infers continuous working sessions from
/// the gaps between events, and reports minutes worked per half hour, day,
/// month and range.
#[derive(Debug, Parser)]
#[command(name = "wp", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show a half-hour activity grid with day, month and range totals.
    Report(ReportArgs),

    /// List inferred work phases.
    Phases(PhasesArgs),

    /// Print the merged, deduplicated event timeline.
    Timeline(TimelineArgs),
}

/// Where to read activity records from.
#[derive(Debug, Clone, Default, Args)]
pub struct DataArgs {
    /// Record file or directory of `*.json` records. Repeatable.
    /// Overrides `data_paths` from the config.
    #[arg(short, long = "data", value_name = "PATH")]
    pub data: Vec<PathBuf>,
}

/// Options shared by commands that segment the timeline.
#[derive(Debug, Clone, Default, Args)]
pub struct ThresholdArgs {
    /// Gap threshold in minutes. Overrides `gap_threshold_minutes` from the config.
    #[arg(short, long, value_name = "MINUTES", value_parser = clap::value_parser!(i64).range(1..))]
    pub threshold: Option<i64>,
}

#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub threshold: ThresholdArgs,

    /// Start of the range (ISO 8601, date, or e.g. "30 days ago").
    /// Defaults to midnight of the first event's day.
    #[arg(long)]
    pub start: Option<String>,

    /// End of the range, exclusive. Defaults to midnight after the last event.
    #[arg(long)]
    pub end: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct PhasesArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub threshold: ThresholdArgs,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct TimelineArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Output as JSONL, one event per line.
    #[arg(long)]
    pub json: bool,
}
