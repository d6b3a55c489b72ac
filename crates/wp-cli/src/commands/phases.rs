//! Phases command for listing inferred work phases.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use wp_core::{PhaseConfig, WorkPhases, segment};

use super::load::load_timeline;
use super::util::{data_paths, format_minutes};
use crate::Config;
use crate::cli::PhasesArgs;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Formats the phase list, one row per phase, then a total.
#[allow(clippy::cast_precision_loss)]
pub fn format_phases(phases: &WorkPhases, phase_config: &PhaseConfig) -> String {
    let mut output = String::new();
    writeln!(
        output,
        "WORK PHASES (gap threshold {})",
        format_minutes(phase_config.gap_threshold_minutes as f64)
    )
    .unwrap();

    if phases.is_empty() {
        writeln!(output, "No events recorded.").unwrap();
        return output;
    }

    for phase in phases {
        writeln!(
            output,
            "{}  ->  {}  {:>8}",
            phase.start().format(TIME_FORMAT),
            phase.end().format(TIME_FORMAT),
            format_minutes(phase.minutes())
        )
        .unwrap();
    }

    let plural = if phases.len() == 1 { "" } else { "s" };
    writeln!(
        output,
        "Total: {} phase{plural}, {}",
        phases.len(),
        format_minutes(phases.total_minutes())
    )
    .unwrap();
    output
}

/// Runs the phases command.
pub fn run<W: Write>(writer: &mut W, args: &PhasesArgs, config: &Config) -> Result<()> {
    let paths = data_paths(&args.data, config)?;
    let timeline = load_timeline(&paths)?;
    let phase_config = config.phase_config(args.threshold.threshold);
    let phases = segment(&timeline, &phase_config);

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&phases)?)?;
    } else {
        write!(writer, "{}", format_phases(&phases, &phase_config))?;
    }
    Ok(())
}
