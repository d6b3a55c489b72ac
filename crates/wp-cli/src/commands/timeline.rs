//! Timeline command for inspecting the merged event sequence.
//!
//! This module outputs the deduplicated timeline as text or JSONL for debugging.

use std::io::Write;

use anyhow::Result;
use wp_core::Timeline;

use super::load::load_timeline;
use super::util::data_paths;
use crate::Config;
use crate::cli::TimelineArgs;

/// Writes one line per event: time, kind, provenance, source, id.
pub fn write_text<W: Write>(writer: &mut W, timeline: &Timeline) -> Result<()> {
    for event in timeline.events() {
        writeln!(
            writer,
            "{}  {:<11}  {:<12}  {}  {}",
            event.timestamp.format("%Y-%m-%dT%H:%M:%SZ"),
            event.kind.as_str(),
            event.provenance.label(),
            event.source,
            event.id
        )?;
    }
    writeln!(
        writer,
        "{} events ({} duplicates dropped)",
        timeline.len(),
        timeline.duplicates_dropped()
    )?;
    Ok(())
}

/// Writes the timeline as JSONL.
pub fn write_jsonl<W: Write>(writer: &mut W, timeline: &Timeline) -> Result<()> {
    for event in timeline.events() {
        let json = serde_json::to_string(event)?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

/// Runs the timeline command.
pub fn run<W: Write>(writer: &mut W, args: &TimelineArgs, config: &Config) -> Result<()> {
    let paths = data_paths(&args.data, config)?;
    let timeline = load_timeline(&paths)?;

    if args.json {
        write_jsonl(writer, &timeline)
    } else {
        write_text(writer, &timeline)
    }
}
