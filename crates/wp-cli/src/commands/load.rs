//! Reading activity record files into a timeline.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use wp_core::{Timeline, parse_record};

/// Expand record paths into the list of files to read.
///
/// Files are taken as given. Directories contribute every `*.json` file
/// directly inside them, sorted by name so runs are reproducible.
pub fn record_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(path)
                .with_context(|| format!("failed to read directory {}", path.display()))?
                .filter_map(std::result::Result::ok)
                .map(|e| e.path())
                .filter(|p| {
                    let is_json = p.is_file() && p.extension().is_some_and(|ext| ext == "json");
                    if !is_json {
                        tracing::debug!(path = ?p, "skipping non-record file");
                    }
                    is_json
                })
                .collect();
            entries.sort();
            files.extend(entries);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            anyhow::bail!("record path does not exist: {}", path.display());
        }
    }
    Ok(files)
}

/// Read every record under `paths` and merge them into one timeline.
///
/// Any unreadable or malformed record aborts the load.
pub fn load_timeline(paths: &[PathBuf]) -> Result<Timeline> {
    let files = record_files(paths)?;
    let mut collections = Vec::with_capacity(files.len());

    for file in &files {
        let json = fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let events = parse_record(&json, &fallback_source(file))
            .with_context(|| format!("invalid record {}", file.display()))?;
        collections.push(events);
    }

    let timeline = Timeline::build(collections);
    tracing::debug!(
        files = files.len(),
        events = timeline.len(),
        duplicates = timeline.duplicates_dropped(),
        "loaded timeline"
    );
    Ok(timeline)
}

fn fallback_source(file: &Path) -> String {
    file.file_stem()
        .map_or_else(|| "unknown".to_string(), |s| s.to_string_lossy().into_owned())
}
