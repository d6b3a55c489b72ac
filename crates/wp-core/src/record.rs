//! Per-source activity records.
//!
//! A record is one JSON document per source holding a `commits` array and an
//! `issue_events` array. Each entry carries an RFC 3339 timestamp and an
//! identity; everything else is passed through as the event payload.
//!
//! Any malformed entry fails the whole record. A bad timestamp would otherwise
//! shift the sort order and move every phase boundary after it.

use chrono::{DateTime, SubsecRound, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::event::{Event, EventProvenance};
use crate::event_kind::EventKind;
use crate::types::{EventId, SourceId, ValidationError};

const COMMITS: &str = "commits";
const ISSUE_EVENTS: &str = "issue_events";

/// Errors raised while reading a source record.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid record JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{origin}: {array}[{index}] is missing the `{field}` field")]
    MissingField {
        origin: String,
        array: &'static str,
        index: usize,
        field: &'static str,
    },

    #[error("{origin}: {array}[{index}] has an invalid `{field}` value: {value}")]
    InvalidField {
        origin: String,
        array: &'static str,
        index: usize,
        field: &'static str,
        value: Value,
    },

    #[error("{origin}: {array}[{index}] has a malformed timestamp {value:?}: {reason}")]
    Timestamp {
        origin: String,
        array: &'static str,
        index: usize,
        value: String,
        #[source]
        reason: chrono::ParseError,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Deserialize)]
struct SourceRecord {
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    commits: Vec<Map<String, Value>>,
    #[serde(default)]
    issue_events: Vec<Map<String, Value>>,
}

/// Parse one source record into events, in record order.
///
/// `fallback_source` names the source when the document has no `source` field
/// (callers usually pass the file stem). Commits come first, then issue events.
pub fn parse_record(json: &str, fallback_source: &str) -> Result<Vec<Event>, ParseError> {
    let record: SourceRecord = serde_json::from_str(json)?;
    let source = match record.source {
        Some(name) if !name.trim().is_empty() => SourceId::new(name)?,
        _ => SourceId::new(fallback_source)?,
    };

    let mut events = Vec::with_capacity(record.commits.len() + record.issue_events.len());
    for (index, entry) in record.commits.into_iter().enumerate() {
        let at = EntryAt {
            source: &source,
            array: COMMITS,
            index,
        };
        events.push(commit_event(entry, &at)?);
    }
    for (index, entry) in record.issue_events.into_iter().enumerate() {
        let at = EntryAt {
            source: &source,
            array: ISSUE_EVENTS,
            index,
        };
        events.push(issue_event(entry, &at)?);
    }

    tracing::debug!(source = %source, events = events.len(), "parsed source record");
    Ok(events)
}

/// Location of an entry, for error messages.
struct EntryAt<'a> {
    source: &'a SourceId,
    array: &'static str,
    index: usize,
}

impl EntryAt<'_> {
    fn missing(&self, field: &'static str) -> ParseError {
        ParseError::MissingField {
            origin: self.source.to_string(),
            array: self.array,
            index: self.index,
            field,
        }
    }

    fn invalid(&self, field: &'static str, value: Value) -> ParseError {
        ParseError::InvalidField {
            origin: self.source.to_string(),
            array: self.array,
            index: self.index,
            field,
            value,
        }
    }
}

fn commit_event(mut entry: Map<String, Value>, at: &EntryAt<'_>) -> Result<Event, ParseError> {
    let id = take_id(&mut entry, "sha", at)?;
    let timestamp = take_timestamp(&mut entry, "timestamp", at)?;

    let squash_merge = match entry.remove("squash_merge") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => flag,
        Some(other) => return Err(at.invalid("squash_merge", other)),
    };
    let pull_request = match entry.remove("pull_request") {
        None | Some(Value::Null) => None,
        Some(value) => match value.as_u64() {
            Some(number) => Some(number),
            None => return Err(at.invalid("pull_request", value)),
        },
    };

    let provenance = match (pull_request, squash_merge) {
        (Some(number), _) => EventProvenance::PullRequestCommit(number),
        (None, true) => EventProvenance::SquashMergeCommit,
        (None, false) => EventProvenance::PlainCommit,
    };

    Ok(Event {
        id,
        kind: EventKind::Commit,
        timestamp,
        provenance,
        source: at.source.clone(),
        payload: Value::Object(entry),
    })
}

fn issue_event(mut entry: Map<String, Value>, at: &EntryAt<'_>) -> Result<Event, ParseError> {
    let id = take_id(&mut entry, "id", at)?;
    let timestamp = take_timestamp(&mut entry, "created_at", at)?;

    Ok(Event {
        id,
        kind: EventKind::IssueEvent,
        timestamp,
        provenance: EventProvenance::IssueActivity,
        source: at.source.clone(),
        payload: Value::Object(entry),
    })
}

fn take_id(
    entry: &mut Map<String, Value>,
    field: &'static str,
    at: &EntryAt<'_>,
) -> Result<EventId, ParseError> {
    let raw = match entry.remove(field) {
        None | Some(Value::Null) => return Err(at.missing(field)),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => return Err(at.invalid(field, other)),
    };
    EventId::new(raw.clone()).map_err(|_| at.invalid(field, Value::String(raw)))
}

fn take_timestamp(
    entry: &mut Map<String, Value>,
    field: &'static str,
    at: &EntryAt<'_>,
) -> Result<DateTime<Utc>, ParseError> {
    let raw = match entry.remove(field) {
        None | Some(Value::Null) => return Err(at.missing(field)),
        Some(Value::String(s)) => s,
        Some(other) => return Err(at.invalid(field, other)),
    };
    let parsed = DateTime::parse_from_rfc3339(raw.trim()).map_err(|reason| ParseError::Timestamp {
        origin: at.source.to_string(),
        array: at.array,
        index: at.index,
        value: raw.clone(),
        reason,
    })?;
    Ok(parsed.with_timezone(&Utc).trunc_subsecs(0))
}
