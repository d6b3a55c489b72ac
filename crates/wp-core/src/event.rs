//! Activity events read from commit and issue-tracker records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event_kind::EventKind;
use crate::types::{EventId, SourceId};

/// A single timestamped piece of activity evidence.
///
/// Events are built once by the record reader and only ever read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Stable identity within its kind (commit SHA or issue-event id).
    pub id: EventId,
    /// Commit or issue event.
    pub kind: EventKind,
    /// When the activity happened, whole seconds in UTC.
    pub timestamp: DateTime<Utc>,
    /// How the event entered its source record.
    pub provenance: EventProvenance,
    /// The record this event was read from.
    pub source: SourceId,
    /// Everything else the record carried for this entry, untouched.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Event {
    /// The `(kind, id)` pair that identifies the same activity across sources.
    pub fn identity(&self) -> (EventKind, &EventId) {
        (self.kind, &self.id)
    }
}

/// Where an event came from within its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventProvenance {
    /// A commit from the main commit list.
    PlainCommit,
    /// A commit produced by squash-merging a pull request.
    SquashMergeCommit,
    /// A commit listed as part of the given pull request.
    PullRequestCommit(u64),
    /// An issue-tracker event.
    IssueActivity,
}

impl EventProvenance {
    /// Short label for display.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::PlainCommit => "commit".to_string(),
            Self::SquashMergeCommit => "squash-merge".to_string(),
            Self::PullRequestCommit(number) => format!("pr#{number}"),
            Self::IssueActivity => "issue".to_string(),
        }
    }
}
