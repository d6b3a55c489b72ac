//! Merging per-source event collections into one ordered timeline.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::aggregate::QueryInterval;
use crate::event::Event;
use crate::event_kind::EventKind;
use crate::types::EventId;

/// All tracked events across sources, deduplicated and ordered by time.
///
/// Events with equal timestamps keep the order in which they were supplied.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    events: Vec<Event>,
    duplicates_dropped: usize,
}

impl Timeline {
    /// Build a timeline from any number of event collections.
    ///
    /// # Algorithm
    ///
    /// 1. Concatenate collections in the order given
    /// 2. Drop any event whose `(kind, id)` was already seen (first one wins)
    /// 3. Stable sort by timestamp ascending
    pub fn build<I>(collections: I) -> Self
    where
        I: IntoIterator<Item = Vec<Event>>,
    {
        let mut seen: HashSet<(EventKind, EventId)> = HashSet::new();
        let mut events = Vec::new();
        let mut duplicates_dropped = 0;

        for collection in collections {
            for event in collection {
                let (kind, id) = event.identity();
                if seen.insert((kind, id.clone())) {
                    events.push(event);
                } else {
                    tracing::debug!(
                        kind = %event.kind,
                        id = %event.id,
                        source = %event.source,
                        "dropping duplicate event"
                    );
                    duplicates_dropped += 1;
                }
            }
        }

        // sort_by_key is stable: ties keep insertion order
        events.sort_by_key(|e| e.timestamp);

        tracing::debug!(
            events = events.len(),
            duplicates_dropped,
            "built timeline"
        );

        Self {
            events,
            duplicates_dropped,
        }
    }

    /// The ordered events.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// How many events were discarded as duplicates while building.
    pub const fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }

    /// Timestamp of the earliest event.
    pub fn first_at(&self) -> Option<DateTime<Utc>> {
        self.events.first().map(|e| e.timestamp)
    }

    /// Timestamp of the latest event.
    pub fn last_at(&self) -> Option<DateTime<Utc>> {
        self.events.last().map(|e| e.timestamp)
    }

    /// Number of events whose timestamp falls in `[start, end)`.
    pub fn count_within(&self, interval: &QueryInterval) -> usize {
        let lo = self
            .events
            .partition_point(|e| e.timestamp < interval.start());
        let hi = self.events.partition_point(|e| e.timestamp < interval.end());
        hi.saturating_sub(lo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventProvenance;
    use crate::types::SourceId;
    use chrono::TimeZone;

    fn ts(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 1, 9, 0, 0).unwrap() + chrono::Duration::minutes(minutes)
    }

    fn commit(id: &str, minutes: i64, source: &str) -> Event {
        Event {
            id: EventId::new(id).unwrap(),
            kind: EventKind::Commit,
            timestamp: ts(minutes),
            provenance: EventProvenance::PlainCommit,
            source: SourceId::new(source).unwrap(),
            payload: serde_json::Value::Null,
        }
    }

    fn issue(id: &str, minutes: i64) -> Event {
        Event {
            id: EventId::new(id).unwrap(),
            kind: EventKind::IssueEvent,
            timestamp: ts(minutes),
            provenance: EventProvenance::IssueActivity,
            source: SourceId::new("tracker").unwrap(),
            payload: serde_json::Value::Null,
        }
    }

    fn ids(timeline: &Timeline) -> Vec<&str> {
        timeline.events().iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_empty_input() {
        let timeline = Timeline::build(Vec::<Vec<Event>>::new());
        assert!(timeline.is_empty());
        assert_eq!(timeline.first_at(), None);
        assert_eq!(timeline.last_at(), None);
    }

    #[test]
    fn test_merges_and_sorts_sources() {
        let a = vec![commit("a1", 30, "a"), commit("a2", 0, "a")];
        let b = vec![issue("b1", 10), commit("b2", 60, "b")];

        let timeline = Timeline::build([a, b]);

        assert_eq!(ids(&timeline), ["a2", "b1", "a1", "b2"]);
        assert_eq!(timeline.first_at(), Some(ts(0)));
        assert_eq!(timeline.last_at(), Some(ts(60)));
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let a = vec![commit("x", 5, "a"), commit("y", 5, "a")];
        let b = vec![issue("z", 5), commit("w", 0, "b")];

        let timeline = Timeline::build([a, b]);

        assert_eq!(ids(&timeline), ["w", "x", "y", "z"]);
    }

    #[test]
    fn test_duplicate_commit_counted_once() {
        // Same commit seen in the main list and again inside a pull request
        let main = vec![commit("c1", 0, "repo"), commit("c2", 10, "repo")];
        let mut from_pr = commit("c1", 0, "repo");
        from_pr.provenance = EventProvenance::PullRequestCommit(4);

        let timeline = Timeline::build([main, vec![from_pr]]);

        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.duplicates_dropped(), 1);
        assert_eq!(timeline.events()[0].provenance, EventProvenance::PlainCommit);
    }

    #[test]
    fn test_same_id_different_kind_is_not_duplicate() {
        let timeline = Timeline::build([vec![commit("42", 0, "repo"), issue("42", 1)]]);
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.duplicates_dropped(), 0);
    }

    #[test]
    fn test_count_within_is_half_open() {
        let timeline = Timeline::build([vec![
            commit("a", 0, "r"),
            commit("b", 29, "r"),
            commit("c", 30, "r"),
            commit("d", 45, "r"),
        ]]);

        let first_cell = QueryInterval::new(ts(0), ts(30)).unwrap();
        let second_cell = QueryInterval::new(ts(30), ts(60)).unwrap();
        let later = QueryInterval::new(ts(60), ts(90)).unwrap();

        assert_eq!(timeline.count_within(&first_cell), 2);
        assert_eq!(timeline.count_within(&second_cell), 2);
        assert_eq!(timeline.count_within(&later), 0);
    }
}
