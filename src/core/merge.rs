use crate::core::record::{LogEntry, MatchRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Fold freshly built records into the previous store.
///
/// Fresh always wins on id collision. Output ordering is touched-first:
/// records captured this run come before records carried over unchanged,
/// each partition keeping its original relative order. That gives a stable
/// pseudo-recency ordering without persisting a sort key, and ids the
/// adapters skipped this run (already logged, source down) survive with
/// their previously captured links intact.
pub fn merge(existing: Vec<MatchRecord>, fresh: Vec<MatchRecord>) -> Vec<MatchRecord> {
    let fresh_ids: HashSet<String> = fresh.iter().map(|r| r.match_id.clone()).collect();

    let mut out = Vec::with_capacity(existing.len() + fresh.len());
    let mut seen: HashSet<String> = HashSet::new();

    for record in fresh {
        // Defensive: a record without a source or URL cannot be
        // re-identified on the next run.
        if !record.is_valid() {
            continue;
        }
        if seen.insert(record.match_id.clone()) {
            out.push(record);
        }
    }

    for record in existing {
        if !record.is_valid() {
            continue;
        }
        if fresh_ids.contains(&record.match_id) {
            continue;
        }
        if seen.insert(record.match_id.clone()) {
            out.push(record);
        }
    }

    out
}

/// Per-id capture bookkeeping, persisted between runs.
///
/// Consulted before re-processing a candidate (already logged means skip,
/// unless the adapter opts into re-checking) and written immediately after
/// each successful capture. Entries are never deleted automatically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityLog {
    entries: BTreeMap<String, LogEntry>,
}

impl ActivityLog {
    pub fn contains(&self, match_id: &str) -> bool {
        self.entries.contains_key(match_id)
    }

    pub fn get(&self, match_id: &str) -> Option<&LogEntry> {
        self.entries.get(match_id)
    }

    pub fn record(
        &mut self,
        match_id: &str,
        title: &str,
        source: &str,
        link_count: usize,
        now: DateTime<Utc>,
    ) {
        self.entries.insert(
            match_id.to_string(),
            LogEntry {
                title: title.to_string(),
                source: source.to_string(),
                link_count,
                last_updated: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::LinkEntry;

    fn record(id: &str, links: usize) -> MatchRecord {
        MatchRecord {
            match_id: id.to_string(),
            source_id: "footballorgin".to_string(),
            url: format!("https://example.com/{}", id),
            links: (0..links)
                .map(|i| LinkEntry::new("Replay", format!("https://ok.ru/v/{}-{}", id, i)))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_with_no_fresh_records_is_identity() {
        let existing = vec![record("a", 1), record("b", 2)];
        let merged = merge(existing.clone(), Vec::new());
        let ids: Vec<_> = merged.iter().map(|r| r.match_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(merged[1].links.len(), 2);
    }

    #[test]
    fn test_fresh_wins_on_collision() {
        let existing = vec![record("x", 1)];
        let fresh = vec![record("x", 3)];
        let merged = merge(existing, fresh);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].links.len(), 3);
    }

    #[test]
    fn test_touched_records_order_first() {
        let existing = vec![record("a", 1), record("b", 1)];
        let updated_b = record("b", 2);
        let merged = merge(existing, vec![updated_b]);
        let ids: Vec<_> = merged.iter().map(|r| r.match_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(merged[0].links.len(), 2);
    }

    #[test]
    fn test_corrupt_records_are_dropped() {
        let mut corrupt = record("z", 1);
        corrupt.source_id.clear();
        let mut no_url = record("y", 1);
        no_url.url.clear();
        let merged = merge(vec![corrupt, record("a", 1)], vec![no_url]);
        let ids: Vec<_> = merged.iter().map(|r| r.match_id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn test_duplicate_ids_within_fresh_collapse() {
        let fresh = vec![record("d", 1), record("d", 2)];
        let merged = merge(Vec::new(), fresh);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].links.len(), 1);
    }

    #[test]
    fn test_log_records_and_updates() {
        let mut log = ActivityLog::default();
        let now = Utc::now();
        assert!(!log.contains("m1"));
        log.record("m1", "Arsenal vs Chelsea", "footballorgin", 2, now);
        assert!(log.contains("m1"));
        assert_eq!(log.get("m1").unwrap().link_count, 2);

        log.record("m1", "Arsenal vs Chelsea", "footballorgin", 4, now);
        assert_eq!(log.get("m1").unwrap().link_count, 4);
        assert_eq!(log.len(), 1);
    }
}
