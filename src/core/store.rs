use crate::core::merge::ActivityLog;
use crate::core::record::MatchRecord;
use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Load the persisted store. Missing or unreadable files start a fresh
/// merge rather than failing the run; losing a corrupt store is the
/// lesser evil against never being able to run again.
pub fn load_store(path: &Path) -> Vec<MatchRecord> {
    let Ok(raw) = fs::read_to_string(path) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<MatchRecord>>(&raw) {
        Ok(records) => records,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not decode store, starting fresh");
            Vec::new()
        }
    }
}

/// Rewrite the whole store. This is the one failure a run may not
/// swallow: an unwritable store means captured data is lost.
pub fn save_store(path: &Path, records: &[MatchRecord]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).with_context(|| format!("writing store to {}", path.display()))?;
    Ok(())
}

pub fn load_log(path: &Path) -> ActivityLog {
    let Ok(raw) = fs::read_to_string(path) else {
        return ActivityLog::default();
    };
    match serde_json::from_str::<ActivityLog>(&raw) {
        Ok(log) => log,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not decode activity log, starting fresh");
            ActivityLog::default()
        }
    }
}

pub fn save_log(path: &Path, log: &ActivityLog) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(log)?;
    fs::write(path, json).with_context(|| format!("writing activity log to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_missing_files_yield_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_store(&dir.path().join("missing.json")).is_empty());
        assert!(load_log(&dir.path().join("missing.json")).is_empty());
    }

    #[test]
    fn test_corrupt_store_yields_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matches.json");
        fs::write(&path, "{not json").unwrap();
        assert!(load_store(&path).is_empty());
    }

    #[test]
    fn test_store_round_trip_preserves_non_ascii() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matches.json");

        let record = MatchRecord {
            match_id: "abc".to_string(),
            source_id: "footballorgin".to_string(),
            url: "https://example.com/atlético".to_string(),
            title: "Atlético Madrid vs Bayern München".to_string(),
            ..Default::default()
        };
        save_store(&path, &[record]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Atlético Madrid vs Bayern München"));

        let loaded = load_store(&path);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "Atlético Madrid vs Bayern München");
    }

    #[test]
    fn test_log_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scrape_log.json");

        let mut log = ActivityLog::default();
        log.record("m1", "Arsenal vs Chelsea", "footballorgin", 2, Utc::now());
        save_log(&path, &log).unwrap();

        let loaded = load_log(&path);
        assert!(loaded.contains("m1"));
        assert_eq!(loaded.get("m1").unwrap().link_count, 2);
    }
}
