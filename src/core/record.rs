use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One observed content item, normalized across all sources.
///
/// Every display field defaults to an empty string rather than null so the
/// persisted JSON stays uniform regardless of which source produced the
/// record. `#[serde(default)]` lets partially-written legacy entries load
/// instead of poisoning the whole store file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRecord {
    pub match_id: String,
    pub source_id: String,
    pub source_name: String,
    pub source_url: String,
    pub url: String,
    pub title: String,
    pub preview_image: String,
    pub duration: String,
    pub categories: Vec<String>,
    pub competition: String,
    pub published_raw: String,
    pub published_at: String,
    pub updated_at: String,
    pub scraped_at: String,
    pub links: Vec<LinkEntry>,
    pub metadata: BTreeMap<String, String>,
}

impl MatchRecord {
    /// A record without a source or URL cannot be merged or re-identified;
    /// such entries only appear via hand-edited or corrupt store files.
    pub fn is_valid(&self) -> bool {
        !self.source_id.is_empty() && !self.url.is_empty()
    }
}

/// One playable stream belonging to a record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LinkEntry {
    pub label: String,
    pub url: String,
    pub host: String,
    pub kind: String,
}

impl Default for LinkEntry {
    fn default() -> Self {
        Self {
            label: "Replay".to_string(),
            url: String::new(),
            host: String::new(),
            kind: "replay".to_string(),
        }
    }
}

impl LinkEntry {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        let label = label.into();
        let host = url::Url::parse(&url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
            .unwrap_or_default();
        Self {
            label: if label.trim().is_empty() {
                "Replay".to_string()
            } else {
                label.trim().to_string()
            },
            url,
            host,
            kind: "replay".to_string(),
        }
    }
}

/// Per-id bookkeeping: written after each successful capture, consulted
/// before re-processing a candidate in a later run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub title: String,
    pub source: String,
    pub link_count: usize,
    pub last_updated: DateTime<Utc>,
}

/// A listing-page item before detail extraction.
#[derive(Debug, Clone, Default)]
pub struct Candidate {
    pub title: String,
    pub url: String,
    pub preview_image: String,
    pub listing_date: String,
    pub listing_categories: Vec<String>,
}

/// Everything an adapter learned from a detail page, handed to the
/// record builder. `extra` carries source-specific diagnostics that end
/// up in `MatchRecord::metadata`.
#[derive(Debug, Clone, Default)]
pub struct DetailPage {
    pub links: Vec<LinkEntry>,
    pub categories: Vec<String>,
    pub date_text: String,
    pub modified_text: String,
    pub duration: String,
    pub preview_image: String,
    pub extra: BTreeMap<String, String>,
}
