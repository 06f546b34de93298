use crate::adapters::SourceAdapter;
use crate::core::builder;
use crate::core::error::ScrapeError;
use crate::core::fetch::PageFetcher;
use crate::core::identity::compute_match_id;
use crate::core::merge::{merge, ActivityLog};
use crate::core::record::MatchRecord;
use chrono::Utc;
use tracing::{debug, info, warn};

/// Listing-time bounds handed to every adapter.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_candidates: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_candidates: 20 }
    }
}

/// Result of one whole run: the next persisted state plus counters for
/// the operator summary.
#[derive(Debug)]
pub struct RunOutcome {
    pub store: Vec<MatchRecord>,
    pub log: ActivityLog,
    pub new_records: usize,
}

/// Sequences the registered source adapters and owns the transition from
/// (previous store, previous log) to the next persisted state.
///
/// The engine never looks inside an adapter beyond the two contract
/// methods, and one source failing (or returning nothing) never stops the
/// others.
pub struct ScrapeEngine {
    adapters: Vec<Box<dyn SourceAdapter>>,
}

impl ScrapeEngine {
    pub fn new() -> Self {
        Self { adapters: Vec::new() }
    }

    pub fn register_adapter(&mut self, adapter: Box<dyn SourceAdapter>) {
        self.adapters.push(adapter);
    }

    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }

    pub async fn run(
        &self,
        fetcher: &dyn PageFetcher,
        limits: Limits,
        store: Vec<MatchRecord>,
        mut log: ActivityLog,
    ) -> RunOutcome {
        let mut fresh: Vec<MatchRecord> = Vec::new();

        for adapter in &self.adapters {
            info!(source = adapter.id(), "starting source");
            match self.run_source(adapter.as_ref(), fetcher, limits, &mut log).await {
                Ok(records) => {
                    info!(source = adapter.id(), captured = records.len(), "source finished");
                    fresh.extend(records);
                }
                Err(err) => {
                    warn!(source = adapter.id(), error = %err, "source failed, continuing with others");
                }
            }
        }

        let new_records = fresh.len();
        let store = merge(store, fresh);
        RunOutcome { store, log, new_records }
    }

    async fn run_source(
        &self,
        adapter: &dyn SourceAdapter,
        fetcher: &dyn PageFetcher,
        limits: Limits,
        log: &mut ActivityLog,
    ) -> anyhow::Result<Vec<MatchRecord>> {
        let candidates = adapter.list_candidates(fetcher, limits).await?;
        debug!(source = adapter.id(), candidates = candidates.len(), "listing pass done");

        let mut records = Vec::new();
        for candidate in candidates {
            let match_id = compute_match_id(&candidate.url);

            let logged_link_count = log.get(&match_id).map(|entry| entry.link_count);
            if logged_link_count.is_some() && !adapter.recheck_logged() {
                debug!(source = adapter.id(), url = %candidate.url, "already logged, skipping");
                continue;
            }

            let detail = match adapter.fetch_detail(fetcher, &candidate).await {
                Ok(detail) => detail,
                Err(ScrapeError::ZeroLinks) => {
                    debug!(source = adapter.id(), url = %candidate.url, "no playable links, dropping");
                    continue;
                }
                Err(err) => {
                    warn!(source = adapter.id(), url = %candidate.url, error = %err, "candidate failed, skipping");
                    continue;
                }
            };
            if detail.links.is_empty() {
                debug!(source = adapter.id(), url = %candidate.url, "no playable links, dropping");
                continue;
            }

            // Re-check path: only re-capture when the link count moved.
            if let Some(previous_count) = logged_link_count {
                if previous_count == detail.links.len() {
                    debug!(source = adapter.id(), url = %candidate.url, "logged with same link count, skipping");
                    continue;
                }
            }

            let now = Utc::now();
            let record = builder::build(
                adapter.id(),
                adapter.name(),
                adapter.base_url(),
                &candidate,
                &detail,
                now,
            );
            log.record(&record.match_id, &record.title, adapter.id(), record.links.len(), now);
            records.push(record);
        }

        Ok(records)
    }
}

impl Default for ScrapeEngine {
    fn default() -> Self {
        Self::new()
    }
}
