pub mod footballorgin;
pub mod footyroom;
pub mod fullmatchsports;
pub mod hoofoot;

use crate::core::engine::Limits;
use crate::core::error::ScrapeError;
use crate::core::fetch::PageFetcher;
use crate::core::record::{Candidate, DetailPage};
use async_trait::async_trait;
use url::Url;

pub use footballorgin::FootballOrginAdapter;
pub use footyroom::FootyRoomAdapter;
pub use fullmatchsports::FullMatchSportsAdapter;
pub use hoofoot::HoofootAdapter;

/// The per-site contract. An adapter knows its listing markup and its
/// detail-page quirks; everything downstream of `DetailPage` is shared.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn base_url(&self) -> &'static str;

    /// Whether candidates already present in the activity log should be
    /// re-fetched to pick up link-count changes. Off by default; sources
    /// that keep adding mirrors to old posts opt in.
    fn recheck_logged(&self) -> bool {
        false
    }

    /// One bounded listing pass: candidates with a resolvable title+URL
    /// pair, de-duplicated by URL. A listing fetch failure yields an
    /// empty list, not an error.
    async fn list_candidates(
        &self,
        fetcher: &dyn PageFetcher,
        limits: Limits,
    ) -> Result<Vec<Candidate>, ScrapeError>;

    /// Fetch and mine one detail page. `ZeroLinks` when nothing playable
    /// was found; the engine drops the candidate silently.
    async fn fetch_detail(
        &self,
        fetcher: &dyn PageFetcher,
        candidate: &Candidate,
    ) -> Result<DetailPage, ScrapeError>;
}

/// All production adapters, in run order.
pub fn default_adapters() -> Vec<Box<dyn SourceAdapter>> {
    vec![
        Box::new(FootballOrginAdapter::new()),
        Box::new(FullMatchSportsAdapter::new()),
        Box::new(HoofootAdapter::new()),
        Box::new(FootyRoomAdapter::new()),
    ]
}

/// Resolve a listing href against the site base, tolerating relative and
/// protocol-relative forms.
pub(crate) fn absolutize(base: &str, href: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    base.join(href.trim()).ok().map(|u| u.to_string())
}

/// Push a candidate unless its URL was already seen this listing pass.
pub(crate) fn push_candidate(
    candidates: &mut Vec<Candidate>,
    seen: &mut std::collections::HashSet<String>,
    candidate: Candidate,
) {
    if candidate.title.is_empty() || candidate.url.is_empty() {
        return;
    }
    if seen.insert(candidate.url.to_lowercase()) {
        candidates.push(candidate);
    }
}
