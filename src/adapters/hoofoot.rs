use crate::adapters::{absolutize, push_candidate, SourceAdapter};
use crate::core::engine::Limits;
use crate::core::error::ScrapeError;
use crate::core::fetch::PageFetcher;
use crate::core::links;
use crate::core::record::{Candidate, DetailPage, LinkEntry};
use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::warn;
use url::Url;

const BASE_URL: &str = "https://hoofoot.com";

/// hoofoot.com: highlight reels behind an intermediate "play" identifier.
/// The detail page carries `play?v=<id>` references that map onto the
/// player frame at `/player?v=<id>`; no JSON, no iframes on the page
/// itself.
pub struct HoofootAdapter;

impl HoofootAdapter {
    pub fn new() -> Self {
        Self
    }

    fn parse_listing(html: &str) -> Vec<Candidate> {
        let document = Html::parse_document(html);
        let Ok(item_selector) = Selector::parse(r#"div#main a[href*="?match="]"#) else {
            return Vec::new();
        };
        let image_selector = Selector::parse("img").ok();
        let title_selector = Selector::parse("h2, span.title").ok();

        let mut out = Vec::new();
        for link in document.select(&item_selector) {
            let Some(href) = link.value().attr("href") else { continue };
            let Some(url) = absolutize(BASE_URL, href) else { continue };

            let title = title_selector
                .as_ref()
                .and_then(|s| link.select(s).next())
                .map(|t| t.text().collect::<String>())
                .unwrap_or_else(|| link.text().collect::<String>())
                .trim()
                .to_string();
            if title.is_empty() {
                continue;
            }

            let preview_image = image_selector
                .as_ref()
                .and_then(|s| link.select(s).next())
                .and_then(|img| img.value().attr("src"))
                .unwrap_or_default()
                .to_string();

            out.push(Candidate {
                title,
                url,
                preview_image,
                ..Default::default()
            });
        }
        out
    }

    /// `play?v=<id>` -> the player frame URL. The transform is the whole
    /// trick on this site; the id never appears as a direct link.
    fn play_links(html: &str) -> Vec<LinkEntry> {
        let Ok(re) = Regex::new(r#"play\?v=([A-Za-z0-9_-]+)"#) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for caps in re.captures_iter(html) {
            let id = &caps[1];
            if seen.insert(id.to_string()) {
                out.push(LinkEntry::new(
                    "Highlights",
                    format!("{}/player?v={}", BASE_URL, id),
                ));
            }
        }
        out
    }

    fn listing_date(html: &str) -> String {
        let document = Html::parse_document(html);
        Selector::parse("div#date, span.date")
            .ok()
            .and_then(|s| document.select(&s).next().map(|t| t.text().collect::<String>()))
            .map(|t| t.trim().to_string())
            .unwrap_or_default()
    }
}

impl Default for HoofootAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for HoofootAdapter {
    fn id(&self) -> &'static str {
        "hoofoot"
    }

    fn name(&self) -> &'static str {
        "Hoofoot"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    async fn list_candidates(
        &self,
        fetcher: &dyn PageFetcher,
        limits: Limits,
    ) -> Result<Vec<Candidate>, ScrapeError> {
        let html = match fetcher.fetch(BASE_URL).await {
            Ok(body) => body,
            Err(err) => {
                warn!(url = BASE_URL, error = %err, "listing fetch failed");
                return Ok(Vec::new());
            }
        };

        let mut candidates = Vec::new();
        let mut seen = HashSet::new();
        for candidate in Self::parse_listing(&html) {
            if candidates.len() >= limits.max_candidates {
                break;
            }
            push_candidate(&mut candidates, &mut seen, candidate);
        }
        Ok(candidates)
    }

    async fn fetch_detail(
        &self,
        fetcher: &dyn PageFetcher,
        candidate: &Candidate,
    ) -> Result<DetailPage, ScrapeError> {
        let html = fetcher.fetch(&candidate.url).await?;
        let page_url = Url::parse(&candidate.url)
            .map_err(|err| ScrapeError::Parse(format!("bad candidate url: {}", err)))?;

        // Union the play-id transform with the generic strategies; some
        // older posts still embed a plain iframe.
        let mut links = Self::play_links(&html);
        for entry in links::resolve(&html, &page_url, fetcher).await {
            if !links
                .iter()
                .any(|existing| existing.url.eq_ignore_ascii_case(&entry.url))
            {
                links.push(entry);
            }
        }
        if links.is_empty() {
            return Err(ScrapeError::ZeroLinks);
        }

        let mut detail = DetailPage {
            links,
            date_text: Self::listing_date(&html),
            categories: vec!["Highlights".to_string()],
            ..Default::default()
        };
        detail.extra.insert("player".to_string(), "hoofoot-frame".to_string());
        Ok(detail)
    }
}
