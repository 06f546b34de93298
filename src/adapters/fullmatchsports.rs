use crate::adapters::{absolutize, push_candidate, SourceAdapter};
use crate::core::engine::Limits;
use crate::core::error::ScrapeError;
use crate::core::fetch::PageFetcher;
use crate::core::links;
use crate::core::record::{Candidate, DetailPage};
use crate::core::structured;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::warn;
use url::Url;

const BASE_URL: &str = "https://fullmatchsports.co";

/// fullmatchsports.co: embeds sit as plain iframes and mirror anchors
/// inside the entry content, one per heading ("First Half", "Second
/// Half"). Kickoff time is a banner paragraph on the detail page.
pub struct FullMatchSportsAdapter;

impl FullMatchSportsAdapter {
    pub fn new() -> Self {
        Self
    }

    fn parse_listing(html: &str) -> Vec<Candidate> {
        let document = Html::parse_document(html);
        let Ok(item_selector) = Selector::parse("article.item-list, article.post-listing article, article") else {
            return Vec::new();
        };
        let title_selector = Selector::parse("h2.post-box-title a, h2.entry-title a").ok();
        let image_selector = Selector::parse("img").ok();
        let category_selector = Selector::parse("span.post-cats a, a[rel~=category]").ok();
        let date_selector = Selector::parse("span.tie-date, time").ok();

        let mut out = Vec::new();
        for item in document.select(&item_selector) {
            let Some(link) = title_selector.as_ref().and_then(|s| item.select(s).next()) else {
                continue;
            };
            let Some(href) = link.value().attr("href") else { continue };
            let Some(url) = absolutize(BASE_URL, href) else { continue };
            let title = link.text().collect::<String>().trim().to_string();
            if title.is_empty() {
                continue;
            }

            let preview_image = image_selector
                .as_ref()
                .and_then(|s| item.select(s).next())
                .and_then(|img| img.value().attr("data-src").or_else(|| img.value().attr("src")))
                .unwrap_or_default()
                .to_string();

            let listing_categories = category_selector
                .as_ref()
                .map(|s| {
                    item.select(s)
                        .map(|a| a.text().collect::<String>().trim().to_string())
                        .collect()
                })
                .unwrap_or_default();

            let listing_date = date_selector
                .as_ref()
                .and_then(|s| item.select(s).next())
                .map(|t| t.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            out.push(Candidate {
                title,
                url,
                preview_image,
                listing_date,
                listing_categories,
            });
        }
        out
    }

    /// The "KICK-OFF at 20:00 (UTC) on 3 January 2024" banner, wherever
    /// the theme put it inside the entry content.
    fn kickoff_banner(html: &str) -> String {
        let document = Html::parse_document(html);
        let Ok(selector) = Selector::parse("div.entry-content p, div.entry p") else {
            return String::new();
        };
        for paragraph in document.select(&selector) {
            let text = paragraph.text().collect::<String>();
            let trimmed = text.trim();
            if trimmed.to_lowercase().contains("kick-off") {
                return trimmed.to_string();
            }
        }
        String::new()
    }

    fn detail_categories(html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        Selector::parse("a[rel~=category], span.post-cats a")
            .ok()
            .map(|s| {
                document
                    .select(&s)
                    .map(|a| a.text().collect::<String>().trim().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for FullMatchSportsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for FullMatchSportsAdapter {
    fn id(&self) -> &'static str {
        "fullmatchsports"
    }

    fn name(&self) -> &'static str {
        "Full Match Sports"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    async fn list_candidates(
        &self,
        fetcher: &dyn PageFetcher,
        limits: Limits,
    ) -> Result<Vec<Candidate>, ScrapeError> {
        let listing_url = format!("{}/category/full-match/", BASE_URL);
        let html = match fetcher.fetch(&listing_url).await {
            Ok(body) => body,
            Err(err) => {
                warn!(url = %listing_url, error = %err, "listing fetch failed");
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

        let links = links::resolve(&html, &page_url, fetcher).await;
        if links.is_empty() {
            return Err(ScrapeError::ZeroLinks);
        }

        let mut date_text = Self::kickoff_banner(&html);
        let mut categories = Self::detail_categories(&html);

        let objects = structured::extract_objects(&html);
        let (published, modified) = structured::article_dates(&objects);
        if date_text.is_empty() {
            date_text = published.unwrap_or_default();
        }
        if categories.is_empty() {
            categories = structured::article_keywords(&objects);
        }
        let preview_image = structured::first_of_type(&objects, &["Article", "NewsArticle"])
            .and_then(|article| structured::image_of(article, &objects))
            .unwrap_or_default();

        Ok(DetailPage {
            links,
            categories,
            date_text,
            modified_text: modified.unwrap_or_default(),
            preview_image,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_parse() {
        let html = r#"
            <article class="item-list">
                <h2 class="post-box-title"><a href="/arsenal-vs-chelsea-full-match/">Arsenal vs Chelsea Full Match</a></h2>
                <img src="https://fullmatchsports.co/img/a.jpg">
                <span class="post-cats"><a>Premier League</a></span>
                <span class="tie-date">January 3, 2024</span>
            </article>
        "#;
        let candidates = FullMatchSportsAdapter::parse_listing(html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].url, "https://fullmatchsports.co/arsenal-vs-chelsea-full-match/");
        assert_eq!(candidates[0].listing_date, "January 3, 2024");
    }

    #[test]
    fn test_kickoff_banner_extraction() {
        let html = r#"
            <div class="entry-content">
                <p>Watch the full match below.</p>
                <p>KICK-OFF at 20:00 (UTC) on 3rd January 2024</p>
            </div>
        "#;
        assert_eq!(
            FullMatchSportsAdapter::kickoff_banner(html),
            "KICK-OFF at 20:00 (UTC) on 3rd January 2024"
        );
        assert_eq!(FullMatchSportsAdapter::kickoff_banner("<p>no banner</p>"), "");
    }
}
