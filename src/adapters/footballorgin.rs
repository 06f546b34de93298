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

const BASE_URL: &str = "https://www.footballorgin.com";

/// Listing categories scraped on every run, first page only.
const CATEGORY_PATHS: &[&str] = &["full-match-replay", "tv-show", "news-and-interviews"];

/// footballorgin.com: WordPress listing of `article.post-item` cards; the
/// player lives in a `single_video_url` script object and multi-part
/// matches hang off a `series-listing` block.
pub struct FootballOrginAdapter;

impl FootballOrginAdapter {
    pub fn new() -> Self {
        Self
    }

    fn parse_listing(html: &str) -> Vec<Candidate> {
        let document = Html::parse_document(html);
        let Ok(item_selector) = Selector::parse(r#"article[class*="post-item"]"#) else {
            return Vec::new();
        };
        let title_selector = Selector::parse("h3.post-title a").ok();
        let image_selector = Selector::parse("img.blog-picture").ok();
        let category_selector = Selector::parse("div.categories-wrap a").ok();
        let date_selector = Selector::parse("time.entry-date").ok();

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
                .and_then(|img| {
                    // Lazy-loaded listings keep the real URL in data-src.
                    img.value().attr("data-src").or_else(|| img.value().attr("src"))
                })
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
                .map(|t| {
                    let text = t.text().collect::<String>();
                    // "2 hours ago - updated" style suffixes add nothing.
                    text.split('-').next().unwrap_or("").trim().to_string()
                })
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

    fn parse_detail_markup(html: &str) -> (String, String, Vec<String>) {
        let document = Html::parse_document(html);

        let date_text = Selector::parse("time.entry-date")
            .ok()
            .and_then(|s| document.select(&s).next().map(|t| t.text().collect::<String>()))
            .map(|t| t.trim().to_string())
            .unwrap_or_default();

        let duration = Selector::parse("span.duration-text")
            .ok()
            .and_then(|s| document.select(&s).next().map(|t| t.text().collect::<String>()))
            .map(|t| t.trim().to_string())
            .unwrap_or_default();

        let categories = Selector::parse(r#"div.categories-wrap a, a[rel="category tag"]"#)
            .ok()
            .map(|s| {
                document
                    .select(&s)
                    .map(|a| a.text().collect::<String>().trim().to_string())
                    .collect()
            })
            .unwrap_or_default();

        (date_text, duration, categories)
    }
}

impl Default for FootballOrginAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for FootballOrginAdapter {
    fn id(&self) -> &'static str {
        "footballorgin"
    }

    fn name(&self) -> &'static str {
        "FootballOrgin"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    async fn list_candidates(
        &self,
        fetcher: &dyn PageFetcher,
        limits: Limits,
    ) -> Result<Vec<Candidate>, ScrapeError> {
        let mut candidates = Vec::new();
        let mut seen = HashSet::new();

        for path in CATEGORY_PATHS {
            if candidates.len() >= limits.max_candidates {
                break;
            }
            let listing_url = format!("{}/{}/", BASE_URL, path);
            let html = match fetcher.fetch(&listing_url).await {
                Ok(body) => body,
                Err(err) => {
                    warn!(url = %listing_url, error = %err, "listing fetch failed, skipping category");
                    continue;
                }
            };
            for candidate in Self::parse_listing(&html) {
                if candidates.len() >= limits.max_candidates {
                    break;
                }
                push_candidate(&mut candidates, &mut seen, candidate);
            }
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

        let (mut date_text, duration, mut categories) = Self::parse_detail_markup(&html);

        // Structured metadata fills whatever the markup left blank.
        let objects = structured::extract_objects(&html);
        let (published, modified) = structured::article_dates(&objects);
        if date_text.is_empty() {
            date_text = published.unwrap_or_default();
        }
        if categories.is_empty() {
            categories = structured::article_keywords(&objects);
        }
        let preview_image = structured::first_of_type(&objects, &["Article", "NewsArticle", "VideoObject"])
            .and_then(|article| structured::image_of(article, &objects))
            .unwrap_or_default();

        let mut detail = DetailPage {
            links,
            categories,
            date_text,
            modified_text: modified.unwrap_or_default(),
            duration,
            preview_image,
            ..Default::default()
        };
        detail.extra.insert("player".to_string(), "vidorev".to_string());
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <article class="grid-post post-item">
            <h3 class="post-title"><a href="/arsenal-vs-chelsea-full-match/">Arsenal vs Chelsea</a></h3>
            <img class="blog-picture" data-src="https://www.footballorgin.com/img/a.jpg" src="placeholder.gif">
            <div class="categories-wrap"><a>Premier League</a><a>Full Match</a></div>
            <span class="duration-text">01:45:00</span>
            <time class="entry-date">3 hours ago - updated</time>
        </article>
        <article class="grid-post post-item">
            <h3 class="post-title"><a href="/arsenal-vs-chelsea-full-match/">Arsenal vs Chelsea</a></h3>
        </article>
        <article class="grid-post post-item">
            <h3 class="post-title">No link here</h3>
        </article>
    "#;

    #[test]
    fn test_listing_parse_skips_broken_items() {
        // The duplicate URL survives here; the listing pass dedupes via
        // push_candidate.
        let candidates = FootballOrginAdapter::parse_listing(LISTING);
        assert_eq!(candidates.len(), 2);
        let c = &candidates[0];
        assert_eq!(c.title, "Arsenal vs Chelsea");
        assert_eq!(c.url, "https://www.footballorgin.com/arsenal-vs-chelsea-full-match/");
        assert_eq!(c.preview_image, "https://www.footballorgin.com/img/a.jpg");
        assert_eq!(c.listing_categories, vec!["Premier League", "Full Match"]);
        assert_eq!(c.listing_date, "3 hours ago");
    }

    #[test]
    fn test_detail_markup_parse() {
        let html = r#"
            <time class="entry-date">January 3, 2024</time>
            <span class="duration-text">92:10</span>
            <div class="categories-wrap"><a>Premier League</a></div>
        "#;
        let (date, duration, categories) = FootballOrginAdapter::parse_detail_markup(html);
        assert_eq!(date, "January 3, 2024");
        assert_eq!(duration, "92:10");
        assert_eq!(categories, vec!["Premier League"]);
    }
}
