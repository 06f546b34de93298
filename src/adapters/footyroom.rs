use crate::adapters::{absolutize, push_candidate, SourceAdapter};
use crate::core::engine::Limits;
use crate::core::error::ScrapeError;
use crate::core::fetch::PageFetcher;
use crate::core::links;
use crate::core::record::{Candidate, DetailPage, LinkEntry};
use crate::core::structured;
use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::warn;
use url::Url;

const BASE_URL: &str = "https://footyroom.co";

/// footyroom.co: the player is loaded over an AJAX exchange, one POST per
/// video server tab, each returning an iframe fragment. Old posts keep
/// gaining mirror servers, so this adapter re-checks logged candidates.
pub struct FootyRoomAdapter;

impl FootyRoomAdapter {
    pub fn new() -> Self {
        Self
    }

    fn parse_listing(html: &str) -> Vec<Candidate> {
        let document = Html::parse_document(html);
        let Ok(item_selector) = Selector::parse("article.post-card, div.post-card") else {
            return Vec::new();
        };
        let title_selector = Selector::parse("h3 a, h2 a, a.post-card-title").ok();
        let image_selector = Selector::parse("img").ok();
        let category_selector = Selector::parse("span.competition, a.competition").ok();
        let date_selector = Selector::parse("time, span.post-date").ok();

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

    /// The post id and server tabs the AJAX player endpoint expects.
    fn player_request(html: &str) -> Option<(String, Vec<(String, String)>)> {
        let document = Html::parse_document(html);
        let player_selector = Selector::parse("[data-post-id]").ok()?;
        let player = document.select(&player_selector).next()?;
        let post_id = player.value().attr("data-post-id")?.to_string();

        let tab_selector = Selector::parse("[data-server]").ok()?;
        let mut servers = Vec::new();
        for tab in document.select(&tab_selector) {
            let Some(server_id) = tab.value().attr("data-server") else { continue };
            let label = tab.text().collect::<String>().trim().to_string();
            let label = if label.is_empty() {
                format!("Server {}", server_id)
            } else {
                label
            };
            servers.push((server_id.to_string(), label));
        }
        Some((post_id, servers))
    }

    /// The POST response is an HTML fragment around one iframe.
    fn iframe_src(fragment: &str) -> Option<String> {
        let re = Regex::new(r#"<iframe[^>]+src\s*=\s*["']([^"']+)["']"#).ok()?;
        let src = re.captures(fragment)?.get(1)?.as_str();
        if let Some(rest) = src.strip_prefix("//") {
            Some(format!("https://{}", rest))
        } else {
            Some(src.to_string())
        }
    }
}

impl Default for FootyRoomAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for FootyRoomAdapter {
    fn id(&self) -> &'static str {
        "footyroom"
    }

    fn name(&self) -> &'static str {
        "FootyRoom"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    fn recheck_logged(&self) -> bool {
        true
    }

    async fn list_candidates(
        &self,
        fetcher: &dyn PageFetcher,
        limits: Limits,
    ) -> Result<Vec<Candidate>, ScrapeError> {
        let listing_url = format!("{}/matches/", BASE_URL);
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

        let mut links: Vec<LinkEntry> = Vec::new();

        if let Some((post_id, servers)) = Self::player_request(&html) {
            let endpoint = format!("{}/api/player", BASE_URL);
            for (server_id, label) in servers {
                let fields = [("post_id", post_id.as_str()), ("server", server_id.as_str())];
                let fragment = match fetcher.post_form(&endpoint, &fields).await {
                    Ok(body) => body,
                    Err(err) => {
                        warn!(url = %candidate.url, server = %server_id, error = %err, "player exchange failed");
                        continue;
                    }
                };
                let Some(src) = Self::iframe_src(&fragment) else { continue };
                let Ok(parsed) = Url::parse(&src) else { continue };
                if !links::is_video_url(&parsed) {
                    continue;
                }
                if !links.iter().any(|l| l.url.eq_ignore_ascii_case(&src)) {
                    links.push(LinkEntry::new(label, src));
                }
            }
        }

        // Some posts skip the AJAX player and embed directly.
        for entry in links::resolve(&html, &page_url, fetcher).await {
            if !links.iter().any(|l| l.url.eq_ignore_ascii_case(&entry.url)) {
                links.push(entry);
            }
        }
        if links.is_empty() {
            return Err(ScrapeError::ZeroLinks);
        }

        let objects = structured::extract_objects(&html);
        let (published, modified) = structured::article_dates(&objects);
        let mut categories = structured::article_keywords(&objects);
        if categories.is_empty() {
            categories = candidate.listing_categories.clone();
        }
        let preview_image = structured::first_of_type(&objects, &["Article", "NewsArticle", "VideoObject"])
            .and_then(|article| structured::image_of(article, &objects))
            .unwrap_or_default();

        let mut detail = DetailPage {
            links,
            categories,
            date_text: published.unwrap_or_default(),
            modified_text: modified.unwrap_or_default(),
            preview_image,
            ..Default::default()
        };
        detail.extra.insert("player".to_string(), "ajax-server-tabs".to_string());
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_request_parse() {
        let html = r#"
            <div id="player" data-post-id="8812">
                <button data-server="1">Server 1</button>
                <button data-server="2"></button>
            </div>
        "#;
        let (post_id, servers) = FootyRoomAdapter::player_request(html).unwrap();
        assert_eq!(post_id, "8812");
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0], ("1".to_string(), "Server 1".to_string()));
        assert_eq!(servers[1], ("2".to_string(), "Server 2".to_string()));
    }

    #[test]
    fn test_iframe_src_from_fragment() {
        let fragment = r#"<div class="player"><iframe width="640" src="//streamable.com/e/xyz"></iframe></div>"#;
        assert_eq!(
            FootyRoomAdapter::iframe_src(fragment),
            Some("https://streamable.com/e/xyz".to_string())
        );
        assert_eq!(FootyRoomAdapter::iframe_src("<p>nope</p>"), None);
    }

    #[test]
    fn test_listing_parse() {
        let html = r#"
            <article class="post-card">
                <h3><a href="/matches/arsenal-chelsea">Arsenal vs Chelsea</a></h3>
                <img data-src="https://footyroom.co/img/a.jpg">
                <span class="competition">Premier League</span>
                <time>yesterday</time>
            </article>
        "#;
        let candidates = FootyRoomAdapter::parse_listing(html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].url, "https://footyroom.co/matches/arsenal-chelsea");
        assert_eq!(candidates[0].listing_date, "yesterday");
    }
}
