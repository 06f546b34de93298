use crate::core::fetch::PageFetcher;
use crate::core::record::LinkEntry;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

/// Host substrings that qualify an embed as a playable video.
const VIDEO_HOST_MARKERS: &[&str] = &[
    "youtube",
    "youtu.be",
    "dailymotion",
    "ok.ru",
    "rumble",
    "streamable",
    "vimeo",
    "mega.nz",
    "filemoon",
    "streamtape",
    "mixdrop",
    "dood",
    "voe.",
    "vidplay",
    "upns",
    "bigvideo",
];

/// Host substrings that disqualify a URL outright, even when a video
/// marker also matches (some ad networks imitate player hostnames).
const AD_HOST_MARKERS: &[&str] = &[
    "doubleclick",
    "googlesyndication",
    "google-analytics",
    "adservice",
    "taboola",
    "outbrain",
    "popads",
    "propeller",
    "adsterra",
    "exoclick",
    "onclicka",
];

/// Cue words that mark nearby text as a usable link label.
const LABEL_CUES: &[&str] = &[
    "half", "server", "link", "highlights", "extended", "full match", "replay", "part",
];

/// How many preceding sibling nodes to scan for a contextual label.
const LABEL_SCAN_DEPTH: usize = 8;

/// Resolve every playable link reachable from a detail page, including
/// series/multi-part sub-pages. An empty result means "no video found"
/// and is not an error.
pub async fn resolve(
    html: &str,
    page_url: &Url,
    fetcher: &dyn PageFetcher,
) -> Vec<LinkEntry> {
    let mut links = resolve_static(html, page_url);

    for (series_label, series_url) in series_links(html, page_url) {
        // The primary page's own strategies already ran; only sub-pages
        // need a fetch.
        if series_url == page_url.as_str() {
            continue;
        }
        let sub_html = match fetcher.fetch(&series_url).await {
            Ok(body) => body,
            Err(err) => {
                warn!(url = %series_url, error = %err, "series sub-page fetch failed");
                continue;
            }
        };
        let sub_url = match Url::parse(&series_url) {
            Ok(parsed) => parsed,
            Err(_) => continue,
        };
        for mut entry in resolve_static(&sub_html, &sub_url) {
            // The series listing usually has the better label ("First
            // Half", "Extended Highlights") than the sub-page itself.
            if entry.label == "Replay" && !series_label.is_empty() {
                entry.label = series_label.clone();
            }
            dedup_push(&mut links, entry);
        }
    }

    links
}

/// The non-fetching strategies: inline player script object, iframe scan,
/// anchor scan. Unioned and de-duplicated by case-insensitive URL.
pub fn resolve_static(html: &str, page_url: &Url) -> Vec<LinkEntry> {
    let mut links = Vec::new();

    if let Some(entry) = inline_script_link(html) {
        dedup_push(&mut links, entry);
    }
    for entry in embed_scan(html, page_url) {
        dedup_push(&mut links, entry);
    }

    debug!(url = %page_url, count = links.len(), "resolved links");
    links
}

fn dedup_push(links: &mut Vec<LinkEntry>, entry: LinkEntry) {
    let key = entry.url.to_lowercase();
    if !links.iter().any(|existing| existing.url.to_lowercase() == key) {
        links.push(entry);
    }
}

/// The `single_video_url` value buried in the player plugin's inline
/// script object. The value is a JSON-escaped string that holds either a
/// bare URL or a whole `<iframe>` tag.
fn inline_script_link(html: &str) -> Option<LinkEntry> {
    let re = Regex::new(r#""single_video_url"\s*:\s*"((?:\\.|[^"\\])*)""#).ok()?;
    let raw = re.captures(html)?.get(1)?.as_str();
    let unescaped = raw.replace(r"\/", "/").replace(r#"\""#, "\"").replace(r"\\", r"\");
    let trimmed = unescaped.trim();

    if trimmed.starts_with("<iframe") {
        let src_re = Regex::new(r#"src\s*=\s*["']([^"']+)["']"#).ok()?;
        let src = src_re.captures(trimmed)?.get(1)?.as_str();
        return Some(LinkEntry::new("", ensure_scheme(src)));
    }
    if trimmed.starts_with("http") || trimmed.starts_with("//") {
        return Some(LinkEntry::new("", ensure_scheme(trimmed)));
    }
    None
}

fn ensure_scheme(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        url.to_string()
    }
}

/// Iframe and anchor scans over the main content container.
fn embed_scan(html: &str, page_url: &Url) -> Vec<LinkEntry> {
    let document = Html::parse_document(html);
    let Some(container) = content_container(&document) else {
        return Vec::new();
    };

    let mut found = Vec::new();

    if let Ok(iframe_selector) = Selector::parse("iframe[src]") {
        for iframe in container.select(&iframe_selector) {
            let Some(src) = iframe.value().attr("src") else { continue };
            let Some(absolute) = absolutize(src, page_url) else { continue };
            if !is_video_url(&absolute) {
                continue;
            }
            let label = contextual_label(iframe).unwrap_or_default();
            found.push(LinkEntry::new(label, absolute.to_string()));
        }
    }

    if let Ok(anchor_selector) = Selector::parse("a[href]") {
        for anchor in container.select(&anchor_selector) {
            let Some(href) = anchor.value().attr("href") else { continue };
            let Some(absolute) = absolutize(href, page_url) else { continue };
            if !is_video_url(&absolute) {
                continue;
            }
            let own_text = anchor.text().collect::<String>().trim().to_string();
            let label = if own_text.is_empty() {
                contextual_label(anchor).unwrap_or_default()
            } else {
                own_text
            };
            found.push(LinkEntry::new(label, absolute.to_string()));
        }
    }

    found
}

fn content_container<'a>(document: &'a Html) -> Option<ElementRef<'a>> {
    const CONTAINER_SELECTORS: &[&str] = &[
        "div.entry-content",
        "div.post-content",
        "div.video-section",
        "article",
        "main",
        "body",
    ];
    for raw in CONTAINER_SELECTORS {
        if let Ok(selector) = Selector::parse(raw) {
            if let Some(element) = document.select(&selector).next() {
                return Some(element);
            }
        }
    }
    None
}

fn absolutize(href: &str, page_url: &Url) -> Option<Url> {
    page_url.join(href.trim()).ok()
}

pub(crate) fn is_video_url(url: &Url) -> bool {
    let haystack = format!(
        "{}{}",
        url.host_str().unwrap_or_default().to_lowercase(),
        url.path().to_lowercase()
    );
    if AD_HOST_MARKERS.iter().any(|marker| haystack.contains(marker)) {
        return false;
    }
    VIDEO_HOST_MARKERS.iter().any(|marker| haystack.contains(marker))
}

/// Scan a bounded window of preceding siblings for heading/paragraph text
/// that names the embed ("First Half", "Server 2", ...).
fn contextual_label(element: ElementRef<'_>) -> Option<String> {
    for sibling in element.prev_siblings().take(LABEL_SCAN_DEPTH) {
        let text = if let Some(sibling_element) = ElementRef::wrap(sibling) {
            sibling_element.text().collect::<String>()
        } else if let Some(text_node) = sibling.value().as_text() {
            text_node.to_string()
        } else {
            continue;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.len() > 80 {
            continue;
        }
        let lower = trimmed.to_lowercase();
        if LABEL_CUES.iter().any(|cue| lower.contains(cue)) {
            return Some(trimmed.to_string());
        }
    }
    None
}

/// Links out of a "series listing" block, each pointing at a sibling
/// sub-page carrying its own embedded video (match halves, extra time).
pub(crate) fn series_links(html: &str, page_url: &Url) -> Vec<(String, String)> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("div.series-listing a[href]") else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for anchor in document.select(&selector) {
        let Some(href) = anchor.value().attr("href") else { continue };
        let Some(absolute) = absolutize(href, page_url) else { continue };
        let label = anchor
            .text()
            .collect::<String>()
            .trim()
            .trim_matches(|c: char| c == ':' || c == '-' || c.is_whitespace())
            .to_string();
        out.push((label, absolute.to_string()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://www.footballorgin.com/arsenal-vs-chelsea/").unwrap()
    }

    #[test]
    fn test_inline_script_object_with_escaped_iframe() {
        let html = r#"<script>var vidorev_jav_js_object={"single_video_url":"<iframe src=\"https://video.example/x\" width=\"640\"></iframe>","other":1};</script>"#;
        let links = resolve_static(html, &page_url());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://video.example/x");
        assert_eq!(links[0].label, "Replay");
    }

    #[test]
    fn test_inline_script_object_with_direct_url() {
        let html = r#"<script>{"single_video_url":"https:\/\/ok.ru\/videoembed\/123"}</script>"#;
        let links = resolve_static(html, &page_url());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://ok.ru/videoembed/123");
        assert_eq!(links[0].host, "ok.ru");
    }

    #[test]
    fn test_protocol_relative_url_is_rewritten() {
        let html = r#"<script>{"single_video_url":"\/\/streamable.com\/e\/abc"}</script>"#;
        let links = resolve_static(html, &page_url());
        assert_eq!(links[0].url, "https://streamable.com/e/abc");
    }

    #[test]
    fn test_iframe_scan_with_contextual_label() {
        let html = r#"
            <div class="entry-content">
                <h3>First Half</h3>
                <iframe src="https://ok.ru/videoembed/111"></iframe>
                <h3>Second Half</h3>
                <iframe src="https://ok.ru/videoembed/222"></iframe>
                <iframe src="https://doubleclick.net/ads/x"></iframe>
            </div>
        "#;
        let links = resolve_static(html, &page_url());
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].label, "First Half");
        assert_eq!(links[1].label, "Second Half");
    }

    #[test]
    fn test_anchor_scan_filters_non_video_hosts() {
        let html = r#"
            <div class="entry-content">
                <a href="https://streamable.com/abc">Watch replay</a>
                <a href="https://twitter.com/share">Share</a>
                <a href="/arsenal-vs-chelsea-highlights/">internal</a>
            </div>
        "#;
        let links = resolve_static(html, &page_url());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].label, "Watch replay");
    }

    #[test]
    fn test_ad_marker_overrides_video_marker() {
        let url = Url::parse("https://youtube.doubleclick.net/embed/1").unwrap();
        assert!(!is_video_url(&url));
        let url = Url::parse("https://www.youtube.com/embed/1").unwrap();
        assert!(is_video_url(&url));
    }

    #[test]
    fn test_dedup_is_case_insensitive() {
        let html = r#"
            <div class="entry-content">
                <iframe src="https://ok.ru/VideoEmbed/9"></iframe>
                <a href="https://ok.ru/videoembed/9">Link 1</a>
            </div>
        "#;
        let links = resolve_static(html, &page_url());
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_series_links_extraction() {
        let html = r#"
            <div class="series-listing">
                <a href="/arsenal-vs-chelsea/">Arsenal vs Chelsea: First Half</a>
                <a href="/arsenal-vs-chelsea-2nd/">- Second Half</a>
            </div>
        "#;
        let series = series_links(html, &page_url());
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].1, "https://www.footballorgin.com/arsenal-vs-chelsea/");
        assert_eq!(series[1].0, "Second Half");
    }

    #[test]
    fn test_no_links_is_ok() {
        let links = resolve_static("<div class='entry-content'><p>text</p></div>", &page_url());
        assert!(links.is_empty());
    }
}
