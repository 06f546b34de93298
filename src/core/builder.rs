use crate::core::dates;
use crate::core::identity::compute_match_id;
use crate::core::record::{Candidate, DetailPage, MatchRecord};
use crate::utils::{dedupe_labels, strip_title_from_label};
use chrono::{DateTime, SecondsFormat, Utc};

/// Assemble the canonical record for one captured candidate.
///
/// Pure assembly: id from the Identity Service, categories merged and
/// de-duplicated, dates normalized against `now`, adapter diagnostics
/// folded into `metadata`. No network, no mutation of anything shared.
pub fn build(
    source_id: &str,
    source_name: &str,
    source_url: &str,
    candidate: &Candidate,
    detail: &DetailPage,
    now: DateTime<Utc>,
) -> MatchRecord {
    let categories = dedupe_labels(
        candidate
            .listing_categories
            .iter()
            .chain(detail.categories.iter())
            .cloned(),
    );

    // Detail-page dates are more precise than listing freshness text;
    // fall back to the listing when the detail page had nothing.
    let (published_raw, date_origin) = if !detail.date_text.trim().is_empty() {
        (detail.date_text.trim().to_string(), "detail")
    } else {
        (candidate.listing_date.trim().to_string(), "listing")
    };
    let (published_at, estimated) = dates::normalize(&published_raw, now);
    let (updated_at, _) = dates::normalize(&detail.modified_text, now);

    let mut links = detail.links.clone();
    for link in &mut links {
        let stripped = strip_title_from_label(&link.label, &candidate.title);
        if !stripped.is_empty() {
            link.label = stripped;
        }
    }

    let mut metadata = detail.extra.clone();
    metadata.insert("date_origin".to_string(), date_origin.to_string());
    metadata.insert("date_estimated".to_string(), estimated.to_string());

    let preview_image = if candidate.preview_image.is_empty() {
        detail.preview_image.clone()
    } else {
        candidate.preview_image.clone()
    };

    MatchRecord {
        match_id: compute_match_id(&candidate.url),
        source_id: source_id.to_string(),
        source_name: source_name.to_string(),
        source_url: source_url.to_string(),
        url: candidate.url.trim().to_string(),
        title: candidate.title.trim().to_string(),
        preview_image,
        duration: detail.duration.clone(),
        competition: categories.join(", "),
        categories,
        published_raw,
        published_at: rfc3339(published_at),
        updated_at: rfc3339(updated_at),
        scraped_at: rfc3339(Some(now)),
        links,
        metadata,
    }
}

fn rfc3339(instant: Option<DateTime<Utc>>) -> String {
    instant
        .map(|i| i.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::LinkEntry;

    fn candidate() -> Candidate {
        Candidate {
            title: "Arsenal vs Chelsea".to_string(),
            url: "https://www.footballorgin.com/arsenal-vs-chelsea/".to_string(),
            preview_image: "https://www.footballorgin.com/img/p.jpg".to_string(),
            listing_date: "2 hours ago".to_string(),
            listing_categories: vec!["Premier League".to_string()],
        }
    }

    fn detail() -> DetailPage {
        DetailPage {
            links: vec![LinkEntry::new(
                "Arsenal vs Chelsea: First Half",
                "https://ok.ru/videoembed/1",
            )],
            categories: vec!["premier league".to_string(), "Arsenal".to_string()],
            date_text: String::new(),
            modified_text: String::new(),
            duration: "90:00".to_string(),
            preview_image: String::new(),
            extra: Default::default(),
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_build_assembles_record() {
        let record = build("footballorgin", "FootballOrgin", "https://www.footballorgin.com", &candidate(), &detail(), now());
        assert_eq!(record.match_id.len(), 32);
        assert_eq!(record.categories, vec!["Premier League", "Arsenal"]);
        assert_eq!(record.competition, "Premier League, Arsenal");
        assert_eq!(record.published_raw, "2 hours ago");
        assert_eq!(record.published_at, "2024-01-01T08:00:00Z");
        assert_eq!(record.metadata.get("date_estimated").map(String::as_str), Some("true"));
        assert_eq!(record.metadata.get("date_origin").map(String::as_str), Some("listing"));
        assert_eq!(record.scraped_at, "2024-01-01T10:00:00Z");
    }

    #[test]
    fn test_link_labels_lose_repeated_title() {
        let record = build("footballorgin", "FootballOrgin", "https://www.footballorgin.com", &candidate(), &detail(), now());
        assert_eq!(record.links[0].label, "First Half");
    }

    #[test]
    fn test_detail_date_takes_precedence() {
        let mut detail = detail();
        detail.date_text = "3 January 2024".to_string();
        let record = build("footballorgin", "FootballOrgin", "https://www.footballorgin.com", &candidate(), &detail, now());
        assert_eq!(record.published_at, "2024-01-03T00:00:00Z");
        assert_eq!(record.metadata.get("date_origin").map(String::as_str), Some("detail"));
        assert_eq!(record.metadata.get("date_estimated").map(String::as_str), Some("false"));
    }

    #[test]
    fn test_unparseable_date_leaves_instant_empty() {
        let mut candidate = candidate();
        candidate.listing_date = "soon".to_string();
        let record = build("footballorgin", "FootballOrgin", "https://www.footballorgin.com", &candidate, &detail(), now());
        assert_eq!(record.published_raw, "soon");
        assert_eq!(record.published_at, "");
    }

    #[test]
    fn test_structured_image_only_fills_gap() {
        let mut detail = detail();
        detail.preview_image = "https://site/structured.jpg".to_string();
        let record = build("footballorgin", "FootballOrgin", "https://www.footballorgin.com", &candidate(), &detail, now());
        assert_eq!(record.preview_image, "https://www.footballorgin.com/img/p.jpg");

        let mut bare = candidate();
        bare.preview_image.clear();
        let record = build("footballorgin", "FootballOrgin", "https://www.footballorgin.com", &bare, &detail, now());
        assert_eq!(record.preview_image, "https://site/structured.jpg");
    }
}
