use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;

/// Result of normalizing one raw date string: the instant (if any text
/// shape matched) and whether it was estimated from relative phrasing
/// rather than read from an explicit timestamp.
pub type NormalizedDate = (Option<DateTime<Utc>>, bool);

/// Convert raw date text into a timezone-aware instant.
///
/// Two passes, in fixed precedence order:
/// 1. relative phrasing ("3 hours ago", "just now", "yesterday") resolved
///    against `reference`, marked estimated;
/// 2. absolute timestamps (ISO-8601, the kickoff banner these sites use,
///    a list of common layouts, then a loose "Month Day, Year" fallback),
///    marked exact.
///
/// Relative month/year units use fixed lengths (30 and 365 days). That is
/// an approximation inherited from how the sites phrase freshness, not a
/// calendar computation.
pub fn normalize(text: &str, reference: DateTime<Utc>) -> NormalizedDate {
    let cleaned = clean(text);
    if cleaned.is_empty() {
        return (None, false);
    }

    if let Some(instant) = parse_relative(&cleaned, reference) {
        return (Some(instant), true);
    }

    if let Some(instant) = parse_absolute(&cleaned) {
        return (Some(instant), false);
    }

    (None, false)
}

fn clean(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Relative pass. The anchor is the reference instant, optionally snapped
/// to an "at HH:MM" time-of-day mentioned in the same string.
fn parse_relative(text: &str, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lower = text.to_lowercase();
    if !lower.contains("ago") && !lower.contains("just now") && !lower.contains("yesterday") {
        return None;
    }

    let anchor = time_anchor(&lower, reference);

    if lower.contains("just now") {
        return Some(anchor);
    }
    if lower.contains("yesterday") {
        return Some(anchor - Duration::days(1));
    }

    let re = Regex::new(r"(?i)\b(\d+|an?|one)\s+(second|minute|hour|day|week|month|year)s?\s+ago\b")
        .ok()?;
    let caps = re.captures(&lower)?;
    let quantity: i64 = match caps.get(1)?.as_str() {
        "a" | "an" | "one" => 1,
        digits => digits.parse().ok()?,
    };
    let unit_seconds: i64 = match caps.get(2)?.as_str() {
        "second" => 1,
        "minute" => 60,
        "hour" => 3_600,
        "day" => 86_400,
        "week" => 7 * 86_400,
        // Fixed-length approximations, see module docs.
        "month" => 30 * 86_400,
        "year" => 365 * 86_400,
        _ => return None,
    };

    Some(anchor - Duration::seconds(quantity * unit_seconds))
}

fn time_anchor(lower: &str, reference: DateTime<Utc>) -> DateTime<Utc> {
    if let Ok(re) = Regex::new(r"\bat\s+(\d{1,2}):(\d{2})\b") {
        if let Some(caps) = re.captures(lower) {
            let hour: u32 = caps[1].parse().unwrap_or(0);
            let minute: u32 = caps[2].parse().unwrap_or(0);
            if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
                return Utc.from_utc_datetime(&reference.date_naive().and_time(time));
            }
        }
    }
    reference
}

/// Absolute pass. First successful parse wins; naive results are taken
/// as UTC, which is the zone every one of these sites publishes in.
fn parse_absolute(text: &str) -> Option<DateTime<Utc>> {
    let prepared = strip_label(&strip_ordinals(text));

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&prepared) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Some(instant) = parse_kickoff(&prepared) {
        return Some(instant);
    }

    const LAYOUTS_WITH_TIME: [&str; 6] = [
        "%d/%m/%Y %H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d %B %Y %H:%M",
        "%B %d, %Y %H:%M",
        "%d %b %Y %H:%M",
    ];
    for layout in LAYOUTS_WITH_TIME {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&prepared, layout) {
            return Some(Utc.from_utc_datetime(&parsed));
        }
    }

    const LAYOUTS_DATE_ONLY: [&str; 8] = [
        "%d/%m/%Y",
        "%d-%m-%Y",
        "%Y-%m-%d",
        "%d %B %Y",
        "%d %b %Y",
        "%B %d, %Y",
        "%b %d, %Y",
        "%B %d %Y",
    ];
    for layout in LAYOUTS_DATE_ONLY {
        if let Ok(parsed) = NaiveDate::parse_from_str(&prepared, layout) {
            return Some(Utc.from_utc_datetime(&parsed.and_hms_opt(0, 0, 0)?));
        }
    }

    parse_loose_month_day_year(&prepared)
}

/// "1st" -> "1", "22nd" -> "22", leaving plain numbers alone.
fn strip_ordinals(text: &str) -> String {
    match Regex::new(r"\b(\d{1,2})(st|nd|rd|th)\b") {
        Ok(re) => re.replace_all(text, "$1").into_owned(),
        Err(_) => text.to_string(),
    }
}

/// Drop a leading "Published:" / "Date:" style label. Word characters only
/// before the colon, so times like "20:00" are untouched.
fn strip_label(text: &str) -> String {
    match Regex::new(r"^[A-Za-z][A-Za-z /-]*:\s*") {
        Ok(re) => re.replace(text, "").trim().to_string(),
        Err(_) => text.trim().to_string(),
    }
}

/// "KICK-OFF at 20:00 (UTC) on 3 January 2024" — the banner format used on
/// match detail pages, with an explicit UTC marker.
fn parse_kickoff(text: &str) -> Option<DateTime<Utc>> {
    let re = Regex::new(
        r"(?i)kick-?\s?off\s+at\s+(\d{1,2}):(\d{2})\s*\(utc\)\s*on\s+(\d{1,2})\s+([A-Za-z]+)\s+(\d{4})",
    )
    .ok()?;
    let caps = re.captures(text)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    let month = month_number(&caps[4])?;
    let year: i32 = caps[5].parse().ok()?;

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    Some(Utc.from_utc_datetime(&date.and_time(time)))
}

/// Last-resort "January 3, 2024, 8:15 pm" shape, time optional.
fn parse_loose_month_day_year(text: &str) -> Option<DateTime<Utc>> {
    let re = Regex::new(
        r"(?i)([A-Za-z]{3,9})\s+(\d{1,2}),?\s+(\d{4})(?:,?\s+(\d{1,2}):(\d{2})\s*(am|pm)?)?",
    )
    .ok()?;
    let caps = re.captures(text)?;
    let month = month_number(&caps[1])?;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;

    let mut hour: u32 = caps.get(4).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    let minute: u32 = caps.get(5).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    if let Some(meridiem) = caps.get(6).map(|m| m.as_str().to_lowercase()) {
        if meridiem == "pm" && hour < 12 {
            hour += 12;
        } else if meridiem == "am" && hour == 12 {
            hour = 0;
        }
    }

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    Some(Utc.from_utc_datetime(&date.and_time(time)))
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
