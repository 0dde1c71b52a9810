//! Relative time labels
//!
//! Turns job posting timestamps into "3 days ago" style labels using fixed
//! month (30 day) and year (365 day) lengths.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::document::{Document, Element, Selector};

const UNITS: [(i64, &str); 5] = [
    (31_536_000, "year"),
    (2_592_000, "month"),
    (86_400, "day"),
    (3_600, "hour"),
    (60, "minute"),
];

/// Attribute holding the creation timestamp on job cards
pub const CREATED_AT_ATTR: &str = "data-created-at";

/// Label for the time elapsed between `then` and `now`
pub fn time_since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_milliseconds().div_euclid(1000);

    for (unit_seconds, unit) in UNITS {
        let count = seconds.div_euclid(unit_seconds);
        if count >= 1 {
            let plural = if count > 1 { "s" } else { "" };
            return format!("{} {}{} ago", count, unit, plural);
        }
    }

    "Just now".to_string()
}

/// Parse an ISO 8601 timestamp.
///
/// Offset-less date-times are read as UTC, whereas a browser's `new Date()`
/// reads them in local time. Server-rendered timestamps carry an offset, so
/// both agree on those.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Label for a raw attribute value; unparsable input reads as "Just now"
pub fn time_since_str(value: &str, now: DateTime<Utc>) -> String {
    match parse_timestamp(value) {
        Some(then) => time_since(then, now),
        None => "Just now".to_string(),
    }
}

/// Rewrite every `small[data-created-at]` with its relative label
pub fn apply_relative_times<D: Document>(doc: &D, now: DateTime<Utc>) -> usize {
    let labels = doc.query_all(&Selector::tag("small").with_attr(CREATED_AT_ATTR));
    for label in &labels {
        let raw = label.attribute(CREATED_AT_ATTR).unwrap_or_default();
        label.set_text(&time_since_str(&raw, now));
    }
    labels.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn ago(seconds: i64) -> String {
        time_since(now() - Duration::seconds(seconds), now())
    }

    #[test]
    fn test_just_now_under_a_minute() {
        assert_eq!(ago(0), "Just now");
        assert_eq!(ago(45), "Just now");
        assert_eq!(ago(59), "Just now");
    }

    #[test]
    fn test_minutes_and_hours() {
        assert_eq!(ago(60), "1 minute ago");
        assert_eq!(ago(90), "1 minute ago");
        assert_eq!(ago(150), "2 minutes ago");
        assert_eq!(ago(3700), "1 hour ago");
        assert_eq!(ago(7200), "2 hours ago");
    }

    #[test]
    fn test_days_months_years() {
        assert_eq!(ago(86_400), "1 day ago");
        assert_eq!(ago(29 * 86_400), "29 days ago");
        assert_eq!(ago(30 * 86_400), "1 month ago");
        assert_eq!(ago(364 * 86_400), "12 months ago");
        assert_eq!(ago(365 * 86_400), "1 year ago");
        assert_eq!(ago(3 * 365 * 86_400), "3 years ago");
    }

    #[test]
    fn test_future_timestamp_is_just_now() {
        assert_eq!(ago(-3600), "Just now");
    }

    #[test]
    fn test_sub_second_elapsed_is_floored() {
        let then = now() - Duration::milliseconds(60_999);
        assert_eq!(time_since(then, now()), "1 minute ago");
        let then = now() - Duration::milliseconds(59_999);
        assert_eq!(time_since(then, now()), "Just now");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 31, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-05-31T12:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-31T14:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-31T12:00:00.000"), Some(expected));
        assert_eq!(parse_timestamp(" 2024-05-31 12:00:00 "), Some(expected));
        assert_eq!(
            parse_timestamp("2024-05-31"),
            Some(Utc.with_ymd_and_hms(2024, 5, 31, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_unparsable_attribute_reads_just_now() {
        assert_eq!(time_since_str("not a date", now()), "Just now");
        assert_eq!(time_since_str("2024-05-31T12:00:00Z", now()), "1 day ago");
    }

    #[test]
    fn test_apply_relative_times_rewrites_labels() {
        let doc = MemoryDocument::new();
        let body = doc.root();
        let card = doc.element("div").class("job-card").append_to(&body);
        let posted = doc
            .element("small")
            .attr(CREATED_AT_ATTR, "2024-06-01T09:00:00Z")
            .text_content("2024-06-01")
            .append_to(&card);
        let other = doc.element("small").text_content("untouched").append_to(&card);

        assert_eq!(apply_relative_times(&doc, now()), 1);
        assert_eq!(posted.text(), "3 hours ago");
        assert_eq!(other.text(), "untouched");
    }
}
