//! Publication-date parsing and calendar-range helpers.
//!
//! The three wire formats encode dates incompatibly: RSS items carry
//! near-RFC-1123 strings, the JSON envelope carries RFC 3339, and scraped
//! pages carry loose named-month timestamps. Articles keep whatever string
//! the source published; this module owns the one ordered layout list used
//! to interpret those strings when a caller actually asks for a date
//! comparison.
//!
//! The layout list is part of the external contract: existing snapshot
//! archives were filtered against exactly these layouts. Additions go at
//! the end; removals are breaking.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use tracing::trace;

use crate::error::{Error, Result};

/// Layout accepted by [`generate_date_range`] and used for archive names.
pub const ARCHIVE_DATE_LAYOUT: &str = "%Y-%m-%d";

/// Date-time layouts tried after RFC 3339 and RFC 2822.
const DATETIME_LAYOUTS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Bare-date layouts, including the named-month forms scraped sources use.
const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

/// Interpret a free-form publication date, taking the first layout that
/// succeeds.
///
/// Tried in order: RFC 3339, RFC 2822 (which covers the RFC 1123 and
/// RFC 822 strings RSS feeds publish), the zone-less date-time layouts,
/// then bare dates. Returns `None` when every layout fails; the caller
/// decides what an unparseable date means.
pub fn parse_article_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }
    for layout in DATETIME_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, layout) {
            return Some(dt.date());
        }
    }
    for layout in DATE_LAYOUTS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, layout) {
            return Some(d);
        }
    }
    trace!(raw, "publication date matched no accepted layout");
    None
}

/// Interpret a caller-supplied range bound.
///
/// Unlike article dates, an unparseable bound is a caller error, never
/// silently ignored.
pub fn parse_bound_date(raw: &str) -> Result<NaiveDate> {
    parse_article_date(raw).ok_or_else(|| Error::DateParse(raw.to_string()))
}

/// Expand an inclusive `[date_start, date_end]` pair into the list of
/// calendar dates it covers, formatted with [`ARCHIVE_DATE_LAYOUT`].
///
/// Both endpoints must be `YYYY-MM-DD`; a start after the end is
/// [`Error::InvalidDateRange`].
pub fn generate_date_range(date_start: &str, date_end: &str) -> Result<Vec<String>> {
    let start = NaiveDate::parse_from_str(date_start, ARCHIVE_DATE_LAYOUT)
        .map_err(|_| Error::DateParse(date_start.to_string()))?;
    let end = NaiveDate::parse_from_str(date_end, ARCHIVE_DATE_LAYOUT)
        .map_err(|_| Error::DateParse(date_end.to_string()))?;
    if start > end {
        return Err(Error::InvalidDateRange {
            start: date_start.to_string(),
            end: date_end.to_string(),
        });
    }

    let mut dates = Vec::new();
    let mut day = start;
    while day <= end {
        dates.push(day.format(ARCHIVE_DATE_LAYOUT).to_string());
        day += Duration::days(1);
    }
    Ok(dates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339() {
        let date = parse_article_date("2024-05-17T14:58:52Z").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 17).unwrap());
    }

    #[test]
    fn parses_rfc1123_via_rfc2822() {
        let date = parse_article_date("Sun, 19 May 2024 09:02:27 GMT").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 19).unwrap());
    }

    #[test]
    fn parses_bare_date() {
        let date = parse_article_date("2024-07-19").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 7, 19).unwrap());
    }

    #[test]
    fn parses_named_month_layouts() {
        for raw in ["May 17, 2024", "17 May 2024"] {
            let date = parse_article_date(raw).unwrap();
            assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(), "{raw}");
        }
    }

    #[test]
    fn rejects_unknown_layouts() {
        assert!(parse_article_date("17/05/2024").is_none());
        assert!(parse_article_date("tomorrow").is_none());
        assert!(parse_article_date("").is_none());
    }

    #[test]
    fn bound_date_is_a_caller_error() {
        let err = parse_bound_date("not-a-date").unwrap_err();
        assert!(matches!(err, Error::DateParse(raw) if raw == "not-a-date"));
    }

    #[test]
    fn range_is_inclusive_of_both_endpoints() {
        let range = generate_date_range("2024-07-19", "2024-07-21").unwrap();
        assert_eq!(range, vec!["2024-07-19", "2024-07-20", "2024-07-21"]);
    }

    #[test]
    fn single_day_range() {
        let range = generate_date_range("2024-07-19", "2024-07-19").unwrap();
        assert_eq!(range, vec!["2024-07-19"]);
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = generate_date_range("2024-07-24", "2024-07-23").unwrap_err();
        assert!(matches!(err, Error::InvalidDateRange { .. }));
    }

    #[test]
    fn range_endpoints_must_be_bare_dates() {
        let err = generate_date_range("2024-07-19T00:00:00Z", "2024-07-21").unwrap_err();
        assert!(matches!(err, Error::DateParse(_)));
    }
}
