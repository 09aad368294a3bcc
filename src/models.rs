//! Data models for normalized articles, source descriptors, and filter criteria.
//!
//! This module defines the core data structures used throughout the crate:
//! - [`Article`]: the canonical record every parser produces
//! - [`Thumbnail`]: optional image metadata attached to an article
//! - [`SourceFormat`] / [`SourceDescriptor`]: a registered feed's declared
//!   format and physical location
//! - [`FilterCriteria`]: an immutable, per-request description of how to
//!   narrow an article set
//!
//! Articles keep their publication date as the free-form string the wire
//! carried; source formats use incompatible date encodings, so the date is
//! normalized lazily by the filter chain rather than at ingestion.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates;
use crate::error::{Error, Result};

/// A normalized news article.
///
/// Every parser, whatever its wire format, converts entries into this
/// record. Retained articles never have both `title` and `link` empty; a
/// parser that cannot extract a title skips the entry instead of emitting
/// a degenerate article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// The article headline.
    pub title: String,
    /// URL of the full article.
    pub link: String,
    /// Publication date exactly as the source published it. Free-form;
    /// normalized lazily by the date-range filter, not at ingestion.
    #[serde(default)]
    pub publication_date: String,
    /// Summary or lede text.
    #[serde(default)]
    pub description: String,
    /// The logical source this article came from.
    #[serde(default)]
    pub publisher: String,
    /// Source-assigned category, when the wire carries one.
    #[serde(default)]
    pub category: String,
    /// Thumbnails in the order the source listed them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thumbnails: Vec<Thumbnail>,
}

impl Article {
    /// True when the article carries enough identity to be retained.
    pub(crate) fn has_identity(&self) -> bool {
        !(self.title.is_empty() && self.link.is_empty())
    }
}

/// Image metadata attached to an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// The parsing strategy a source declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Xml,
    Json,
    Html,
}

impl std::str::FromStr for SourceFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "xml" => Ok(SourceFormat::Xml),
            "json" => Ok(SourceFormat::Json),
            "html" => Ok(SourceFormat::Html),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SourceFormat::Xml => "xml",
            SourceFormat::Json => "json",
            SourceFormat::Html => "html",
        };
        f.write_str(s)
    }
}

/// A registered feed: unique name, declared format, physical location.
///
/// Serialized in the manifest file as
/// `{ "name": ..., "format": ..., "endpoint": ... }`; the location field
/// is renamed on the wire for compatibility with existing manifests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub format: SourceFormat,
    #[serde(rename = "endpoint")]
    pub location: String,
}

/// Criteria narrowing an article set. Immutable; built once per request.
///
/// Empty fields mean "no constraint": an empty keyword list matches every
/// article, empty date bounds are unbounded, and an empty source list
/// admits all sources.
///
/// Construction parses any non-empty date bound against the accepted
/// layouts up front, so a caller-supplied bound that matches no layout is
/// rejected as [`Error::DateParse`] instead of being silently ignored at
/// filter time.
#[derive(Debug, Clone)]
pub struct FilterCriteria {
    /// Comma-separated OR list of keywords.
    pub keywords: String,
    /// Lower publication-date bound, free-form. Empty = unbounded.
    pub date_start: String,
    /// Upper publication-date bound, free-form. Empty = unbounded.
    pub date_end: String,
    /// Logical source names to admit. Empty = all sources.
    pub sources: Vec<String>,
    pub(crate) start_bound: Option<NaiveDate>,
    pub(crate) end_bound: Option<NaiveDate>,
}

impl FilterCriteria {
    pub fn new(
        keywords: &str,
        date_start: &str,
        date_end: &str,
        sources: Vec<String>,
    ) -> Result<Self> {
        let start_bound = match date_start {
            "" => None,
            raw => Some(dates::parse_bound_date(raw)?),
        };
        let end_bound = match date_end {
            "" => None,
            raw => Some(dates::parse_bound_date(raw)?),
        };
        Ok(Self {
            keywords: keywords.to_string(),
            date_start: date_start.to_string(),
            date_end: date_end.to_string(),
            sources,
            start_bound,
            end_bound,
        })
    }

    /// Criteria that admit every article.
    pub fn unconstrained() -> Self {
        Self {
            keywords: String::new(),
            date_start: String::new(),
            date_end: String::new(),
            sources: Vec::new(),
            start_bound: None,
            end_bound: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> Article {
        Article {
            title: "Glide path to recovery".to_string(),
            link: "https://example.com/articles/1".to_string(),
            publication_date: "2024-05-17T14:58:52Z".to_string(),
            description: "Markets steady.".to_string(),
            publisher: "bbc".to_string(),
            category: "Business".to_string(),
            thumbnails: vec![Thumbnail {
                url: "https://example.com/thumb.jpg".to_string(),
                width: Some(120),
                height: Some(80),
            }],
        }
    }

    #[test]
    fn article_round_trips_through_json() {
        let original = article();
        let json = serde_json::to_string(&original).unwrap();
        let decoded: Article = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn empty_thumbnails_are_omitted_from_json() {
        let mut a = article();
        a.thumbnails.clear();
        let json = serde_json::to_string(&a).unwrap();
        assert!(!json.contains("thumbnails"));
    }

    #[test]
    fn source_format_parses_known_strings() {
        assert_eq!("xml".parse::<SourceFormat>().unwrap(), SourceFormat::Xml);
        assert_eq!("json".parse::<SourceFormat>().unwrap(), SourceFormat::Json);
        assert_eq!("html".parse::<SourceFormat>().unwrap(), SourceFormat::Html);
    }

    #[test]
    fn source_format_rejects_unknown_strings() {
        let err = "atom".parse::<SourceFormat>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(f) if f == "atom"));
    }

    #[test]
    fn descriptor_serializes_location_as_endpoint() {
        let descriptor = SourceDescriptor {
            name: "bbc".to_string(),
            format: SourceFormat::Xml,
            location: "https://feeds.bbci.co.uk/news/rss.xml".to_string(),
        };
        let json = serde_json::to_string(&descriptor).unwrap();
        assert!(json.contains("\"endpoint\""));
        assert!(json.contains("\"format\":\"xml\""));
        assert!(!json.contains("location"));
    }

    #[test]
    fn criteria_parses_bounds_up_front() {
        let criteria = FilterCriteria::new("", "2024-07-01", "2024-07-31", vec![]).unwrap();
        assert!(criteria.start_bound.is_some());
        assert!(criteria.end_bound.is_some());
    }

    #[test]
    fn criteria_rejects_unparseable_bound() {
        let err = FilterCriteria::new("", "not-a-date", "", vec![]).unwrap_err();
        assert!(matches!(err, Error::DateParse(raw) if raw == "not-a-date"));
    }

    #[test]
    fn unconstrained_criteria_has_no_bounds() {
        let criteria = FilterCriteria::unconstrained();
        assert!(criteria.start_bound.is_none());
        assert!(criteria.end_bound.is_none());
        assert!(criteria.sources.is_empty());
    }
}
