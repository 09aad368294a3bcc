//! JSON article-envelope parser.
//!
//! Decodes the article-search envelope
//! `{"status": ..., "totalResults": ..., "articles": [...]}` with typed
//! serde structs:
//!
//! - `article.title` -> title
//! - `article.url` -> link
//! - `article.publishedAt` -> publication date (RFC 3339, kept verbatim)
//! - `article.description` -> description
//! - `article.urlToImage` -> a single thumbnail with no declared dimensions
//!
//! The publisher is `article.source.name` when the envelope carries one,
//! else the configured source name. Entries with neither a title nor a
//! URL are dropped.

use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{load_location, parse_failure};
use crate::error::Result;
use crate::models::{Article, Thumbnail};
use crate::utils::truncate_for_log;

#[derive(Debug, Clone)]
pub struct JsonParser {
    pub(crate) source_name: String,
    pub(crate) location: String,
}

/// Wire schema of the envelope. Fields the mapping doesn't consume
/// (`status`, `totalResults`) are still decoded so schema drift shows up
/// in logs rather than silently.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: String,
    #[serde(default, rename = "totalResults")]
    total_results: u64,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    url: String,
    #[serde(default, rename = "urlToImage")]
    url_to_image: Option<String>,
    #[serde(default, rename = "publishedAt")]
    published_at: String,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    #[serde(default)]
    name: String,
}

impl JsonParser {
    pub fn new(source_name: &str, location: &str) -> Self {
        Self {
            source_name: source_name.to_string(),
            location: location.to_string(),
        }
    }

    /// Load the envelope document and normalize its articles.
    #[instrument(level = "info", skip_all, fields(source = %self.source_name, location = %self.location))]
    pub async fn parse(&self) -> Result<Vec<Article>> {
        let body = load_location(&self.location)
            .await
            .map_err(|e| parse_failure(&self.location, e))?;
        self.parse_document(&body)
    }

    /// Normalize an already-loaded envelope document.
    pub fn parse_document(&self, body: &str) -> Result<Vec<Article>> {
        let envelope: Envelope = serde_json::from_str(body).map_err(|e| {
            warn!(
                source = %self.source_name,
                preview = %truncate_for_log(body, 200),
                "Envelope failed to decode"
            );
            parse_failure(&self.location, e)
        })?;

        debug!(
            source = %self.source_name,
            status = %envelope.status,
            total_results = envelope.total_results,
            "Decoded article envelope"
        );

        let articles = envelope
            .articles
            .into_iter()
            .filter_map(|raw| self.normalize(raw))
            .collect::<Vec<_>>();
        debug!(source = %self.source_name, count = articles.len(), "Parsed envelope articles");
        Ok(articles)
    }

    fn normalize(&self, raw: RawArticle) -> Option<Article> {
        let publisher = match raw.source {
            Some(source) if !source.name.is_empty() => source.name,
            _ => self.source_name.clone(),
        };
        let thumbnails = raw
            .url_to_image
            .filter(|url| !url.is_empty())
            .map(|url| {
                vec![Thumbnail {
                    url,
                    width: None,
                    height: None,
                }]
            })
            .unwrap_or_default();
        let article = Article {
            title: raw.title,
            link: raw.url,
            publication_date: raw.published_at,
            description: raw.description,
            publisher,
            category: String::new(),
            thumbnails,
        };
        if !article.has_identity() {
            warn!(source = %self.source_name, "Dropped envelope entry with no title or URL");
            return None;
        }
        Some(article)
    }
}
