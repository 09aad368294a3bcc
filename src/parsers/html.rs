//! HTML story-list parser.
//!
//! Scraped pages don't carry a feed schema, so this parser is keyed to a
//! fixed selector pattern: each story is an anchor `a.gnt_m_flm_a` whose
//! `title` attribute holds the headline and whose element text is the
//! teaser, followed by a sibling timestamp element carrying a `data-c-dt`
//! attribute.
//!
//! - anchor `title` attribute -> title (anchors missing it are dropped;
//!   scraped markup is expected to have gaps, this is not an error)
//! - anchor `href`, resolved against the page URL -> link
//! - anchor text -> description
//! - sibling `data-c-dt` attribute -> publication date, after stripping an
//!   optional `Updated`/`Published` prefix
//!
//! The publisher is always the configured source name; scraped pages have
//! no reliable self-identification.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use super::{load_location, parse_failure};
use crate::error::Result;
use crate::models::Article;

static STORY_ANCHOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a.gnt_m_flm_a").expect("story anchor selector is valid")
});

static TIMESTAMP_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:updated|published):?\s+").expect("timestamp prefix pattern is valid")
});

#[derive(Debug, Clone)]
pub struct HtmlParser {
    pub(crate) source_name: String,
    pub(crate) location: String,
}

impl HtmlParser {
    pub fn new(source_name: &str, location: &str) -> Self {
        Self {
            source_name: source_name.to_string(),
            location: location.to_string(),
        }
    }

    /// Load the page and normalize its story anchors.
    #[instrument(level = "info", skip_all, fields(source = %self.source_name, location = %self.location))]
    pub async fn parse(&self) -> Result<Vec<Article>> {
        let body = load_location(&self.location)
            .await
            .map_err(|e| parse_failure(&self.location, e))?;
        Ok(self.parse_document(&body))
    }

    /// Normalize an already-loaded page.
    ///
    /// HTML parsing is error-tolerant, so decoding itself never fails;
    /// a page with no recognizable story anchors simply yields nothing.
    pub fn parse_document(&self, body: &str) -> Vec<Article> {
        let document = Html::parse_document(body);
        let base_url = Url::parse(&self.location).ok();

        let mut articles = Vec::new();
        for anchor in document.select(&STORY_ANCHOR) {
            let Some(title) = anchor.value().attr("title").filter(|t| !t.is_empty()) else {
                // Gaps in scraped markup are expected; skip, don't fail.
                continue;
            };
            let link = anchor
                .value()
                .attr("href")
                .map(|href| resolve_link(base_url.as_ref(), href))
                .unwrap_or_default();
            let description = anchor.text().collect::<Vec<_>>().join(" ").trim().to_string();
            let publication_date = sibling_timestamp(&anchor)
                .map(|raw| TIMESTAMP_PREFIX.replace(&raw, "").into_owned())
                .unwrap_or_default();

            articles.push(Article {
                title: title.to_string(),
                link,
                publication_date,
                description,
                publisher: self.source_name.clone(),
                category: String::new(),
                thumbnails: Vec::new(),
            });
        }

        debug!(source = %self.source_name, count = articles.len(), "Parsed story anchors");
        articles
    }
}

/// Resolve a possibly-relative href against the page URL. When the page
/// location is a local file there is no base to resolve against, so the
/// href is kept as-is.
fn resolve_link(base: Option<&Url>, href: &str) -> String {
    match base {
        Some(base) => base
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string()),
        None => href.to_string(),
    }
}

/// Find the timestamp element following a story anchor. The search stops
/// at the next story anchor so one story can never borrow a later
/// story's timestamp.
fn sibling_timestamp(anchor: &ElementRef<'_>) -> Option<String> {
    for node in anchor.next_siblings() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        if element.value().classes().any(|c| c == "gnt_m_flm_a") {
            return None;
        }
        if let Some(timestamp) = element.value().attr("data-c-dt") {
            return Some(timestamp.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><body><div class="gnt_m_flm">
  <a class="gnt_m_flm_a" href="/story/news/1" title="Full headline one">Teaser one</a>
  <div class="gnt_m_flm_sbt" data-c-dt="May 17, 2024"></div>
  <a class="gnt_m_flm_a" href="https://elsewhere.example.com/2" title="Full headline two">Teaser two</a>
  <div class="gnt_m_flm_sbt" data-c-dt="Updated: May 18, 2024"></div>
  <a class="gnt_m_flm_a" href="/story/news/3">Anchor without a headline attribute</a>
  <a class="gnt_m_flm_a" href="/story/news/4" title="Dateless headline">Teaser four</a>
</div></body></html>"#;

    fn parser() -> HtmlParser {
        HtmlParser::new("usatoday", "https://www.usatoday.com/news/")
    }

    #[test]
    fn maps_story_anchors_to_articles() {
        let articles = parser().parse_document(PAGE);
        assert_eq!(articles.len(), 3);

        let first = &articles[0];
        assert_eq!(first.title, "Full headline one");
        assert_eq!(first.link, "https://www.usatoday.com/story/news/1");
        assert_eq!(first.description, "Teaser one");
        assert_eq!(first.publication_date, "May 17, 2024");
        assert_eq!(first.publisher, "usatoday");
    }

    #[test]
    fn anchors_without_title_attribute_are_dropped_in_order() {
        let articles = parser().parse_document(PAGE);
        let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Full headline one", "Full headline two", "Dateless headline"]
        );
    }

    #[test]
    fn absolute_hrefs_survive_resolution() {
        let articles = parser().parse_document(PAGE);
        assert_eq!(articles[1].link, "https://elsewhere.example.com/2");
    }

    #[test]
    fn timestamp_prefix_is_stripped() {
        let articles = parser().parse_document(PAGE);
        assert_eq!(articles[1].publication_date, "May 18, 2024");
    }

    #[test]
    fn story_without_timestamp_keeps_empty_date() {
        let articles = parser().parse_document(PAGE);
        assert_eq!(articles[2].publication_date, "");
    }

    #[test]
    fn page_without_story_anchors_yields_nothing() {
        let articles = parser().parse_document("<html><body><p>hi</p></body></html>");
        assert!(articles.is_empty());
    }

    #[test]
    fn file_locations_keep_relative_hrefs() {
        let local = HtmlParser::new("usatoday", "page.html");
        let articles = local.parse_document(PAGE);
        assert_eq!(articles[0].link, "/story/news/1");
    }
}
