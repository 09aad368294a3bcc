//! RSS/XML feed parser.
//!
//! Walks the document with a streaming `quick-xml` reader rather than a
//! DOM, collecting one [`Article`] per `<item>`:
//!
//! - `item.title` -> title
//! - `item.link` -> link
//! - `item.pubDate` -> publication date (kept verbatim; RSS dates are
//!   near-RFC-1123 and are interpreted lazily by the date-range filter)
//! - `item.description` -> description
//! - `item.category` -> category (first occurrence wins)
//! - `media:thumbnail` url/width/height attributes -> thumbnails
//!
//! The channel `<title>` becomes the publisher when the feed declares one;
//! otherwise the configured source name is used. Items with neither a
//! title nor a link are dropped.

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, instrument, warn};

use super::{load_location, parse_failure};
use crate::error::Result;
use crate::models::{Article, Thumbnail};

#[derive(Debug, Clone)]
pub struct XmlParser {
    pub(crate) source_name: String,
    pub(crate) location: String,
}

impl XmlParser {
    pub fn new(source_name: &str, location: &str) -> Self {
        Self {
            source_name: source_name.to_string(),
            location: location.to_string(),
        }
    }

    /// Load the feed document and normalize its items.
    #[instrument(level = "info", skip_all, fields(source = %self.source_name, location = %self.location))]
    pub async fn parse(&self) -> Result<Vec<Article>> {
        let body = load_location(&self.location)
            .await
            .map_err(|e| parse_failure(&self.location, e))?;
        self.parse_document(&body)
    }

    /// Normalize an already-loaded feed document.
    pub fn parse_document(&self, xml: &str) -> Result<Vec<Article>> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut articles = Vec::new();
        let mut channel_title = String::new();
        let mut in_item = false;
        let mut saw_root = false;
        let mut current_tag = String::new();
        let mut item = ItemFields::default();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    saw_root = true;
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    match name.as_str() {
                        "item" => {
                            in_item = true;
                            item = ItemFields::default();
                        }
                        "media:thumbnail" if in_item => {
                            if let Some(thumbnail) = read_thumbnail(&e) {
                                item.thumbnails.push(thumbnail);
                            }
                        }
                        _ => current_tag = name,
                    }
                }
                Ok(Event::Empty(e)) => {
                    saw_root = true;
                    if in_item && matches!(e.name().as_ref(), b"media:thumbnail") {
                        if let Some(thumbnail) = read_thumbnail(&e) {
                            item.thumbnails.push(thumbnail);
                        }
                    }
                }
                Ok(Event::End(e)) => {
                    if in_item && matches!(e.name().as_ref(), b"item") {
                        in_item = false;
                        match item.take_article(&channel_title, &self.source_name) {
                            Some(article) => articles.push(article),
                            None => warn!(
                                source = %self.source_name,
                                "Dropped feed item with no title or link"
                            ),
                        }
                    }
                    current_tag.clear();
                }
                Ok(Event::Text(e)) => {
                    let decoded = e.decode().unwrap_or_default();
                    let text = unescape(&decoded)
                        .map(|t| t.into_owned())
                        .unwrap_or_else(|_| decoded.into_owned());
                    self.record_text(&current_tag, text, in_item, &mut channel_title, &mut item);
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    self.record_text(&current_tag, text, in_item, &mut channel_title, &mut item);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(parse_failure(&self.location, e)),
                _ => {}
            }
        }

        if !saw_root {
            return Err(parse_failure(
                &self.location,
                "document contains no XML root element",
            ));
        }

        debug!(source = %self.source_name, count = articles.len(), "Parsed feed items");
        Ok(articles)
    }

    fn record_text(
        &self,
        current_tag: &str,
        text: String,
        in_item: bool,
        channel_title: &mut String,
        item: &mut ItemFields,
    ) {
        if in_item {
            match current_tag {
                "title" => item.title = text,
                "link" => item.link = text,
                "description" => item.description = text,
                "pubDate" => item.pub_date = text,
                "category" if item.category.is_empty() => item.category = text,
                _ => {}
            }
        } else if current_tag == "title" && channel_title.is_empty() {
            *channel_title = text;
        }
    }
}

/// Per-item accumulator, reset at each `<item>` boundary.
#[derive(Debug, Default)]
struct ItemFields {
    title: String,
    link: String,
    description: String,
    pub_date: String,
    category: String,
    thumbnails: Vec<Thumbnail>,
}

impl ItemFields {
    /// Build the article, or `None` when the item lacks any identity.
    fn take_article(&mut self, channel_title: &str, source_name: &str) -> Option<Article> {
        let publisher = if channel_title.is_empty() {
            source_name.to_string()
        } else {
            channel_title.to_string()
        };
        let article = Article {
            title: std::mem::take(&mut self.title),
            link: std::mem::take(&mut self.link),
            publication_date: std::mem::take(&mut self.pub_date),
            description: std::mem::take(&mut self.description),
            publisher,
            category: std::mem::take(&mut self.category),
            thumbnails: std::mem::take(&mut self.thumbnails),
        };
        article.has_identity().then_some(article)
    }
}

fn read_thumbnail(e: &BytesStart<'_>) -> Option<Thumbnail> {
    let mut url = String::new();
    let mut width = None;
    let mut height = None;
    for attr in e.attributes().flatten() {
        let value = attr.unescape_value().unwrap_or_default();
        match attr.key.as_ref() {
            b"url" => url = value.into_owned(),
            b"width" => width = value.parse().ok(),
            b"height" => height = value.parse().ok(),
            _ => {}
        }
    }
    (!url.is_empty()).then_some(Thumbnail { url, width, height })
}
