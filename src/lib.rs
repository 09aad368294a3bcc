//! # Newswire
//!
//! A library that ingests news articles published in heterogeneous wire
//! formats (RSS/XML feeds, a JSON article envelope, and scraped HTML),
//! normalizes them into one canonical [`Article`] record, and serves
//! filtered views of that data by keyword, publication date range, and
//! originating source.
//!
//! ## Architecture
//!
//! Data flows through four subsystems:
//! 1. **Registry** ([`SourceRegistry`]): maps a logical feed name to a
//!    declared format and physical location, persisted in a JSON
//!    manifest that survives restarts
//! 2. **Parsers** ([`parsers`]): one strategy per wire format, all
//!    producing the same normalized record
//! 3. **Filters** ([`apply_filters`]): source, date-range, and keyword
//!    predicates composed with short-circuit AND
//! 4. **Retrieval** ([`parse_by_source`], [`from_files`]): live parsing
//!    across registered sources, and concurrent aggregation of dated
//!    snapshot archives
//!
//! [`SnapshotWriter`] closes the loop: an externally-scheduled job calls
//! it to capture today's filtered retrieval as a dated archive that
//! [`from_files`] can later aggregate.
//!
//! ## Usage
//!
//! ```no_run
//! use newswire::{FilterCriteria, SnapshotWriter, SourceRegistry};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn run() -> newswire::Result<()> {
//! let registry = Arc::new(SourceRegistry::load("sources.json").await?);
//! registry.register("bbc", "xml", "https://feeds.bbci.co.uk/news/world/rss.xml").await?;
//!
//! let articles = newswire::parse_by_source(&registry, &[]).await?;
//! let criteria = FilterCriteria::new("climate", "2024-07-19", "2024-07-21", vec![])?;
//! let filtered = newswire::apply_filters(articles, &criteria);
//!
//! SnapshotWriter::new(registry).execute(&criteria, Path::new("./snapshots")).await?;
//! # Ok(())
//! # }
//! ```
//!
//! The operating model is pre-fetched local snapshots plus on-demand
//! live parsing; there is no background polling loop in this crate.
//! Callers at the CLI, HTTP, or scheduler boundary own flag parsing,
//! serving, and retry policy.

pub mod dates;
pub mod error;
pub mod filters;
pub mod models;
pub mod parsers;
pub mod registry;
pub mod retrieval;
pub mod snapshot;
mod utils;

pub use dates::generate_date_range;
pub use error::{Error, Result};
pub use filters::apply_filters;
pub use models::{Article, FilterCriteria, SourceDescriptor, SourceFormat, Thumbnail};
pub use registry::SourceRegistry;
pub use retrieval::{from_files, parse_by_source};
pub use snapshot::SnapshotWriter;
