//! Error taxonomy for the crate.
//!
//! Per-entry anomalies inside a parser (a missing optional field, one
//! unparseable item) are never surfaced here; parsers skip those entries.
//! The variants below cover whole-call failures: registry mutation
//! violations, date strings no accepted layout matches, and source
//! documents that could not be opened or decoded as a document.
//!
//! Nothing in this crate terminates the process; callers at the CLI or
//! scheduler boundary decide whether to log, retry, or exit.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A format string other than `xml`, `json`, or `html` reached the
    /// parser factory.
    #[error("unsupported source format: {0:?}")]
    UnsupportedFormat(String),

    /// A source with this name is already registered.
    #[error("source {0:?} is already registered")]
    DuplicateSource(String),

    /// Source names must be 1-20 characters.
    #[error("invalid source name {0:?}: must be 1-20 characters")]
    InvalidSourceName(String),

    /// The named source is not in the registry.
    #[error("source {0:?} is not registered")]
    SourceNotFound(String),

    /// A required date string matched none of the accepted layouts.
    #[error("date {0:?} matched no accepted layout")]
    DateParse(String),

    /// A date range was requested with its start after its end.
    #[error("invalid date range: {start} is after {end}")]
    InvalidDateRange { start: String, end: String },

    /// A source document could not be opened or decoded as a whole.
    #[error("failed to parse source document at {location}: {reason}")]
    ParseFailure { location: String, reason: String },

    /// The first error observed among concurrent per-date snapshot
    /// workers; errors from the other workers are discarded.
    #[error("snapshot aggregation failed: {0}")]
    Aggregation(Box<Error>),

    /// A stage of the snapshot writer failed. The writer does not retry;
    /// retry policy belongs to the external scheduler.
    #[error("snapshot {stage} failed: {cause}")]
    Snapshot {
        stage: &'static str,
        cause: Box<Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
