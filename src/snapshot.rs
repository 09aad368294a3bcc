//! Dated snapshot archives: one JSON file per calendar day.
//!
//! An archive is a plain JSON array of [`Article`]s named
//! `<YYYY-MM-DD>.json` under a configured storage root. The date string
//! is the archive's identity; archives are immutable once written: a
//! re-run for the same day overwrites rather than appends.
//!
//! # Output Structure
//!
//! ```text
//! storage_root/
//! ├── 2024-07-19.json
//! ├── 2024-07-20.json
//! └── 2024-07-21.json
//! ```
//!
//! [`SnapshotWriter`] is the thin boundary an externally-scheduled job
//! drives: retrieve live across all sources, filter, and capture the
//! result as one day's archive. It does not retry; retry policy belongs
//! to the scheduler.

use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use tokio::fs;
use tracing::{info, instrument};

use crate::dates::ARCHIVE_DATE_LAYOUT;
use crate::error::{Error, Result};
use crate::filters::apply_filters;
use crate::models::{Article, FilterCriteria};
use crate::parsers::parse_failure;
use crate::registry::SourceRegistry;
use crate::retrieval::parse_by_source;
use crate::utils::ensure_writable_dir;

/// Read one day's archive into articles.
///
/// A missing or undecodable archive is a whole-document failure,
/// surfaced as [`Error::ParseFailure`] naming the file.
pub async fn read_archive(path: &Path) -> Result<Vec<Article>> {
    let location = path.display().to_string();
    let bytes = fs::read(path).await.map_err(|e| parse_failure(&location, e))?;
    serde_json::from_slice(&bytes).map_err(|e| parse_failure(&location, e))
}

/// Captures filtered live retrievals as dated archives.
pub struct SnapshotWriter {
    registry: Arc<SourceRegistry>,
}

impl SnapshotWriter {
    pub fn new(registry: Arc<SourceRegistry>) -> Self {
        Self { registry }
    }

    /// Retrieve live across all sources, filter, and write the result to
    /// `storage_path/<date>.json`, where the date is
    /// `criteria.date_start` or today when the criteria name no start.
    ///
    /// The write goes through a temp file and rename, so a crash
    /// mid-write never leaves a torn archive. Each stage failure is
    /// wrapped with the stage that produced it.
    #[instrument(level = "info", skip_all, fields(storage_path = %storage_path.display()))]
    pub async fn execute(&self, criteria: &FilterCriteria, storage_path: &Path) -> Result<()> {
        ensure_writable_dir(storage_path)
            .await
            .map_err(|e| stage_failure("prepare", e))?;

        let articles = parse_by_source(&self.registry, &[])
            .await
            .map_err(|e| stage_failure("retrieval", e))?;
        let filtered = apply_filters(articles, criteria);

        let json = serde_json::to_string(&filtered)
            .map_err(|e| stage_failure("encode", Error::from(e)))?;

        let day = if criteria.date_start.is_empty() {
            Local::now().date_naive().format(ARCHIVE_DATE_LAYOUT).to_string()
        } else {
            criteria.date_start.clone()
        };
        let final_path = storage_path.join(format!("{day}.json"));
        let tmp_path = storage_path.join(format!("{day}.json.tmp"));

        fs::write(&tmp_path, &json)
            .await
            .map_err(|e| stage_failure("write", Error::from(e)))?;
        fs::rename(&tmp_path, &final_path)
            .await
            .map_err(|e| stage_failure("commit", Error::from(e)))?;

        info!(
            path = %final_path.display(),
            count = filtered.len(),
            "Snapshot archive written"
        );
        Ok(())
    }
}

fn stage_failure(stage: &'static str, cause: Error) -> Error {
    Error::Snapshot {
        stage,
        cause: Box::new(cause),
    }
}
