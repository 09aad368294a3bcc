//! The retrieval engine: live parsing across registered sources and
//! concurrent multi-day snapshot aggregation.
//!
//! Live retrieval runs the bound parsers one after another and
//! concatenates their output; each parser preserves its own document
//! order, and a single parser failure aborts the whole call. Silently
//! dropping one source's contribution would make downstream counts
//! misleading, so there is no partial-success mode.
//!
//! Snapshot retrieval fans out one worker per calendar date in the
//! requested range, bounded by a small semaphore so an operator asking
//! for a year doesn't open hundreds of files at once. Workers append to
//! a shared accumulator behind a lock and funnel failures through a
//! buffered channel; the call joins every worker before inspecting
//! either. The same fail-fast policy applies: any worker error discards
//! everything and surfaces as [`Error::Aggregation`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;
use tokio::sync::{Mutex, Semaphore, mpsc};
use tracing::{debug, info, instrument, warn};

use crate::dates::generate_date_range;
use crate::error::{Error, Result};
use crate::models::Article;
use crate::registry::SourceRegistry;
use crate::snapshot::read_archive;

/// Upper bound on archive files open at once during snapshot retrieval.
/// Date ranges are operator-bounded, not user-unbounded, but a misjudged
/// range should saturate I/O, not file descriptors.
const MAX_CONCURRENT_ARCHIVE_READS: usize = 8;

/// Run the named sources' parsers now and concatenate their articles.
///
/// An empty `source_names` runs every registered source. Names not in
/// the registry are skipped rather than failing, tolerating stale
/// requests against a since-deleted source. The first parser failure
/// aborts the whole call; no partial result is returned.
#[instrument(level = "info", skip_all, fields(requested = source_names.len()))]
pub async fn parse_by_source(
    registry: &SourceRegistry,
    source_names: &[String],
) -> Result<Vec<Article>> {
    let parsers = registry.parsers_for(source_names).await;
    debug!(bound = parsers.len(), "Resolved parsers for retrieval");

    let mut articles = Vec::new();
    for parser in parsers {
        let mut parsed = parser.parse().await?;
        debug!(
            source = parser.source_name(),
            count = parsed.len(),
            "Source parsed"
        );
        articles.append(&mut parsed);
    }

    info!(count = articles.len(), "Live retrieval complete");
    Ok(articles)
}

/// Read and merge the daily snapshot archives for every calendar date in
/// the inclusive `[date_start, date_end]` range (layout `YYYY-MM-DD`).
///
/// Archives are read concurrently, so the merged article order is **not
/// deterministic across runs**; callers needing a stable order must sort
/// explicitly (e.g. by publication date) after retrieval. If any day's
/// archive cannot be read or decoded, the whole call fails with
/// [`Error::Aggregation`] wrapping the first error observed, and all
/// accumulated articles are discarded.
#[instrument(level = "info", skip_all, fields(%date_start, %date_end))]
pub async fn from_files(
    storage_root: &Path,
    date_start: &str,
    date_end: &str,
) -> Result<Vec<Article>> {
    let dates = generate_date_range(date_start, date_end)?;
    debug!(days = dates.len(), root = %storage_root.display(), "Reading snapshot archives");

    let accumulator = Arc::new(Mutex::new(Vec::new()));
    let (error_tx, mut error_rx) = mpsc::channel::<Error>(dates.len());
    let permits = Arc::new(Semaphore::new(MAX_CONCURRENT_ARCHIVE_READS));
    let failed = Arc::new(AtomicBool::new(false));

    let mut workers = Vec::with_capacity(dates.len());
    for date in &dates {
        let path = storage_root.join(format!("{date}.json"));
        let accumulator = Arc::clone(&accumulator);
        let error_tx = error_tx.clone();
        let permits = Arc::clone(&permits);
        let failed = Arc::clone(&failed);
        workers.push(tokio::spawn(read_day_archive(
            path,
            accumulator,
            error_tx,
            permits,
            failed,
        )));
    }
    drop(error_tx);

    // Wait-group: every worker finishes before results are inspected.
    let joined = join_all(workers).await;
    for join in joined {
        if let Err(e) = join {
            return Err(Error::Aggregation(Box::new(Error::Io(
                std::io::Error::other(e),
            ))));
        }
    }

    if let Some(first_error) = error_rx.recv().await {
        // Later workers may have reported too; only the first survives.
        return Err(Error::Aggregation(Box::new(first_error)));
    }

    let articles = std::mem::take(&mut *accumulator.lock().await);
    info!(count = articles.len(), days = dates.len(), "Snapshot retrieval complete");
    Ok(articles)
}

/// One per-date worker: read the day's archive and either append its
/// articles to the shared accumulator or report the failure.
async fn read_day_archive(
    path: PathBuf,
    accumulator: Arc<Mutex<Vec<Article>>>,
    error_tx: mpsc::Sender<Error>,
    permits: Arc<Semaphore>,
    failed: Arc<AtomicBool>,
) {
    let Ok(_permit) = permits.acquire_owned().await else {
        return;
    };
    // Cooperative cancellation: once a sibling has failed the call's
    // outcome is fixed, so skip the read instead of burning I/O.
    if failed.load(Ordering::Relaxed) {
        debug!(path = %path.display(), "Skipping archive read after sibling failure");
        return;
    }

    match read_archive(&path).await {
        Ok(mut articles) => {
            debug!(path = %path.display(), count = articles.len(), "Archive read");
            accumulator.lock().await.append(&mut articles);
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Archive read failed");
            failed.store(true, Ordering::Relaxed);
            // Buffered to the range size; never blocks.
            let _ = error_tx.send(e).await;
        }
    }
}
