use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};

use crate::entry::EntryKind;
use crate::request::RequestId;
use crate::results::{ScanStats, SearchOutcome, SearchResult, SearchStatus};
use crate::traits::{FileSystem, Matcher};

// ---------------------------------------------------------------------------
// CancellationToken
// ---------------------------------------------------------------------------

/// Cooperative cancellation flag shared between a caller and a worker.
///
/// The pipeline checks it between candidates. A file whose content is being
/// scanned is finished before the flag is seen.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Everything one pipeline run needs, borrowed from whoever owns it.
pub(crate) struct EngineOptions<'a> {
    pub fs:        &'a dyn FileSystem,
    pub root:      &'a Path,
    pub recursive: bool,
    pub matcher:   &'a dyn Matcher,
    pub cancel:    &'a CancellationToken,
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// Walk `root` and collect every candidate the matcher accepts.
///
/// Runs on the calling thread. Per-entry errors are logged and skipped.
/// Returns `Cancelled` with no matches if the token fires mid-walk.
pub(crate) fn run(id: RequestId, opts: EngineOptions<'_>) -> SearchOutcome {
    info!(
        "search {id} started under {} (recursive: {})",
        opts.root.display(),
        opts.recursive
    );
    let start = Instant::now();

    let mut matches = Vec::new();
    let mut files = 0;
    let mut dirs = 0;
    let mut skipped = 0;
    let mut status = SearchStatus::Completed;

    for item in opts.fs.walk(opts.root, opts.recursive) {
        if opts.cancel.is_cancelled() {
            status = SearchStatus::Cancelled;
            break;
        }

        let entry = match item {
            Ok(e) => e,
            Err(e) => {
                debug!("search {id}: skipping entry: {e}");
                skipped += 1;
                continue;
            }
        };

        match entry.kind {
            EntryKind::Dir => {
                dirs += 1;
                continue;
            }
            EntryKind::File => files += 1,
            EntryKind::Symlink | EntryKind::Other => continue,
        }

        if opts.matcher.is_match(&entry, opts.fs) {
            matches.push(SearchResult {
                absolute_path: entry.path,
                display_name:  entry.name,
            });
        }
    }

    // A cancel that lands after the last candidate still wins.
    if opts.cancel.is_cancelled() {
        status = SearchStatus::Cancelled;
    }

    let stats = ScanStats::compute(files, dirs, skipped, start.elapsed());
    info!(
        "search {id} {status}: {} matches, {files} files, {dirs} dirs, {skipped} skipped in {:.3}s",
        matches.len(),
        stats.duration.as_secs_f64()
    );

    let outcome = SearchOutcome { id, status, matches, stats };
    match outcome.status {
        SearchStatus::Cancelled => outcome.into_cancelled(),
        _ => outcome,
    }
}
