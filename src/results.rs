use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::request::RequestId;

/// One matched file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchResult {
    pub absolute_path: PathBuf,
    pub display_name:  String,
}

/// How a request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    /// The walk ran to the end. `matches` may be empty.
    Completed,

    /// The request was cancelled or superseded. No matches are delivered.
    Cancelled,

    /// The worker could not run or died. Carries a human-readable reason.
    Failed(String),
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::Cancelled => f.write_str("cancelled"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// The terminal result of one request.
///
/// Exactly one outcome is delivered per submitted request.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The request this outcome belongs to.
    pub id: RequestId,

    pub status: SearchStatus,

    /// Matched files in the order the walk discovered them.
    /// Always empty unless `status` is [`SearchStatus::Completed`].
    pub matches: Vec<SearchResult>,

    /// Scan statistics. Zeroed for requests that never ran.
    pub stats: ScanStats,
}

impl SearchOutcome {
    pub(crate) fn failed(id: RequestId, reason: impl Into<String>) -> Self {
        Self {
            id,
            status: SearchStatus::Failed(reason.into()),
            matches: Vec::new(),
            stats: ScanStats::default(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == SearchStatus::Completed
    }

    /// Downgrade to `Cancelled`, dropping any matches.
    pub(crate) fn into_cancelled(mut self) -> Self {
        if self.is_completed() {
            self.status = SearchStatus::Cancelled;
        }
        if self.status == SearchStatus::Cancelled {
            self.matches.clear();
        }
        self
    }
}

/// Performance statistics for a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Regular files examined (matched or not).
    pub files: usize,

    /// Directories encountered.
    pub dirs: usize,

    /// Entries skipped because they could not be listed or stat'd.
    pub skipped: usize,

    /// Wall-clock time from search start to completion.
    pub duration: Duration,

    /// Entries scanned per second. Convenience field, equal to
    /// `(files + dirs) / duration.as_secs_f64()`, 0 on zero-duration runs.
    pub entries_per_sec: usize,
}

impl ScanStats {
    /// Compute `entries_per_sec` from raw counts and duration.
    pub(crate) fn compute(files: usize, dirs: usize, skipped: usize, duration: Duration) -> Self {
        let total = files + dirs;
        let eps = if duration.as_secs_f64() > 0.0 {
            (total as f64 / duration.as_secs_f64()) as usize
        } else {
            0
        };
        Self {
            files,
            dirs,
            skipped,
            duration,
            entries_per_sec: eps,
        }
    }
}
