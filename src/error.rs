use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    // Submission
    #[error("invalid search root: {0}")]
    InvalidRoot(PathBuf),

    // Traversal
    #[error("entry unavailable: {path}")]
    EntryUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("symlink loop at {0}")]
    SymlinkLoop(PathBuf),

    #[error("walk error: {0}")]
    Walk(String),

    // Runtime
    #[error("failed to spawn search worker")]
    WorkerSpawn(#[source] std::io::Error),
}

impl SearchError {
    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::InvalidRoot(p)
            | Self::SymlinkLoop(p)
            | Self::EntryUnavailable { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether the search can continue after this error.
    ///
    /// Per-entry failures (unreadable entries, symlink loops, other walk
    /// errors) are skipped by the pipeline and the walk keeps going.
    ///
    /// Request-level errors (bad root, worker spawn failure) end the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::EntryUnavailable { .. } | Self::SymlinkLoop(_) | Self::Walk(_)
        )
    }
}
