//! # filesift
//!
//! Filtered directory search engine: walk a directory, keep the files whose
//! name, extension and text content match, and do it off the caller's thread.
//!
//! A search is described by a [`FilterSpec`] (every criterion optional) and
//! a root directory. [`SearchEngine::submit`] runs it on a background worker
//! and the caller drains exactly one [`SearchOutcome`] per request from its
//! own thread. The filesystem is injected through the [`FileSystem`] trait;
//! [`LocalFileSystem`] walks the local disk.
//!
//! # Quick Start
//!
//! ```rust
//! use std::fs;
//! use filesift::{FilterSpec, SearchRequest, SearchStatus};
//!
//! let dir = tempfile::tempdir()?;
//! fs::write(dir.path().join("notes.txt"), "Hello world\n")?;
//! fs::write(dir.path().join("README"), "hello")?;
//!
//! let mut engine = filesift::engine().build();
//! let spec = FilterSpec::from_input("", ".txt", "HELLO", false, true);
//! engine.submit(SearchRequest::new(dir.path(), spec))?;
//!
//! let outcome = engine.wait().expect("one outcome per request");
//! assert_eq!(outcome.status, SearchStatus::Completed);
//! assert_eq!(outcome.matches.len(), 1);
//! assert_eq!(outcome.matches[0].display_name, "notes.txt");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! For callers that already run on a worker of their own,
//! [`search_blocking`] does the same walk on the current thread.

#![forbid(unsafe_code)]

mod builder;
mod engine;
mod entry;
mod error;
mod filter;
mod orchestrator;
mod request;
mod results;
mod traits;
mod walker;

#[cfg(test)]
mod testing;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::{platform_root, EngineBuilder};
pub use engine::CancellationToken;
pub use entry::{Entry, EntryKind};
pub use error::SearchError;
pub use filter::{contains_text, FilterSpec};
pub use orchestrator::{SearchEngine, SearchHandle};
pub use request::{RequestId, SearchRequest};
pub use results::{ScanStats, SearchOutcome, SearchResult, SearchStatus};
pub use traits::{Entries, FileSystem, Matcher};
pub use walker::LocalFileSystem;

// ── Entry points ──────────────────────────────────────────────────────────────

/// Create a new [`EngineBuilder`] to configure a [`SearchEngine`].
pub fn engine() -> EngineBuilder {
    EngineBuilder::default()
}

/// Run a search to completion on the current thread.
///
/// An empty root resolves to [`platform_root`]. The outcome carries the
/// default [`RequestId`]; ids are only assigned by [`SearchEngine`].
/// `cancel` is checked between candidates.
///
/// # Errors
///
/// Returns [`SearchError::InvalidRoot`] if the root is not an existing
/// directory.
///
/// # Example
///
/// ```rust
/// use filesift::{CancellationToken, FilterSpec, LocalFileSystem, SearchRequest};
///
/// let dir = tempfile::tempdir()?;
/// std::fs::write(dir.path().join("a.TXT"), "x")?;
///
/// let request = SearchRequest::new(dir.path(), FilterSpec::default().extension("txt"));
/// let outcome = filesift::search_blocking(&LocalFileSystem, request, &CancellationToken::new())?;
/// assert_eq!(outcome.matches.len(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn search_blocking(
    fs: &dyn FileSystem,
    request: SearchRequest,
    cancel: &CancellationToken,
) -> Result<SearchOutcome, SearchError> {
    let root = request.resolve_root(fs, &platform_root())?;
    Ok(engine::run(
        RequestId::default(),
        engine::EngineOptions {
            fs,
            root: &root,
            recursive: request.spec.is_recursive(),
            matcher: &request.spec,
            cancel,
        },
    ))
}
