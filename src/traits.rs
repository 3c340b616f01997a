use std::io::{self, BufRead};
use std::path::Path;

use crate::entry::Entry;
use crate::error::SearchError;

/// Lazy, single-pass sequence of walked entries.
pub type Entries<'a> = Box<dyn Iterator<Item = Result<Entry, SearchError>> + 'a>;

/// A filesystem the engine can search.
///
/// The engine owns no filesystem logic of its own: it walks and reads
/// through this trait, so callers can inject the local disk
/// ([`LocalFileSystem`](crate::walker::LocalFileSystem)), an in-memory tree
/// for tests, or anything else that can list entries and open files.
///
/// # Thread Safety
///
/// `Send + Sync` are required. Providers are shared with worker threads
/// behind an `Arc`.
///
/// # Error Handling
///
/// Per-entry failures (permission denied, entry removed mid-walk) should be
/// yielded as `Err(SearchError)` rather than ending the iterator. The
/// pipeline skips them and keeps walking.
///
/// # Example
///
/// ```rust
/// use std::io::{self, BufRead};
/// use std::path::Path;
/// use filesift::{Entries, Entry, EntryKind, FileSystem, SearchError};
///
/// struct Names(Vec<&'static str>);
///
/// impl FileSystem for Names {
///     fn walk(&self, root: &Path, _recursive: bool) -> Entries<'_> {
///         let root = root.to_path_buf();
///         Box::new(self.0.iter().map(move |n| {
///             Ok::<_, SearchError>(Entry::new(root.join(n), EntryKind::File, 1))
///         }))
///     }
///
///     fn open_text(&self, _path: &Path) -> io::Result<Box<dyn BufRead + '_>> {
///         Ok(Box::new(io::Cursor::new(Vec::<u8>::new())))
///     }
///
///     fn is_dir(&self, _path: &Path) -> bool {
///         true
///     }
/// }
/// ```
pub trait FileSystem: Send + Sync {
    /// Enumerate entries under `root`.
    ///
    /// Non-recursive walks yield direct children only. Recursive walks yield
    /// the whole subtree. The root itself is never yielded and symlinks are
    /// not followed.
    fn walk(&self, root: &Path, recursive: bool) -> Entries<'_>;

    /// Open a file for line-oriented text reading.
    fn open_text(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>>;

    /// Whether `path` currently denotes a directory.
    fn is_dir(&self, path: &Path) -> bool;
}

/// Determines whether a candidate is a match.
///
/// [`FilterSpec`](crate::filter::FilterSpec) is the stock implementation.
/// Matchers receive the provider so they can read file contents through
/// the same filesystem the walk came from.
///
/// # Thread Safety
///
/// `Send + Sync` are required. Matchers are moved onto worker threads.
///
/// # Example
///
/// ```rust
/// use filesift::{Entry, FileSystem, Matcher};
///
/// struct LargeName(usize);
///
/// impl Matcher for LargeName {
///     fn is_match(&self, entry: &Entry, _fs: &dyn FileSystem) -> bool {
///         entry.is_file() && entry.name.len() > self.0
///     }
/// }
/// ```
pub trait Matcher: Send + Sync {
    /// Returns `true` if this entry should be included in results.
    fn is_match(&self, entry: &Entry, fs: &dyn FileSystem) -> bool;
}
