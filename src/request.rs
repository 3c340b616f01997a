use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::SearchError;
use crate::filter::FilterSpec;
use crate::traits::FileSystem;

/// Identifies one submitted request. Assigned by
/// [`SearchEngine`](crate::SearchEngine) in increasing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub(crate) u64);

impl RequestId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A root directory plus the criteria to search it with.
///
/// An empty `root` stands for the engine's default root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub root: PathBuf,
    pub spec: FilterSpec,
}

impl SearchRequest {
    pub fn new(root: impl Into<PathBuf>, spec: FilterSpec) -> Self {
        Self { root: root.into(), spec }
    }

    /// Resolve the root to an absolute existing directory.
    ///
    /// The path is made absolute lexically, without resolving symlinks, so
    /// results keep the paths the user navigated through.
    pub(crate) fn resolve_root(
        &self,
        fs: &dyn FileSystem,
        default_root: &Path,
    ) -> Result<PathBuf, SearchError> {
        let root = if self.root.as_os_str().is_empty() {
            default_root
        } else {
            self.root.as_path()
        };
        let root = std::path::absolute(root)
            .map_err(|_| SearchError::InvalidRoot(root.to_path_buf()))?;
        if !fs.is_dir(&root) {
            return Err(SearchError::InvalidRoot(root));
        }
        Ok(root)
    }
}
