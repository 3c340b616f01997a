use std::path::PathBuf;
use std::sync::Arc;

use crate::orchestrator::SearchEngine;
use crate::traits::FileSystem;
use crate::walker::LocalFileSystem;

// ---------------------------------------------------------------------------
// EngineBuilder
// ---------------------------------------------------------------------------

/// Configures a [`SearchEngine`].
///
/// Created via [`filesift::engine()`](crate::engine) or
/// [`SearchEngine::builder()`]. Every setting has a default, so
/// `engine().build()` gives a working engine over the local disk.
///
/// # Example
///
/// ```rust
/// use filesift::LocalFileSystem;
///
/// let engine = filesift::engine()
///     .file_system(LocalFileSystem)
///     .default_root(std::env::temp_dir())
///     .thread_name("finder")
///     .build();
///
/// assert_eq!(engine.in_flight(), 0);
/// ```
pub struct EngineBuilder {
    fs:           Option<Arc<dyn FileSystem>>,
    default_root: Option<PathBuf>,
    thread_name:  String,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            fs:           None,
            default_root: None,
            thread_name:  "filesift-search".to_owned(),
        }
    }
}

impl EngineBuilder {
    // ── Filesystem ────────────────────────────────────────────────────────

    /// Set the filesystem searches walk and read through.
    ///
    /// Defaults to [`LocalFileSystem`].
    pub fn file_system(mut self, fs: impl FileSystem + 'static) -> Self {
        self.fs = Some(Arc::new(fs));
        self
    }

    /// Share an existing filesystem handle with the engine.
    pub fn shared_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    // ── Options ───────────────────────────────────────────────────────────

    /// Root used for requests submitted with an empty path.
    ///
    /// Defaults to the platform filesystem root.
    pub fn default_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.default_root = Some(root.into());
        self
    }

    /// Name prefix for worker threads. Each worker is named
    /// `<prefix>-<request id>`.
    pub fn thread_name(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name = prefix.into();
        self
    }

    // ── Build ─────────────────────────────────────────────────────────────

    pub fn build(self) -> SearchEngine {
        let fs = self
            .fs
            .unwrap_or_else(|| Arc::new(LocalFileSystem) as Arc<dyn FileSystem>);
        let default_root = self.default_root.unwrap_or_else(platform_root);
        SearchEngine::from_parts(fs, default_root, self.thread_name)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The filesystem root: `/` on Unix, the system drive on Windows.
pub fn platform_root() -> PathBuf {
    #[cfg(windows)]
    {
        let drive = std::env::var_os("SystemDrive").unwrap_or_else(|| "C:".into());
        let mut root = PathBuf::from(drive);
        root.push("\\");
        root
    }
    #[cfg(not(windows))]
    {
        PathBuf::from("/")
    }
}
