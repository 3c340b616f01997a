use std::path::PathBuf;

/// A single candidate produced by a [`FileSystem`](crate::traits::FileSystem)
/// during a walk.
///
/// `name` is the final path component, decoded lossily. Providers fill it in
/// once so filters do not re-decode the path for every criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Full path to the entry.
    pub path: PathBuf,

    /// The entry's file name.
    pub name: String,

    /// What kind of entry this is.
    pub kind: EntryKind,

    /// How deep below the search root this entry was found. Direct children = 1.
    pub depth: usize,
}

impl Entry {
    /// Build an entry from a path, deriving `name` from its last component.
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind, depth: usize) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name, kind, depth }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// The file extension as the text after the last dot of `name`.
    ///
    /// `None` when the name has no dot or ends with one. A leading-dot name
    /// such as `.bashrc` reports `bashrc`.
    pub fn extension(&self) -> Option<&str> {
        match self.name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => Some(ext),
            _ => None,
        }
    }
}

/// The kind of a walked entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file. The only kind a search can match.
    File,

    /// A directory.
    Dir,

    /// A symbolic link (never followed).
    Symlink,

    /// Anything else (device files, pipes, sockets, etc.).
    Other,
}
