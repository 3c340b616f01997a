//! In-memory filesystem for unit tests.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::Receiver;

use crate::entry::{Entry, EntryKind};
use crate::error::SearchError;
use crate::traits::{Entries, FileSystem};

enum Node {
    File(Vec<u8>),
    Dir,
    Unavailable,
}

/// A flat, insertion-ordered tree rooted at `root`.
///
/// Paths are given relative to the root. Walks yield entries in insertion
/// order, which makes ordering assertions deterministic.
pub(crate) struct MemoryFileSystem {
    root:   PathBuf,
    nodes:  Vec<(PathBuf, Node)>,
    opened: AtomicUsize,
    gate:   Option<Receiver<()>>,
    panic_on_walk: bool,
}

impl MemoryFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root:   root.into(),
            nodes:  Vec::new(),
            opened: AtomicUsize::new(0),
            gate:   None,
            panic_on_walk: false,
        }
    }

    pub fn file(self, rel: &str, content: &str) -> Self {
        self.bytes(rel, content.as_bytes().to_vec())
    }

    pub fn bytes(mut self, rel: &str, content: Vec<u8>) -> Self {
        self.nodes.push((PathBuf::from(rel), Node::File(content)));
        self
    }

    pub fn dir(mut self, rel: &str) -> Self {
        self.nodes.push((PathBuf::from(rel), Node::Dir));
        self
    }

    /// An entry the walk reports as failed, as if removed or locked mid-walk.
    pub fn unavailable(mut self, rel: &str) -> Self {
        self.nodes.push((PathBuf::from(rel), Node::Unavailable));
        self
    }

    /// Block before yielding each entry until `gate` delivers a message or
    /// disconnects.
    pub fn gated(mut self, gate: Receiver<()>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panic_on_walk = true;
        self
    }

    /// How many times `open_text` has been called.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl FileSystem for MemoryFileSystem {
    fn walk(&self, root: &Path, recursive: bool) -> Entries<'_> {
        if self.panic_on_walk {
            panic!("walk exploded");
        }
        let root = root.to_path_buf();
        Box::new(self.nodes.iter().filter_map(move |(rel, node)| {
            let path = self.root.join(rel);
            let depth = rel.components().count();
            if !path.starts_with(&root) || (!recursive && depth > 1) {
                return None;
            }
            if let Some(gate) = &self.gate {
                let _ = gate.recv();
            }
            Some(match node {
                Node::File(_) => Ok(Entry::new(path, EntryKind::File, depth)),
                Node::Dir => Ok(Entry::new(path, EntryKind::Dir, depth)),
                Node::Unavailable => Err(SearchError::EntryUnavailable {
                    path,
                    source: io::Error::from(io::ErrorKind::PermissionDenied),
                }),
            })
        }))
    }

    fn open_text(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        match self.nodes.iter().find(|(p, _)| p == rel) {
            Some((_, Node::File(bytes))) => Ok(Box::new(io::Cursor::new(bytes.as_slice()))),
            Some((_, Node::Unavailable)) => Err(io::ErrorKind::PermissionDenied.into()),
            _ => Err(io::ErrorKind::NotFound.into()),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        if path == self.root {
            return true;
        }
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        self.nodes
            .iter()
            .any(|(p, node)| p == rel && matches!(node, Node::Dir))
    }
}
