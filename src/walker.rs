use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use ignore::{DirEntry, WalkBuilder};

use crate::entry::{Entry, EntryKind};
use crate::error::SearchError;
use crate::traits::{Entries, FileSystem};

/// The local disk, walked with `ignore::WalkBuilder`.
///
/// Every ignore-file and hidden-file filter is switched off: a file browser
/// search sees exactly what the directory listing shows. Symlinks are not
/// followed for descent. A symlink whose target is a regular file is reported
/// as [`EntryKind::File`], a dangling or directory symlink as
/// [`EntryKind::Symlink`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn walk(&self, root: &Path, recursive: bool) -> Entries<'_> {
        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .ignore(false)
            .parents(false)
            .hidden(false)
            .follow_links(false)
            .same_file_system(false)
            .max_depth(if recursive { None } else { Some(1) })
            .build();

        Box::new(walker.filter_map(|res| match res {
            Ok(e) if e.depth() == 0 => None,
            Ok(e) => Some(Ok(to_entry(e))),
            Err(e) => Some(Err(map_ignore_error(e))),
        }))
    }

    fn open_text(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>> {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

fn to_entry(e: DirEntry) -> Entry {
    let kind = match e.file_type() {
        Some(ft) if ft.is_dir() => EntryKind::Dir,
        Some(ft) if ft.is_file() => EntryKind::File,
        Some(ft) if ft.is_symlink() => {
            // Qualifies only when the target is a regular file.
            match std::fs::metadata(e.path()) {
                Ok(md) if md.is_file() => EntryKind::File,
                _ => EntryKind::Symlink,
            }
        }
        _ => EntryKind::Other,
    };
    let depth = e.depth();
    Entry::new(e.into_path(), kind, depth)
}

// ---------------------------------------------------------------------------
// Map ignore::Error to SearchError
// ---------------------------------------------------------------------------

fn map_ignore_error(e: ignore::Error) -> SearchError {
    match e {
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err),
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(io_err) => SearchError::EntryUnavailable {
                path,
                source: io_err,
            },
            other => SearchError::Walk(format!("{}: {}", path.display(), other)),
        },
        ignore::Error::Loop { child, .. } => SearchError::SymlinkLoop(child),
        ignore::Error::Io(io_err) => SearchError::EntryUnavailable {
            path: PathBuf::new(),
            source: io_err,
        },
        other => SearchError::Walk(other.to_string()),
    }
}
