use std::io::BufRead;
use std::path::Path;

use log::debug;

use crate::entry::Entry;
use crate::traits::{FileSystem, Matcher};

// ---------------------------------------------------------------------------
// FilterSpec
// ---------------------------------------------------------------------------

/// Immutable search criteria.
///
/// Every criterion is optional. An unset criterion never rejects a
/// candidate, so `FilterSpec::default()` matches every regular file.
///
/// Build one field by field, or from raw text-box input with
/// [`FilterSpec::from_input`]:
///
/// ```rust
/// use filesift::FilterSpec;
///
/// let spec = FilterSpec::default()
///     .name("invoice")
///     .extension(".TXT")
///     .recursive(true);
///
/// assert_eq!(spec, FilterSpec::from_input("invoice ", " .TXT", "", false, true));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    name_pattern:         Option<String>,
    extension:            Option<String>,
    content_pattern:      Option<String>,
    include_no_extension: bool,
    recursive:            bool,
}

impl FilterSpec {
    /// Build a spec from raw user input.
    ///
    /// Each text field is trimmed. Fields that are empty after trimming are
    /// left unset.
    pub fn from_input(
        name: &str,
        extension: &str,
        content: &str,
        include_no_extension: bool,
        recursive: bool,
    ) -> Self {
        Self::default()
            .name(name)
            .extension(extension)
            .content(content)
            .include_no_extension(include_no_extension)
            .recursive(recursive)
    }

    // ── Criteria ──────────────────────────────────────────────────────────

    /// Case-insensitive substring the file name must contain.
    pub fn name(mut self, pattern: impl AsRef<str>) -> Self {
        self.name_pattern = normalize(pattern.as_ref());
        self
    }

    /// Case-insensitive extension the file must have. A leading dot is
    /// accepted and stripped, so `"txt"` and `".txt"` are equivalent.
    pub fn extension(mut self, ext: impl AsRef<str>) -> Self {
        let ext = ext.as_ref().trim();
        self.extension = normalize(ext.strip_prefix('.').unwrap_or(ext));
        self
    }

    /// Case-insensitive substring some line of the file must contain.
    pub fn content(mut self, pattern: impl AsRef<str>) -> Self {
        self.content_pattern = normalize(pattern.as_ref());
        self
    }

    /// With an extension set, let files without any extension through.
    pub fn include_no_extension(mut self, yes: bool) -> Self {
        self.include_no_extension = yes;
        self
    }

    /// Descend into subdirectories.
    pub fn recursive(mut self, yes: bool) -> Self {
        self.recursive = yes;
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn name_pattern(&self) -> Option<&str> {
        self.name_pattern.as_deref()
    }

    pub fn extension_filter(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    pub fn content_pattern(&self) -> Option<&str> {
        self.content_pattern.as_deref()
    }

    pub fn includes_no_extension(&self) -> bool {
        self.include_no_extension
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    // ── Evaluation ────────────────────────────────────────────────────────

    /// Evaluate the criteria against `entry` in order name, extension,
    /// content. Content is read only for candidates that pass the cheaper
    /// checks. Non-files never match.
    pub fn matches(&self, entry: &Entry, fs: &dyn FileSystem) -> bool {
        entry.is_file()
            && self.matches_name(entry)
            && self.matches_extension(entry)
            && self.matches_content(entry, fs)
    }

    fn matches_name(&self, entry: &Entry) -> bool {
        match &self.name_pattern {
            Some(pattern) => contains_ignore_case(&entry.name, pattern),
            None => true,
        }
    }

    fn matches_extension(&self, entry: &Entry) -> bool {
        let Some(wanted) = &self.extension else {
            return true;
        };
        match entry.extension() {
            Some(ext) => ext.to_lowercase() == wanted.to_lowercase(),
            None => self.include_no_extension,
        }
    }

    fn matches_content(&self, entry: &Entry, fs: &dyn FileSystem) -> bool {
        match &self.content_pattern {
            Some(pattern) => contains_text(fs, &entry.path, pattern),
            None => true,
        }
    }
}

impl Matcher for FilterSpec {
    fn is_match(&self, entry: &Entry, fs: &dyn FileSystem) -> bool {
        self.matches(entry, fs)
    }
}

// ---------------------------------------------------------------------------
// Content check
// ---------------------------------------------------------------------------

/// Whether any line of the file at `path` contains `pattern`,
/// case-insensitively.
///
/// Stops at the first matching line. A file that cannot be opened, or whose
/// bytes stop decoding as UTF-8, counts as not matching.
pub fn contains_text(fs: &dyn FileSystem, path: &Path, pattern: &str) -> bool {
    let reader = match fs.open_text(path) {
        Ok(r) => r,
        Err(e) => {
            debug!("skipping content check for {}: {e}", path.display());
            return false;
        }
    };

    let pattern = pattern.to_lowercase();
    for line in reader.lines() {
        match line {
            Ok(line) if line.to_lowercase().contains(&pattern) => return true,
            Ok(_) => {}
            Err(e) => {
                debug!("stopped reading {}: {e}", path.display());
                return false;
            }
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
