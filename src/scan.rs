//! Collection directory scanning.
//!
//! First step of every build. Walks one collection root and lists the
//! document files it contains, each paired with the category it belongs to.
//!
//! ## Directory Structure
//!
//! ```text
//! content/posts/                   # Collection root
//! ├── rust/                        # Category "rust"
//! │   ├── hello-world.md           # Document: (rust, hello-world)
//! │   └── async/                   # Nested category "rust/async"
//! │       └── pinning.mdx
//! ├── travel/
//! │   ├── japan.md
//! │   └── notes.txt                # Not a document extension, skipped
//! ├── _drafts/                     # Leading "_", skipped with its contents
//! ├── .obsidian/                   # Leading ".", skipped with its contents
//! └── stray.md                     # No category, skipped
//! ```
//!
//! ## Failure Mode
//!
//! A missing or unreadable root is not an error for the build: the scan
//! returns zero entries and records a structural warning, so callers can
//! still render an empty collection.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("content root does not exist: {0}")]
    MissingRoot(PathBuf),
    #[error("content root is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("cannot read {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// One document file found under a collection root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Directory path relative to the root, components joined with `/`
    pub category: String,
    pub path: PathBuf,
}

impl SourceEntry {
    /// File stem, used as the document slug.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Entries found plus any structural problems met along the way.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub entries: Vec<SourceEntry>,
    pub warnings: Vec<ScanError>,
}

/// Scan `root` for documents with one of `extensions` (no dot,
/// case-insensitive).
///
/// Entries come back sorted by path so repeated scans of an unchanged tree
/// are identical.
pub fn scan_collection(root: &Path, extensions: &[String]) -> ScanResult {
    let mut result = ScanResult::default();

    if !root.exists() {
        let err = ScanError::MissingRoot(root.to_path_buf());
        warn!(root = %root.display(), "{err}");
        result.warnings.push(err);
        return result;
    }
    if !root.is_dir() {
        let err = ScanError::NotADirectory(root.to_path_buf());
        warn!(root = %root.display(), "{err}");
        result.warnings.push(err);
        return result;
    }

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_ignored(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                let path = source.path().unwrap_or(root).to_path_buf();
                let err = ScanError::Walk { path, source };
                warn!("{err}");
                result.warnings.push(err);
                continue;
            }
        };

        if !entry.file_type().is_file() || !has_extension(entry.path(), extensions) {
            continue;
        }
        let Some(category) = category_of(root, entry.path()) else {
            debug!(path = %entry.path().display(), "document outside any category, skipping");
            continue;
        };
        result.entries.push(SourceEntry {
            category,
            path: entry.into_path(),
        });
    }

    result
}

/// Hidden (`.`) and private (`_`) entries are skipped, directories included.
fn is_ignored(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.') || name.starts_with('_'))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
}

/// Category for a file: its parent directory relative to `root`.
/// `None` for files sitting directly in the root.
fn category_of(root: &Path, path: &Path) -> Option<String> {
    let rel = path.parent()?.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
