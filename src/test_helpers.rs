//! Shared test utilities for the folio test suite.
//!
//! Provides the fixture tree, a scriptable history oracle, and lookup
//! helpers that panic with a listing of what is available.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let history = StubHistory::new().with_author(tmp.path().join("posts/rust/ownership.md"), "Ada");
//! let repo = build_posts(tmp.path(), &history);
//!
//! let doc = find_doc(repo.all(), "ownership");
//! assert_eq!(doc.author.name, "Ada");
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::FolioConfig;
use crate::history::{HistoryFact, HistoryOracle, HistoryValue};
use crate::normalize::NormalizeContext;
use crate::repository::ContentRepository;
use crate::types::{CollectionKind, ContentDocument};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Fixed build date used across tests.
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

/// Build the `posts/` collection under `content_root` with default config.
pub fn build_posts(content_root: &Path, history: &dyn HistoryOracle) -> ContentRepository {
    build_collection(CollectionKind::Posts, &content_root.join("posts"), history)
}

/// Build the `projects/` collection under `content_root` with default config.
pub fn build_projects(content_root: &Path, history: &dyn HistoryOracle) -> ContentRepository {
    build_collection(CollectionKind::Projects, &content_root.join("projects"), history)
}

fn build_collection(
    kind: CollectionKind,
    root: &Path,
    history: &dyn HistoryOracle,
) -> ContentRepository {
    let config = FolioConfig::default();
    let ctx = NormalizeContext {
        history,
        today: test_today(),
        config: &config,
    };
    ContentRepository::build(kind, root, &ctx)
}

// =========================================================================
// Stub history oracle
// =========================================================================

/// History oracle answering from a fixed table.
///
/// A date query with no date entry falls back to the timestamp entry, the
/// way git derives both from the same commit.
#[derive(Debug, Default)]
pub struct StubHistory {
    facts: HashMap<(PathBuf, HistoryFact), HistoryValue>,
}

impl StubHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timestamp(mut self, path: impl AsRef<Path>, ts: DateTime<FixedOffset>) -> Self {
        self.facts.insert(
            (path.as_ref().to_path_buf(), HistoryFact::LastCommitTimestamp),
            HistoryValue::Timestamp(ts),
        );
        self
    }

    pub fn with_date(mut self, path: impl AsRef<Path>, date: NaiveDate) -> Self {
        self.facts.insert(
            (path.as_ref().to_path_buf(), HistoryFact::LastCommitDate),
            HistoryValue::Date(date),
        );
        self
    }

    pub fn with_author(mut self, path: impl AsRef<Path>, name: impl Into<String>) -> Self {
        self.facts.insert(
            (path.as_ref().to_path_buf(), HistoryFact::LastCommitAuthor),
            HistoryValue::Author(name.into()),
        );
        self
    }
}

impl HistoryOracle for StubHistory {
    fn resolve(&self, path: &Path, fact: HistoryFact) -> Option<HistoryValue> {
        let lookup = |fact: HistoryFact| self.facts.get(&(path.to_path_buf(), fact)).cloned();
        match fact {
            HistoryFact::LastCommitDate => {
                lookup(fact).or_else(|| lookup(HistoryFact::LastCommitTimestamp))
            }
            _ => lookup(fact),
        }
    }
}

// =========================================================================
// Document lookups: panic with a clear message on miss
// =========================================================================

/// Find a document by slug. Panics if not found.
pub fn find_doc<'a>(docs: &'a [ContentDocument], slug: &str) -> &'a ContentDocument {
    docs.iter().find(|d| d.slug == slug).unwrap_or_else(|| {
        let slugs = doc_slugs(docs);
        panic!("document '{slug}' not found. Available: {slugs:?}")
    })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All slugs in collection order.
pub fn doc_slugs(docs: &[ContentDocument]) -> Vec<&str> {
    docs.iter().map(|d| d.slug.as_str()).collect()
}

/// All titles in collection order.
pub fn doc_titles(docs: &[ContentDocument]) -> Vec<&str> {
    docs.iter().map(|d| d.title.as_str()).collect()
}
