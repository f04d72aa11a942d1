//! In-memory collection of normalized documents.
//!
//! A [`ContentRepository`] is rebuilt from disk on every build: scan the
//! collection root, parse each file, normalize its metadata, sort. Nothing
//! derived is persisted between builds, and a document's `(category, slug)`
//! comes only from its location so links stay stable.
//!
//! Problems with individual files never fail the build. They are logged and
//! collected in a [`BuildReport`] so callers can surface them.
//!
//! Outlines are not stored. [`ContentRepository::by_slug`] builds one fresh
//! for each single-document fetch; bulk accessors hand out bare documents.

use crate::frontmatter::{ParseError, parse_document};
use crate::normalize::{NormalizeContext, normalize};
use crate::outline::{OutlineOptions, build_outline};
use crate::scan::{ScanError, SourceEntry, scan_collection};
use crate::types::{CollectionKind, ContentDocument, DocumentView};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed front matter in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// A file left out of the build, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything that went wrong, short of failing, while building.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Structural problems: missing roots, unreadable directories
    pub warnings: Vec<String>,
    pub skipped: Vec<SkippedFile>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.skipped.is_empty()
    }

    pub fn extend(&mut self, other: BuildReport) {
        self.warnings.extend(other.warnings);
        self.skipped.extend(other.skipped);
    }

    fn warn(&mut self, err: &ScanError) {
        self.warnings.push(err.to_string());
    }

    fn skip(&mut self, err: &IngestError) {
        let path = match err {
            IngestError::Read { path, .. } | IngestError::Parse { path, .. } => path.clone(),
        };
        self.skipped.push(SkippedFile {
            path,
            reason: err.to_string(),
        });
    }
}

/// Tag name with the number of documents carrying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}

/// Documents of one collection, newest first.
#[derive(Debug, Clone)]
pub struct ContentRepository {
    kind: CollectionKind,
    documents: Vec<ContentDocument>,
    outline: OutlineOptions,
    report: BuildReport,
}

impl ContentRepository {
    /// Scan `root` and ingest every document found.
    pub fn build(kind: CollectionKind, root: &Path, ctx: &NormalizeContext<'_>) -> Self {
        let scan = scan_collection(root, &ctx.config.content.extensions);

        let mut report = BuildReport::default();
        for warning in &scan.warnings {
            report.warn(warning);
        }

        let mut documents = Vec::with_capacity(scan.entries.len());
        for entry in &scan.entries {
            match ingest(kind, entry, ctx) {
                Ok(doc) => documents.push(doc),
                Err(err) => {
                    error!(path = %entry.path.display(), "{err}");
                    report.skip(&err);
                }
            }
        }

        Self::from_documents(kind, documents, OutlineOptions::from(&ctx.config.outline))
            .with_report(report)
            .logged()
    }

    /// Assemble a repository from already normalized documents.
    pub fn from_documents(
        kind: CollectionKind,
        mut documents: Vec<ContentDocument>,
        outline: OutlineOptions,
    ) -> Self {
        // Stable: equal dates keep scan order
        documents.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
        Self {
            kind,
            documents,
            outline,
            report: BuildReport::default(),
        }
    }

    fn with_report(mut self, report: BuildReport) -> Self {
        self.report = report;
        self
    }

    fn logged(self) -> Self {
        info!(
            collection = %self.kind,
            documents = self.documents.len(),
            skipped = self.report.skipped.len(),
            "collection built"
        );
        self
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Every document, sorted by publish date, newest first.
    pub fn all(&self) -> &[ContentDocument] {
        &self.documents
    }

    /// [`all`](Self::all) without drafts.
    pub fn published(&self) -> impl Iterator<Item = &ContentDocument> {
        self.documents.iter().filter(|doc| !doc.draft)
    }

    /// Look up one document, case-insensitively, and build its outline.
    ///
    /// Without a category the first match in date order wins.
    pub fn by_slug(&self, slug: &str, category: Option<&str>) -> Option<DocumentView<'_>> {
        let document = self.find(slug, category)?;
        Some(DocumentView {
            document,
            outline: build_outline(&document.body, &self.outline),
        })
    }

    /// The bare document behind [`by_slug`](Self::by_slug).
    pub fn find(&self, slug: &str, category: Option<&str>) -> Option<&ContentDocument> {
        self.documents.iter().find(|doc| {
            same_key(&doc.slug, slug) && category.is_none_or(|c| same_key(&doc.category, c))
        })
    }

    /// `(category, slug)` pairs for every routable document.
    ///
    /// Nested categories and empty slugs cannot form a two-segment route and
    /// are left out.
    pub fn all_paths(&self) -> Vec<(String, String)> {
        self.documents
            .iter()
            .filter(|doc| !doc.slug.is_empty())
            .filter(|doc| !doc.category.contains(['/', '\\']))
            .map(|doc| (doc.category.clone(), doc.slug.clone()))
            .collect()
    }

    /// Documents of one category, case-insensitively, newest first.
    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a ContentDocument> {
        self.documents
            .iter()
            .filter(move |doc| same_key(&doc.category, category))
    }

    /// Tags across the collection, most used first.
    ///
    /// Spellings are grouped case-insensitively; the first spelling seen in
    /// date order names the group.
    pub fn tags(&self) -> Vec<TagCount> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<TagCount> = Vec::new();
        for tag in self.documents.iter().flat_map(|doc| &doc.tags) {
            let key = tag.to_lowercase();
            match index.get(&key) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(key, counts.len());
                    counts.push(TagCount {
                        name: tag.clone(),
                        count: 1,
                    });
                }
            }
        }
        counts.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        counts
    }
}

fn same_key(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Read, parse and normalize one file.
fn ingest(
    kind: CollectionKind,
    entry: &SourceEntry,
    ctx: &NormalizeContext<'_>,
) -> Result<ContentDocument, IngestError> {
    let raw = fs::read_to_string(&entry.path).map_err(|source| IngestError::Read {
        path: entry.path.clone(),
        source,
    })?;
    let (fm, body) = parse_document(&raw).map_err(|source| IngestError::Parse {
        path: entry.path.clone(),
        source,
    })?;
    let header = normalize(&fm, &entry.path, &body, ctx);
    debug!(path = %entry.path.display(), title = %header.title, "ingested");

    Ok(ContentDocument {
        slug: entry.stem(),
        category: entry.category.clone(),
        collection: kind,
        title: header.title,
        publish_date: header.publish_date,
        last_modified: header.last_modified,
        draft: header.draft,
        tags: header.tags,
        technologies: header.technologies,
        excerpt: header.excerpt,
        image: header.image,
        image_alt: header.image_alt,
        image_caption: header.image_caption,
        reading_time_minutes: header.reading_time_minutes,
        author: header.author,
        contributors: header.contributors,
        body,
        source_path: entry.path.clone(),
    })
}
