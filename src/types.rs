//! Shared types handed from the ingestion pipeline to the rendering layer.
//!
//! Everything here is plain data: built once per build pass, serialized to
//! JSON by the CLI, never mutated after the repository is assembled.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which collection a document belongs to.
///
/// Related-content scoring is asymmetric, so the pipeline needs to know
/// which side of the posts/projects pair it is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Posts,
    Projects,
}

impl CollectionKind {
    /// The collection on the other side of the related-content pairing.
    pub fn opposite(self) -> Self {
        match self {
            CollectionKind::Posts => CollectionKind::Projects,
            CollectionKind::Projects => CollectionKind::Posts,
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKind::Posts => f.write_str("posts"),
            CollectionKind::Projects => f.write_str("projects"),
        }
    }
}

/// A person credited on a document.
///
/// Deserialization is strict because it only serves `folio.toml`; front
/// matter authors are picked key by key in [`crate::frontmatter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthorIdentity {
    pub name: String,
    #[serde(
        default,
        alias = "avatarUrl",
        alias = "avatar",
        skip_serializing_if = "Option::is_none"
    )]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(
        default,
        alias = "githubHandle",
        alias = "github_handle",
        skip_serializing_if = "Option::is_none"
    )]
    pub github: Option<String>,
}

impl AuthorIdentity {
    /// An identity carrying only a display name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar_url: None,
            bio: None,
            github: None,
        }
    }
}

/// A fully normalized content entry.
///
/// Identity is `(category, slug)`; both come from the file's location on
/// disk so links stay stable across builds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentDocument {
    /// File stem, case preserved (`My-Post.md` → `My-Post`)
    pub slug: String,
    /// Containing directory relative to the collection root, `/`-joined
    pub category: String,
    pub collection: CollectionKind,
    pub title: String,
    pub publish_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    pub draft: bool,
    /// Declared order, duplicates removed case-insensitively
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub technologies: Vec<String>,
    pub excerpt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_caption: Option<String>,
    pub reading_time_minutes: u32,
    pub author: AuthorIdentity,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<AuthorIdentity>,
    /// Raw markdown after the front matter block
    pub body: String,
    /// Source file, kept for diagnostics; not part of the rendering contract
    #[serde(skip)]
    pub source_path: PathBuf,
}

/// One heading in a document's table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineNode {
    pub level: u8,
    pub text: String,
    pub slug: String,
}

/// A single document fetched by slug, with its freshly built outline.
///
/// Bulk listings hand out bare [`ContentDocument`]s; only this view carries
/// an outline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentView<'a> {
    #[serde(flatten)]
    pub document: &'a ContentDocument,
    pub outline: Vec<OutlineNode>,
}

impl DocumentView<'_> {
    /// Outline entries suitable for on-page navigation.
    ///
    /// Level-1 headings duplicate the document title and are left out.
    pub fn navigation(&self) -> impl Iterator<Item = &OutlineNode> {
        self.outline.iter().filter(|node| node.level > 1)
    }
}
