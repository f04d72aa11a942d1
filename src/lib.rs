//! # Folio
//!
//! Content ingestion for markdown blogs and project portfolios. Your
//! filesystem is the data source: one directory per category, one markdown
//! file per document, metadata in a YAML front matter block. Whatever the
//! front matter leaves out is filled in from git history or sensible
//! fallbacks, so the rendering layer always receives complete documents.
//!
//! # Architecture: One Synchronous Pass
//!
//! ```text
//! scan       collection root  →  (category, file) pairs
//! parse      file text        →  typed front matter + body
//! normalize  front matter     →  complete header (git fallback here)
//! repository documents        →  sorted collection, lookup, routes
//! outline    body             →  heading tree, on single-document fetch
//! related    document         →  ranked documents of the other collection
//! ```
//!
//! Builds read the content tree and nothing else; the only external process
//! is a read-only `git log`, bounded by a timeout. Rebuilding an unchanged
//! tree yields identical collections.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks a collection root, skipping `_`/`.` entries and non-document files |
//! | [`frontmatter`] | Splits the `---` block from the body and coerces recognized keys |
//! | [`history`] | `HistoryOracle` trait; `GitHistory` subprocess oracle and `NoHistory` |
//! | [`normalize`] | Priority-chain resolution of dates, authors, title, excerpt, reading time |
//! | [`outline`] | Heading extraction with `pulldown-cmark` and anchor slugs |
//! | [`repository`] | Per-collection store: sorting, case-insensitive lookup, routes, tags |
//! | [`related`] | Weighted cross-collection related-content scoring |
//! | [`site`] | Entry point building posts and projects from one [`config::FolioConfig`] |
//! | [`config`] | `folio.toml` loading, validation, merging, environment overrides |
//! | [`types`] | Documents, authors and outline nodes handed to the rendering layer |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Failures Degrade, Never Abort
//!
//! This is build-time data preparation. A missing collection root yields an
//! empty collection, a malformed file is skipped, a git failure means "no
//! answer". Each is logged through `tracing` and, for the first two,
//! recorded in a [`repository::BuildReport`]. Only an invalid `folio.toml`
//! stops the binary.
//!
//! ## Git as an Injectable Oracle
//!
//! Normalization never runs `git` directly; it asks a
//! [`history::HistoryOracle`]. Tests plug in a table-backed stub, and
//! CI/export builds swap in [`history::NoHistory`] so results do not depend
//! on clone depth.
//!
//! ## Location Is Identity
//!
//! A document's `(category, slug)` comes from its directory and file stem,
//! never from front matter, so external links stay valid as long as the
//! file does not move.

pub mod config;
pub mod frontmatter;
pub mod history;
pub mod normalize;
pub mod outline;
pub mod output;
pub mod related;
pub mod repository;
pub mod scan;
pub mod site;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
