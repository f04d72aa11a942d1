//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Each document leads
//! with its positional index and title; its route, tags and source file are
//! secondary context on indented lines. The output reads as a content
//! inventory while still letting users trace entries back to files.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Posts (2 documents)
//! 001 Understanding Ownership
//!     Route: rust/ownership
//!     Date: 2024-05-10 · 1 min · Ada Lovelace
//!     Tags: Rust, Memory
//!     Source: rust/ownership.md
//! 002 Generics in Go [draft]
//!     Route: go/generics-draft
//!     ...
//!
//! Tags
//!     Rust (3)
//!     Go (2)
//! ```
//!
//! ## Show
//!
//! ```text
//! Understanding Ownership
//!     Route: rust/ownership
//!     Date: 2024-05-10 · 1 min · Ada Lovelace
//!     Excerpt: Moves, borrows and lifetimes without the hand-waving.
//!
//! Outline
//!     Moves #moves
//!     Borrowing #borrowing
//!         Shared references #shared-references
//! ```
//!
//! ## Related
//!
//! ```text
//! Related to Folio CLI
//! 001 Understanding Ownership (score 9) → posts/rust/ownership
//! ```
//!
//! ## Check
//!
//! ```text
//! Posts: 5 documents
//! Projects: 2 documents
//! Warning: content root does not exist: content/projects
//! Skipped: content/posts/rust/broken.md
//!     malformed front matter in content/posts/rust/broken.md: ...
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::related::ScoredDocument;
use crate::repository::{BuildReport, ContentRepository, TagCount};
use crate::site::Site;
use crate::types::{CollectionKind, ContentDocument, DocumentView};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head.trim_end())
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Header line: positional index + title, with a draft marker.
fn document_header(index: usize, doc: &ContentDocument) -> String {
    let draft = if doc.draft { " [draft]" } else { "" };
    format!("{} {}{}", format_index(index), doc.title, draft)
}

/// Indented context lines shared by listings and single-document views.
fn document_context(doc: &ContentDocument, depth: usize) -> Vec<String> {
    let pad = indent(depth);
    let mut lines = vec![
        format!("{pad}Route: {}/{}", doc.category, doc.slug),
        format!(
            "{pad}Date: {} · {} min · {}",
            doc.publish_date, doc.reading_time_minutes, doc.author.name
        ),
    ];
    if let Some(modified) = doc.last_modified {
        lines.push(format!("{pad}Modified: {}", modified.format("%Y-%m-%d %H:%M UTC")));
    }
    if !doc.tags.is_empty() {
        lines.push(format!("{pad}Tags: {}", doc.tags.join(", ")));
    }
    if !doc.technologies.is_empty() {
        lines.push(format!("{pad}Technologies: {}", doc.technologies.join(", ")));
    }
    if let Some(name) = doc.source_path.file_name() {
        lines.push(format!(
            "{pad}Source: {}/{}",
            doc.category,
            name.to_string_lossy()
        ));
    }
    lines
}

// ============================================================================
// Scan output
// ============================================================================

/// Format one collection listing, newest first, followed by its tags.
pub fn format_collection(repo: &ContentRepository) -> Vec<String> {
    let mut lines = Vec::new();
    let title = match repo.kind() {
        CollectionKind::Posts => "Posts",
        CollectionKind::Projects => "Projects",
    };
    lines.push(format!("{} ({})", title, plural(repo.len(), "document")));

    for (i, doc) in repo.all().iter().enumerate() {
        lines.push(document_header(i + 1, doc));
        lines.extend(document_context(doc, 1));
    }

    let tags = repo.tags();
    if !tags.is_empty() {
        lines.push(String::new());
        lines.push("Tags".to_string());
        lines.extend(format_tags(&tags));
    }

    lines
}

fn format_tags(tags: &[TagCount]) -> Vec<String> {
    tags.iter()
        .map(|t| format!("{}{} ({})", indent(1), t.name, t.count))
        .collect()
}

/// Format both collections, separated by a blank line.
pub fn format_scan_output(site: &Site) -> Vec<String> {
    let mut lines = format_collection(site.posts());
    lines.push(String::new());
    lines.extend(format_collection(site.projects()));
    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(site: &Site) {
    for line in format_scan_output(site) {
        println!("{}", line);
    }
}

// ============================================================================
// Show output
// ============================================================================

/// Format a single document with its outline.
///
/// Level-1 headings are the title and are left out of the outline section.
pub fn format_document(view: &DocumentView<'_>) -> Vec<String> {
    let doc = view.document;
    let mut lines = vec![if doc.draft {
        format!("{} [draft]", doc.title)
    } else {
        doc.title.clone()
    }];
    lines.extend(document_context(doc, 1));
    if !doc.excerpt.is_empty() {
        lines.push(format!("{}Excerpt: {}", indent(1), truncate_desc(&doc.excerpt, 80)));
    }
    if !doc.contributors.is_empty() {
        let names: Vec<&str> = doc.contributors.iter().map(|c| c.name.as_str()).collect();
        lines.push(format!("{}Contributors: {}", indent(1), names.join(", ")));
    }

    let nav: Vec<_> = view.navigation().collect();
    if !nav.is_empty() {
        lines.push(String::new());
        lines.push("Outline".to_string());
        for node in nav {
            let depth = usize::from(node.level.saturating_sub(1));
            lines.push(format!("{}{} #{}", indent(depth), node.text, node.slug));
        }
    }
    lines
}

/// Print a single document to stdout.
pub fn print_document(view: &DocumentView<'_>) {
    for line in format_document(view) {
        println!("{}", line);
    }
}

// ============================================================================
// Paths output
// ============================================================================

/// One `category/slug` route per line.
pub fn format_paths(paths: &[(String, String)]) -> Vec<String> {
    paths
        .iter()
        .map(|(category, slug)| format!("{category}/{slug}"))
        .collect()
}

/// Print routes to stdout.
pub fn print_paths(paths: &[(String, String)]) {
    for line in format_paths(paths) {
        println!("{}", line);
    }
}

// ============================================================================
// Related output
// ============================================================================

/// Format the ranked related documents for `source`.
pub fn format_related(source: &ContentDocument, related: &[ScoredDocument<'_>]) -> Vec<String> {
    let mut lines = vec![format!("Related to {}", source.title)];
    if related.is_empty() {
        lines.push(format!("{}(nothing related)", indent(1)));
    }
    for (i, scored) in related.iter().enumerate() {
        let doc = scored.document;
        lines.push(format!(
            "{} {} (score {}) → {}/{}/{}",
            format_index(i + 1),
            doc.title,
            scored.score,
            doc.collection,
            doc.category,
            doc.slug
        ));
    }
    lines
}

/// Print related documents to stdout.
pub fn print_related(source: &ContentDocument, related: &[ScoredDocument<'_>]) {
    for line in format_related(source, related) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format document counts and every problem met while building.
pub fn format_check_output(site: &Site) -> Vec<String> {
    let mut lines = vec![
        format!("Posts: {}", plural(site.posts().len(), "document")),
        format!("Projects: {}", plural(site.projects().len(), "document")),
    ];
    lines.extend(format_report(&site.report()));
    lines
}

fn format_report(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();
    for warning in &report.warnings {
        lines.push(format!("Warning: {warning}"));
    }
    for skipped in &report.skipped {
        lines.push(format!("Skipped: {}", skipped.path.display()));
        lines.push(format!("{}{}", indent(1), skipped.reason));
    }
    lines
}

/// Print check output to stdout.
pub fn print_check_output(site: &Site) {
    for line in format_check_output(site) {
        println!("{}", line);
    }
}
