//! Metadata normalization.
//!
//! Turns coerced [`Frontmatter`] into a complete [`DocumentHeader`]: every
//! field the rendering layer relies on is present and typed, whether the
//! author declared it or not.
//!
//! ## Resolution priority
//!
//! Each field is resolved independently through an ordered chain. The first
//! source that yields a value wins; later sources are never consulted, so git
//! is only asked when the front matter is silent.
//!
//! - **Publish date**: `date` → last commit date → build date
//! - **Last modified**: `lastModified` → last commit timestamp, only when its
//!   date differs from the publish date → none
//! - **Author**: structured `author` → bare `author` name → last commit
//!   author → configured default identity
//! - **Title**: `title` → first level-1 heading of the body → slug with dashes
//!   turned into spaces
//! - **Excerpt**: `excerpt` → opening characters of the body
//!
//! Bare author names (declared or from git) that match an entry of the
//! configured author registry pick up that entry's avatar, bio and handle.
//! Structured authors are taken as written.
//!
//! Contributors come from the front matter only; git history is not mined
//! for them.

use crate::config::FolioConfig;
use crate::frontmatter::{AuthorField, Frontmatter};
use crate::history::HistoryOracle;
use crate::outline::{OutlineOptions, build_outline};
use crate::types::AuthorIdentity;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use std::path::Path;

/// Everything normalization needs besides the document itself.
pub struct NormalizeContext<'a> {
    pub history: &'a dyn HistoryOracle,
    /// Calendar date used when nothing else dates a document
    pub today: NaiveDate,
    pub config: &'a FolioConfig,
}

/// Fully resolved document metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentHeader {
    pub title: String,
    pub publish_date: NaiveDate,
    pub last_modified: Option<DateTime<Utc>>,
    pub draft: bool,
    pub tags: Vec<String>,
    pub technologies: Vec<String>,
    pub excerpt: String,
    pub image: Option<String>,
    pub image_alt: Option<String>,
    pub image_caption: Option<String>,
    pub reading_time_minutes: u32,
    pub author: AuthorIdentity,
    pub contributors: Vec<AuthorIdentity>,
}

/// A lazily evaluated source in a priority chain.
pub type Resolver<'a, T> = &'a dyn Fn() -> Option<T>;

/// Try each resolver in order and return the first value produced.
///
/// ```text
/// publish date: resolve_first(&[&declared_date, &git_commit_date])
/// author:       resolve_first(&[&structured, &bare_name, &git_author])
/// ```
pub fn resolve_first<T>(chain: &[Resolver<'_, T>]) -> Option<T> {
    chain.iter().find_map(|resolver| resolver())
}

/// Build the complete header for one document.
pub fn normalize(
    fm: &Frontmatter,
    path: &Path,
    body: &str,
    ctx: &NormalizeContext<'_>,
) -> DocumentHeader {
    let publish_date = resolve_publish_date(fm, path, ctx);
    let last_modified = resolve_last_modified(fm, path, publish_date, ctx);

    DocumentHeader {
        title: resolve_title(fm, path, body),
        publish_date,
        last_modified,
        draft: fm.draft.unwrap_or(false),
        tags: dedupe_case_insensitive(&fm.tags),
        technologies: dedupe_case_insensitive(&fm.technologies),
        excerpt: fm
            .excerpt
            .clone()
            .unwrap_or_else(|| derive_excerpt(body, ctx.config.excerpt.max_chars)),
        image: fm.image.clone(),
        image_alt: fm.image_alt.clone(),
        image_caption: fm.image_caption.clone(),
        reading_time_minutes: reading_time(body, ctx.config.reading.words_per_minute),
        author: resolve_author(fm, path, ctx),
        contributors: fm
            .contributors
            .iter()
            .map(|c| identity_from_field(c, ctx.config))
            .collect(),
    }
}

pub fn resolve_publish_date(fm: &Frontmatter, path: &Path, ctx: &NormalizeContext<'_>) -> NaiveDate {
    let declared = || fm.date;
    let from_history = || ctx.history.last_commit_date(path);
    resolve_first(&[&declared, &from_history]).unwrap_or(ctx.today)
}

pub fn resolve_last_modified(
    fm: &Frontmatter,
    path: &Path,
    publish_date: NaiveDate,
    ctx: &NormalizeContext<'_>,
) -> Option<DateTime<Utc>> {
    let declared = || fm.last_modified.map(|m| m.to_timestamp());
    // An untouched file's last commit is its publish commit; no marker then
    let from_history = || {
        ctx.history
            .last_commit_timestamp(path)
            .filter(|ts| ts.date_naive() != publish_date)
            .map(|ts| ts.with_timezone(&Utc))
    };
    resolve_first(&[&declared, &from_history])
}

pub fn resolve_author(fm: &Frontmatter, path: &Path, ctx: &NormalizeContext<'_>) -> AuthorIdentity {
    let structured = || match &fm.author {
        Some(AuthorField::Identity(identity)) => Some(identity.clone()),
        _ => None,
    };
    let bare_name = || match &fm.author {
        Some(AuthorField::Name(name)) => Some(enrich(name, ctx.config)),
        _ => None,
    };
    let from_history = || {
        ctx.history
            .last_commit_author(path)
            .filter(|name| !name.trim().is_empty())
            .map(|name| enrich(&name, ctx.config))
    };
    resolve_first(&[&structured, &bare_name, &from_history])
        .unwrap_or_else(|| ctx.config.default_author.clone())
}

fn identity_from_field(field: &AuthorField, config: &FolioConfig) -> AuthorIdentity {
    match field {
        AuthorField::Identity(identity) => identity.clone(),
        AuthorField::Name(name) => enrich(name, config),
    }
}

/// Registry entry for `name`, or an identity carrying just the name.
fn enrich(name: &str, config: &FolioConfig) -> AuthorIdentity {
    config
        .find_author(name)
        .cloned()
        .unwrap_or_else(|| AuthorIdentity::named(name.trim()))
}

fn resolve_title(fm: &Frontmatter, path: &Path, body: &str) -> String {
    let declared = || fm.title.clone();
    let first_heading = || {
        let top_level = OutlineOptions {
            max_level: 1,
            dedupe_slugs: false,
        };
        build_outline(body, &top_level)
            .into_iter()
            .next()
            .map(|node| node.text)
    };
    let from_slug = || {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().replace('-', " "))
    };
    resolve_first(&[&declared, &first_heading, &from_slug]).unwrap_or_default()
}

/// Minutes to read `body`, rounded up, never less than one.
pub fn reading_time(body: &str, words_per_minute: u32) -> u32 {
    let words = body.split_whitespace().count() as u64;
    let wpm = u64::from(words_per_minute.max(1));
    let minutes = words.div_ceil(wpm).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// Opening `max_chars` characters of the body on one line.
///
/// `...` is appended only when the body was cut short.
pub fn derive_excerpt(body: &str, max_chars: usize) -> String {
    let body = body.trim();
    let truncated = body.chars().count() > max_chars;
    let head: String = body
        .chars()
        .take(max_chars)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    let head = head.trim_end();
    if truncated {
        format!("{head}...")
    } else {
        head.to_string()
    }
}

/// Keep the first spelling of each value, compared case-insensitively.
fn dedupe_case_insensitive(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .filter(|v| seen.insert(v.to_lowercase()))
        .cloned()
        .collect()
}
