//! Front matter parsing.
//!
//! A document is a YAML block fenced by `---` lines followed by a markdown
//! body:
//!
//! ```text
//! ---
//! title: Intro
//! tags: [Rust, Go]
//! author:
//!   name: Ada Lovelace
//!   github: ada
//! ---
//! Body text...
//! ```
//!
//! Parsing happens in two steps. The block must be syntactically valid YAML
//! and a mapping, otherwise the whole file is rejected with a
//! [`ParseError`]. Each recognized key is then coerced into [`Frontmatter`]
//! on its own: a key holding the wrong shape (a list where a string was
//! expected, an unparseable date) is dropped with a debug log instead of
//! failing the document. Unrecognized keys are ignored so content can carry
//! fields for other tools.
//!
//! A file without an opening fence has no front matter; its whole text is
//! the body.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::debug;

use crate::types::AuthorIdentity;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("front matter opened with `---` but never closed")]
    Unterminated,
    #[error("invalid YAML in front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("front matter must be a key/value mapping, found {0}")]
    NotAMapping(&'static str),
}

/// A declared author: either a bare name or a structured identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorField {
    Name(String),
    Identity(AuthorIdentity),
}

/// A declared last-modified value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifiedField {
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl ModifiedField {
    /// Full timestamp; date-only values land on midnight UTC.
    pub fn to_timestamp(self) -> DateTime<Utc> {
        match self {
            ModifiedField::Date(date) => date.and_time(NaiveTime::MIN).and_utc(),
            ModifiedField::Timestamp(ts) => ts,
        }
    }
}

/// Recognized front matter fields, already coerced to their types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub last_modified: Option<ModifiedField>,
    pub draft: Option<bool>,
    pub tags: Vec<String>,
    pub technologies: Vec<String>,
    pub excerpt: Option<String>,
    pub image: Option<String>,
    pub image_alt: Option<String>,
    pub image_caption: Option<String>,
    pub author: Option<AuthorField>,
    pub contributors: Vec<AuthorField>,
}

const FENCE: &str = "---";

/// Split raw file text into typed front matter and the body.
pub fn parse_document(raw: &str) -> Result<(Frontmatter, String), ParseError> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let Some((block, body)) = split_fences(raw)? else {
        return Ok((Frontmatter::default(), raw.to_string()));
    };

    let value: Value = if block.trim().is_empty() {
        Value::Mapping(Mapping::new())
    } else {
        serde_yaml::from_str(block)?
    };
    let mapping = match value {
        Value::Mapping(m) => m,
        Value::Null => Mapping::new(),
        other => return Err(ParseError::NotAMapping(kind_name(&other))),
    };

    Ok((Frontmatter::from_mapping(&mapping), body.to_string()))
}

/// Locate the fenced block. `Ok(None)` when the text has no opening fence.
fn split_fences(raw: &str) -> Result<Option<(&str, &str)>, ParseError> {
    let mut lines = raw.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(None);
    };
    if first.trim_end() != FENCE {
        return Ok(None);
    }

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        if line.trim_end() == FENCE {
            let block = &raw[block_start..offset];
            let body = &raw[offset + line.len()..];
            return Ok(Some((block, body)));
        }
        offset += line.len();
    }
    Err(ParseError::Unterminated)
}

impl Frontmatter {
    /// Coerce recognized keys out of a raw YAML mapping.
    pub fn from_mapping(mapping: &Mapping) -> Self {
        let mut fm = Frontmatter::default();
        for (key, value) in mapping {
            let Some(key) = key.as_str() else {
                continue;
            };
            let applied = match key {
                "title" => set(&mut fm.title, non_empty_string(value)),
                "date" => set(&mut fm.date, parse_date_value(value)),
                "lastModified" | "last_modified" => {
                    set(&mut fm.last_modified, parse_modified_value(value))
                }
                "draft" => set(&mut fm.draft, parse_bool(value)),
                "tags" => set_list(&mut fm.tags, string_list(value)),
                "technologies" => set_list(&mut fm.technologies, string_list(value)),
                "excerpt" => set(&mut fm.excerpt, non_empty_string(value)),
                "image" => set(&mut fm.image, non_empty_string(value)),
                "imageAlt" | "image_alt" => set(&mut fm.image_alt, non_empty_string(value)),
                "imageCaption" | "image_caption" => {
                    set(&mut fm.image_caption, non_empty_string(value))
                }
                "author" => set(&mut fm.author, parse_author(value)),
                "contributors" => set_list(&mut fm.contributors, parse_contributors(value)),
                _ => true,
            };
            if !applied && !value.is_null() {
                debug!(key, value = ?value, "ignoring malformed front matter field");
            }
        }
        fm
    }
}

fn set<T>(slot: &mut Option<T>, value: Option<T>) -> bool {
    let ok = value.is_some();
    if ok {
        *slot = value;
    }
    ok
}

fn set_list<T>(slot: &mut Vec<T>, value: Option<Vec<T>>) -> bool {
    match value {
        Some(items) => {
            *slot = items;
            true
        }
        None => false,
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Scalars rendered as text. Lists and mappings are not strings.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_empty_string(value: &Value) -> Option<String> {
    scalar_string(value)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes") => {
            Some(true)
        }
        Value::String(s) if s.eq_ignore_ascii_case("false") || s.eq_ignore_ascii_case("no") => {
            Some(false)
        }
        _ => None,
    }
}

/// A list of strings; a single scalar or a comma-separated string is
/// accepted as a one-or-more element list.
fn string_list(value: &Value) -> Option<Vec<String>> {
    let items: Vec<String> = match value {
        Value::Sequence(seq) => seq.iter().filter_map(non_empty_string).collect(),
        Value::String(s) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        Value::Number(_) | Value::Bool(_) => vec![scalar_string(value)?],
        _ => return None,
    };
    Some(items)
}

/// Calendar date from `YYYY-MM-DD` or any full timestamp form.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    // Keep the calendar day the author wrote, not the UTC one
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    parse_timestamp(raw).map(|ts| ts.date_naive())
}

/// Timestamp from RFC 3339 or a zone-less `YYYY-MM-DD[T ]HH:MM[:SS]`
/// (read as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_date_value(value: &Value) -> Option<NaiveDate> {
    value.as_str().and_then(parse_date)
}

fn parse_modified_value(value: &Value) -> Option<ModifiedField> {
    let raw = value.as_str()?.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(ModifiedField::Date(date));
    }
    parse_timestamp(raw).map(ModifiedField::Timestamp)
}

fn parse_author(value: &Value) -> Option<AuthorField> {
    match value {
        Value::Mapping(mapping) => identity_from_mapping(mapping).map(AuthorField::Identity),
        _ => non_empty_string(value).map(AuthorField::Name),
    }
}

/// Pick the identity keys out of an author mapping. Other keys are ignored,
/// like unrecognized top-level keys; a mapping without a name is no author.
fn identity_from_mapping(mapping: &Mapping) -> Option<AuthorIdentity> {
    let mut identity = AuthorIdentity::named(String::new());
    for (key, value) in mapping {
        let Some(key) = key.as_str() else {
            continue;
        };
        match key {
            "name" => identity.name = non_empty_string(value).unwrap_or_default(),
            "avatarUrl" | "avatar_url" | "avatar" => identity.avatar_url = non_empty_string(value),
            "bio" => identity.bio = non_empty_string(value),
            "github" | "githubHandle" | "github_handle" => identity.github = non_empty_string(value),
            _ => {}
        }
    }
    (!identity.name.is_empty()).then_some(identity)
}

fn parse_contributors(value: &Value) -> Option<Vec<AuthorField>> {
    match value {
        Value::Sequence(seq) => Some(
            seq.iter()
                .filter_map(|item| {
                    let parsed = parse_author(item);
                    if parsed.is_none() {
                        debug!(value = ?item, "ignoring malformed contributor");
                    }
                    parsed
                })
                .collect(),
        ),
        single => parse_author(single).map(|a| vec![a]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // =========================================================================
    // Fence splitting
    // =========================================================================

    #[test]
    fn splits_front_matter_and_body() {
        let raw = "---\ntitle: Intro\n---\n# Heading\n\nBody.\n";
        let (fm, body) = parse_document(raw).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Intro"));
        assert_eq!(body, "# Heading\n\nBody.\n");
    }

    #[test]
    fn no_front_matter_means_whole_text_is_body() {
        let raw = "# Just markdown\n\nNo metadata here.";
        let (fm, body) = parse_document(raw).unwrap();
        assert_eq!(fm, Frontmatter::default());
        assert_eq!(body, raw);
    }

    #[test]
    fn empty_front_matter_block() {
        let (fm, body) = parse_document("---\n---\nBody").unwrap();
        assert_eq!(fm, Frontmatter::default());
        assert_eq!(body, "Body");
    }

    #[test]
    fn crlf_line_endings() {
        let raw = "---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        let (fm, body) = parse_document(raw).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Windows"));
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn leading_bom_is_ignored() {
        let (fm, _) = parse_document("\u{feff}---\ntitle: Bom\n---\n").unwrap();
        assert_eq!(fm.title.as_deref(), Some("Bom"));
    }

    #[test]
    fn horizontal_rule_in_body_is_not_a_fence() {
        let raw = "---\ntitle: Rules\n---\nabove\n\n---\n\nbelow\n";
        let (_, body) = parse_document(raw).unwrap();
        assert_eq!(body, "above\n\n---\n\nbelow\n");
    }

    #[test]
    fn unterminated_block_is_error() {
        let result = parse_document("---\ntitle: Oops\nbody without closing fence");
        assert!(matches!(result, Err(ParseError::Unterminated)));
    }

    #[test]
    fn invalid_yaml_is_error() {
        let result = parse_document("---\ntitle: [unclosed\n---\nbody");
        assert!(matches!(result, Err(ParseError::Yaml(_))));
    }

    #[test]
    fn non_mapping_block_is_error() {
        let result = parse_document("---\n- a\n- b\n---\nbody");
        assert!(matches!(result, Err(ParseError::NotAMapping("a list"))));
    }

    // =========================================================================
    // Field coercion
    // =========================================================================

    #[test]
    fn recognized_fields_are_typed() {
        let raw = r#"---
title: "Intro"
date: 2024-03-01
lastModified: 2024-04-02T10:30:00Z
draft: true
tags: [Rust, Go]
technologies: [tokio]
excerpt: A short intro.
image: /img/cover.png
imageAlt: Cover
imageCaption: Taken at dawn
---
Body
"#;
        let (fm, _) = parse_document(raw).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Intro"));
        assert_eq!(fm.date, Some(date(2024, 3, 1)));
        assert_eq!(
            fm.last_modified,
            Some(ModifiedField::Timestamp(
                "2024-04-02T10:30:00Z".parse::<DateTime<Utc>>().unwrap()
            ))
        );
        assert_eq!(fm.draft, Some(true));
        assert_eq!(fm.tags, vec!["Rust", "Go"]);
        assert_eq!(fm.technologies, vec!["tokio"]);
        assert_eq!(fm.excerpt.as_deref(), Some("A short intro."));
        assert_eq!(fm.image.as_deref(), Some("/img/cover.png"));
        assert_eq!(fm.image_alt.as_deref(), Some("Cover"));
        assert_eq!(fm.image_caption.as_deref(), Some("Taken at dawn"));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let (fm, _) = parse_document("---\ntitle: A\nlayout: wide\nseries: 3\n---\n").unwrap();
        assert_eq!(fm.title.as_deref(), Some("A"));
    }

    #[test]
    fn malformed_field_is_dropped_not_fatal() {
        let raw = "---\ntitle: Fine\ndate: someday\ndraft: maybe\ntags: {a: b}\n---\n";
        let (fm, _) = parse_document(raw).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Fine"));
        assert_eq!(fm.date, None);
        assert_eq!(fm.draft, None);
        assert!(fm.tags.is_empty());
    }

    #[test]
    fn date_with_time_is_truncated_to_calendar_date() {
        let (fm, _) = parse_document("---\ndate: 2023-12-31T23:00:00Z\n---\n").unwrap();
        assert_eq!(fm.date, Some(date(2023, 12, 31)));
    }

    #[test]
    fn date_only_last_modified() {
        let (fm, _) = parse_document("---\nlastModified: 2024-05-06\n---\n").unwrap();
        let modified = fm.last_modified.unwrap();
        assert_eq!(modified, ModifiedField::Date(date(2024, 5, 6)));
        assert_eq!(
            modified.to_timestamp(),
            "2024-05-06T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn comma_separated_tags() {
        let (fm, _) = parse_document("---\ntags: rust, wasm ,\n---\n").unwrap();
        assert_eq!(fm.tags, vec!["rust", "wasm"]);
    }

    #[test]
    fn numeric_tags_become_strings() {
        let (fm, _) = parse_document("---\ntags: [2024, rust]\n---\n").unwrap();
        assert_eq!(fm.tags, vec!["2024", "rust"]);
    }

    #[test]
    fn blank_title_is_absent() {
        let (fm, _) = parse_document("---\ntitle: \"   \"\n---\n").unwrap();
        assert_eq!(fm.title, None);
    }

    // =========================================================================
    // Authors
    // =========================================================================

    #[test]
    fn bare_string_author() {
        let (fm, _) = parse_document("---\nauthor: Ada Lovelace\n---\n").unwrap();
        assert_eq!(fm.author, Some(AuthorField::Name("Ada Lovelace".into())));
    }

    #[test]
    fn structured_author() {
        let raw = "---\nauthor:\n  name: Ada\n  avatar_url: /ada.png\n  github: ada\n---\n";
        let (fm, _) = parse_document(raw).unwrap();
        assert_eq!(
            fm.author,
            Some(AuthorField::Identity(AuthorIdentity {
                name: "Ada".into(),
                avatar_url: Some("/ada.png".into()),
                bio: None,
                github: Some("ada".into()),
            }))
        );
    }

    #[test]
    fn structured_author_without_name_is_dropped() {
        let (fm, _) = parse_document("---\nauthor:\n  github: ada\n---\n").unwrap();
        assert_eq!(fm.author, None);
    }

    #[test]
    fn structured_author_keeps_identity_despite_extra_keys() {
        let raw = "---\nauthor:\n  name: Ada Lovelace\n  twitter: ada\n  avatarUrl: /ada.png\n---\nBody\n";
        let (fm, _) = parse_document(raw).unwrap();
        assert_eq!(
            fm.author,
            Some(AuthorField::Identity(AuthorIdentity {
                name: "Ada Lovelace".into(),
                avatar_url: Some("/ada.png".into()),
                bio: None,
                github: None,
            }))
        );
    }

    #[test]
    fn contributor_with_extra_keys_is_kept() {
        let raw = "---\ncontributors:\n  - name: Grace\n    url: https://grace.example\n    githubHandle: grace\n---\n";
        let (fm, _) = parse_document(raw).unwrap();
        assert_eq!(fm.contributors.len(), 1);
        assert!(matches!(
            &fm.contributors[0],
            AuthorField::Identity(id) if id.name == "Grace" && id.github.as_deref() == Some("grace")
        ));
    }

    #[test]
    fn mixed_contributors() {
        let raw = "---\ncontributors:\n  - Grace\n  - name: Linus\n    github: torvalds\n  - [nested]\n---\n";
        let (fm, _) = parse_document(raw).unwrap();
        assert_eq!(fm.contributors.len(), 2);
        assert_eq!(fm.contributors[0], AuthorField::Name("Grace".into()));
        assert!(matches!(
            &fm.contributors[1],
            AuthorField::Identity(id) if id.github.as_deref() == Some("torvalds")
        ));
    }

    // =========================================================================
    // Date helpers
    // =========================================================================

    #[test]
    fn parse_date_forms() {
        assert_eq!(parse_date("2024-03-01"), Some(date(2024, 3, 1)));
        assert_eq!(parse_date("2024-03-01T08:00:00+09:00"), Some(date(2024, 3, 1)));
        assert_eq!(parse_date("2024-03-01 12:00"), Some(date(2024, 3, 1)));
        assert_eq!(parse_date("March 1st"), None);
        assert_eq!(parse_date("2024-02-30"), None);
    }
}
