//! Pipeline configuration.
//!
//! Handles loading, validating, and overriding `folio.toml`. Stock defaults
//! are the base layer; the user file is merged on top, and a small set of
//! environment variables is applied last so CI and export builds can switch
//! the version-control fallback off without editing the file.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [content]
//! posts = "content/posts"        # Collection root for blog posts
//! projects = "content/projects"  # Collection root for project write-ups
//! extensions = ["md", "mdx", "markdown"]
//!
//! [history]
//! enabled = true                 # Fall back to git history for dates/authors
//! timeout_ms = 1500              # Per git invocation
//!
//! [reading]
//! words_per_minute = 200
//!
//! [excerpt]
//! max_chars = 160
//!
//! [outline]
//! max_level = 4                  # Deepest heading kept in the outline
//! dedupe_slugs = false           # Suffix repeated heading slugs with -1, -2, ...
//!
//! [related]
//! limit = 3
//!
//! [default_author]
//! name = "Anonymous"
//!
//! [[authors]]                    # Registry used to enrich bare author names
//! name = "Ada Lovelace"
//! github = "ada"
//! avatar_url = "https://github.com/ada.png"
//! ```
//!
//! ## Environment Overrides
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `FOLIO_DISABLE_GIT_FALLBACK` | `1`/`true` disables the git fallback |
//! | `FOLIO_GIT_TIMEOUT_MS` | Overrides `history.timeout_ms` |
//! | `FOLIO_EXPORT`, `CI` | `1`/`true` forces the git fallback off |
//!
//! Unknown keys are rejected to catch typos early.

use crate::types::AuthorIdentity;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Pipeline configuration loaded from `folio.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FolioConfig {
    /// Collection roots and recognized file extensions.
    pub content: ContentConfig,
    /// Version-control fallback settings.
    pub history: HistoryConfig,
    /// Reading-time estimate settings.
    pub reading: ReadingConfig,
    /// Derived excerpt settings.
    pub excerpt: ExcerptConfig,
    /// Table-of-contents settings.
    pub outline: OutlineConfig,
    /// Related-content settings.
    pub related: RelatedConfig,
    /// Identity used when nothing else names an author.
    pub default_author: AuthorIdentity,
    /// Known identities used to enrich bare author names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<AuthorIdentity>,
}

impl Default for AuthorIdentity {
    fn default() -> Self {
        AuthorIdentity::named("Anonymous")
    }
}

impl FolioConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reading.words_per_minute == 0 {
            return Err(ConfigError::Validation(
                "reading.words_per_minute must be positive".into(),
            ));
        }
        if self.excerpt.max_chars == 0 {
            return Err(ConfigError::Validation(
                "excerpt.max_chars must be positive".into(),
            ));
        }
        if !(1..=6).contains(&self.outline.max_level) {
            return Err(ConfigError::Validation(
                "outline.max_level must be 1-6".into(),
            ));
        }
        if self.history.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "history.timeout_ms must be positive".into(),
            ));
        }
        if self.default_author.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "default_author.name must not be empty".into(),
            ));
        }
        if self.content.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "content.extensions must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// Takes the lookup as a function so callers (and tests) decide where
    /// variables come from; the binary passes `std::env::var`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if lookup("FOLIO_DISABLE_GIT_FALLBACK").is_some_and(|v| is_truthy(&v)) {
            self.history.enabled = false;
        }
        if let Some(raw) = lookup("FOLIO_GIT_TIMEOUT_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => self.history.timeout_ms = ms,
                _ => warn!(value = %raw, "ignoring invalid FOLIO_GIT_TIMEOUT_MS"),
            }
        }
        let export_mode = ["FOLIO_EXPORT", "CI"]
            .iter()
            .any(|key| lookup(key).is_some_and(|v| is_truthy(&v)));
        if export_mode {
            self.history.enabled = false;
        }
    }

    /// Look up a registered author by display name or GitHub handle.
    pub fn find_author(&self, name: &str) -> Option<&AuthorIdentity> {
        let needle = name.trim();
        self.authors.iter().find(|author| {
            author.name.eq_ignore_ascii_case(needle)
                || author
                    .github
                    .as_deref()
                    .is_some_and(|handle| handle.eq_ignore_ascii_case(needle))
        })
    }
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Collection roots and recognized document extensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// Root directory of the blog post collection.
    pub posts: PathBuf,
    /// Root directory of the project collection.
    pub projects: PathBuf,
    /// File extensions treated as documents (case-insensitive, no dot).
    pub extensions: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            posts: PathBuf::from("content/posts"),
            projects: PathBuf::from("content/projects"),
            extensions: vec!["md".into(), "mdx".into(), "markdown".into()],
        }
    }
}

/// Version-control fallback settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Whether git history may fill in missing dates and authors.
    pub enabled: bool,
    /// Upper bound for each git invocation, in milliseconds.
    pub timeout_ms: u64,
}

impl HistoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 1500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadingConfig {
    pub words_per_minute: u32,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExcerptConfig {
    /// Characters of body text kept when no excerpt is declared.
    pub max_chars: usize,
}

impl Default for ExcerptConfig {
    fn default() -> Self {
        Self { max_chars: 160 }
    }
}

/// Table-of-contents settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutlineConfig {
    /// Deepest heading level included in the outline.
    pub max_level: u8,
    /// Suffix repeated heading slugs (`setup`, `setup-1`, ...).
    pub dedupe_slugs: bool,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            max_level: 4,
            dedupe_slugs: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelatedConfig {
    /// Maximum number of related documents returned.
    pub limit: usize,
}

impl Default for RelatedConfig {
    fn default() -> Self {
        Self { limit: 3 }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(FolioConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<FolioConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: FolioConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the file at `path`.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. Relative collection roots are resolved
/// against the config file's directory.
pub fn load_config(path: &Path) -> Result<FolioConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    let mut config = resolve_config(base, overlay)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        config.content.posts = dir.join(&config.content.posts);
        config.content.projects = dir.join(&config.content.projects);
    }
    Ok(config)
}

/// Returns a fully-commented stock `folio.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Relative paths are resolved against the directory holding this file.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Content collections
# ---------------------------------------------------------------------------
[content]
# One subdirectory per category, one file per document:
#   content/posts/rust/hello-world.md -> category "rust", slug "hello-world"
# Directories and files starting with "_" or "." are ignored.
posts = "content/posts"
projects = "content/projects"

# File extensions treated as documents.
extensions = ["md", "mdx", "markdown"]

# ---------------------------------------------------------------------------
# Version-control fallback
# ---------------------------------------------------------------------------
[history]
# Use git history for missing dates and authors.
# Also switched off by FOLIO_DISABLE_GIT_FALLBACK=1, FOLIO_EXPORT=1 or CI=true.
enabled = true

# Upper bound for each git invocation (FOLIO_GIT_TIMEOUT_MS overrides).
timeout_ms = 1500

# ---------------------------------------------------------------------------
# Derived metadata
# ---------------------------------------------------------------------------
[reading]
words_per_minute = 200

[excerpt]
# Characters of body text used when no excerpt is declared.
max_chars = 160

[outline]
# Deepest heading level kept in the table of contents.
max_level = 4

# Suffix repeated heading slugs with -1, -2, ... so anchors stay unique.
dedupe_slugs = false

[related]
# Maximum number of related documents returned.
limit = 3

# ---------------------------------------------------------------------------
# Authors
# ---------------------------------------------------------------------------
# Used when neither the front matter nor git names an author.
[default_author]
name = "Anonymous"

# Known identities. A bare author name matching an entry's name or GitHub
# handle picks up the entry's avatar, bio and handle.
# [[authors]]
# name = "Ada Lovelace"
# github = "ada"
# avatar_url = "https://github.com/ada.png"
# bio = "Writes about engines."
"##
}
