//! Cross-collection related content.
//!
//! Posts link to projects and projects link back to posts. Each candidate in
//! the other collection gets a weighted score:
//!
//! | Signal | Weight |
//! |--------|--------|
//! | Shared tag (case-insensitive) | +3 each |
//! | Category signal (see [`Direction`]) | +2 |
//! | Source technology mentioned in target body | +1 each |
//! | Source title mentioned in target body (project → posts only) | +5 |
//!
//! Candidates scoring zero are dropped even if that leaves fewer than the
//! requested number. Ties go to the more recently published target.
//!
//! Mentions are plain case-insensitive substring checks; no tokenization, so
//! a short title like "Go" matches inside "Google".

use crate::types::{CollectionKind, ContentDocument};
use serde::Serialize;
use std::collections::HashSet;

pub const TAG_WEIGHT: u32 = 3;
pub const CATEGORY_WEIGHT: u32 = 2;
pub const TECHNOLOGY_WEIGHT: u32 = 1;
pub const TITLE_MENTION_WEIGHT: u32 = 5;

/// Which way the scoring runs; the two directions weigh categories
/// differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// A post's category is matched against each project's tags.
    PostToProjects,
    /// Categories must be equal; targets mentioning the project title score
    /// extra.
    ProjectToPosts,
}

impl Direction {
    /// Direction for a source document from `kind`.
    pub fn from_source(kind: CollectionKind) -> Self {
        match kind {
            CollectionKind::Posts => Direction::PostToProjects,
            CollectionKind::Projects => Direction::ProjectToPosts,
        }
    }
}

/// A related document with its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument<'a> {
    pub score: u32,
    #[serde(flatten)]
    pub document: &'a ContentDocument,
}

/// Top `limit` targets related to `source`, best first.
pub fn related<'a, I>(
    source: &ContentDocument,
    targets: I,
    direction: Direction,
    limit: usize,
) -> Vec<ScoredDocument<'a>>
where
    I: IntoIterator<Item = &'a ContentDocument>,
{
    let signals = SourceSignals::new(source);
    let mut scored: Vec<ScoredDocument<'a>> = targets
        .into_iter()
        .map(|document| ScoredDocument {
            score: signals.score(document, direction),
            document,
        })
        .filter(|s| s.score > 0)
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.document.publish_date.cmp(&a.document.publish_date))
    });
    scored.truncate(limit);
    scored
}

/// Score a single target against `source`.
pub fn score(source: &ContentDocument, target: &ContentDocument, direction: Direction) -> u32 {
    SourceSignals::new(source).score(target, direction)
}

/// Source-side values, lowercased once per query.
struct SourceSignals {
    tags: HashSet<String>,
    category: String,
    technologies: Vec<String>,
    title: String,
}

impl SourceSignals {
    fn new(source: &ContentDocument) -> Self {
        Self {
            tags: source.tags.iter().map(|t| t.to_lowercase()).collect(),
            category: source.category.to_lowercase(),
            technologies: source
                .technologies
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            title: source.title.trim().to_lowercase(),
        }
    }

    fn score(&self, target: &ContentDocument, direction: Direction) -> u32 {
        let target_tags: HashSet<String> = target.tags.iter().map(|t| t.to_lowercase()).collect();
        let body = target.body.to_lowercase();

        let shared_tags = self.tags.intersection(&target_tags).count() as u32;
        let mut total = shared_tags * TAG_WEIGHT;

        let category_match = match direction {
            Direction::PostToProjects => target_tags.contains(&self.category),
            Direction::ProjectToPosts => target.category.to_lowercase() == self.category,
        };
        if category_match {
            total += CATEGORY_WEIGHT;
        }

        let mentioned = self
            .technologies
            .iter()
            .filter(|tech| body.contains(tech.as_str()))
            .count() as u32;
        total += mentioned * TECHNOLOGY_WEIGHT;

        if direction == Direction::ProjectToPosts
            && !self.title.is_empty()
            && body.contains(&self.title)
        {
            total += TITLE_MENTION_WEIGHT;
        }

        total
    }
}
