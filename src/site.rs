//! Pipeline entry point: both collections built from one configuration.

use crate::config::FolioConfig;
use crate::history::{GitHistory, HistoryOracle, NoHistory};
use crate::normalize::NormalizeContext;
use crate::related::{Direction, ScoredDocument, related};
use crate::repository::{BuildReport, ContentRepository};
use crate::types::{CollectionKind, ContentDocument};
use chrono::{NaiveDate, Utc};
use tracing::info;

/// Posts and projects, built in one pass.
#[derive(Debug, Clone)]
pub struct Site {
    posts: ContentRepository,
    projects: ContentRepository,
    related_limit: usize,
}

impl Site {
    /// Build both collections, consulting git when history is enabled.
    ///
    /// "Today" is the current UTC date.
    pub fn load(config: &FolioConfig) -> Self {
        let today = Utc::now().date_naive();
        if config.history.enabled {
            let git = GitHistory::new(config.history.timeout());
            Self::load_with(config, &git, today)
        } else {
            info!("version-control fallback disabled");
            Self::load_with(config, &NoHistory, today)
        }
    }

    /// Build with an explicit history oracle and build date.
    pub fn load_with(config: &FolioConfig, history: &dyn HistoryOracle, today: NaiveDate) -> Self {
        let ctx = NormalizeContext {
            history,
            today,
            config,
        };
        Self {
            posts: ContentRepository::build(CollectionKind::Posts, &config.content.posts, &ctx),
            projects: ContentRepository::build(
                CollectionKind::Projects,
                &config.content.projects,
                &ctx,
            ),
            related_limit: config.related.limit,
        }
    }

    pub fn posts(&self) -> &ContentRepository {
        &self.posts
    }

    pub fn projects(&self) -> &ContentRepository {
        &self.projects
    }

    pub fn collection(&self, kind: CollectionKind) -> &ContentRepository {
        match kind {
            CollectionKind::Posts => &self.posts,
            CollectionKind::Projects => &self.projects,
        }
    }

    /// Published documents from the other collection related to `source`.
    ///
    /// `limit` defaults to the configured `related.limit`.
    pub fn related_to(
        &self,
        source: &ContentDocument,
        limit: Option<usize>,
    ) -> Vec<ScoredDocument<'_>> {
        let targets = self.collection(source.collection.opposite());
        related(
            source,
            targets.published(),
            Direction::from_source(source.collection),
            limit.unwrap_or(self.related_limit),
        )
    }

    /// Problems from both collections combined.
    pub fn report(&self) -> BuildReport {
        let mut report = self.posts.report().clone();
        report.extend(self.projects.report().clone());
        report
    }
}
