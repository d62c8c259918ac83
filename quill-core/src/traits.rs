//! Common traits for Quill.
//!
//! The aggregator only knows about remote articles through this seam, so the
//! cached HTTP adapter and in-memory fakes are interchangeable.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::Article;

// ═══════════════════════════════════════════════════════════════════════════════
// REMOTE SOURCE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for a source of externally published articles.
///
/// Implementations might use:
/// - The events service behind a TTL cache (production)
/// - A fixed list (tests, offline previews)
#[async_trait]
pub trait RemoteArticleSource: Send + Sync {
    /// Returns the remote articles as of `now`.
    ///
    /// Whether failures surface as `Err` or as an empty list is up to the
    /// implementation's failure policy.
    async fn fetch_remote_articles(&self, now: DateTime<Utc>) -> Result<Vec<Article>>;
}

/// A fixed list of remote articles, for tests and offline runs.
#[derive(Clone, Debug, Default)]
pub struct StaticRemoteSource {
    articles: Vec<Article>,
}

impl StaticRemoteSource {
    /// Creates a source that always returns `articles`.
    pub fn new(articles: Vec<Article>) -> Self {
        Self { articles }
    }
}

#[async_trait]
impl RemoteArticleSource for StaticRemoteSource {
    async fn fetch_remote_articles(&self, _now: DateTime<Utc>) -> Result<Vec<Article>> {
        Ok(self.articles.clone())
    }
}
