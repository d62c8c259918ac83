//! Article aggregation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use quill_core::error::Result;
use quill_core::traits::RemoteArticleSource;
use quill_core::types::Article;
use quill_core::visibility::VisibilityPolicy;
use quill_registry::ArticleRegistry;

/// Sorts ascending by publication time, then reverses.
///
/// The sort is stable, so equal timestamps come out in the reverse of their
/// input order.
pub fn sort_most_recent_first(articles: &mut [Article]) {
    articles.sort_by_key(|a| a.published_at);
    articles.reverse();
}

/// Merges catalog and remote articles into one listing.
///
/// Catalog entries pass through the visibility gate. Remote entries do not;
/// the events service's own `type=blog` filter decides what is published.
pub struct Aggregator {
    registry: Arc<ArticleRegistry>,
    remote: Option<Arc<dyn RemoteArticleSource>>,
    policy: VisibilityPolicy,
}

impl Aggregator {
    /// Creates an aggregator over the catalog only.
    pub fn new(registry: Arc<ArticleRegistry>, policy: VisibilityPolicy) -> Self {
        Self {
            registry,
            remote: None,
            policy,
        }
    }

    /// Adds a remote article source.
    pub fn with_remote(mut self, remote: Arc<dyn RemoteArticleSource>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Returns the visibility policy.
    pub fn policy(&self) -> VisibilityPolicy {
        self.policy
    }

    /// Returns the underlying registry.
    pub fn registry(&self) -> &Arc<ArticleRegistry> {
        &self.registry
    }

    /// Returns true if a remote source is attached.
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Lists every visible article, most recent first.
    ///
    /// `now` is used for both gating and the remote cache so one request sees
    /// one consistent instant.
    ///
    /// # Errors
    ///
    /// Only a remote failure under the strict policy.
    #[instrument(skip(self))]
    pub async fn list_articles(&self, now: DateTime<Utc>) -> Result<Vec<Article>> {
        let mut articles = self.visible_local(now);
        let local = articles.len();

        if let Some(remote) = &self.remote {
            articles.extend(remote.fetch_remote_articles(now).await?);
        }

        sort_most_recent_first(&mut articles);

        debug!(local, remote = articles.len() - local, "Aggregated articles");
        Ok(articles)
    }

    /// Lists visible catalog articles only, most recent first.
    pub fn list_local_articles(&self, now: DateTime<Utc>) -> Vec<Article> {
        let mut articles = self.visible_local(now);
        sort_most_recent_first(&mut articles);
        articles
    }

    /// Looks up a catalog article by route, without gating.
    ///
    /// Gating for direct fetches happens in the response builder, which turns
    /// an invisible article into a 404.
    pub fn find(&self, route: &str) -> Option<Article> {
        self.registry.lookup(route)
    }

    fn visible_local(&self, now: DateTime<Utc>) -> Vec<Article> {
        self.registry
            .all_articles()
            .into_iter()
            .filter(|a| self.policy.is_visible(a, now))
            .collect()
    }
}
