//! Cached remote article adapter.
//!
//! Wraps an [`EventSource`] in a [`TtlCache`] under a single fixed key. On a
//! refresh the events are normalized into articles; what happens when the
//! refresh fails depends on the [`FailurePolicy`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use quill_cache::TtlCache;
use quill_core::constants::{
    MAX_REMOTE_ARTICLES_TTL_SECONDS, REMOTE_ARTICLES_CACHE_KEY, REMOTE_ARTICLES_TTL_SECONDS,
    REMOTE_TIMEOUT_SECONDS,
};
use quill_core::error::{QuillError, Result};
use quill_core::traits::RemoteArticleSource;
use quill_core::types::Article;

use crate::events::{EventSource, EventsClient, EventsConfig, RemoteEvent};

/// What a failed refresh does to the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Failures become an empty list, cached like any other result
    #[default]
    Isolated,
    /// Failures propagate and nothing is cached
    Strict,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Isolated => write!(f, "isolated"),
            FailurePolicy::Strict => write!(f, "strict"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = QuillError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "isolated" => Ok(FailurePolicy::Isolated),
            "strict" => Ok(FailurePolicy::Strict),
            other => Err(QuillError::Config(format!(
                "unknown remote failure policy '{}', expected 'isolated' or 'strict'",
                other
            ))),
        }
    }
}

/// Remote source configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the events service
    pub base_url: String,
    /// How long a fetched list stays fresh
    pub ttl_seconds: i64,
    /// HTTP timeout in seconds
    pub timeout_seconds: u64,
    /// Failure handling
    pub failure_policy: FailurePolicy,
}

impl RemoteConfig {
    /// Creates a config with default TTL, timeout, and isolated failures.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ttl_seconds: REMOTE_ARTICLES_TTL_SECONDS,
            timeout_seconds: REMOTE_TIMEOUT_SECONDS,
            failure_policy: FailurePolicy::default(),
        }
    }

    /// Sets the failure policy.
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

/// Checks a TTL in seconds and converts it.
///
/// # Errors
///
/// `Config` unless `1 <= ttl_seconds <= MAX_REMOTE_ARTICLES_TTL_SECONDS`.
pub fn validate_ttl(ttl_seconds: i64) -> Result<Duration> {
    if !(1..=MAX_REMOTE_ARTICLES_TTL_SECONDS).contains(&ttl_seconds) {
        return Err(QuillError::Config(format!(
            "remote TTL must be between 1 and {} seconds, got {}",
            MAX_REMOTE_ARTICLES_TTL_SECONDS, ttl_seconds
        )));
    }
    Duration::try_seconds(ttl_seconds)
        .ok_or_else(|| QuillError::Config(format!("remote TTL {} is out of range", ttl_seconds)))
}

/// Remote articles behind a TTL cache.
pub struct RemoteArticles {
    source: Arc<dyn EventSource>,
    cache: TtlCache<Vec<Article>>,
    ttl: Duration,
    failure_policy: FailurePolicy,
}

impl RemoteArticles {
    /// Creates an adapter over any event source.
    ///
    /// # Errors
    ///
    /// `Config` if the TTL is out of range, see [`validate_ttl`].
    pub fn new(source: Arc<dyn EventSource>, ttl_seconds: i64, failure_policy: FailurePolicy) -> Result<Self> {
        Ok(Self {
            source,
            cache: TtlCache::new(),
            ttl: validate_ttl(ttl_seconds)?,
            failure_policy,
        })
    }

    /// Creates an adapter talking HTTP to the configured events service.
    pub fn from_config(config: RemoteConfig) -> Result<Self> {
        let events = EventsConfig::new(config.base_url)
            .with_timeout(StdDuration::from_secs(config.timeout_seconds));
        let client = EventsClient::with_config(events)?;
        Self::new(Arc::new(client), config.ttl_seconds, config.failure_policy)
    }

    /// Returns the configured failure policy.
    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Returns the remote articles, refreshing when the cached list expired.
    ///
    /// A refresh caches the new list until `now + ttl`.
    #[instrument(skip(self), fields(policy = %self.failure_policy))]
    pub async fn fetch_remote_articles(&self, now: DateTime<Utc>) -> Result<Vec<Article>> {
        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(|| {
            QuillError::Config(format!("cache expiry overflows at {}", now))
        })?;

        match self.failure_policy {
            FailurePolicy::Isolated => Ok(self
                .cache
                .get_at(REMOTE_ARTICLES_CACHE_KEY, now, expires_at, || self.refresh_isolated())
                .await),
            FailurePolicy::Strict => {
                self.cache
                    .try_get_at(REMOTE_ARTICLES_CACHE_KEY, now, expires_at, || self.refresh())
                    .await
            }
        }
    }

    async fn refresh(&self) -> Result<Vec<Article>> {
        info!(key = REMOTE_ARTICLES_CACHE_KEY, "caching");

        let events = self.source.fetch_events().await?;
        events.into_iter().map(RemoteEvent::into_article).collect()
    }

    async fn refresh_isolated(&self) -> Vec<Article> {
        match self.refresh().await {
            Ok(articles) => articles,
            Err(e) => {
                warn!(error = %e, "Remote articles unavailable, listing local articles only");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl RemoteArticleSource for RemoteArticles {
    async fn fetch_remote_articles(&self, now: DateTime<Utc>) -> Result<Vec<Article>> {
        RemoteArticles::fetch_remote_articles(self, now).await
    }
}
