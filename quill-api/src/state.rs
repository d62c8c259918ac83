//! App state: registry, aggregator, response builder, config.

use std::env;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use quill_core::constants::{DEFAULT_SITE_TITLE, REMOTE_ARTICLES_TTL_SECONDS, REMOTE_TIMEOUT_SECONDS};
use quill_core::error::{QuillError, Result};
use quill_core::traits::RemoteArticleSource;
use quill_core::visibility::VisibilityPolicy;
use quill_feed::{Aggregator, ResponseBuilder};
use quill_registry::{register_catalog, ArticleRegistry};
use quill_remote::{validate_ttl, FailurePolicy, RemoteArticles, RemoteConfig};

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Events service base URL; `None` disables remote articles
    pub events_url: Option<String>,
    /// Emit entity tags and honor preconditions
    pub production: bool,
    /// Whether unpublished catalog articles are hidden
    pub visibility: VisibilityPolicy,
    /// What a failed events fetch does to a listing
    pub remote_failure: FailurePolicy,
    /// Remote cache TTL in seconds
    pub remote_ttl_secs: i64,
    /// Events service HTTP timeout in seconds
    pub remote_timeout_secs: u64,
    /// Base URL remote articles link under
    pub remote_link_base: Option<String>,
    /// Site title for the layout and the Atom feed
    pub site_title: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            events_url: None,
            production: false,
            visibility: VisibilityPolicy::Gated,
            remote_failure: FailurePolicy::Isolated,
            remote_ttl_secs: REMOTE_ARTICLES_TTL_SECONDS,
            remote_timeout_secs: REMOTE_TIMEOUT_SECONDS,
            remote_link_base: None,
            site_title: DEFAULT_SITE_TITLE.into(),
        }
    }
}

impl ApiConfig {
    /// Reads the configuration from the environment, loading `.env` first.
    ///
    /// # Errors
    ///
    /// `Config` if a variable is set to something unparseable.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        let config = Self {
            events_url: non_empty("QUILL_EVENTS_URL"),
            production: env::var("QUILL_PRODUCTION")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.production),
            visibility: parsed("QUILL_VISIBILITY")?.unwrap_or(defaults.visibility),
            remote_failure: parsed("QUILL_REMOTE_FAILURE")?.unwrap_or(defaults.remote_failure),
            remote_ttl_secs: parse_number("QUILL_REMOTE_TTL_SECS")?.unwrap_or(defaults.remote_ttl_secs),
            remote_timeout_secs: parse_number("QUILL_REMOTE_TIMEOUT_SECS")?
                .unwrap_or(defaults.remote_timeout_secs),
            remote_link_base: non_empty("QUILL_REMOTE_LINK_BASE"),
            site_title: non_empty("QUILL_SITE_TITLE").unwrap_or(defaults.site_title),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges that parsing alone does not catch.
    ///
    /// # Errors
    ///
    /// `Config` for an out-of-range TTL or a zero timeout.
    pub fn validate(&self) -> Result<()> {
        validate_ttl(self.remote_ttl_secs)?;
        if self.remote_timeout_secs == 0 {
            return Err(QuillError::Config("remote timeout must be at least 1 second".into()));
        }
        Ok(())
    }

    /// The remote adapter configuration, if an events URL is set.
    pub fn remote_config(&self) -> Option<RemoteConfig> {
        self.events_url.as_ref().map(|url| RemoteConfig {
            base_url: url.clone(),
            ttl_seconds: self.remote_ttl_secs,
            timeout_seconds: self.remote_timeout_secs,
            failure_policy: self.remote_failure,
        })
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = QuillError>,
{
    non_empty(key).map(|v| v.parse()).transpose()
}

fn parse_number<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    non_empty(key)
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| QuillError::Config(format!("{} must be a number, got '{}'", key, v)))
        })
        .transpose()
}

/// Shared state for every handler.
pub struct AppState {
    /// Configuration the state was built from
    pub config: ApiConfig,
    /// Catalog, written once at startup
    pub registry: Arc<ArticleRegistry>,
    /// Merged listing over the catalog and remote source
    pub aggregator: Aggregator,
    /// Single-article response builder
    pub responses: ResponseBuilder,
    /// Used for the health check's uptime
    pub started_at: Instant,
}

impl AppState {
    /// Registers the built-in catalog and, if configured, the remote source.
    ///
    /// # Errors
    ///
    /// Invalid configuration, a catalog registration error, or an invalid
    /// events URL.
    pub fn new(config: ApiConfig) -> Result<Self> {
        config.validate()?;
        let registry = Arc::new(ArticleRegistry::new());
        register_catalog(&registry)?;

        let remote = match config.remote_config() {
            Some(remote) => Some(Arc::new(RemoteArticles::from_config(remote)?) as Arc<dyn RemoteArticleSource>),
            None => None,
        };

        Ok(Self::from_parts(config, registry, remote))
    }

    /// Assembles state from an already populated registry.
    pub fn from_parts(
        config: ApiConfig,
        registry: Arc<ArticleRegistry>,
        remote: Option<Arc<dyn RemoteArticleSource>>,
    ) -> Self {
        let mut aggregator = Aggregator::new(registry.clone(), config.visibility);
        if let Some(remote) = remote {
            aggregator = aggregator.with_remote(remote);
        }

        Self {
            responses: ResponseBuilder::new(config.visibility, config.production),
            config,
            registry,
            aggregator,
            started_at: Instant::now(),
        }
    }
}
