//! Events service client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use quill_core::constants::{EVENTS_PATH, EVENTS_TYPE_FILTER, REMOTE_TIMEOUT_SECONDS};
use quill_core::error::{QuillError, Result};
use quill_core::types::Article;

/// One element of the events service's JSON array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEvent {
    /// ISO 8601 timestamp of the event
    pub occurred_at: String,
    /// Slug of the remote post
    pub slug: String,
    /// Post title
    pub content: String,
}

impl RemoteEvent {
    /// Normalizes the event into an [`Article`].
    pub fn into_article(self) -> Result<Article> {
        let published_at = parse_occurred_at(&self.occurred_at)?;
        Ok(Article::remote(self.slug, self.content, published_at))
    }
}

/// Parses an `occurred_at` value.
///
/// Accepts RFC 3339 and, for timestamps without an offset, assumes UTC.
fn parse_occurred_at(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| QuillError::RemoteDecode(format!("bad occurred_at '{}': {}", raw, e)))
}

/// Source of raw remote events.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetches the current list of blog events.
    async fn fetch_events(&self) -> Result<Vec<RemoteEvent>>;
}

/// Events client configuration.
#[derive(Clone, Debug)]
pub struct EventsConfig {
    /// Base URL of the events service, e.g. `https://events.example.com`
    pub base_url: String,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl EventsConfig {
    /// Creates a config with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(REMOTE_TIMEOUT_SECONDS),
        }
    }

    /// Overrides the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolves the `/events` URL under the base.
    pub fn events_url(&self) -> Result<Url> {
        let base = self.base_url.trim().trim_end_matches('/');
        Url::parse(&format!("{}/{}", base, EVENTS_PATH))
            .map_err(|e| QuillError::Config(format!("invalid events URL '{}': {}", self.base_url, e)))
    }
}

/// HTTP client for the events service.
pub struct EventsClient {
    events_url: Url,
    http_client: reqwest::Client,
}

impl EventsClient {
    /// Creates a client from `config`.
    pub fn with_config(config: EventsConfig) -> Result<Self> {
        let events_url = config.events_url()?;
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| QuillError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            events_url,
            http_client,
        })
    }

    /// The resolved events URL, without the query.
    pub fn events_url(&self) -> &Url {
        &self.events_url
    }
}

#[async_trait]
impl EventSource for EventsClient {
    /// `GET {base}/events?type=blog`, expecting 200 and a JSON array.
    #[instrument(skip(self))]
    async fn fetch_events(&self) -> Result<Vec<RemoteEvent>> {
        let response = self
            .http_client
            .get(self.events_url.clone())
            .header(ACCEPT, "application/json")
            .query(&[("type", EVENTS_TYPE_FILTER)])
            .send()
            .await
            .map_err(|e| QuillError::RemoteFetch(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(QuillError::RemoteStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| QuillError::RemoteFetch(e.to_string()))?;

        let events: Vec<RemoteEvent> =
            serde_json::from_str(&body).map_err(|e| QuillError::RemoteDecode(e.to_string()))?;

        debug!(url = %self.events_url, count = events.len(), "Fetched remote events");
        Ok(events)
    }
}
