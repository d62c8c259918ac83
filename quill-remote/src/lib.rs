//! # Quill Remote
//!
//! Short "blog" events from the remote events service, normalized into
//! [`Article`](quill_core::Article)s and memoized behind a TTL cache.
//!
//! - [`EventsClient`]: HTTP client for `GET {base}/events?type=blog`
//! - [`RemoteArticles`]: cached adapter with a configurable [`FailurePolicy`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use quill_remote::{RemoteArticles, RemoteConfig};
//!
//! let remote = RemoteArticles::from_config(RemoteConfig::new("https://events.example.com"))?;
//! let articles = remote.fetch_remote_articles(chrono::Utc::now()).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod adapter;
mod events;

pub use adapter::{validate_ttl, FailurePolicy, RemoteArticles, RemoteConfig};
pub use events::{EventSource, EventsClient, EventsConfig, RemoteEvent};
