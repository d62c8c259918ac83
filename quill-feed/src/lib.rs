//! # Quill Feed
//!
//! The read path of the site:
//!
//! - [`Aggregator`]: merges the catalog with remote articles, gates
//!   unpublished entries, and orders the result most-recent-first
//! - [`ResponseBuilder`]: turns a single article into a response with a
//!   404 for gated entries and entity tag / last-modified metadata
//!
//! ## Example
//!
//! ```rust,ignore
//! use quill_feed::{Aggregator, ResponseBuilder};
//!
//! let aggregator = Aggregator::new(registry, VisibilityPolicy::Gated).with_remote(remote);
//! let articles = aggregator.list_articles(Utc::now()).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod aggregator;
pub mod response;

pub use aggregator::{sort_most_recent_first, Aggregator};
pub use response::{
    entity_tag, http_date, parse_http_date, ArticleResponse, RequestConditions, ResponseBuilder,
    ResponseStatus,
};
