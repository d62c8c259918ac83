//! Article types.
//!
//! Articles come from two places: the in-process catalog, registered once at
//! startup, and the remote events service. Both end up in the same shape so
//! they can be merged into one listing.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::REMOTE_SOURCE_LABEL;

/// Where an article came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleSource {
    /// Registered in the local catalog
    #[default]
    Local,
    /// Aggregated from the events service
    Remote,
}

impl ArticleSource {
    /// Label shown next to aggregated entries in listings.
    ///
    /// Catalog entries carry no label.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            ArticleSource::Local => None,
            ArticleSource::Remote => Some(REMOTE_SOURCE_LABEL),
        }
    }
}

impl fmt::Display for ArticleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArticleSource::Local => write!(f, "local"),
            ArticleSource::Remote => write!(f, "remote"),
        }
    }
}

/// A unit of publishable content.
///
/// Immutable once built. Catalog entries get theirs from
/// `ArticleRegistry::register`; remote entries from [`Article::remote`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Lookup path, e.g. `/request-ids`. Never set for remote entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    /// Route without its leading slashes
    pub slug: String,
    /// Display title
    pub title: String,
    /// Publication instant; drives both ordering and visibility
    pub published_at: DateTime<Utc>,
    /// When the entry was registered (process start), not the content's edit time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<DateTime<Utc>>,
    /// Origin of the article
    #[serde(default)]
    pub source: ArticleSource,
    /// Rendered with the signature template family
    #[serde(default)]
    pub signature: bool,
    /// Teaser text shown in listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook: Option<String>,
    /// Where the piece was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// HTML fragment for the article page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Article {
    /// Builds an article that came from the events service.
    pub fn remote(slug: impl Into<String>, title: impl Into<String>, published_at: DateTime<Utc>) -> Self {
        Self {
            route: None,
            slug: slug.into(),
            title: title.into(),
            published_at,
            last_modified_at: None,
            source: ArticleSource::Remote,
            signature: false,
            hook: None,
            location: None,
            body: None,
        }
    }

    /// Returns true for catalog entries.
    pub fn is_local(&self) -> bool {
        self.source == ArticleSource::Local
    }

    /// Returns true when this article can be fetched directly by route.
    pub fn is_routable(&self) -> bool {
        self.is_local() && self.route.is_some()
    }
}

/// Metadata supplied when registering a catalog entry.
///
/// `published_at` is optional here only so that forgetting it is representable
/// and can be rejected at registration instead of silently defaulting.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    /// Display title
    pub title: String,
    /// Publication instant
    pub published_at: Option<DateTime<Utc>>,
    /// Teaser text shown in listings
    #[serde(default)]
    pub hook: Option<String>,
    /// Where the piece was written
    #[serde(default)]
    pub location: Option<String>,
    /// Rendered with the signature template family
    #[serde(default)]
    pub signature: bool,
    /// HTML fragment for the article page
    #[serde(default)]
    pub body: Option<String>,
}

impl ArticleMetadata {
    /// Creates metadata with a title and publication instant.
    pub fn new(title: impl Into<String>, published_at: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            published_at: Some(published_at),
            ..Default::default()
        }
    }

    /// Sets the teaser text.
    pub fn hook(mut self, hook: impl Into<String>) -> Self {
        self.hook = Some(hook.into());
        self
    }

    /// Sets the location.
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Marks the article as a signature piece.
    pub fn signature(mut self) -> Self {
        self.signature = true;
        self
    }

    /// Sets the HTML body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Derives a slug from a route by stripping leading slashes.
pub fn slug_from_route(route: &str) -> &str {
    route.trim_start_matches('/')
}
