//! Publication gate.
//!
//! An article dated in the future stays hidden from listings and direct
//! fetches until its publication instant, unless the deployment runs ungated
//! (previews).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QuillError;
use crate::types::Article;

/// Which visibility rule a deployment applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityPolicy {
    /// Visible iff `published_at <= now`
    #[default]
    Gated,
    /// Everything is visible
    Ungated,
}

impl VisibilityPolicy {
    /// Returns true if `article` is publicly visible at `now`.
    pub fn is_visible(&self, article: &Article, now: DateTime<Utc>) -> bool {
        match self {
            VisibilityPolicy::Gated => article.published_at <= now,
            VisibilityPolicy::Ungated => true,
        }
    }

    /// Returns true if this policy can hide anything.
    pub fn is_gated(&self) -> bool {
        matches!(self, VisibilityPolicy::Gated)
    }
}

impl fmt::Display for VisibilityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisibilityPolicy::Gated => write!(f, "gated"),
            VisibilityPolicy::Ungated => write!(f, "ungated"),
        }
    }
}

impl FromStr for VisibilityPolicy {
    type Err = QuillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gated" => Ok(VisibilityPolicy::Gated),
            "ungated" => Ok(VisibilityPolicy::Ungated),
            other => Err(QuillError::Config(format!(
                "unknown visibility policy '{}', expected 'gated' or 'ungated'",
                other
            ))),
        }
    }
}

/// Free-function form of [`VisibilityPolicy::is_visible`].
pub fn is_visible(article: &Article, now: DateTime<Utc>, policy: VisibilityPolicy) -> bool {
    policy.is_visible(article, now)
}
