//! # Quill Registry
//!
//! Route-keyed table of catalog articles.
//!
//! The registry is filled once at startup by an explicit, ordered list of
//! registrations (see [`catalog`]) and is read-only afterwards. Registering a
//! route twice keeps the last metadata.
//!
//! ## Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use quill_core::ArticleMetadata;
//! use quill_registry::ArticleRegistry;
//!
//! let registry = ArticleRegistry::new();
//! let published = Utc.with_ymd_and_hms(2013, 5, 26, 3, 49, 2).unwrap();
//! registry.register("/request-ids", ArticleMetadata::new("Tracking Request IDs", published))?;
//!
//! let article = registry.lookup("/request-ids").unwrap();
//! assert_eq!(article.slug, "request-ids");
//! # Ok::<(), quill_core::QuillError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod catalog;
mod registry;

pub use catalog::register_catalog;
pub use registry::ArticleRegistry;
