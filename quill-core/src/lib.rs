//! # Quill Core
//!
//! Core types, errors, and traits for the Quill article feed.
//!
//! This crate provides the foundational building blocks used by all other Quill crates:
//!
//! - **Types**: `Article`, its registration metadata, and the source tag
//! - **Errors**: A single error enum with remote-failure classification
//! - **Constants**: Cache keys, TTLs, and header names shared across crates
//! - **Traits**: The remote article source seam used by the aggregator
//! - **Visibility**: The publication gate
//!
//! ## Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use quill_core::{Article, VisibilityPolicy};
//!
//! let published = Utc.with_ymd_and_hms(2013, 5, 25, 20, 49, 2).unwrap();
//! let article = Article::remote("request-ids", "Tracking Request IDs", published);
//!
//! assert!(VisibilityPolicy::Gated.is_visible(&article, published));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;
pub mod visibility;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{QuillError, Result};
pub use traits::*;
pub use types::*;
pub use visibility::{is_visible, VisibilityPolicy};
