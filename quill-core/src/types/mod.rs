//! Domain types for Quill.
//!
//! - [`Article`]: An immutable, publishable piece of content
//! - [`ArticleMetadata`]: What a catalog entry supplies at registration
//! - [`ArticleSource`]: Where an article came from

mod article;

pub use article::{slug_from_route, Article, ArticleMetadata, ArticleSource};
