//! TTL cache for Quill.
//!
//! Keyed memoization of an expensive producer. An entry is valid until an
//! absolute expiry instant; the next access after that re-runs the producer.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;

pub use cache::{CacheStats, TtlCache};
