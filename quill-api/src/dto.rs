//! DTOs for API responses.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests
    pub status: String,
    /// Crate version
    pub version: String,
    /// Seconds since the server state was built
    pub uptime_seconds: u64,
    /// Number of registered catalog articles
    pub articles_count: usize,
}
