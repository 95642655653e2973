//! Trends source trait
//!
//! Anything that can answer a [`TrendsRequest`]: the HTTP client in
//! production, canned responses in tests.

use async_trait::async_trait;

use super::error::ReportResult;
use super::types::{TrendsRequest, TrendsResponse};

/// Source of aggregated trend counts
#[async_trait]
pub trait TrendsSource: Send + Sync {
    /// Fetch counts for the requested range and granularity
    async fn fetch_trends(&self, request: &TrendsRequest) -> ReportResult<TrendsResponse>;
}
