pub mod client;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;

pub use client::KagiClient;
pub use types::{
    NOT_AVAILABLE, OrganicResult, ResultItem, SearchResponse, SummarizeRequest, SummarizerEngine,
    SummaryData, SummaryResponse, SummaryType,
};

/// API-reported errors come back as `Ok` with the response's `error` set.
#[async_trait]
pub trait KagiApi: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchResponse>;

    async fn summarize(&self, request: &SummarizeRequest) -> Result<SummaryResponse>;
}
