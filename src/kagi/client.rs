use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, header::AUTHORIZATION};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{
    KagiApi,
    types::{SearchResponse, SummarizeRequest, SummaryResponse},
};

pub const DEFAULT_BASE_URL: &str = "https://kagi.com/api/v0";

#[derive(Clone)]
pub struct KagiClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl KagiClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url,
            api_key,
            http: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.api_key)
    }
}

#[async_trait]
impl KagiApi for KagiClient {
    async fn search(&self, query: &str) -> Result<SearchResponse> {
        debug!(query = %query, "Sending search request to Kagi API");

        let response = self
            .http
            .get(self.endpoint("search"))
            .header(AUTHORIZATION, self.authorization())
            .query(&[("q", query)])
            .send()
            .await
            .context("request kagi search failed")?;

        let payload: SearchResponse =
            decode(response, "search", |payload: &SearchResponse| payload.error.is_some()).await?;

        debug!(
            query = %query,
            items = payload.data.len(),
            error = ?payload.error,
            "Received search response from Kagi API"
        );
        Ok(payload)
    }

    async fn summarize(&self, request: &SummarizeRequest) -> Result<SummaryResponse> {
        debug!(
            url = %request.url,
            engine = request.engine.as_str(),
            summary_type = request.summary_type.as_str(),
            "Sending summarize request to Kagi API"
        );

        let mut params = vec![
            ("url", request.url.as_str()),
            ("engine", request.engine.as_str()),
            ("summary_type", request.summary_type.as_str()),
        ];
        if let Some(language) = request.target_language.as_deref() {
            params.push(("target_language", language));
        }

        let response = self
            .http
            .get(self.endpoint("summarize"))
            .header(AUTHORIZATION, self.authorization())
            .query(&params)
            .send()
            .await
            .context("request kagi summarize failed")?;

        decode(response, "summarize", |payload: &SummaryResponse| {
            payload.error.is_some()
        })
        .await
    }
}

// Error statuses are accepted only when the body carries an API error.
async fn decode<T, F>(response: Response, endpoint: &str, has_error: F) -> Result<T>
where
    T: DeserializeOwned,
    F: Fn(&T) -> bool,
{
    let status = response.status();
    let body = response
        .text()
        .await
        .with_context(|| format!("read kagi {endpoint} response failed"))?;

    if status.is_success() {
        return serde_json::from_str(&body)
            .with_context(|| format!("decode kagi {endpoint} response failed"));
    }

    match serde_json::from_str::<T>(&body) {
        Ok(payload) if has_error(&payload) => Ok(payload),
        _ => anyhow::bail!("kagi {endpoint} returned error status {status}"),
    }
}
