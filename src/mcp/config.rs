use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;

use crate::{kagi::client::DEFAULT_BASE_URL, search::DEFAULT_TIMEOUT, summarize::DEFAULT_ENGINE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Http,
}

#[derive(Debug, Clone)]
pub struct McpConfig {
    pub transport: Transport,
    pub bind: String,
    pub auth_token: Option<String>,
    pub kagi_url: String,
    pub kagi_api_key: String,
    /// Validated when the summarizer is called, not here.
    pub summarizer_engine: String,
    pub search_timeout: Duration,
    pub search_concurrency: Option<usize>,
}

impl McpConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let transport = match non_empty("MCP_TRANSPORT").as_deref() {
            None | Some("stdio") => Transport::Stdio,
            Some("http") => Transport::Http,
            Some(other) => anyhow::bail!("MCP_TRANSPORT must be stdio or http, got {other}"),
        };
        let bind = non_empty("MCP_BIND").unwrap_or_else(|| "127.0.0.1:8000".to_string());
        let auth_token = non_empty("MCP_AUTH_TOKEN");

        let kagi_api_key = non_empty("KAGI_API_KEY").context("KAGI_API_KEY is required")?;
        let kagi_url = non_empty("KAGI_URL")
            .map(|value| value.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let summarizer_engine =
            non_empty("KAGI_SUMMARIZER_ENGINE").unwrap_or_else(|| DEFAULT_ENGINE.to_string());

        let search_timeout = match non_empty("KAGI_SEARCH_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(positive("KAGI_SEARCH_TIMEOUT_SECS", &value)?),
            None => DEFAULT_TIMEOUT,
        };
        let search_concurrency = non_empty("KAGI_SEARCH_CONCURRENCY")
            .map(|value| positive("KAGI_SEARCH_CONCURRENCY", &value))
            .transpose()?
            .map(|value| usize::try_from(value).unwrap_or(usize::MAX).min(Semaphore::MAX_PERMITS));

        Ok(Self {
            transport,
            bind,
            auth_token,
            kagi_url,
            kagi_api_key,
            summarizer_engine,
            search_timeout,
            search_concurrency,
        })
    }
}

fn positive(key: &str, value: &str) -> Result<u64> {
    let parsed: u64 = value
        .parse()
        .with_context(|| format!("{key} is not a number: {value}"))?;
    if parsed == 0 {
        anyhow::bail!("{key} must be greater than 0");
    }
    Ok(parsed)
}
