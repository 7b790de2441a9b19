use std::{num::NonZeroUsize, sync::Arc, time::Duration};

use tokio::{sync::Semaphore, task::JoinSet, time::timeout};
use tracing::{debug, warn};

use crate::{
    error::ToolError,
    kagi::{KagiApi, SearchResponse},
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const ACCESS_HINT: &str = "Error calling Kagi Search API (Currently in beta, make sure you have been granted access. Can be granted by emailing support@kagi.com)";

/// Failed or timed-out requests become error responses for their own query.
#[derive(Clone)]
pub struct SearchExecutor {
    api: Arc<dyn KagiApi>,
    timeout: Duration,
    concurrency: usize,
}

impl SearchExecutor {
    pub fn new(api: Arc<dyn KagiApi>) -> Self {
        Self {
            api,
            timeout: DEFAULT_TIMEOUT,
            concurrency: default_concurrency(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, Semaphore::MAX_PERMITS);
        self
    }

    pub async fn fetch_all(&self, queries: &[String]) -> Result<Vec<SearchResponse>, ToolError> {
        if queries.is_empty() {
            return Err(ToolError::invalid_input("Search called with no queries."));
        }

        debug!(
            queries = queries.len(),
            concurrency = self.concurrency,
            "Fanning out search queries"
        );

        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut join_set = JoinSet::new();

        for (index, query) in queries.iter().cloned().enumerate() {
            let api = self.api.clone();
            let permits = permits.clone();
            let limit = self.timeout;
            join_set.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                (index, search_single(api.as_ref(), &query, limit).await)
            });
        }

        let mut responses: Vec<Option<SearchResponse>> = vec![None; queries.len()];
        while let Some(task) = join_set.join_next().await {
            match task {
                Ok((index, response)) => responses[index] = Some(response),
                Err(err) => warn!(error = %err, "search task failed"),
            }
        }

        Ok(responses
            .into_iter()
            .map(|response| {
                response.unwrap_or_else(|| {
                    SearchResponse::failed(transport_failure("search task failed").to_string())
                })
            })
            .collect())
    }
}

async fn search_single(api: &dyn KagiApi, query: &str, limit: Duration) -> SearchResponse {
    match timeout(limit, api.search(query)).await {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => {
            warn!(query = %query, error = %format!("{err:#}"), "search request failed");
            SearchResponse::failed(transport_failure(format!("{err:#}")).to_string())
        }
        Err(_) => {
            warn!(query = %query, timeout = ?limit, "search request timed out");
            SearchResponse::failed(
                transport_failure(format!("request timed out after {limit:?}")).to_string(),
            )
        }
    }
}

fn transport_failure(cause: impl std::fmt::Display) -> ToolError {
    ToolError::Transport(format!("{ACCESS_HINT}: {cause}"))
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
