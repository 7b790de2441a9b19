use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    error::ToolError,
    kagi::{KagiApi, SummarizeRequest, SummarizerEngine, SummaryType},
};

pub const DEFAULT_ENGINE: &str = "cecil";

#[derive(Clone)]
pub struct Summarizer {
    api: Arc<dyn KagiApi>,
    engine: String,
}

impl Summarizer {
    pub fn new(api: Arc<dyn KagiApi>, engine: impl Into<String>) -> Self {
        Self {
            api,
            engine: engine.into(),
        }
    }

    /// Engine is validated here rather than at startup.
    pub fn engine(&self) -> Result<SummarizerEngine, ToolError> {
        SummarizerEngine::parse(&self.engine).ok_or_else(|| {
            let valid = SummarizerEngine::ALL
                .iter()
                .map(SummarizerEngine::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            ToolError::Configuration(format!(
                "Summarizer configured incorrectly, invalid summarization engine set: {}. Must be one of the following: {valid}",
                self.engine
            ))
        })
    }

    pub async fn summarize(
        &self,
        url: &str,
        summary_type: SummaryType,
        target_language: Option<String>,
    ) -> Result<String, ToolError> {
        if url.is_empty() {
            return Err(ToolError::invalid_input("Summarizer called with no URL."));
        }
        let engine = self.engine()?;

        let request = SummarizeRequest {
            url: url.to_string(),
            engine,
            summary_type,
            target_language: target_language.filter(|language| !language.trim().is_empty()),
        };

        let response = self.api.summarize(&request).await.map_err(|err| {
            warn!(url = %url, error = %format!("{err:#}"), "summarize request failed");
            ToolError::Upstream(format!("{err:#}"))
        })?;

        let output = response.output().map(str::to_string);
        if let Some(error) = response.error {
            return Err(ToolError::Upstream(error));
        }

        let output = output.ok_or_else(|| {
            ToolError::Upstream("summarizer response contained no output".to_string())
        })?;
        debug!(url = %url, chars = output.len(), "Summary received");
        Ok(output)
    }
}
