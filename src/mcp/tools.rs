use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::ToolError, format::format_search_results, kagi::SummaryType, search::SearchExecutor,
    summarize::Summarizer,
};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchFetchParams {
    /// One or more concise, keyword-focused search queries. Include essential context within each query for standalone use.
    #[schemars(length(min = 1))]
    pub queries: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SummarizerParams {
    /// A URL to a document to summarize.
    pub url: String,
    /// Type of summary to produce. Options are 'summary' for paragraph prose and 'takeaway' for a bulleted list of key points.
    #[serde(default)]
    pub summary_type: SummaryType,
    /// Desired output language using language codes (e.g., 'EN' for English). If not specified, the document's original language influences the output.
    #[serde(default)]
    pub target_language: Option<String>,
}

#[derive(Clone)]
pub struct KagiTools {
    executor: SearchExecutor,
    summarizer: Summarizer,
    tool_router: ToolRouter<Self>,
}

impl KagiTools {
    pub fn new(executor: SearchExecutor, summarizer: Summarizer) -> Self {
        Self {
            executor,
            summarizer,
            tool_router: Self::tool_router(),
        }
    }

    pub async fn search_fetch(&self, params: SearchFetchParams) -> CallToolResult {
        info!(queries = ?params.queries, "kagi_search_fetch called");
        match self.executor.fetch_all(&params.queries).await {
            Ok(responses) => CallToolResult::success(vec![Content::text(format_search_results(
                &params.queries,
                &responses,
            ))]),
            Err(err) => Self::error_result(err),
        }
    }

    pub async fn summarize(&self, params: SummarizerParams) -> CallToolResult {
        info!(
            url = %params.url,
            summary_type = params.summary_type.as_str(),
            "kagi_summarizer called"
        );
        match self
            .summarizer
            .summarize(&params.url, params.summary_type, params.target_language)
            .await
        {
            Ok(summary) => CallToolResult::success(vec![Content::text(summary)]),
            Err(err) => Self::error_result(err),
        }
    }

    fn error_result(err: ToolError) -> CallToolResult {
        warn!(error = %err, "tool call failed");
        CallToolResult::error(vec![Content::text(err.to_string())])
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for KagiTools {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Kagi search and summarization. kagi_search_fetch runs several queries concurrently and numbers results continuously; kagi_summarizer summarizes any document by URL."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}

#[tool_router]
impl KagiTools {
    #[tool(
        name = "kagi_search_fetch",
        description = "Fetch web results based on one or more queries using the Kagi Search API. Use for general search and when the user explicitly tells you to 'fetch' results/information. Results are from all queries given. They are numbered continuously, so that a user may be able to refer to a result by a specific number."
    )]
    async fn kagi_search_fetch(
        &self,
        Parameters(params): Parameters<SearchFetchParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.search_fetch(params).await)
    }

    #[tool(
        name = "kagi_summarizer",
        description = "Summarize content from a URL using the Kagi Summarizer API. The Summarizer can summarize any document type (text webpage, video, audio, etc.)"
    )]
    async fn kagi_summarizer(
        &self,
        Parameters(params): Parameters<SummarizerParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.summarize(params).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_schema_requires_at_least_one_query() {
        let schema = serde_json::to_value(schemars::schema_for!(SearchFetchParams)).unwrap();

        assert_eq!(schema["required"], serde_json::json!(["queries"]));
        assert_eq!(schema["properties"]["queries"]["minItems"], 1);
        assert_eq!(schema["properties"]["queries"]["type"], "array");
    }

    #[test]
    fn summarizer_params_default_to_prose_summary() {
        let params: SummarizerParams =
            serde_json::from_value(serde_json::json!({"url": "https://example.com"})).unwrap();

        assert_eq!(params.summary_type, SummaryType::Summary);
        assert_eq!(params.target_language, None);
    }

    #[test]
    fn summary_type_rejects_unknown_values() {
        let parsed = serde_json::from_value::<SummarizerParams>(
            serde_json::json!({"url": "https://example.com", "summary_type": "essay"}),
        );
        assert!(parsed.is_err());
    }
}
