use std::sync::Arc;

use anyhow::Result;
use axum::{Router, middleware, routing::get};
use rmcp::{
    ServiceExt,
    transport::{
        io::stdio,
        streamable_http_server::{
            StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
        },
    },
};
use tokio_util::sync::CancellationToken;

use super::{
    auth::{AuthState, auth_middleware},
    config::{McpConfig, Transport},
    tools::KagiTools,
};
use crate::{
    kagi::{KagiApi, KagiClient},
    search::SearchExecutor,
    summarize::Summarizer,
};

async fn health_check() -> &'static str {
    "OK"
}

pub fn build_tools(config: &McpConfig, api: Arc<dyn KagiApi>) -> KagiTools {
    let mut executor = SearchExecutor::new(api.clone()).with_timeout(config.search_timeout);
    if let Some(concurrency) = config.search_concurrency {
        executor = executor.with_concurrency(concurrency);
    }
    let summarizer = Summarizer::new(api, config.summarizer_engine.clone());
    KagiTools::new(executor, summarizer)
}

pub async fn serve(config: McpConfig) -> Result<()> {
    let api: Arc<dyn KagiApi> = Arc::new(KagiClient::new(
        config.kagi_url.clone(),
        config.kagi_api_key.clone(),
    ));
    let tools = build_tools(&config, api);

    match config.transport {
        Transport::Stdio => serve_stdio(tools).await,
        Transport::Http => serve_http(tools, config).await,
    }
}

async fn serve_stdio(tools: KagiTools) -> Result<()> {
    tracing::info!("MCP server running on stdio");
    let service = tools.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

async fn serve_http(tools: KagiTools, config: McpConfig) -> Result<()> {
    let auth_state = Arc::new(AuthState::new(config.auth_token));
    let ct = CancellationToken::new();

    let mcp_service: StreamableHttpService<KagiTools, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(tools.clone()),
            LocalSessionManager::default().into(),
            StreamableHttpServerConfig {
                cancellation_token: ct.child_token(),
                ..Default::default()
            },
        );

    let mcp_router = if auth_state.enabled() {
        Router::new()
            .nest_service("/mcp", mcp_service)
            .layer(middleware::from_fn_with_state(auth_state.clone(), auth_middleware))
    } else {
        Router::new().nest_service("/mcp", mcp_service)
    };

    let app = Router::new()
        .route("/health", get(health_check))
        .merge(mcp_router);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!("MCP server listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
            ct.cancel();
        })
        .await?;
    Ok(())
}
