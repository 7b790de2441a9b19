use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kagi_mcp::mcp::{config::McpConfig, server};

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP stdio stream, so logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".to_string().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let config = McpConfig::from_env()?;
    server::serve(config).await
}
