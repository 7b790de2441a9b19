//! MCP server exposing Kagi web search and summarization as LLM tools.

pub mod error;
pub mod format;
pub mod kagi;
pub mod mcp;
pub mod search;
pub mod summarize;
