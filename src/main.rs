use std::path::PathBuf;
use std::sync::Arc;

use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters,
    model::*, tool, tool_handler, tool_router,
    transport::stdio, ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

mod aggregate;
mod apis;
mod config;
mod extract;
mod summarize;

use apis::PaperSource;
use config::Config;

// ── Parameter structs ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
struct SearchPapersParams {
    #[schemars(description = "Search query string")]
    query: String,
    #[schemars(description = "Override the per-source result cap (arXiv 5, OpenAlex 3, CORE 3)")]
    max_results: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ExtractFileParams {
    #[schemars(description = "Path to a .txt, .pdf, or .docx file")]
    path: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SummarizeParams {
    #[schemars(description = "Text to summarize")]
    text: String,
    #[schemars(description = "Maximum sentences to keep (default 5)")]
    max_sentences: Option<usize>,
}

// ── Server ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct PaperFinderServer {
    tool_router: ToolRouter<Self>,
    config: Arc<Config>,
    sources: Arc<Vec<Arc<dyn PaperSource>>>,
}

#[tool_router]
impl PaperFinderServer {
    pub fn create() -> Self {
        let config = Config::from_env();
        let sources = config.build_sources();

        tracing::info!(
            "Initialized {} paper sources (CORE key {})",
            sources.len(),
            if config.core_api_key.is_some() { "set" } else { "missing" }
        );

        Self {
            tool_router: Self::tool_router(),
            config: Arc::new(config),
            sources: Arc::new(sources),
        }
    }

    #[tool(description = "List the paper sources and their credential status")]
    async fn list_sources(&self) -> Result<CallToolResult, McpError> {
        let statuses = self.config.source_status();
        let json = serde_json::to_string_pretty(&statuses)
            .map_err(|e| McpError::internal_error(format!("{}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Search arXiv, OpenAlex, and CORE for papers matching a query. \
                          Results keep source order: arXiv first, then OpenAlex, then CORE.")]
    async fn search_papers(
        &self,
        Parameters(params): Parameters<SearchPapersParams>,
    ) -> Result<CallToolResult, McpError> {
        let max = params.max_results.map(|m| m.clamp(1, 100));
        let results = aggregate::aggregate_search(&self.sources, &params.query, max).await;

        let json = serde_json::to_string_pretty(&results)
            .map_err(|e| McpError::internal_error(format!("{}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Extract the text of an uploaded .txt, .pdf, or .docx file. \
                          Scanned PDF pages fall back to OCR.")]
    async fn extract_file_text(
        &self,
        Parameters(params): Parameters<ExtractFileParams>,
    ) -> Result<CallToolResult, McpError> {
        let path = PathBuf::from(params.path);
        // Extraction does blocking file I/O and may shell out for OCR.
        let extracted = tokio::task::spawn_blocking(move || extract::extract_file(&path))
            .await
            .map_err(|e| McpError::internal_error(format!("extraction task failed: {}", e), None))?
            .map_err(|e| McpError::internal_error(format!("{}", e), None))?;

        match extracted {
            Some(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            None => Err(McpError::invalid_params(
                "Unsupported file type; expected .txt, .pdf, or .docx".to_string(),
                None,
            )),
        }
    }

    #[tool(description = "Produce an extractive summary of the given text")]
    async fn summarize_text(
        &self,
        Parameters(params): Parameters<SummarizeParams>,
    ) -> Result<CallToolResult, McpError> {
        let max_sentences = params.max_sentences.unwrap_or(5);
        let summary = summarize::summarize(&params.text, max_sentences);
        Ok(CallToolResult::success(vec![Content::text(summary)]))
    }
}

#[tool_handler]
impl ServerHandler for PaperFinderServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Aggregate research-paper search across arXiv, OpenAlex, and CORE, \
                 returning uniform records in fixed source order. Also extracts text \
                 from uploaded TXT/PDF/DOCX files (with OCR fallback for scanned \
                 pages) and offers extractive summarization."
                    .into(),
            ),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting paper-finder MCP server");

    let server = PaperFinderServer::create();
    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
