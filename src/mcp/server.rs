//! Scent MCP Server implementation

use std::sync::Arc;

use anyhow::Result;
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use scent_search::search::embedding::{Encoder, HtpEncoder};
use scent_search::search::engine::QueryEngine;
use scent_search::{ScentConfig, SearchError};

/// Parameters for scent_query tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryParams {
    /// Free-text description (e.g., "something spicy")
    #[schemars(description = "Free-text scent description to match")]
    pub query: String,
    /// Number of results (default: config default_k)
    #[schemars(description = "Number of results (default: config default_k, capped at max_k)")]
    #[serde(default)]
    pub k: usize,
}

/// Parameters for scent_index tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct IndexParams {
    /// Scent descriptions, replacing the current index
    #[schemars(description = "Scent descriptions; replaces everything indexed so far")]
    pub scents: Vec<String>,
}

/// Query hit for JSON output
#[derive(Debug, Serialize, PartialEq)]
struct QueryResultJson {
    rank: usize,
    scent: String,
    distance: f32,
}

#[derive(Debug, Serialize, PartialEq)]
struct StatusJson {
    model: String,
    built: bool,
    size: usize,
    dimension: Option<usize>,
    built_at: Option<String>,
}

fn to_mcp_error(err: SearchError) -> McpError {
    match err {
        SearchError::Encoder(scent_search::EncoderError::Backend(_)) => {
            McpError::internal_error(err.to_string(), None)
        }
        _ => McpError::invalid_params(err.to_string(), None),
    }
}

fn join_error(err: tokio::task::JoinError) -> McpError {
    McpError::internal_error(format!("Worker task failed: {}", err), None)
}

fn to_json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let output = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(format!("JSON serialization failed: {}", e), None)
    })?;
    Ok(CallToolResult::success(vec![Content::text(output)]))
}

/// Scent MCP Service
#[derive(Clone)]
pub struct ScentService {
    engine: Arc<QueryEngine<HtpEncoder>>,
    config: Arc<ScentConfig>,
    tool_router: ToolRouter<Self>,
}

impl ScentService {
    /// Service with the configured scents already indexed
    pub fn new(config: ScentConfig) -> Result<Self> {
        let engine = QueryEngine::new(config.encoder()?);
        engine.index_corpus(&config.scents)?;

        Ok(Self {
            engine: Arc::new(engine),
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        })
    }

    fn status(&self) -> StatusJson {
        let stats = self.engine.stats();
        StatusJson {
            model: self.engine.encoder().model_id().to_string(),
            built: stats.is_some(),
            size: stats.as_ref().map_or(0, |s| s.size),
            dimension: stats.as_ref().map(|s| s.dimension),
            built_at: stats.map(|s| s.built_at.to_rfc3339()),
        }
    }
}

fn run_query(
    engine: &QueryEngine<HtpEncoder>,
    config: &ScentConfig,
    query: &str,
    k: usize,
) -> Result<Vec<QueryResultJson>, SearchError> {
    let k = config.clamp_k(k);
    Ok(engine
        .search(query, k)?
        .into_iter()
        .map(|r| QueryResultJson {
            rank: r.rank,
            scent: r.description,
            distance: r.distance,
        })
        .collect())
}

#[tool_router]
impl ScentService {
    /// Closest scents for a query
    #[tool(description = "Find the indexed scent descriptions closest to a free-text query. Returns rank, scent and squared L2 distance (lower is closer).")]
    async fn scent_query(
        &self,
        params: Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        let engine = Arc::clone(&self.engine);
        let config = Arc::clone(&self.config);
        let QueryParams { query, k } = params.0;

        let results = tokio::task::spawn_blocking(move || run_query(&engine, &config, &query, k))
            .await
            .map_err(join_error)?
            .map_err(to_mcp_error)?;
        to_json_result(&results)
    }

    /// Replace the indexed scents
    #[tool(description = "Replace the indexed scent descriptions. Previous scents are discarded.")]
    async fn scent_index(
        &self,
        params: Parameters<IndexParams>,
    ) -> Result<CallToolResult, McpError> {
        let engine = Arc::clone(&self.engine);
        let scents = params.0.scents;

        let stats = tokio::task::spawn_blocking(move || engine.index_corpus(&scents))
            .await
            .map_err(join_error)?
            .map_err(to_mcp_error)?;

        to_json_result(&serde_json::json!({
            "indexed": stats.indexed,
            "dimension": stats.dimension,
            "duration_ms": stats.duration_ms,
        }))
    }

    /// Index status
    #[tool(description = "Get index status: model, number of scents, vector dimension and build time.")]
    async fn scent_status(&self) -> Result<CallToolResult, McpError> {
        to_json_result(&self.status())
    }

    /// Drop the index
    #[tool(description = "Drop all indexed scents. Queries fail until scent_index is called.")]
    async fn scent_reset(&self) -> Result<CallToolResult, McpError> {
        self.engine.reset();
        to_json_result(&self.status())
    }
}

#[tool_handler]
impl ServerHandler for ScentService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Scent search MCP Server. Matches free-text queries to the closest indexed scent descriptions.".to_string()
            ),
            ..Default::default()
        }
    }
}

/// Run the MCP server
pub async fn run_mcp_server(config: ScentConfig) -> Result<()> {
    use tokio::io::{stdin, stdout};

    let service = ScentService::new(config)?;
    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}
