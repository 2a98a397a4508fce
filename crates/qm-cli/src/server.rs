use std::sync::Arc;

use qm_core::VisualizationKind;
use qm_engine::ResultOrchestrator;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Clone)]
pub struct QmServer {
    engine: Arc<ResultOrchestrator>,
    tool_router: ToolRouter<Self>,
}

impl QmServer {
    pub fn new(engine: ResultOrchestrator) -> Self {
        Self {
            engine: Arc::new(engine),
            tool_router: Self::tool_router(),
        }
    }

    fn json_result<T: serde::Serialize>(value: &T) -> Result<CallToolResult, McpError> {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

// --- Tool parameter types ---

#[derive(Debug, Deserialize, JsonSchema)]
struct AnalyzeRequest {
    /// Free-text memory fragment, any language
    memory: String,
    /// Emotion label, e.g. nostalgic, peaceful, melancholy, warm
    emotion: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct MapPointsRequest {
    /// Free-text memory fragment
    memory: String,
    /// Emotion label
    emotion: String,
    /// One of probability, coherence, entanglement, quantum_3d. Defaults to probability.
    kind: Option<String>,
}

#[tool_router]
impl QmServer {
    #[tool(
        description = "Reconstruct places from a memory fragment and an emotion. Returns a primary location with a short story, two secondary locations ranked by probability, and the quantum state summary (coherence, entanglement, superposition)."
    )]
    async fn qm_analyze(
        &self,
        Parameters(req): Parameters<AnalyzeRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .engine
            .analyze(&req.memory, &req.emotion)
            .await
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Self::json_result(&result)
    }

    #[tool(
        description = "Report the sampling backend tier, register size, encoder dimensions, last measurement time and cache statistics."
    )]
    async fn qm_state(&self) -> Result<CallToolResult, McpError> {
        Self::json_result(&self.engine.status().await)
    }

    #[tool(
        description = "Analyze a memory and return weighted map points (probability, coherence, entanglement, confidence, semantic similarity) with a center coordinate for one visualization kind."
    )]
    async fn qm_map_points(
        &self,
        Parameters(req): Parameters<MapPointsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let kind = match req.kind.as_deref() {
            Some(raw) => raw
                .parse::<VisualizationKind>()
                .map_err(|e| McpError::invalid_params(e, None))?,
            None => VisualizationKind::default(),
        };
        let points = self
            .engine
            .map_points(&req.memory, &req.emotion, kind)
            .await
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Self::json_result(&points)
    }
}

#[tool_handler]
impl ServerHandler for QmServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Quantum-metaphor memory recall. Call qm_analyze with a remembered scene and how it \
                 felt to get candidate places with a short story. qm_map_points returns the same \
                 candidates as weighted map points. qm_state reports backend and cache status."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
