//! MCP server exposing the tool registry over stdio

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool as McpTool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt};
use serde_json::Value;

use crate::Error;
use crate::tools::{ToolDefinition, ToolRegistry};

/// Name the server reports during initialization
pub const SERVER_NAME: &str = "docs";

const INSTRUCTIONS: &str = "Documentation lookup for langchain, llama-index and openai. \
    Call get_docs with a query and a library to get text from the library's documentation site.";

/// MCP server over a [`ToolRegistry`]
#[derive(Clone)]
pub struct DocsServer {
    registry: Arc<ToolRegistry>,
}

impl DocsServer {
    /// Create a server for the given tools
    #[must_use]
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Serve via stdio transport (stdin/stdout)
    ///
    /// Runs until the client closes the connection.
    ///
    /// # Errors
    ///
    /// Returns error if the MCP handshake fails or the service task panics
    pub async fn serve_stdio(self) -> anyhow::Result<()> {
        tracing::info!(tools = self.registry.len(), "serving MCP over stdio");

        let service = self.serve(rmcp::transport::stdio()).await?;
        let reason = service.waiting().await?;

        tracing::info!(?reason, "MCP session ended");
        Ok(())
    }

    /// Run one tool call and map the outcome to an MCP result
    ///
    /// Tool failures are reported to the client as error results; only
    /// unknown tool names are protocol errors.
    pub async fn dispatch(&self, name: &str, arguments: Value) -> Result<CallToolResult, McpError> {
        match self.registry.call(name, arguments).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(Error::UnknownTool(name)) => Err(McpError::invalid_params(
                format!("unknown tool: {name}"),
                None,
            )),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        }
    }
}

fn to_mcp_tool(definition: ToolDefinition) -> McpTool {
    McpTool::new(
        definition.name,
        definition.description,
        Arc::new(definition.input_schema),
    )
}

impl ServerHandler for DocsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let tools = self
            .registry
            .definitions()
            .into_iter()
            .map(to_mcp_tool)
            .collect();

        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = Value::Object(request.arguments.unwrap_or_default());
        self.dispatch(&request.name, arguments).await
    }
}
