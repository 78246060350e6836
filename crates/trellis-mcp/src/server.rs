//! MCP server implementation.
//!
//! This module contains the main server setup using rmcp.

use crate::context::Context;
use crate::models::{ForestParams, GetIssueParams, SearchParams, TreeParams};
use crate::tools::Tools;
use rmcp::handler::server::ServerHandler;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::transport::stdio;
use rmcp::{ErrorData as McpError, ServiceExt, tool, tool_handler, tool_router};
use std::sync::Arc;

/// The trellis MCP server.
///
/// Provides MCP protocol handling over stdio transport.
#[derive(Clone)]
pub struct TrellisMcpServer {
    /// Tool implementations.
    tools: Arc<Tools>,
    /// Tool router for MCP dispatch.
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl TrellisMcpServer {
    /// Render the hierarchy below one issue.
    #[tool(
        description = "Render the issue hierarchy below a starting key: contained and covered issues, optionally epic members. Depth is bounded (1-20, default 10)."
    )]
    async fn issue_tree(
        &self,
        Parameters(params): Parameters<TreeParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .issue_tree(&params.issue_key, params.max_depth, params.include_epic)
            .await
        {
            Ok(response) => Ok(CallToolResult::success(vec![Content::json(response)?])),
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }

    /// Render the hierarchy of a query result.
    #[tool(
        description = "Run a search query and render the result as a hierarchy: epic sections and root trees, grouped by folder when a structure is configured."
    )]
    async fn issue_forest(
        &self,
        Parameters(params): Parameters<ForestParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .issue_forest(&params.query, params.max_results)
            .await
        {
            Ok(response) => Ok(CallToolResult::success(vec![Content::json(response)?])),
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }

    /// Show detailed information about a specific issue.
    #[tool(
        description = "Show detailed information about a specific issue including its hierarchy-relevant relationships."
    )]
    async fn get_issue(
        &self,
        Parameters(params): Parameters<GetIssueParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.tools.get_issue(&params.issue_key).await {
            Ok(response) => Ok(CallToolResult::success(vec![Content::json(response)?])),
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }

    /// Run a flat search.
    #[tool(description = "Run a search query and list matching issues without hierarchy assembly.")]
    async fn search_issues(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .search_issues(&params.query, params.max_results)
            .await
        {
            Ok(response) => Ok(CallToolResult::success(vec![Content::json(response)?])),
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }

    /// The last issue shown to this caller.
    #[tool(description = "Return the key of the last issue shown to this caller, if any.")]
    async fn last_viewed(&self) -> Result<CallToolResult, McpError> {
        match self.tools.last_viewed() {
            Ok(response) => Ok(CallToolResult::success(vec![Content::json(response)?])),
            Err(e) => Err(McpError::internal_error(e.to_string(), None)),
        }
    }
}

impl TrellisMcpServer {
    /// Create a new trellis MCP server over the given context.
    #[must_use]
    pub fn new(context: Context) -> Self {
        Self {
            tools: Arc::new(Tools::new(Arc::new(context))),
            tool_router: Self::tool_router(),
        }
    }

    /// Number of registered tools.
    #[must_use]
    pub fn tool_count(&self) -> usize {
        self.tool_router.list_all().len()
    }

    /// Run the server over stdio until the transport closes.
    ///
    /// # Errors
    ///
    /// Returns transport and protocol errors from the MCP service.
    pub async fn run(self) -> anyhow::Result<()> {
        let service = self.serve(stdio()).await?;
        service.waiting().await?;
        Ok(())
    }
}

#[tool_handler]
impl ServerHandler for TrellisMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "trellis-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Trellis MCP server for exploring a remote issue tracker's hierarchy. \
                 Configure the tracker via JIRA_URL and credentials in the environment."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc as StdArc;
    use trellis::hierarchy::HierarchyOptions;
    use trellis::remote::MockTracker;

    fn test_server() -> TrellisMcpServer {
        let context = Context::new(
            StdArc::new(MockTracker::new()),
            None,
            HierarchyOptions::default(),
        );
        TrellisMcpServer::new(context)
    }

    #[test]
    fn test_server_info() {
        let server = test_server();
        let info = server.get_info();
        assert_eq!(info.server_info.name, "trellis-mcp");
        assert!(!info.server_info.version.is_empty());
        assert!(info.instructions.is_some());
    }

    #[test]
    fn test_tool_router_has_all_tools() {
        let server = test_server();
        let tools = server.tool_router.list_all();
        let tool_names: Vec<&str> = tools.iter().map(|t| &*t.name).collect();

        assert!(tool_names.contains(&"issue_tree"));
        assert!(tool_names.contains(&"issue_forest"));
        assert!(tool_names.contains(&"get_issue"));
        assert!(tool_names.contains(&"search_issues"));
        assert!(tool_names.contains(&"last_viewed"));
        assert_eq!(tools.len(), 5);
    }
}
