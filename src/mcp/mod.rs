//! MCP (Model Context Protocol) server for page analysis
//!
//! Exposes the tool registry as rmcp tools. Every tool call goes through
//! [`ToolRegistry::execute`](crate::tools::ToolRegistry::execute), so MCP
//! clients and other front ends see the same results.

pub mod handler;
pub use handler::LensServer;

use crate::error::ErrorKind;
use crate::tools::{AnalyzeHtmlParams, AnalyzeUrlParams, EstimateTokensParams, ToolContext, ToolResult as InternalToolResult};
use rmcp::{
    tool_router, tool,
    ErrorData as McpError,
    model::{CallToolResult, Content},
    handler::server::wrapper::Parameters,
};
use serde::Serialize;

/// Convert internal ToolResult to MCP CallToolResult
fn convert_result(result: InternalToolResult) -> Result<CallToolResult, McpError> {
    if result.success {
        let text = if let Some(data) = result.data {
            serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string())
        } else {
            "Success".to_string()
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    } else {
        let error_msg = result.error.unwrap_or_else(|| "Unknown error".to_string());
        let data = result.kind.map(|kind| serde_json::json!({ "kind": kind }));
        match result.kind {
            Some(ErrorKind::InvalidInput) => Err(McpError::invalid_params(error_msg, data)),
            _ => Err(McpError::internal_error(error_msg, data)),
        }
    }
}

impl LensServer {
    async fn run_tool<P: Serialize>(&self, name: &str, params: P) -> Result<CallToolResult, McpError> {
        let tool_params =
            serde_json::to_value(params).map_err(|e| McpError::invalid_params(e.to_string(), None))?;
        let context = ToolContext::new(self.analyzer());

        let result = self
            .registry()
            .execute(name, tool_params, &context)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidInput => McpError::invalid_params(e.to_string(), None),
                _ => McpError::internal_error(e.to_string(), None),
            })?;

        convert_result(result)
    }
}

#[tool_router]
impl LensServer {
    /// Analyze raw HTML
    #[tool(description = "Convert page HTML into a structural IR (DOM tree with resolved CSS, navigation, forms, images, colors, fonts, calls to action and a structural analysis). Set tier or custom_budget to reduce the IR to a token budget.")]
    async fn page_analyze_html(
        &self,
        params: Parameters<AnalyzeHtmlParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("analyze_html", params.0).await
    }

    /// Fetch and analyze a URL
    #[tool(description = "Fetch a static HTML page over HTTP(S) and convert it into a structural IR. Script-rendered pages are rejected.")]
    async fn page_analyze_url(
        &self,
        params: Parameters<AnalyzeUrlParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("analyze_url", params.0).await
    }

    /// Estimate IR size per tier
    #[tool(description = "Estimate the token size of a page's IR unreduced and after reduction to each budget tier (free, basic, pro, enterprise)")]
    async fn page_estimate_tokens(
        &self,
        params: Parameters<EstimateTokensParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("estimate_tokens", params.0).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::TierName;
    use crate::error::LensError;
    use crate::pipeline::Analyzer;
    use rmcp::model::ErrorCode;

    #[test]
    fn test_convert_failure_kinds() {
        let err = convert_result(InternalToolResult::failure(&LensError::InvalidInput("bad url".into()))).unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

        let err = convert_result(InternalToolResult::failure(&LensError::UpstreamTimeout("slow".into()))).unwrap_err();
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
        assert_eq!(err.data.unwrap()["kind"], "upstream_timeout");
    }

    #[tokio::test]
    async fn test_page_analyze_html() {
        let server = LensServer::new(Analyzer::default());
        let result = server
            .page_analyze_html(Parameters(AnalyzeHtmlParams {
                html: "<html><body><main><h1>Docs</h1><p>Getting started</p></main></body></html>".to_string(),
                base_url: "https://docs.test/".to_string(),
                tier: Some(TierName::Free),
                custom_budget: None,
            }))
            .await
            .unwrap();
        assert_eq!(result.content.len(), 1);
    }

    #[tokio::test]
    async fn test_page_analyze_url_without_fetcher() {
        let server = LensServer::new(Analyzer::default());
        let err = server
            .page_analyze_url(Parameters(AnalyzeUrlParams {
                url: "https://docs.test/".to_string(),
                tier: None,
                custom_budget: None,
            }))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }
}
