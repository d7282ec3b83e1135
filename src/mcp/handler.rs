use crate::config::AnalyzerOptions;
use crate::error::Result as LensResult;
use crate::pipeline::Analyzer;
use crate::tools::ToolRegistry;
use rmcp::{
    ServerHandler, tool_handler,
    handler::server::router::tool::ToolRouter,
    model::{ServerCapabilities, ServerInfo},
};
use std::sync::Arc;

/// MCP server that turns pages into structural IR
#[derive(Clone)]
pub struct LensServer {
    analyzer: Arc<Analyzer>,
    registry: Arc<ToolRegistry>,
    tool_router: ToolRouter<Self>,
}

impl LensServer {
    /// Create a server around an existing analyzer
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            registry: Arc::new(ToolRegistry::with_defaults()),
            tool_router: Self::tool_router(),
        }
    }

    /// Create a server whose analyzer fetches pages over HTTP
    pub fn with_options(options: AnalyzerOptions) -> LensResult<Self> {
        Ok(Self::new(Analyzer::with_http(options)?))
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

#[tool_handler]
impl ServerHandler for LensServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Page structure analysis. Turns static HTML into a bounded structural IR \
                 (DOM tree with resolved CSS, navigation, forms, images, colors, fonts, calls \
                 to action, layout, sections, density and difficulty) sized for a model's \
                 context window. Use page_estimate_tokens to pick a tier before analyzing."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_info() {
        let server = LensServer::new(Analyzer::default());
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.unwrap().contains("page_estimate_tokens"));
        assert_eq!(server.registry().len(), 3);
        assert!(!server.analyzer().has_fetcher());
    }

    #[test]
    fn test_with_options_routes_every_tool() {
        let server = LensServer::with_options(AnalyzerOptions::default()).unwrap();
        assert!(server.analyzer().has_fetcher());

        let names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        assert_eq!(names.len(), 3);
        for name in ["page_analyze_html", "page_analyze_url", "page_estimate_tokens"] {
            assert!(names.iter().any(|n| n == name), "{} not routed", name);
        }
    }
}
