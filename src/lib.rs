//! # sitelens
//!
//! A Rust library that turns static web pages into a bounded, LLM-ready
//! description of their visual structure: a DOM tree with resolved CSS, the
//! page's navigation, forms, images, colors, fonts and calls to action, and
//! a heuristic structural analysis, trimmed to a token budget.
//!
//! ## Features
//!
//! - **MCP Server**: Model Context Protocol server exposing page analysis to AI agents
//! - **CSS Resolution**: class rules from `<style>` blocks and linked stylesheets, merged with inline styles
//! - **Structural Analysis**: layout type, section candidates, content density, difficulty and node roles
//! - **Token Budgets**: named tiers or custom limits, with CSS value compression
//!
//! ## MCP Server
//!
//! ```bash
//! # stdio transport
//! cargo run --bin sitelens-mcp --features mcp-server
//!
//! # HTTP streamable transport
//! cargo run --bin sitelens-mcp --features mcp-server -- --transport http --port 3000
//! ```
//!
//! ## Library Usage
//!
//! ### Analyzing markup
//!
//! ```rust,no_run
//! use sitelens::{AnalysisRequest, Analyzer, TierName};
//!
//! # fn main() -> sitelens::Result<()> {
//! let html = std::fs::read_to_string("page.html").unwrap_or_default();
//! let request = AnalysisRequest::new(html, "https://example.com/").with_tier(TierName::Free);
//!
//! let report = Analyzer::default().analyze_offline(&request)?;
//! println!("Layout: {}", report.ir.structural.layout_type.as_str());
//! println!("{}", report.ir.to_json()?);
//! # Ok(())
//! # }
//! ```
//!
//! ### Fetching a page
//!
//! ```rust,no_run
//! use sitelens::{Analyzer, AnalyzerOptions};
//!
//! # async fn run() -> sitelens::Result<()> {
//! let analyzer = Analyzer::with_http(AnalyzerOptions::default())?;
//! let report = analyzer.analyze_url("https://example.com", None, None).await?;
//! println!("{} nodes", report.ir.total_nodes);
//! # Ok(())
//! # }
//! ```
//!
//! ### Using the Tool System
//!
//! ```rust,no_run
//! use sitelens::Analyzer;
//! use sitelens::tools::{ToolContext, ToolRegistry};
//! use serde_json::json;
//!
//! # async fn run() -> sitelens::Result<()> {
//! let analyzer = Analyzer::default();
//! let registry = ToolRegistry::with_defaults();
//! let context = ToolContext::new(&analyzer);
//!
//! let result = registry
//!     .execute(
//!         "estimate_tokens",
//!         json!({ "html": "<main><h1>Hi</h1></main>", "base_url": "https://example.com" }),
//!         &context,
//!     )
//!     .await?;
//! println!("{:?}", result.data);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`pipeline`]: request → IR orchestration
//! - [`normalize`]: markup cleanup, fonts, embeds and CSS text
//! - [`css`]: stylesheet parsing and per-node resolution
//! - [`dom`]: tree extraction and page-level collections
//! - [`analysis`]: heuristic structural analysis
//! - [`budget`]: token budget tiers and reduction
//! - [`ir`]: the assembled page IR
//! - [`fetch`] / [`interpret`]: network and model collaborators
//! - [`tools`]: named operations with JSON parameters
//! - [`mcp`]: **Model Context Protocol server** (requires `mcp-handler` feature)

pub mod analysis;
pub mod budget;
pub mod config;
pub mod css;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod interpret;
pub mod ir;
pub mod normalize;
pub mod pipeline;
pub mod tools;
pub mod utils;

#[cfg(feature = "mcp-handler")]
pub mod mcp;

pub use budget::{TierName, TokenBudgetConfig, TokenBudgetOverrides};
pub use config::{AnalyzerCapabilities, AnalyzerOptions};
pub use dom::{DomNode, DomTree};
pub use error::{ErrorKind, LensError, Result};
pub use fetch::{FetchedPage, Fetcher, HttpFetcher};
pub use interpret::{AnalysisReport, Interpretation, Interpreter};
pub use ir::PageIr;
pub use pipeline::{AnalysisRequest, Analyzer};
pub use tools::{Tool, ToolContext, ToolRegistry, ToolResult};

#[cfg(feature = "mcp-handler")]
pub use mcp::LensServer;
#[cfg(feature = "mcp-handler")]
pub use rmcp::ServiceExt;
