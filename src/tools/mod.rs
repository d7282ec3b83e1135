//! Tool system
//!
//! Named operations with JSON parameters and JSON results, shared by the MCP
//! server and any other front end:
//! - `analyze_html`: markup to IR, optionally budgeted
//! - `analyze_url`: fetch a page, then analyze it
//! - `estimate_tokens`: IR size unreduced and per tier

pub mod analyze_html;
pub mod analyze_url;
pub mod estimate_tokens;

pub use analyze_html::{AnalyzeHtmlParams, AnalyzeHtmlTool};
pub use analyze_url::{AnalyzeUrlParams, AnalyzeUrlTool};
pub use estimate_tokens::{EstimateTokensParams, EstimateTokensTool};

use async_trait::async_trait;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{ErrorKind, LensError, Result};
use crate::pipeline::Analyzer;

/// What every tool execution gets access to
pub struct ToolContext<'a> {
    pub analyzer: &'a Analyzer,
}

impl<'a> ToolContext<'a> {
    pub fn new(analyzer: &'a Analyzer) -> Self {
        Self { analyzer }
    }
}

/// Outcome of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Stable classification of `error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl ToolResult {
    pub fn success() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            kind: None,
        }
    }

    pub fn success_with(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::success()
        }
    }

    /// Failed result carrying the error's message and kind
    pub fn failure(error: &LensError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            kind: Some(error.kind()),
        }
    }
}

/// A typed tool
#[async_trait]
pub trait Tool: Send + Sync {
    type Params: DeserializeOwned + JsonSchema + Send;

    fn name(&self) -> &str;

    /// JSON schema of [`Tool::Params`]
    fn parameters_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(Self::Params)).unwrap_or(Value::Null)
    }

    async fn execute_typed(&self, params: Self::Params, context: &ToolContext<'_>) -> Result<ToolResult>;

    /// Execute with JSON parameters
    async fn execute(&self, params: Value, context: &ToolContext<'_>) -> Result<ToolResult> {
        let typed: Self::Params = serde_json::from_value(params)
            .map_err(|e| LensError::InvalidParams(format!("{}: {}", self.name(), e)))?;
        self.execute_typed(typed, context).await
    }
}

/// Object-safe view of a [`Tool`] with JSON parameters
#[async_trait]
trait ErasedTool: Send + Sync {
    fn tool_name(&self) -> &str;

    fn schema(&self) -> Value;

    async fn call(&self, params: Value, context: &ToolContext<'_>) -> Result<ToolResult>;
}

#[async_trait]
impl<T: Tool> ErasedTool for T {
    fn tool_name(&self) -> &str {
        self.name()
    }

    fn schema(&self) -> Value {
        self.parameters_schema()
    }

    async fn call(&self, params: Value, context: &ToolContext<'_>) -> Result<ToolResult> {
        self.execute(params, context).await
    }
}

/// Tools by name, in registration order
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn ErasedTool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in tool
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(AnalyzeHtmlTool);
        registry.register(AnalyzeUrlTool);
        registry.register(EstimateTokensTool);
        registry
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn schema(&self, name: &str) -> Option<Value> {
        self.tools.get(name).map(|tool| tool.schema())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name with JSON parameters
    pub async fn execute(&self, name: &str, params: Value, context: &ToolContext<'_>) -> Result<ToolResult> {
        let tool = self.tools.get(name).ok_or_else(|| LensError::ToolExecutionFailed {
            tool: name.to_string(),
            reason: "Tool not found".to_string(),
        })?;
        log::debug!("Executing tool {}", tool.tool_name());
        tool.call(params, context).await
    }
}
