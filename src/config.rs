use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{LensError, Result};
use crate::normalize::stylesheets::MAX_STYLESHEETS;

/// Optional analyzer extensions that can be switched on or off per deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerCapabilities {
    /// Attach an inferred visual role to every node
    pub role_inference: bool,
}

impl Default for AnalyzerCapabilities {
    fn default() -> Self {
        Self { role_inference: true }
    }
}

/// Options that bound the work done for a single analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerOptions {
    /// Raw HTML larger than this is rejected before parsing
    pub max_html_bytes: usize,

    /// Below this much body text (and without structural tags) the page is
    /// assumed to need script execution
    pub min_body_text_chars: usize,

    /// Maximum number of external stylesheets fetched per page, at most
    /// [`MAX_STYLESHEETS`]
    pub max_stylesheets: usize,

    /// Per-stylesheet fetch timeout in milliseconds
    pub stylesheet_timeout_ms: u64,

    /// Maximum number of top-level nodes taken from `<body>`
    pub max_root_nodes: usize,

    /// Depth at which nodes are kept as leaves
    pub max_depth: usize,

    /// Page fetch timeout in milliseconds
    pub fetch_timeout_ms: u64,

    /// Redirects followed before a fetch fails
    pub max_redirects: usize,

    /// Largest response body accepted from upstream
    pub max_response_bytes: usize,

    /// User agent sent with every request
    pub user_agent: String,

    pub capabilities: AnalyzerCapabilities,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            max_html_bytes: 5 * 1024 * 1024,
            min_body_text_chars: 50,
            max_stylesheets: MAX_STYLESHEETS,
            stylesheet_timeout_ms: 5_000,
            max_root_nodes: 200,
            max_depth: 12,
            fetch_timeout_ms: 15_000,
            max_redirects: 5,
            max_response_bytes: 5 * 1024 * 1024,
            user_agent: format!("sitelens/{}", env!("CARGO_PKG_VERSION")),
            capabilities: AnalyzerCapabilities::default(),
        }
    }
}

impl AnalyzerOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the raw HTML size ceiling
    pub fn max_html_bytes(mut self, bytes: usize) -> Self {
        self.max_html_bytes = bytes;
        self
    }

    /// Builder method: set the script-rendered page threshold
    pub fn min_body_text_chars(mut self, chars: usize) -> Self {
        self.min_body_text_chars = chars;
        self
    }

    /// Builder method: set the external stylesheet cap, clamped to [`MAX_STYLESHEETS`]
    pub fn max_stylesheets(mut self, count: usize) -> Self {
        self.max_stylesheets = count.min(MAX_STYLESHEETS);
        self
    }

    /// Builder method: set the per-stylesheet timeout
    pub fn stylesheet_timeout(mut self, timeout: Duration) -> Self {
        self.stylesheet_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Builder method: set the root breadth cap
    pub fn max_root_nodes(mut self, count: usize) -> Self {
        self.max_root_nodes = count;
        self
    }

    /// Builder method: set the depth cap
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Builder method: set the page fetch timeout
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Builder method: set the redirect limit
    pub fn max_redirects(mut self, redirects: usize) -> Self {
        self.max_redirects = redirects;
        self
    }

    /// Builder method: set the user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Builder method: toggle role inference
    pub fn role_inference(mut self, enabled: bool) -> Self {
        self.capabilities.role_inference = enabled;
        self
    }

    /// Load options from a JSON file; missing fields keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| LensError::InvalidInput(format!("Cannot read {}: {}", path.display(), e)))?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn stylesheet_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.stylesheet_timeout_ms)
    }

    pub fn fetch_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
