//! End-to-end analysis: markup in, bounded IR out
//!
//! raw HTML → normalize → extract (resolving CSS) → analyze → reduce (when a
//! budget is requested) → [`AnalysisReport`]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

use crate::budget::{resolve_budget, BudgetReducer, TierName, TokenBudgetOverrides};
use crate::config::AnalyzerOptions;
use crate::error::{LensError, Result};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::interpret::AnalysisReport;
use crate::ir::{IrAssembler, PageIr};
use crate::normalize::{fetch_stylesheets, stylesheet_links, Normalizer};
use crate::utils::normalize_url;

/// One analysis request
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub html: String,

    /// URL the page was served from; relative references resolve against it
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<TierName>,

    /// Partial budget layered over the `free` tier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_budget: Option<TokenBudgetOverrides>,
}

impl AnalysisRequest {
    pub fn new(html: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            base_url: base_url.into(),
            tier: None,
            custom_budget: None,
        }
    }

    /// Builder method: set the budget tier
    pub fn with_tier(mut self, tier: TierName) -> Self {
        self.tier = Some(tier);
        self
    }

    /// Builder method: set a custom budget
    pub fn with_custom_budget(mut self, budget: TokenBudgetOverrides) -> Self {
        self.custom_budget = Some(budget);
        self
    }
}

/// Parse a page URL, adding a missing scheme; only http(s) is accepted
pub fn parse_base_url(url: &str) -> Result<Url> {
    if url.trim().is_empty() {
        return Err(LensError::InvalidInput("Base URL is empty".to_string()));
    }
    let parsed = Url::parse(&normalize_url(url))
        .map_err(|e| LensError::InvalidInput(format!("Invalid URL '{}': {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(LensError::InvalidInput(format!("Unsupported protocol '{}'", scheme))),
    }
}

/// Runs the pipeline with one set of options
#[derive(Clone)]
pub struct Analyzer {
    options: AnalyzerOptions,
    fetcher: Option<Arc<dyn Fetcher>>,
    default_tier: Option<TierName>,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("options", &self.options)
            .field("fetcher", &self.fetcher.is_some())
            .field("default_tier", &self.default_tier)
            .finish()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerOptions::default())
    }
}

impl Analyzer {
    /// Analyzer without network access; linked stylesheets are ignored
    pub fn new(options: AnalyzerOptions) -> Self {
        Self {
            options,
            fetcher: None,
            default_tier: None,
        }
    }

    /// Analyzer with a reqwest-backed fetcher built from the options
    pub fn with_http(options: AnalyzerOptions) -> Result<Self> {
        let fetcher = HttpFetcher::new(&options)?;
        Ok(Self::new(options).with_fetcher(Arc::new(fetcher)))
    }

    /// Builder method: set the fetcher used for pages and stylesheets
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Builder method: set the tier used when a request names neither a tier
    /// nor a custom budget
    pub fn with_default_tier(mut self, tier: Option<TierName>) -> Self {
        self.default_tier = tier;
        self
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    pub fn has_fetcher(&self) -> bool {
        self.fetcher.is_some()
    }

    /// Analyze markup, fetching linked stylesheets when a fetcher is set
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport> {
        let base = parse_base_url(&request.base_url)?;
        Normalizer::new(&self.options).check_size(&request.html)?;

        let external_css = match &self.fetcher {
            Some(fetcher) => {
                let links = stylesheet_links(&request.html, &base, self.options.max_stylesheets);
                fetch_stylesheets(
                    fetcher.as_ref(),
                    &links,
                    self.options.stylesheet_timeout_duration(),
                )
                .await
            }
            None => Vec::new(),
        };

        self.build(request, &base, &external_css)
    }

    /// Analyze markup with inline `<style>` blocks only
    pub fn analyze_offline(&self, request: &AnalysisRequest) -> Result<AnalysisReport> {
        let base = parse_base_url(&request.base_url)?;
        self.build(request, &base, &[])
    }

    /// Fetch a page and analyze it against its final URL
    pub async fn analyze_url(
        &self,
        url: &str,
        tier: Option<TierName>,
        custom_budget: Option<TokenBudgetOverrides>,
    ) -> Result<AnalysisReport> {
        let fetcher = self
            .fetcher
            .as_ref()
            .ok_or_else(|| LensError::InvalidInput("No fetcher configured for URL analysis".to_string()))?;

        let page = fetcher.fetch(&normalize_url(url)).await?;
        log::info!(
            "Fetched {} ({} bytes, status {})",
            page.final_url,
            page.content_length,
            page.status_code
        );

        let request = AnalysisRequest {
            html: page.html,
            base_url: page.final_url,
            tier,
            custom_budget,
        };
        self.analyze(&request).await
    }

    /// Build the unreduced IR
    pub fn page_ir(&self, html: &str, base: &Url, external_css: &[String]) -> Result<PageIr> {
        let normalized = Normalizer::new(&self.options).normalize(html, base, external_css)?;
        Ok(IrAssembler::new(&self.options).assemble(html, base, normalized))
    }

    fn build(&self, request: &AnalysisRequest, base: &Url, external_css: &[String]) -> Result<AnalysisReport> {
        let mut ir = self.page_ir(&request.html, base, external_css)?;

        let tier = request.tier.or(self.default_tier);
        let Some(budget) = resolve_budget(tier, request.custom_budget.as_ref()) else {
            return Ok(AnalysisReport::new(ir));
        };
        let reduction = BudgetReducer::new(budget).reduce(&mut ir)?;
        Ok(AnalysisReport::new(ir).with_reduction(reduction))
    }
}
