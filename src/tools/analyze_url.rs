use crate::budget::{TierName, TokenBudgetOverrides};
use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the analyze_url tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeUrlParams {
    /// Page URL; a missing scheme defaults to https
    pub url: String,

    /// Budget tier to reduce the IR to (omit for the full IR)
    #[serde(default)]
    pub tier: Option<TierName>,

    /// Custom limits layered over the free tier; takes precedence over `tier`
    #[serde(default, alias = "customBudget")]
    pub custom_budget: Option<TokenBudgetOverrides>,
}

/// Tool for fetching a page and analyzing it
#[derive(Default)]
pub struct AnalyzeUrlTool;

#[async_trait::async_trait]
impl Tool for AnalyzeUrlTool {
    type Params = AnalyzeUrlParams;

    fn name(&self) -> &str {
        "analyze_url"
    }

    async fn execute_typed(&self, params: AnalyzeUrlParams, context: &ToolContext<'_>) -> Result<ToolResult> {
        match context
            .analyzer
            .analyze_url(&params.url, params.tier, params.custom_budget)
            .await
        {
            Ok(report) => Ok(ToolResult::success_with(serde_json::to_value(&report)?)),
            Err(e) => {
                log::warn!("analyze_url {} failed: {}", params.url, e);
                Ok(ToolResult::failure(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, LensError};
    use crate::fetch::{FetchedPage, Fetcher};
    use crate::pipeline::Analyzer;
    use std::sync::Arc;

    struct ProtectedSite;

    #[async_trait::async_trait]
    impl Fetcher for ProtectedSite {
        async fn fetch(&self, url: &str) -> Result<FetchedPage> {
            if url.contains("private") {
                return Err(LensError::UpstreamFailure("403 Forbidden".to_string()));
            }
            let html = "<html><body><main><h1>Open</h1></main></body></html>".to_string();
            Ok(FetchedPage {
                content_length: html.len(),
                html,
                final_url: url.to_string(),
                status_code: 200,
            })
        }

        async fn fetch_text(&self, _url: &str) -> Result<String> {
            Ok(String::new())
        }
    }

    fn analyzer() -> Analyzer {
        Analyzer::default().with_fetcher(Arc::new(ProtectedSite))
    }

    #[tokio::test]
    async fn test_analyze_url() {
        let analyzer = analyzer();
        let result = AnalyzeUrlTool
            .execute_typed(
                AnalyzeUrlParams {
                    url: "open.test".to_string(),
                    tier: Some(TierName::Basic),
                    custom_budget: None,
                },
                &ToolContext::new(&analyzer),
            )
            .await
            .unwrap();

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["ir"]["tree"][0]["tag"], "main");
        assert!(data["reduction"].is_object());
    }

    #[tokio::test]
    async fn test_upstream_failure_is_reported() {
        let analyzer = analyzer();
        let result = AnalyzeUrlTool
            .execute_typed(
                AnalyzeUrlParams {
                    url: "https://open.test/private".to_string(),
                    tier: None,
                    custom_budget: None,
                },
                &ToolContext::new(&analyzer),
            )
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.kind, Some(ErrorKind::UpstreamFailure));
        assert!(result.error.unwrap().contains("403"));
    }
}
