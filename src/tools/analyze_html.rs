use crate::budget::{TierName, TokenBudgetOverrides};
use crate::error::Result;
use crate::pipeline::AnalysisRequest;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the analyze_html tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeHtmlParams {
    /// Raw HTML of the page
    pub html: String,

    /// URL the page was served from
    #[serde(alias = "baseUrl")]
    pub base_url: String,

    /// Budget tier to reduce the IR to (omit for the full IR)
    #[serde(default)]
    pub tier: Option<TierName>,

    /// Custom limits layered over the free tier; takes precedence over `tier`
    #[serde(default, alias = "customBudget")]
    pub custom_budget: Option<TokenBudgetOverrides>,
}

impl From<AnalyzeHtmlParams> for AnalysisRequest {
    fn from(params: AnalyzeHtmlParams) -> Self {
        AnalysisRequest {
            html: params.html,
            base_url: params.base_url,
            tier: params.tier,
            custom_budget: params.custom_budget,
        }
    }
}

/// Tool for turning page markup into a structural IR
#[derive(Default)]
pub struct AnalyzeHtmlTool;

#[async_trait::async_trait]
impl Tool for AnalyzeHtmlTool {
    type Params = AnalyzeHtmlParams;

    fn name(&self) -> &str {
        "analyze_html"
    }

    async fn execute_typed(&self, params: AnalyzeHtmlParams, context: &ToolContext<'_>) -> Result<ToolResult> {
        let request = AnalysisRequest::from(params);
        match context.analyzer.analyze(&request).await {
            Ok(report) => Ok(ToolResult::success_with(serde_json::to_value(&report)?)),
            Err(e) => {
                log::warn!("analyze_html failed: {}", e);
                Ok(ToolResult::failure(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pipeline::Analyzer;

    const PAGE: &str = r#"<html lang="en"><head><title>Studio</title>
        <style>.hero { background-color: #112233; padding: 64px } .btn { color: #fff }</style>
        </head><body>
        <nav><ul><li><a href="/work">Work</a></li><li><a href="/about">About</a></li></ul></nav>
        <section class="hero"><h1>We build sites</h1><a class="btn primary" href="/contact">Talk to us</a></section>
        </body></html>"#;

    fn params(tier: Option<TierName>) -> AnalyzeHtmlParams {
        AnalyzeHtmlParams {
            html: PAGE.to_string(),
            base_url: "https://studio.test/".to_string(),
            tier,
            custom_budget: None,
        }
    }

    #[tokio::test]
    async fn test_analyze_html() {
        let analyzer = Analyzer::default();
        let result = AnalyzeHtmlTool
            .execute_typed(params(None), &ToolContext::new(&analyzer))
            .await
            .unwrap();

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["ir"]["metadata"]["title"], "Studio");
        assert_eq!(data["ir"]["language"], "en");
        assert_eq!(data["ir"]["navigation"]["items"][1]["href"], "https://studio.test/about");
        assert_eq!(data["ir"]["ctas"][0]["prominence"], "primary");
        assert!(data.get("reduction").is_none());
    }

    #[tokio::test]
    async fn test_analyze_html_with_tier() {
        let analyzer = Analyzer::default();
        let result = AnalyzeHtmlTool
            .execute_typed(params(Some(TierName::Free)), &ToolContext::new(&analyzer))
            .await
            .unwrap();

        let data = result.data.unwrap();
        assert!(data["reduction"]["estimatedTokens"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_bad_base_url_is_reported() {
        let analyzer = Analyzer::default();
        let mut params = params(None);
        params.base_url = "ftp://files.studio.test/".to_string();

        let result = AnalyzeHtmlTool
            .execute_typed(params, &ToolContext::new(&analyzer))
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.kind, Some(ErrorKind::InvalidInput));
    }

    #[test]
    fn test_params_accept_camel_case() {
        let params: AnalyzeHtmlParams = serde_json::from_value(serde_json::json!({
            "html": "<p>x</p>",
            "baseUrl": "https://a.test/",
            "customBudget": { "maxNodes": 5 }
        }))
        .unwrap();
        assert_eq!(params.custom_budget.unwrap().max_nodes, Some(5));
    }
}
