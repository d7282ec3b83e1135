use crate::budget::{estimate_tokens, BudgetReducer, TierName, TokenBudgetOverrides, UNLIMITED};
use crate::error::{LensError, Result};
use crate::ir::PageIr;
use crate::pipeline::AnalysisRequest;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the estimate_tokens tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EstimateTokensParams {
    /// Raw HTML of the page
    pub html: String,

    /// URL the page was served from
    #[serde(alias = "baseUrl")]
    pub base_url: String,
}

/// Size of the IR after reducing it to one tier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TierEstimate {
    pub tier: TierName,
    pub estimated_tokens: usize,
    pub max_tokens: i64,
    pub fits: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenEstimate {
    pub total_nodes: usize,
    pub unreduced_tokens: usize,
    pub tiers: Vec<TierEstimate>,
}

/// Estimate the IR size for every tier without failing on the ceiling
pub fn estimate_for_tiers(ir: &PageIr) -> Result<TokenEstimate> {
    let mut tiers = Vec::with_capacity(TierName::ALL.len());
    for tier in TierName::ALL {
        let config = tier.config();
        let mut reduced = ir.clone();
        let (report, fits) = match BudgetReducer::new(config).reduce(&mut reduced) {
            Ok(report) => (report, true),
            Err(LensError::PayloadTooLarge(_)) => {
                let uncapped = config.with_overrides(&TokenBudgetOverrides {
                    max_tokens: Some(UNLIMITED),
                    ..Default::default()
                });
                let mut reduced = ir.clone();
                (BudgetReducer::new(uncapped).reduce(&mut reduced)?, false)
            }
            Err(e) => return Err(e),
        };
        tiers.push(TierEstimate {
            tier,
            estimated_tokens: report.estimated_tokens,
            max_tokens: config.max_tokens,
            fits,
        });
    }

    Ok(TokenEstimate {
        total_nodes: ir.total_nodes,
        unreduced_tokens: estimate_tokens(ir)?,
        tiers,
    })
}

/// Tool for sizing a page's IR against every tier
#[derive(Default)]
pub struct EstimateTokensTool;

#[async_trait::async_trait]
impl Tool for EstimateTokensTool {
    type Params = EstimateTokensParams;

    fn name(&self) -> &str {
        "estimate_tokens"
    }

    async fn execute_typed(&self, params: EstimateTokensParams, context: &ToolContext<'_>) -> Result<ToolResult> {
        let request = AnalysisRequest::new(params.html, params.base_url);
        let report = match context.analyzer.analyze(&request).await {
            Ok(report) => report,
            Err(e) => return Ok(ToolResult::failure(&e)),
        };
        let estimate = estimate_for_tiers(&report.ir)?;
        Ok(ToolResult::success_with(serde_json::to_value(&estimate)?))
    }
}
