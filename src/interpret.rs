//! Interpretation collaborator
//!
//! The model-backed step that reads a [`PageIr`] and describes the page's
//! intent. Providers live outside this crate; they implement [`Interpreter`]
//! and their errors are surfaced unchanged, never retried.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::analysis::StructuralAnalysis;
use crate::budget::ReductionReport;
use crate::error::Result;
use crate::ir::PageIr;

/// Role the interpreter assigned to a node or section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SectionInterpretation {
    pub document_order: u32,
    pub role: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Interpretation {
    pub layout_intent: String,

    #[serde(default)]
    pub sections: Vec<SectionInterpretation>,

    #[serde(default)]
    pub animations: Vec<String>,

    #[serde(default)]
    pub responsive_hints: Vec<String>,
}

#[async_trait]
pub trait Interpreter: Send + Sync {
    /// Interpret a page IR with the given model
    async fn interpret(&self, ir: &PageIr, model: &str) -> Result<Interpretation>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleSource {
    Interpreter,
    Heuristic,
}

/// Final role of a node after merging both sources
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MergedRole {
    pub document_order: u32,
    pub role: String,
    pub source: RoleSource,
}

/// IR plus everything derived from it for one request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub ir: PageIr,

    #[serde(default, skip_serializing_if = "Option::is_none", skip_deserializing)]
    pub reduction: Option<ReductionReport>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<Interpretation>,
}

impl AnalysisReport {
    pub fn new(ir: PageIr) -> Self {
        Self {
            ir,
            reduction: None,
            interpretation: None,
        }
    }

    /// Builder method: record the budget reduction that produced the IR
    pub fn with_reduction(mut self, reduction: ReductionReport) -> Self {
        self.reduction = Some(reduction);
        self
    }

    /// Builder method: attach an interpretation
    pub fn with_interpretation(mut self, interpretation: Interpretation) -> Self {
        self.interpretation = Some(interpretation);
        self
    }

    pub fn structural(&self) -> &StructuralAnalysis {
        &self.ir.structural
    }

    /// Heuristic roles overlaid with interpreter roles, in document order.
    /// The interpreter wins wherever both name the same node.
    pub fn merged_roles(&self) -> Vec<MergedRole> {
        let mut merged: IndexMap<u32, MergedRole> = IndexMap::new();

        for role in self.ir.structural.roles.iter().flatten() {
            let name = serde_json::to_value(role.role)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            merged.insert(
                role.document_order,
                MergedRole {
                    document_order: role.document_order,
                    role: name,
                    source: RoleSource::Heuristic,
                },
            );
        }

        if let Some(interpretation) = &self.interpretation {
            for section in &interpretation.sections {
                merged.insert(
                    section.document_order,
                    MergedRole {
                        document_order: section.document_order,
                        role: section.role.clone(),
                        source: RoleSource::Interpreter,
                    },
                );
            }
        }

        merged.sort_keys();
        merged.into_values().collect()
    }
}

/// Run an interpreter over the report's IR and attach its result
pub async fn interpret_report<I: Interpreter + ?Sized>(
    interpreter: &I,
    report: AnalysisReport,
    model: &str,
) -> Result<AnalysisReport> {
    let interpretation = interpreter.interpret(&report.ir, model).await?;
    log::debug!(
        "Interpreter {} returned {} sections",
        model,
        interpretation.sections.len()
    );
    Ok(report.with_interpretation(interpretation))
}
