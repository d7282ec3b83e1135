//! Token budget reduction
//!
//! Trims a page IR to a named tier or a custom budget:
//! - root breadth and per-node text are truncated
//! - repeated CSS values are replaced by short dictionary IDs
//! - auxiliary collections are capped
//! - the estimated token count is checked against the ceiling

pub mod config;
pub mod dictionary;
pub mod reducer;
pub mod tokens;

pub use config::{resolve_budget, TierName, TokenBudgetConfig, TokenBudgetOverrides, UNLIMITED};
pub use dictionary::{CssValueDictionary, ValueCategory};
pub use reducer::{apply_budget, BudgetReducer, ReductionReport};
pub use tokens::{estimate_text_tokens, estimate_tokens};
