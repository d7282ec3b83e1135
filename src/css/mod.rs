//! CSS handling
//!
//! - CssClassDictionary: class rules parsed from `<style>` blocks and linked stylesheets
//! - resolve_css: class rules + inline style merged into one property map per element
//! - ColorCounter / CssInfo: page-level color usage and stylesheet overview

pub mod colors;
pub mod info;
pub mod resolver;
pub mod stylesheet;

pub use colors::{ColorCounter, ColorUsage};
pub use info::{CssClassSummary, CssInfo};
pub use resolver::{parse_inline_style, resolve_css, ResolvedCss};
pub use stylesheet::{parse_declarations, CssClassDictionary, CssClassRule};
