//! Block-level parsing.
//!
//! The block pass is rule-driven: [`BlockRule`] names each recognizable
//! block opener, [`match_rule`] turns a source position into a
//! [`RuleMatch`], and [`BlockParser`] owns the dispatch loop plus one
//! handler per rule:
//! - Blank lines and thematic breaks
//! - ATX and setext headings
//! - Fenced and indented code blocks
//! - Block quotes (with lazy continuation)
//! - Lists (with tight/loose detection)
//! - Link reference definitions
//! - Raw HTML blocks

mod html;
mod list;
mod parser;
mod rule;

pub use html::HtmlKind;
pub use parser::BlockParser;
pub use rule::{BlockRule, DEFAULT_RULES, MatchKind, RuleMatch, match_rule};
