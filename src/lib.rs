//! blockmark: block-level Markdown parsing to a structured token tree
//!
//! This crate implements the block pass of a CommonMark-style parser: it
//! turns a raw document into headings, paragraphs, lists, block quotes,
//! code blocks, raw HTML blocks and link reference definitions, and leaves
//! inline parsing (emphasis, links, code spans) to the caller.
//!
//! # Design
//! - Rule-driven dispatch: a fixed, ordered rule list decides which block
//!   opens at each line start; handlers may decline and fall back to
//!   paragraph text, so every input parses
//! - Containers re-parse their collected text through child states with
//!   swappable rule lists, and nesting depth is capped
//! - The token tree is generic over the caller's inline node type; leaf
//!   text stays raw until a final tree walk hands it to an inline parser
//!
//! # Example
//! ```
//! use blockmark::Token;
//!
//! let doc = blockmark::parse_blocks::<String>("# Hello\n\nWorld\n");
//! assert!(matches!(doc.tokens()[0], Token::Heading { level: 1, .. }));
//!
//! // expand leaf text with any inline parser
//! let tokens = doc.into_tokens(|text, _env| vec![text.to_string()]);
//! assert_eq!(tokens.len(), 3);
//! ```

pub mod block;
pub mod limits;
pub mod link_ref;
pub mod range;
pub mod token;
pub mod walk;

mod state;
mod text;

// Re-export primary types
pub use block::{BlockParser, BlockRule, DEFAULT_RULES, HtmlKind, MatchKind, RuleMatch};
pub use link_ref::{Environment, LinkRefDef, normalize_label};
pub use range::Range;
pub use state::BlockState;
pub use token::{Content, Token};
pub use walk::{Document, ParagraphPolicy, ParentAttrs, Walk, demote_tight_paragraphs};

/// Parser options.
#[derive(Debug, Clone)]
pub struct Options {
    /// Rules active when re-parsing block quote content.
    pub block_quote_rules: Vec<BlockRule>,
    /// Rules active when re-parsing list item content.
    pub list_rules: Vec<BlockRule>,
    /// Container nesting depth cap; deeper markers stay literal text.
    pub max_nested_level: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            block_quote_rules: DEFAULT_RULES.to_vec(),
            list_rules: DEFAULT_RULES.to_vec(),
            max_nested_level: limits::DEFAULT_MAX_NESTED_LEVEL,
        }
    }
}

/// Parse a document into its block token tree.
///
/// This is the primary API for simple use cases. Leaf text is still raw;
/// expand it through [`Document::walk`] or [`Document::into_tokens`].
///
/// # Example
/// ```
/// let doc = blockmark::parse_blocks::<String>("[here]: /url\n");
/// assert!(doc.env().contains_link_ref("here"));
/// ```
pub fn parse_blocks<I>(input: &str) -> Document<I> {
    BlockParser::new().parse_document(input)
}

/// Parse a document with custom options.
pub fn parse_blocks_with_options<I>(input: &str, options: Options) -> Document<I> {
    BlockParser::with_options(options).parse_document(input)
}
