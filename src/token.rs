//! Block-level token tree.
//!
//! The block pass produces a tree of [`Token`]s whose leaf text is plain
//! source text. Inline parsing happens later, during a tree walk, which
//! swaps each leaf's [`Content::Text`] for [`Content::Inline`] nodes of the
//! caller's choosing. The tree is generic over that inline node type `I`.

/// Leaf text, either still raw or already expanded by an inline parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content<I> {
    /// Source text not yet handed to an inline parser.
    Text(String),
    /// Inline nodes produced by the caller's inline parser.
    Inline(Vec<I>),
}

impl<I> Default for Content<I> {
    fn default() -> Self {
        Content::Text(String::new())
    }
}

impl<I> Content<I> {
    /// The raw text, if inline expansion has not happened yet.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            Content::Inline(_) => None,
        }
    }

    /// The inline nodes, once expanded.
    pub fn as_inline(&self) -> Option<&[I]> {
        match self {
            Content::Text(_) => None,
            Content::Inline(nodes) => Some(nodes),
        }
    }
}

/// A block-level node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<I> {
    /// One or more consecutive blank lines.
    BlankLine,
    /// Thematic break (horizontal rule).
    ThematicBreak,
    /// ATX or setext heading.
    Heading {
        /// Heading text.
        content: Content<I>,
        /// Heading level (1-6).
        level: u8,
    },
    /// Prose; consecutive plain lines merge into one paragraph.
    Paragraph {
        /// Paragraph text, newline-separated.
        content: Content<I>,
    },
    /// Paragraph-like text inside a tight list item.
    BlockText {
        /// Item text, newline-separated.
        content: Content<I>,
    },
    /// Indented or fenced code block.
    BlockCode {
        /// Code with indentation or fence markers stripped.
        raw: String,
        /// Info string of a fenced block (language identifier).
        info: Option<String>,
        /// Whether the block was fenced rather than indented.
        fenced: bool,
    },
    /// Raw HTML block passed through untouched.
    BlockHtml {
        /// Verbatim source lines, including the trailing newline.
        raw: String,
    },
    /// Block quote with fully re-parsed children.
    BlockQuote {
        /// Child blocks.
        children: Vec<Token<I>>,
    },
    /// Bullet or ordered list.
    List {
        /// List items (plus any trailing blank-line tokens).
        children: Vec<Token<I>>,
        /// Whether the markers were ordinals rather than bullets.
        ordered: bool,
        /// Starting ordinal, when ordered and different from 1.
        start: Option<u32>,
        /// Nesting depth of this list (outermost is 0).
        depth: usize,
        /// Whether the list is tight (no blank line between or inside items).
        tight: bool,
    },
    /// A single list item.
    ListItem {
        /// Child blocks of the item.
        children: Vec<Token<I>>,
        /// Nesting depth inherited from the owning list.
        depth: usize,
        /// Tightness inherited from the owning list.
        tight: bool,
    },
}

impl<I> Token<I> {
    /// Whether this token is a blank-line marker.
    pub fn is_blank_line(&self) -> bool {
        matches!(self, Token::BlankLine)
    }

    /// Child tokens of a container, if this is one.
    pub fn children(&self) -> Option<&[Token<I>]> {
        match self {
            Token::BlockQuote { children }
            | Token::List { children, .. }
            | Token::ListItem { children, .. } => Some(children),
            _ => None,
        }
    }
}
