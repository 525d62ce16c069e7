//! Mutable state for one block-parsing pass.
//!
//! A [`BlockState`] owns the text being scanned, a cursor into it, and the
//! tokens produced so far. Container handlers (block quotes, lists) strip
//! their markers, then re-parse the stripped text through a child state at
//! one greater nesting depth.

use std::borrow::Cow;

use crate::text;
use crate::token::{Content, Token};

/// Parse state: source text, cursor, and output tokens.
pub struct BlockState<'s, I> {
    src: Cow<'s, str>,
    cursor: usize,
    tokens: Vec<Token<I>>,
    depth: usize,
}

impl<'s, I> BlockState<'s, I> {
    /// State over borrowed document text, at depth 0.
    pub fn new(src: &'s str) -> Self {
        Self {
            src: Cow::Borrowed(src),
            cursor: 0,
            tokens: Vec::new(),
            depth: 0,
        }
    }

    /// State over text a container handler assembled, one level deeper.
    pub(crate) fn child(src: String, depth: usize) -> BlockState<'static, I> {
        BlockState {
            src: Cow::Owned(src),
            cursor: 0,
            tokens: Vec::new(),
            depth,
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    /// Nesting depth of this state (document level is 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn set_cursor(&mut self, pos: usize) {
        debug_assert!(pos >= self.cursor, "cursor moved backwards");
        debug_assert!(pos <= self.src.len());
        self.cursor = pos;
    }

    pub(crate) fn is_done(&self) -> bool {
        self.cursor >= self.src.len()
    }

    /// Position just past the newline ending the current line.
    pub(crate) fn find_line_end(&self) -> usize {
        text::line_end(&self.src, self.cursor)
    }

    /// Text from the cursor up to `end`.
    pub(crate) fn get_text(&self, end: usize) -> &str {
        &self.src[self.cursor..end]
    }

    pub fn tokens(&self) -> &[Token<I>] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token<I>> {
        self.tokens
    }

    pub(crate) fn last_token(&self) -> Option<&Token<I>> {
        self.tokens.last()
    }

    pub(crate) fn pop_token(&mut self) -> Option<Token<I>> {
        self.tokens.pop()
    }

    pub(crate) fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub(crate) fn append_token(&mut self, token: Token<I>) {
        self.tokens.push(token);
    }

    /// Insert a token at an absolute position in the stream. Used when a
    /// container must land before blocks that were parsed while scanning
    /// its tail.
    pub(crate) fn insert_token(&mut self, index: usize, token: Token<I>) {
        self.tokens.insert(index, token);
    }

    /// Insert a token just before the most recently appended one.
    ///
    /// Used when a container is cut short by a sibling block: the sibling
    /// has already been appended, and the container belongs before it.
    pub(crate) fn prepend_token(&mut self, token: Token<I>) {
        debug_assert!(!self.tokens.is_empty());
        let at = self.tokens.len().saturating_sub(1);
        self.tokens.insert(at, token);
    }

    /// Add `src[from..to]` as paragraph text, merging into a directly
    /// preceding paragraph token.
    pub(crate) fn add_paragraph(&mut self, from: usize, to: usize) {
        let Self { src, tokens, .. } = self;
        let text = &src[from..to];
        if let Some(Token::Paragraph {
            content: Content::Text(para),
        }) = tokens.last_mut()
        {
            para.push_str(text);
        } else {
            tokens.push(Token::Paragraph {
                content: Content::Text(text.to_string()),
            });
        }
    }

    /// If the last token is a paragraph, absorb the current line into it and
    /// return the line's end. The cursor is left for the caller to advance.
    pub(crate) fn append_paragraph(&mut self) -> Option<usize> {
        let pos = self.find_line_end();
        let Self {
            src,
            tokens,
            cursor,
            ..
        } = self;
        if let Some(Token::Paragraph {
            content: Content::Text(para),
        }) = tokens.last_mut()
        {
            para.push_str(&src[*cursor..pos]);
            Some(pos)
        } else {
            None
        }
    }
}

impl<I> std::fmt::Debug for BlockState<'_, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockState")
            .field("cursor", &self.cursor)
            .field("len", &self.src.len())
            .field("depth", &self.depth)
            .field("tokens", &self.tokens.len())
            .finish()
    }
}
