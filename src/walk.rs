//! Tree walk and inline delegation.
//!
//! Block parsing leaves leaf text untouched. [`Document`] holds that frozen
//! block tree together with the collected link definitions; walking it hands
//! every text leaf to a caller-supplied inline parser and recurses into
//! containers. The walk is where tight lists take effect: right after a
//! paragraph inside a list is expanded, the paragraph policy may demote it
//! to block text so a renderer skips the wrapping block.

use std::mem;
use std::vec;

use crate::link_ref::Environment;
use crate::token::{Content, Token};

/// Characters stripped from leaf text before inline parsing.
const INLINE_TRIM: &[char] = &[' ', '\r', '\n', '\t', '\u{000c}'];

/// Attributes a list or list item passes down to its children during the
/// walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentAttrs {
    /// Tightness of the owning list.
    pub tight: bool,
    /// Nesting depth of the owning list.
    pub depth: usize,
}

/// Hook applied to each token carrying parent attributes, right after its
/// text is expanded.
pub type ParagraphPolicy<I> = fn(&mut Token<I>, ParentAttrs);

/// Default paragraph policy: paragraphs inside a tight list become block
/// text.
pub fn demote_tight_paragraphs<I>(token: &mut Token<I>, parent: ParentAttrs) {
    if !parent.tight {
        return;
    }
    if let Token::Paragraph { content } = token {
        *token = Token::BlockText {
            content: mem::take(content),
        };
    }
}

/// A parsed document: the block token tree plus the environment collected
/// while parsing it.
#[derive(Debug)]
pub struct Document<I> {
    tokens: Vec<Token<I>>,
    env: Environment,
}

impl<I> Document<I> {
    pub(crate) fn new(tokens: Vec<Token<I>>, env: Environment) -> Self {
        Self { tokens, env }
    }

    /// The block tokens, with leaf text still unexpanded.
    pub fn tokens(&self) -> &[Token<I>] {
        &self.tokens
    }

    /// The link reference definitions collected during parsing.
    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn into_parts(self) -> (Vec<Token<I>>, Environment) {
        (self.tokens, self.env)
    }

    /// Lazily expand the tree with `inline`, yielding one finished
    /// top-level token at a time.
    pub fn walk<F>(self, inline: F) -> Walk<I, F>
    where
        F: FnMut(&str, &Environment) -> Vec<I>,
    {
        self.walk_with(inline, demote_tight_paragraphs)
    }

    /// Like [`Document::walk`] with a custom paragraph policy.
    pub fn walk_with<F>(self, inline: F, policy: ParagraphPolicy<I>) -> Walk<I, F>
    where
        F: FnMut(&str, &Environment) -> Vec<I>,
    {
        Walk {
            tokens: self.tokens.into_iter(),
            env: self.env,
            inline,
            policy,
        }
    }

    /// Expand the whole tree and return it.
    pub fn into_tokens<F>(self, inline: F) -> Vec<Token<I>>
    where
        F: FnMut(&str, &Environment) -> Vec<I>,
    {
        self.walk(inline).collect()
    }

    /// Feed the lazy traversal to a renderer and return its output.
    pub fn render<F, R, O>(self, inline: F, renderer: R) -> O
    where
        F: FnMut(&str, &Environment) -> Vec<I>,
        R: FnOnce(Walk<I, F>) -> O,
    {
        renderer(self.walk(inline))
    }
}

/// Lazy depth-first traversal over a [`Document`]'s top-level tokens.
///
/// Each yielded token has its whole subtree expanded; the rest of the
/// document is untouched until the iterator advances.
pub struct Walk<I, F> {
    tokens: vec::IntoIter<Token<I>>,
    env: Environment,
    inline: F,
    policy: ParagraphPolicy<I>,
}

impl<I, F> Walk<I, F> {
    /// The environment inline parsing reads from.
    pub fn env(&self) -> &Environment {
        &self.env
    }
}

impl<I, F> Iterator for Walk<I, F>
where
    F: FnMut(&str, &Environment) -> Vec<I>,
{
    type Item = Token<I>;

    fn next(&mut self) -> Option<Token<I>> {
        let mut token = self.tokens.next()?;
        expand_token(&mut token, None, &self.env, &mut self.inline, self.policy);
        Some(token)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.tokens.size_hint()
    }
}

fn expand_token<I, F>(
    token: &mut Token<I>,
    parent: Option<ParentAttrs>,
    env: &Environment,
    inline: &mut F,
    policy: ParagraphPolicy<I>,
) where
    F: FnMut(&str, &Environment) -> Vec<I>,
{
    match token {
        Token::BlockQuote { children } => {
            // quote children render as full blocks, no attributes passed
            for child in children {
                expand_token(child, None, env, inline, policy);
            }
        }
        Token::List {
            children,
            depth,
            tight,
            ..
        } => {
            let attrs = ParentAttrs {
                tight: *tight,
                depth: *depth,
            };
            for child in children {
                expand_token(child, Some(attrs), env, inline, policy);
            }
        }
        Token::ListItem {
            children,
            depth,
            tight,
        } => {
            let attrs = ParentAttrs {
                tight: *tight,
                depth: *depth,
            };
            for child in children {
                expand_token(child, Some(attrs), env, inline, policy);
            }
        }
        Token::Heading { content, .. }
        | Token::Paragraph { content }
        | Token::BlockText { content } => expand_content(content, env, inline),
        Token::BlankLine
        | Token::ThematicBreak
        | Token::BlockCode { .. }
        | Token::BlockHtml { .. } => {}
    }
    if let Some(attrs) = parent {
        policy(token, attrs);
    }
}

fn expand_content<I, F>(content: &mut Content<I>, env: &Environment, inline: &mut F)
where
    F: FnMut(&str, &Environment) -> Vec<I>,
{
    if let Content::Text(text) = content {
        let nodes = inline(text.trim_matches(INLINE_TRIM), env);
        *content = Content::Inline(nodes);
    }
}
