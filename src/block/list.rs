//! List assembly.
//!
//! A list match only covers its first marker line. This module consumes the
//! following lines item by item, deciding for each one whether it continues
//! the current item, opens a sibling item, or belongs to a block that ends
//! the list, then parses every item's collected text with a child state.

use crate::Range;
use crate::block::parser::{BlockParser, RuleList};
use crate::block::rule::{self, BlockRule, RuleMatch};
use crate::link_ref::Environment;
use crate::state::BlockState;
use crate::text;
use crate::token::Token;

/// Captured pieces of a list marker line.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ListSpan {
    /// Spaces before the marker.
    pub leading: Range,
    /// The marker itself.
    pub marker: Range,
    /// Rest of the line, excluding the newline.
    pub text: Range,
}

/// Blocks that end the list when found at an item boundary, tried in order
/// after the thematic-break and sibling-marker checks.
const LIST_BREAK_RULES: &[BlockRule] = &[
    BlockRule::FencedCode,
    BlockRule::AtxHeading,
    BlockRule::BlockQuote,
    BlockRule::BlockHtml,
    BlockRule::List,
];

/// What an unconsumed line at an item boundary turned out to be.
enum Boundary {
    /// Next item of the same list.
    Sibling(ListSpan),
    /// A block that ends the list; dispatched into the parent state.
    Break(RuleMatch),
    /// Nothing special, candidate for lazy continuation.
    Plain,
}

/// Assemble a list from its first marker match.
///
/// Returns the position parsing should resume from, or `None` when an open
/// paragraph absorbed the marker line instead.
pub(crate) fn parse_list<I>(
    block: &BlockParser,
    state: &mut BlockState<'_, I>,
    env: &mut Environment,
    span: ListSpan,
    ordinal: Option<u32>,
    marker_line_end: usize,
) -> Option<usize> {
    if span.text.slice(state.src()).trim().is_empty() {
        // an empty item cannot interrupt an open paragraph
        if let Some(end) = state.append_paragraph() {
            return Some(end);
        }
    }

    let ordered = ordinal.is_some();
    let mut start = None;
    if let Some(n) = ordinal {
        if n != 1 {
            // only lists starting at 1 may interrupt a paragraph
            if let Some(end) = state.append_paragraph() {
                return Some(end);
            }
            start = Some(n);
        }
    }

    let depth = state.depth();
    let filtered: RuleList;
    let rules: &[BlockRule] = if depth >= block.max_nested_level().saturating_sub(1) {
        filtered = block
            .list_rules()
            .iter()
            .copied()
            .filter(|&r| r != BlockRule::List)
            .collect();
        &filtered
    } else {
        block.list_rules()
    };

    let bullet = state.src().as_bytes()[span.marker.end_usize() - 1];
    state.set_cursor(marker_line_end);

    let mut item_children: Vec<Vec<Token<I>>> = Vec::new();
    let mut tight = true;
    let mut end_pos: Option<(usize, usize)> = None;
    let mut next = Some(span);
    while let Some(current) = next {
        next = parse_list_item(
            block,
            state,
            env,
            current,
            bullet,
            rules,
            &mut item_children,
            &mut tight,
            &mut end_pos,
        );
    }

    let children = item_children
        .into_iter()
        .map(|children| Token::ListItem {
            children,
            depth,
            tight,
        })
        .collect();
    let token = Token::List {
        children,
        ordered,
        start,
        depth,
        tight,
    };
    if let Some((index, end)) = end_pos {
        state.insert_token(index, token);
        return Some(end);
    }
    state.append_token(token);
    Some(state.cursor())
}

/// Consume the lines of one item, parse its text, and push the resulting
/// child tokens. Returns the span of the next sibling item when one was
/// found.
#[allow(clippy::too_many_arguments)]
fn parse_list_item<I>(
    block: &BlockParser,
    state: &mut BlockState<'_, I>,
    env: &mut Environment,
    span: ListSpan,
    bullet: u8,
    rules: &[BlockRule],
    item_children: &mut Vec<Vec<Token<I>>>,
    tight: &mut bool,
    end_pos: &mut Option<(usize, usize)>,
) -> Option<ListSpan> {
    let leading_width = (span.leading.len() + span.marker.len()) as usize;
    let (mut item_text, continue_width) =
        compile_continue_width(span.text.slice(state.src()), leading_width);
    let first_empty = item_text.is_empty();

    // sibling markers keep the narrow cap; list-ending blocks widen theirs
    // to the marker width when the marker is indented past three columns
    let item_cap = leading_width.min(3);
    let break_cap = leading_width.max(3);

    let mut cont = String::new();
    let mut prev_blank = false;
    let mut next = None;

    while !state.is_done() {
        let cursor = state.cursor();
        let pos = state.find_line_end();
        if text::is_blank_line(state.get_text(pos)) {
            cont.push('\n');
            prev_blank = true;
            state.set_cursor(pos);
            continue;
        }

        let line = text::expand_leading_tab(state.get_text(pos), 4).into_owned();
        if line.len() >= continue_width
            && line.as_bytes()[..continue_width].iter().all(|&b| b == b' ')
        {
            // an item may begin with at most one blank line
            if prev_blank && first_empty && cont.trim().is_empty() {
                break;
            }
            cont.push_str(&text::expand_tab(&line[continue_width..]));
            prev_blank = false;
            state.set_cursor(pos);
            continue;
        }

        match scan_boundary(state.src(), cursor, bullet, item_cap, break_cap) {
            Boundary::Sibling(sibling) => {
                if prev_blank {
                    *tight = false;
                }
                next = Some(sibling);
                state.set_cursor(pos);
                break;
            }
            Boundary::Break(m) => {
                let index = state.token_count();
                if let Some(end) = block.dispatch(&m, state, env) {
                    *end_pos = Some((index, end));
                    break;
                }
                // the handler declined, keep the line as lazy text
                if prev_blank {
                    break;
                }
                cont.push_str(&line);
                state.set_cursor(pos);
            }
            Boundary::Plain => {
                // a blank line followed by ordinary text ends the item
                if prev_blank {
                    break;
                }
                cont.push_str(&line);
                state.set_cursor(pos);
            }
        }
    }

    item_text.push_str(&cont);
    let mut child = BlockState::child(item_text, state.depth() + 1);
    block.parse(&mut child, env, rules);
    let children = child.into_tokens();
    if *tight && has_internal_blank(&children) {
        *tight = false;
    }
    item_children.push(children);
    next
}

fn scan_boundary(src: &str, pos: usize, bullet: u8, item_cap: usize, break_cap: usize) -> Boundary {
    if let Some(m) = rule::match_rule_capped(BlockRule::ThematicBreak, src, pos, break_cap) {
        return Boundary::Break(m);
    }
    if let Some(span) = match_sibling_marker(src, pos, bullet, item_cap) {
        return Boundary::Sibling(span);
    }
    for &r in LIST_BREAK_RULES {
        if let Some(m) = rule::match_rule_capped(r, src, pos, break_cap) {
            return Boundary::Break(m);
        }
    }
    Boundary::Plain
}

/// Match the next marker of the same list kind: the same bullet byte, or
/// any ordinal with the same delimiter. The digit prefix may be empty.
fn match_sibling_marker(src: &str, pos: usize, bullet: u8, cap: usize) -> Option<ListSpan> {
    let bytes = src.as_bytes();
    let mut i = pos;
    while i - pos < cap && bytes.get(i) == Some(&b' ') {
        i += 1;
    }
    let marker_start = i;
    if matches!(bullet, b'.' | b')') {
        let mut digits = 0;
        while digits < 9 && bytes.get(i).is_some_and(|b| b.is_ascii_digit()) {
            i += 1;
            digits += 1;
        }
        if bytes.get(i) != Some(&bullet) {
            return None;
        }
        i += 1;
    } else {
        if bytes.get(i) != Some(&bullet) {
            return None;
        }
        i += 1;
    }
    match bytes.get(i) {
        None | Some(b'\n') | Some(b' ') | Some(b'\t') => {}
        _ => return None,
    }
    let line_end = text::line_end(src, i);
    let text_end = if line_end > i && bytes[line_end - 1] == b'\n' {
        line_end - 1
    } else {
        line_end
    };
    Some(ListSpan {
        leading: Range::from_usize(pos, marker_start),
        marker: Range::from_usize(marker_start, i),
        text: Range::from_usize(i, text_end),
    })
}

/// First-line item text and the column count continuation lines must be
/// indented by. Content indented five or more columns counts as one (it is
/// an indented code block relative to the item), as does an empty rest.
fn compile_continue_width(line_text: &str, leading_width: usize) -> (String, usize) {
    let once = text::expand_leading_tab(line_text, 3);
    let full = text::expand_tab(&once);
    let bytes = full.as_bytes();
    let mut spaces = 0;
    while bytes.get(spaces) == Some(&b' ') {
        spaces += 1;
    }
    let has_text = bytes
        .get(spaces)
        .is_some_and(|&b| !matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c));
    if has_text {
        let space_width = if spaces >= 5 { 1 } else { spaces };
        let mut item_text = full[space_width..].to_string();
        item_text.push('\n');
        (item_text, leading_width + space_width)
    } else {
        (String::new(), leading_width + 1)
    }
}

/// Blank lines strictly inside an item's parsed content make the whole
/// list loose. Leading and trailing blanks do not count.
fn has_internal_blank<I>(tokens: &[Token<I>]) -> bool {
    let Some(first) = tokens.iter().position(|t| !t.is_blank_line()) else {
        return false;
    };
    let Some(last) = tokens.iter().rposition(|t| !t.is_blank_line()) else {
        return false;
    };
    tokens[first..last].iter().any(Token::is_blank_line)
}
