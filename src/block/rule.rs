//! Block grammar rules and their line matchers.
//!
//! Each rule recognizes a construct at a line start and records the
//! positions its handler needs. Matchers only look at the opening line (or
//! the full run, for blank lines and indented code); consuming the rest of
//! a multi-line construct is handler work.
//!
//! All positions are byte offsets into the text being parsed. A matcher
//! returns `None` when the rule does not apply at the given line start, and
//! the scan falls through to the next rule in priority order.

use crate::Range;
use crate::block::html::{self, HtmlKind};
use crate::limits::{MAX_LINK_LABEL_LEN, MAX_LIST_MARKER_DIGITS};
use crate::text;

/// A block-level grammar rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockRule {
    /// ```` ``` ```` or `~~~` fenced code blocks.
    FencedCode,
    /// Code indented by four spaces or a tab.
    IndentCode,
    /// `#` headings.
    AtxHeading,
    /// `===` / `---` underlines promoting the previous paragraph.
    SetextHeading,
    /// `***`, `---`, `___` horizontal rules.
    ThematicBreak,
    /// `>` quoted blocks.
    BlockQuote,
    /// Bullet and ordered list markers.
    List,
    /// `[label]: destination` link reference definitions.
    RefLink,
    /// Raw HTML blocks (all seven opening forms).
    RawHtml,
    /// Runs of blank lines.
    BlankLine,
    /// Restricted HTML openers that may cut a container short; recognizes
    /// only known block-level tag names. Not part of the default set.
    BlockHtml,
}

/// Default rule priority, tried first to last at each line start.
pub const DEFAULT_RULES: &[BlockRule] = &[
    BlockRule::FencedCode,
    BlockRule::IndentCode,
    BlockRule::AtxHeading,
    BlockRule::SetextHeading,
    BlockRule::ThematicBreak,
    BlockRule::BlockQuote,
    BlockRule::List,
    BlockRule::RefLink,
    BlockRule::RawHtml,
    BlockRule::BlankLine,
];

/// What a rule matched, with the positions its handler needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    BlankLine,
    AtxHeading {
        /// Heading level (1-6).
        level: u8,
        /// Everything after the hashes, untrimmed.
        text: Range,
    },
    SetextHeading {
        /// Underline character, `=` or `-`.
        marker: u8,
    },
    FencedCode {
        /// Opening fence indentation (0-3 spaces at document level).
        indent: u8,
        /// Fence character, `` ` `` or `~`.
        marker: u8,
        /// Opening fence length.
        run: u32,
        /// Info string after the fence, untrimmed at the end.
        info: Range,
    },
    IndentCode,
    ThematicBreak,
    RefLink {
        /// Label between the brackets.
        label: Range,
    },
    BlockQuote {
        /// Rest of the first line after `>`.
        text: Range,
    },
    List {
        /// Spaces before the marker.
        leading: Range,
        /// The marker itself (`-` or `12.` style).
        marker: Range,
        /// Rest of the line after the marker, including its leading spaces.
        text: Range,
        /// Ordinal value for ordered markers.
        ordinal: Option<u32>,
    },
    Html {
        kind: HtmlKind,
        /// Tag name for `OpenTag`/`CloseTag`; empty otherwise.
        tag: Range,
    },
}

/// A successful rule match at a line start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch {
    pub rule: BlockRule,
    /// Line start where the rule matched.
    pub start: usize,
    /// End of the matched span. For single-line rules this is the end of
    /// the line including its newline; for marker rules (reference links,
    /// HTML openers) it can sit mid-line.
    pub end: usize,
    pub kind: MatchKind,
}

/// Try one rule at `pos`, which must be a line start, with the standard
/// three-space indentation allowance.
pub fn match_rule(rule: BlockRule, src: &str, pos: usize) -> Option<RuleMatch> {
    match_rule_capped(rule, src, pos, 3)
}

/// Try one rule with a custom indentation cap. List items widen the cap to
/// their marker width when checking for blocks that end the list.
pub(crate) fn match_rule_capped(
    rule: BlockRule,
    src: &str,
    pos: usize,
    indent_cap: usize,
) -> Option<RuleMatch> {
    match rule {
        BlockRule::FencedCode => match_fenced_code(src, pos, indent_cap),
        BlockRule::IndentCode => match_indent_code(src, pos),
        BlockRule::AtxHeading => match_atx_heading(src, pos, indent_cap),
        BlockRule::SetextHeading => match_setext_heading(src, pos, indent_cap),
        BlockRule::ThematicBreak => match_thematic_break(src, pos, indent_cap),
        BlockRule::BlockQuote => match_block_quote(src, pos, indent_cap),
        BlockRule::List => match_list(src, pos, indent_cap),
        BlockRule::RefLink => match_ref_link(src, pos, indent_cap),
        BlockRule::RawHtml => match_raw_html(src, pos, indent_cap),
        BlockRule::BlankLine => match_blank_line(src, pos),
        BlockRule::BlockHtml => match_block_html(src, pos, indent_cap),
    }
}

/// Find the first rule match at or after `from`, scanning line starts in
/// document order and rules in priority order within each line.
pub(crate) fn find_match(src: &str, from: usize, rules: &[BlockRule]) -> Option<RuleMatch> {
    let mut pos = if text::at_line_start(src, from) {
        from
    } else {
        text::line_end(src, from)
    };
    while pos < src.len() {
        for &rule in rules {
            if let Some(m) = match_rule(rule, src, pos) {
                return Some(m);
            }
        }
        pos = text::line_end(src, pos);
    }
    None
}

/// Position after up to `cap` leading spaces.
#[inline]
fn after_indent(bytes: &[u8], pos: usize, cap: usize) -> usize {
    let mut i = pos;
    while i - pos < cap && i < bytes.len() && bytes[i] == b' ' {
        i += 1;
    }
    i
}

#[inline]
fn line_text_end(src: &str, from: usize) -> (usize, usize) {
    let end = text::line_end(src, from);
    if end > from && src.as_bytes()[end - 1] == b'\n' {
        (end - 1, end)
    } else {
        (end, end)
    }
}

fn match_blank_line(src: &str, pos: usize) -> Option<RuleMatch> {
    let mut end = pos;
    loop {
        let line_end = text::line_end(src, end);
        if !text::is_blank_line(&src[end..line_end]) {
            break;
        }
        end = line_end;
    }
    (end > pos).then_some(RuleMatch {
        rule: BlockRule::BlankLine,
        start: pos,
        end,
        kind: MatchKind::BlankLine,
    })
}

fn match_atx_heading(src: &str, pos: usize, cap: usize) -> Option<RuleMatch> {
    let bytes = src.as_bytes();
    let mut i = after_indent(bytes, pos, cap);
    let hash_start = i;
    while i < bytes.len() && bytes[i] == b'#' {
        i += 1;
    }
    let level = i - hash_start;
    if level == 0 || level > 6 {
        return None;
    }
    // the hashes must stand alone or be followed by whitespace
    if let Some(&b) = bytes.get(i) {
        if !matches!(b, b' ' | b'\t' | b'\n') {
            return None;
        }
    }
    let (text_end, end) = line_text_end(src, i);
    Some(RuleMatch {
        rule: BlockRule::AtxHeading,
        start: pos,
        end,
        kind: MatchKind::AtxHeading {
            level: level as u8,
            text: Range::from_usize(i, text_end),
        },
    })
}

fn match_setext_heading(src: &str, pos: usize, cap: usize) -> Option<RuleMatch> {
    let bytes = src.as_bytes();
    let mut i = after_indent(bytes, pos, cap);
    let marker = *bytes.get(i)?;
    if marker != b'=' && marker != b'-' {
        return None;
    }
    while i < bytes.len() && bytes[i] == marker {
        i += 1;
    }
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
        i += 1;
    }
    if i < bytes.len() && bytes[i] != b'\n' {
        return None;
    }
    Some(RuleMatch {
        rule: BlockRule::SetextHeading,
        start: pos,
        end: text::line_end(src, i),
        kind: MatchKind::SetextHeading { marker },
    })
}

fn match_fenced_code(src: &str, pos: usize, cap: usize) -> Option<RuleMatch> {
    let bytes = src.as_bytes();
    let fence_start = after_indent(bytes, pos, cap);
    let marker = *bytes.get(fence_start)?;
    if marker != b'`' && marker != b'~' {
        return None;
    }
    let mut i = fence_start;
    while i < bytes.len() && bytes[i] == marker {
        i += 1;
    }
    let run = i - fence_start;
    if run < 3 {
        return None;
    }
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
        i += 1;
    }
    let (info_end, end) = line_text_end(src, i);
    Some(RuleMatch {
        rule: BlockRule::FencedCode,
        start: pos,
        end,
        kind: MatchKind::FencedCode {
            indent: (fence_start - pos) as u8,
            marker,
            run: run as u32,
            info: Range::from_usize(i, info_end),
        },
    })
}

/// Four spaces, or fewer spaces followed by a tab.
#[inline]
fn indent_code_prefix(bytes: &[u8], pos: usize) -> Option<usize> {
    if bytes.len() >= pos + 4 && bytes[pos..pos + 4].iter().all(|&b| b == b' ') {
        return Some(pos + 4);
    }
    let mut i = pos;
    while i < bytes.len() && bytes[i] == b' ' {
        i += 1;
    }
    (bytes.get(i) == Some(&b'\t')).then(|| i + 1)
}

#[inline]
fn is_space_char(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

fn match_indent_code(src: &str, pos: usize) -> Option<RuleMatch> {
    let bytes = src.as_bytes();
    let first = indent_code_prefix(bytes, pos)?;
    if !bytes.get(first).is_some_and(|&b| b != b'\n') {
        return None;
    }
    let mut end = text::line_end(src, first);
    while bytes.get(end) == Some(&b'\n') {
        end += 1;
    }
    // absorb further indented lines; stray whitespace extends the span one
    // byte at a time, so the match can stop mid-line
    loop {
        if let Some(content) = indent_code_prefix(bytes, end) {
            if bytes.get(content).is_some_and(|&b| b != b'\n') {
                end = text::line_end(src, content);
                while bytes.get(end) == Some(&b'\n') {
                    end += 1;
                }
                continue;
            }
        }
        if bytes.get(end).is_some_and(|&b| is_space_char(b)) {
            end += 1;
            continue;
        }
        break;
    }
    Some(RuleMatch {
        rule: BlockRule::IndentCode,
        start: pos,
        end,
        kind: MatchKind::IndentCode,
    })
}

fn match_thematic_break(src: &str, pos: usize, cap: usize) -> Option<RuleMatch> {
    let bytes = src.as_bytes();
    let mut i = after_indent(bytes, pos, cap);
    let marker = *bytes.get(i)?;
    if !matches!(marker, b'-' | b'_' | b'*') {
        return None;
    }
    let mut count = 0;
    while bytes.get(i) == Some(&marker) {
        count += 1;
        i += 1;
        while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
            i += 1;
        }
    }
    if count < 3 || (i < bytes.len() && bytes[i] != b'\n') {
        return None;
    }
    Some(RuleMatch {
        rule: BlockRule::ThematicBreak,
        start: pos,
        end: text::line_end(src, i),
        kind: MatchKind::ThematicBreak,
    })
}

fn match_ref_link(src: &str, pos: usize, cap: usize) -> Option<RuleMatch> {
    let bytes = src.as_bytes();
    let i = after_indent(bytes, pos, cap);
    if bytes.get(i) != Some(&b'[') {
        return None;
    }
    let label_start = i + 1;
    let mut units = 0usize;
    let mut iter = src[label_start..].char_indices();
    loop {
        let (off, c) = iter.next()?;
        match c {
            ']' => {
                let at = label_start + off;
                if bytes.get(at + 1) != Some(&b':') {
                    return None;
                }
                return Some(RuleMatch {
                    rule: BlockRule::RefLink,
                    start: pos,
                    end: at + 2,
                    kind: MatchKind::RefLink {
                        label: Range::from_usize(label_start, at),
                    },
                });
            }
            '[' => return None,
            '\\' => {
                // escapes may hide brackets but not a line break
                match iter.next() {
                    Some((_, next)) if next != '\n' => {}
                    _ => return None,
                }
                units += 1;
            }
            _ => units += 1,
        }
        if units > MAX_LINK_LABEL_LEN {
            return None;
        }
    }
}

fn match_block_quote(src: &str, pos: usize, cap: usize) -> Option<RuleMatch> {
    let bytes = src.as_bytes();
    let i = after_indent(bytes, pos, cap);
    if bytes.get(i) != Some(&b'>') {
        return None;
    }
    let (text_end, end) = line_text_end(src, i + 1);
    Some(RuleMatch {
        rule: BlockRule::BlockQuote,
        start: pos,
        end,
        kind: MatchKind::BlockQuote {
            text: Range::from_usize(i + 1, text_end),
        },
    })
}

fn match_list(src: &str, pos: usize, cap: usize) -> Option<RuleMatch> {
    let bytes = src.as_bytes();
    let marker_start = after_indent(bytes, pos, cap);
    let first = *bytes.get(marker_start)?;
    let mut i = marker_start;
    let mut ordinal = None;
    if matches!(first, b'*' | b'+' | b'-') {
        i += 1;
    } else if first.is_ascii_digit() {
        let mut value: u32 = 0;
        let mut digits = 0usize;
        while bytes.get(i).is_some_and(|b| b.is_ascii_digit()) {
            digits += 1;
            if digits > MAX_LIST_MARKER_DIGITS {
                return None;
            }
            value = value * 10 + u32::from(bytes[i] - b'0');
            i += 1;
        }
        if !matches!(bytes.get(i), Some(b'.') | Some(b')')) {
            return None;
        }
        i += 1;
        ordinal = Some(value);
    } else {
        return None;
    }
    // the marker must end the line or be followed by whitespace
    match bytes.get(i) {
        None | Some(b'\n') | Some(b' ') | Some(b'\t') => {}
        _ => return None,
    }
    let (text_end, end) = line_text_end(src, i);
    Some(RuleMatch {
        rule: BlockRule::List,
        start: pos,
        end,
        kind: MatchKind::List {
            leading: Range::from_usize(pos, marker_start),
            marker: Range::from_usize(marker_start, i),
            text: Range::from_usize(i, text_end),
            ordinal,
        },
    })
}

fn match_raw_html(src: &str, pos: usize, cap: usize) -> Option<RuleMatch> {
    let bytes = src.as_bytes();
    let i = after_indent(bytes, pos, cap);
    if bytes.get(i) != Some(&b'<') {
        return None;
    }
    if let Some((kind, end)) = match_html_special(src, i) {
        return Some(html_match(BlockRule::RawHtml, pos, end, kind, Range::from_usize(end, end)));
    }
    let (name_pos, kind) = if bytes.get(i + 1) == Some(&b'/') {
        (i + 2, HtmlKind::CloseTag)
    } else {
        (i + 1, HtmlKind::OpenTag)
    };
    let name_end = html::scan_tag_name(src, name_pos)?;
    Some(html_match(
        BlockRule::RawHtml,
        pos,
        name_end,
        kind,
        Range::from_usize(name_pos, name_end),
    ))
}

fn match_block_html(src: &str, pos: usize, cap: usize) -> Option<RuleMatch> {
    let bytes = src.as_bytes();
    let i = after_indent(bytes, pos, cap);
    if bytes.get(i) != Some(&b'<') {
        return None;
    }
    if let Some((kind, end)) = match_html_special(src, i) {
        return Some(html_match(BlockRule::BlockHtml, pos, end, kind, Range::from_usize(end, end)));
    }
    let (name_pos, kind) = if bytes.get(i + 1) == Some(&b'/') {
        (i + 2, HtmlKind::CloseTag)
    } else {
        (i + 1, HtmlKind::OpenTag)
    };
    let name_end = html::scan_tag_name(src, name_pos)?;
    let name = &src[name_pos..name_end];
    // only literal (lowercase) known tags end a container
    if !html::is_block_tag(name) && !html::is_pre_tag(name) {
        return None;
    }
    match bytes.get(name_end) {
        None | Some(b'\n') | Some(b' ') | Some(b'\t') => {}
        _ => return None,
    }
    Some(html_match(
        BlockRule::BlockHtml,
        pos,
        name_end,
        kind,
        Range::from_usize(name_pos, name_end),
    ))
}

fn match_html_special(src: &str, i: usize) -> Option<(HtmlKind, usize)> {
    let rest = &src[i..];
    if rest.starts_with("<!--") {
        return Some((HtmlKind::Comment, i + 4));
    }
    if rest.starts_with("<?") {
        return Some((HtmlKind::Pi, i + 2));
    }
    if rest.starts_with("<![CDATA[") {
        return Some((HtmlKind::Cdata, i + 9));
    }
    if rest.starts_with("<!")
        && src.as_bytes().get(i + 2).is_some_and(|b| b.is_ascii_uppercase())
    {
        return Some((HtmlKind::Declaration, i + 3));
    }
    None
}

#[inline]
fn html_match(rule: BlockRule, start: usize, end: usize, kind: HtmlKind, tag: Range) -> RuleMatch {
    RuleMatch {
        rule,
        start,
        end,
        kind: MatchKind::Html { kind, tag },
    }
}
