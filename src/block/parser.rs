//! Block parser implementation.
//!
//! [`BlockParser`] drives the rule loop: find the next rule match at a line
//! start, dispatch its handler, and turn every unmatched gap into paragraph
//! text. Container handlers re-enter the loop over a child state with a
//! possibly reduced rule set, which is how nesting depth stays bounded.

use smallvec::SmallVec;

use crate::Options;
use crate::block::html::{self, HtmlKind};
use crate::block::list::{self, ListSpan};
use crate::block::rule::{self, BlockRule, DEFAULT_RULES, MatchKind, RuleMatch};
use crate::limits::DEFAULT_MAX_NESTED_LEVEL;
use crate::link_ref::{self, Environment, LinkRefDef};
use crate::state::BlockState;
use crate::text;
use crate::token::{Content, Token};
use crate::walk::Document;

/// Rule set small enough to keep inline; the default set has ten entries.
pub(crate) type RuleList = SmallVec<[BlockRule; 12]>;

/// Blocks that end an unmarked quote continuation, tried in order.
const QUOTE_BREAK_RULES: &[BlockRule] = &[
    BlockRule::BlankLine,
    BlockRule::ThematicBreak,
    BlockRule::FencedCode,
    BlockRule::List,
    BlockRule::BlockHtml,
];

/// Rules whose match right after a quote marker forces every following
/// quoted line to carry its own marker.
const QUOTE_MARKER_RULES: &[BlockRule] = &[
    BlockRule::BlankLine,
    BlockRule::IndentCode,
    BlockRule::FencedCode,
];

/// Block-level parser.
///
/// Holds the rule sets used inside containers and the nesting cap. The
/// per-document cursor and token list live in [`BlockState`], so one parser
/// can be reused across documents.
pub struct BlockParser {
    block_quote_rules: RuleList,
    list_rules: RuleList,
    max_nested_level: usize,
}

impl Default for BlockParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockParser {
    /// Create a parser with the default rule sets.
    pub fn new() -> Self {
        Self {
            block_quote_rules: RuleList::from_slice(DEFAULT_RULES),
            list_rules: RuleList::from_slice(DEFAULT_RULES),
            max_nested_level: DEFAULT_MAX_NESTED_LEVEL,
        }
    }

    /// Create a parser with custom rule sets and nesting cap.
    pub fn with_options(options: Options) -> Self {
        Self {
            block_quote_rules: RuleList::from_vec(options.block_quote_rules),
            list_rules: RuleList::from_vec(options.list_rules),
            max_nested_level: options.max_nested_level,
        }
    }

    pub(crate) fn list_rules(&self) -> &[BlockRule] {
        &self.list_rules
    }

    pub(crate) fn max_nested_level(&self) -> usize {
        self.max_nested_level
    }

    /// Parse a whole document with the default top-level rules and a fresh
    /// environment.
    pub fn parse_document<I>(&self, src: &str) -> Document<I> {
        let mut state = BlockState::new(src);
        let mut env = Environment::new();
        self.parse(&mut state, &mut env, DEFAULT_RULES);
        Document::new(state.into_tokens(), env)
    }

    /// Run the rule loop over `state` until its source is exhausted.
    pub fn parse<I>(
        &self,
        state: &mut BlockState<'_, I>,
        env: &mut Environment,
        rules: &[BlockRule],
    ) {
        while !state.is_done() {
            let Some(m) = rule::find_match(state.src(), state.cursor(), rules) else {
                break;
            };
            if m.start > state.cursor() {
                state.add_paragraph(state.cursor(), m.start);
                state.set_cursor(m.start);
            }
            match self.dispatch(&m, state, env) {
                Some(end) => state.set_cursor(end),
                None => {
                    // the handler declined, the line is paragraph text
                    let end = state.find_line_end();
                    state.add_paragraph(state.cursor(), end);
                    state.set_cursor(end);
                }
            }
        }
        if !state.is_done() {
            let len = state.src().len();
            state.add_paragraph(state.cursor(), len);
            state.set_cursor(len);
        }
    }

    /// Run the matched rule's handler. `None` means the handler declined
    /// and the line falls back to paragraph text.
    pub(crate) fn dispatch<I>(
        &self,
        m: &RuleMatch,
        state: &mut BlockState<'_, I>,
        env: &mut Environment,
    ) -> Option<usize> {
        match m.rule {
            BlockRule::FencedCode => self.parse_fenced_code(m, state),
            BlockRule::IndentCode => self.parse_indent_code(m, state),
            BlockRule::AtxHeading => self.parse_atx_heading(m, state),
            BlockRule::SetextHeading => self.parse_setext_heading(m, state, env),
            BlockRule::ThematicBreak => self.parse_thematic_break(m, state),
            BlockRule::BlockQuote => self.parse_block_quote(m, state, env),
            BlockRule::List => self.parse_list(m, state, env),
            BlockRule::RefLink => self.parse_ref_link(m, state, env),
            BlockRule::RawHtml | BlockRule::BlockHtml => self.parse_raw_html(m, state),
            BlockRule::BlankLine => self.parse_blank_line(m, state),
        }
    }

    fn parse_blank_line<I>(&self, m: &RuleMatch, state: &mut BlockState<'_, I>) -> Option<usize> {
        state.append_token(Token::BlankLine);
        Some(m.end)
    }

    fn parse_thematic_break<I>(
        &self,
        m: &RuleMatch,
        state: &mut BlockState<'_, I>,
    ) -> Option<usize> {
        state.append_token(Token::ThematicBreak);
        Some(m.end)
    }

    fn parse_atx_heading<I>(&self, m: &RuleMatch, state: &mut BlockState<'_, I>) -> Option<usize> {
        let MatchKind::AtxHeading { level, text } = m.kind else {
            return None;
        };
        let raw = text.slice(state.src()).trim();
        let content = trim_atx_text(raw).to_string();
        state.append_token(Token::Heading {
            content: Content::Text(content),
            level,
        });
        Some(m.end)
    }

    /// An underline promotes the open paragraph into a heading. Without
    /// one, the line may still be a thematic break or a list marker.
    fn parse_setext_heading<I>(
        &self,
        m: &RuleMatch,
        state: &mut BlockState<'_, I>,
        env: &mut Environment,
    ) -> Option<usize> {
        let MatchKind::SetextHeading { marker } = m.kind else {
            return None;
        };
        if matches!(state.last_token(), Some(Token::Paragraph { .. })) {
            let level = if marker == b'=' { 1 } else { 2 };
            if let Some(Token::Paragraph { content }) = state.pop_token() {
                state.append_token(Token::Heading { content, level });
            }
            return Some(m.end);
        }
        for rule in [BlockRule::ThematicBreak, BlockRule::List] {
            if let Some(m2) = rule::match_rule(rule, state.src(), m.start) {
                return self.dispatch(&m2, state, env);
            }
        }
        None
    }

    fn parse_fenced_code<I>(&self, m: &RuleMatch, state: &mut BlockState<'_, I>) -> Option<usize> {
        let MatchKind::FencedCode {
            indent,
            marker,
            run,
            info,
        } = m.kind
        else {
            return None;
        };
        let src = state.src();
        let info_raw = info.slice(src);
        // info strings of backtick fences cannot contain backticks
        if marker == b'`' && info_raw.contains('`') {
            return None;
        }
        let (code, end) = match find_closing_fence(src, m.end, marker, run as usize) {
            Some((close_start, close_end)) => (&src[m.end..close_start], close_end),
            None => (&src[m.end..], src.len()),
        };
        let raw = if indent > 0 && !code.is_empty() {
            text::dedent_up_to(code, indent as usize)
        } else {
            code.to_string()
        };
        let info_attr = if info_raw.is_empty() {
            None
        } else {
            Some(text::unescape_char(info_raw).trim().to_string())
        };
        state.append_token(Token::BlockCode {
            raw,
            info: info_attr,
            fenced: true,
        });
        Some(end)
    }

    fn parse_indent_code<I>(&self, m: &RuleMatch, state: &mut BlockState<'_, I>) -> Option<usize> {
        // indented text under an open paragraph is part of the paragraph
        if let Some(end) = state.append_paragraph() {
            return Some(end);
        }
        let code = &state.src()[m.start..m.end];
        let expanded = text::expand_leading_tab(code, 4);
        let dedented = text::dedent_up_to(&expanded, 4);
        let raw = dedented.trim_matches('\n').to_string();
        state.append_token(Token::BlockCode {
            raw,
            info: None,
            fenced: false,
        });
        Some(m.end)
    }

    fn parse_ref_link<I>(
        &self,
        m: &RuleMatch,
        state: &mut BlockState<'_, I>,
        env: &mut Environment,
    ) -> Option<usize> {
        // a definition cannot interrupt an open paragraph
        if let Some(end) = state.append_paragraph() {
            return Some(end);
        }
        let MatchKind::RefLink { label } = m.kind else {
            return None;
        };
        let src = state.src();
        let key = link_ref::normalize_label(label.slice(src));
        if key.is_empty() {
            return None;
        }
        let (dest, href_pos) = link_ref::scan_link_dest(src, m.end)?;
        let max_pos = text::next_blank_line(src, href_pos).unwrap_or(src.len());

        let mut title = None;
        let mut end_pos = None;
        if let Some((scanned, title_pos)) = link_ref::scan_link_title(src, href_pos, max_pos) {
            // the title only counts if nothing else follows it on its line
            if let Some(after) = text::blank_to_line_end(src, title_pos) {
                title = Some(scanned);
                end_pos = Some(after);
            }
        }
        let end = match end_pos {
            Some(end) => end,
            None => text::blank_to_line_end(src, href_pos)?,
        };

        let url = text::unescape_char(dest);
        env.insert_link_ref(key, LinkRefDef::new(url, title));
        Some(end)
    }

    fn parse_block_quote<I>(
        &self,
        m: &RuleMatch,
        state: &mut BlockState<'_, I>,
        env: &mut Environment,
    ) -> Option<usize> {
        let MatchKind::BlockQuote { text: first } = m.kind else {
            return None;
        };
        let mut text = {
            let mut line = first.slice(state.src()).to_string();
            line.push('\n');
            quote_line_text(&line)
        };

        // code or a blank right after the marker turns off lazy
        // continuation for the whole quote
        let require_marker = QUOTE_MARKER_RULES
            .iter()
            .any(|&r| rule::match_rule(r, &text, 0).is_some());

        state.set_cursor(m.end);
        let mut end_pos = None;

        if require_marker {
            if let Some(run_end) = match_strict_quote(state.src(), state.cursor()) {
                let quote = strip_quote_markers(&state.src()[state.cursor()..run_end]);
                text.push_str(&quote);
                state.set_cursor(run_end);
            }
        } else {
            let mut prev_blank = false;
            while !state.is_done() {
                let cursor = state.cursor();
                if let Some(run_end) = match_strict_quote(state.src(), cursor) {
                    let quote = strip_quote_markers(&state.src()[cursor..run_end]);
                    prev_blank =
                        quote.trim().is_empty() || text::ends_with_blank_line(&quote);
                    text.push_str(&quote);
                    state.set_cursor(run_end);
                    continue;
                }
                if prev_blank {
                    // laziness requires an unbroken run of text
                    break;
                }
                if let Some(m2) = first_match(state.src(), cursor, QUOTE_BREAK_RULES) {
                    if let Some(end) = self.dispatch(&m2, state, env) {
                        end_pos = Some(end);
                        break;
                    }
                }
                // lazy continuation line
                let pos = text::line_end(state.src(), cursor);
                let line = text::expand_leading_tab(&state.src()[cursor..pos], 3);
                text.push_str(&line);
                state.set_cursor(pos);
            }
        }

        // a second leading tab counts as four columns
        let text = text::expand_tab(&text).into_owned();

        let depth = state.depth();
        let filtered: RuleList;
        let rules: &[BlockRule] = if depth >= self.max_nested_level.saturating_sub(1) {
            filtered = self
                .block_quote_rules
                .iter()
                .copied()
                .filter(|&r| r != BlockRule::BlockQuote)
                .collect();
            &filtered
        } else {
            &self.block_quote_rules
        };
        let mut child = BlockState::child(text, depth + 1);
        self.parse(&mut child, env, rules);
        let token = Token::BlockQuote {
            children: child.into_tokens(),
        };
        if let Some(end) = end_pos {
            // the block that cut the quote short is already in the stream
            state.prepend_token(token);
            return Some(end);
        }
        let cursor = state.cursor();
        state.append_token(token);
        Some(cursor)
    }

    fn parse_list<I>(
        &self,
        m: &RuleMatch,
        state: &mut BlockState<'_, I>,
        env: &mut Environment,
    ) -> Option<usize> {
        let MatchKind::List {
            leading,
            marker,
            text,
            ordinal,
        } = m.kind
        else {
            return None;
        };
        let span = ListSpan {
            leading,
            marker,
            text,
        };
        list::parse_list(self, state, env, span, ordinal, m.end)
    }

    fn parse_raw_html<I>(&self, m: &RuleMatch, state: &mut BlockState<'_, I>) -> Option<usize> {
        let MatchKind::Html { kind, tag } = m.kind else {
            return None;
        };
        match kind {
            HtmlKind::Comment => Some(html_to_end(state, "-->", m.end)),
            HtmlKind::Pi => Some(html_to_end(state, "?>", m.end)),
            HtmlKind::Cdata => Some(html_to_end(state, "]]>", m.end)),
            HtmlKind::Declaration => Some(html_to_end(state, ">", m.end)),
            HtmlKind::CloseTag => {
                let name = tag.slice(state.src()).to_ascii_lowercase();
                if html::is_block_tag(&name) {
                    return Some(html_to_blank_line(state));
                }
                // an unknown tag cannot interrupt an open paragraph
                if let Some(end) = state.append_paragraph() {
                    return Some(end);
                }
                if is_lone_tag_line(state, m.end, true) {
                    return Some(html_to_blank_line(state));
                }
                None
            }
            HtmlKind::OpenTag => {
                let name = tag.slice(state.src()).to_ascii_lowercase();
                if html::is_pre_tag(&name) {
                    let end_tag = format!("</{name}>");
                    return Some(html_to_end(state, &end_tag, m.end));
                }
                if html::is_block_tag(&name) {
                    return Some(html_to_blank_line(state));
                }
                if let Some(end) = state.append_paragraph() {
                    return Some(end);
                }
                if is_lone_tag_line(state, m.end, false) {
                    return Some(html_to_blank_line(state));
                }
                None
            }
        }
    }
}

/// Trim a trailing hash run (and the whitespace before it) from heading
/// text. Hashes glued to the content are kept.
fn trim_atx_text(text: &str) -> &str {
    let stripped = text.trim_end_matches('#');
    if stripped.len() == text.len() {
        return text;
    }
    if stripped.is_empty() {
        return "";
    }
    let trimmed = stripped.trim_end_matches([' ', '\t']);
    if trimmed.len() < stripped.len() {
        trimmed
    } else {
        text
    }
}

/// Find a closing fence line at or after `from`. Returns the line's start
/// and the position after its end.
fn find_closing_fence(src: &str, from: usize, marker: u8, run: usize) -> Option<(usize, usize)> {
    let bytes = src.as_bytes();
    let mut pos = from;
    while pos < src.len() {
        let line_end = text::line_end(src, pos);
        let mut i = pos;
        while i - pos < 3 && bytes.get(i) == Some(&b' ') {
            i += 1;
        }
        let fence_start = i;
        while bytes.get(i) == Some(&marker) {
            i += 1;
        }
        if i - fence_start >= run {
            while i < src.len() && matches!(bytes[i], b' ' | b'\t') {
                i += 1;
            }
            if i >= src.len() || bytes[i] == b'\n' {
                return Some((pos, text::line_end(src, i)));
            }
        }
        pos = line_end;
    }
    None
}

/// Match a maximal run of `>`-marked lines starting at `pos`.
fn match_strict_quote(src: &str, pos: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut end = pos;
    loop {
        let mut i = end;
        while i - end < 3 && bytes.get(i) == Some(&b' ') {
            i += 1;
        }
        if bytes.get(i) != Some(&b'>') {
            break;
        }
        end = text::line_end(src, i + 1);
    }
    (end > pos).then_some(end)
}

/// Strip quote markers from a run of marked lines: drop the `>` and its
/// indent, expand a leading tab to three columns, then drop one space.
fn strip_quote_markers(run: &str) -> String {
    let mut out = String::with_capacity(run.len());
    let mut pos = 0;
    while pos < run.len() {
        let end = text::line_end(run, pos);
        let line = &run[pos..end];
        let bytes = line.as_bytes();
        let mut i = 0;
        while bytes.get(i) == Some(&b' ') {
            i += 1;
        }
        debug_assert_eq!(bytes.get(i), Some(&b'>'));
        out.push_str(&quote_line_text(&line[i + 1..]));
        pos = end;
    }
    out
}

/// Process the text after one quote marker.
fn quote_line_text(line: &str) -> String {
    let expanded = text::expand_leading_tab(line, 3);
    let stripped = expanded.strip_prefix(' ').unwrap_or(&expanded);
    stripped.to_string()
}

fn first_match(src: &str, pos: usize, rules: &[BlockRule]) -> Option<RuleMatch> {
    rules.iter().find_map(|&r| rule::match_rule(r, src, pos))
}

/// Collect raw HTML up to and including the line holding `end_marker`, or
/// to the end of input when the marker never appears.
fn html_to_end<I>(state: &mut BlockState<'_, I>, end_marker: &str, from: usize) -> usize {
    let (raw, end) = {
        let src = state.src();
        match memchr::memmem::find(src[from..].as_bytes(), end_marker.as_bytes()) {
            Some(at) => {
                let marker_end = from + at + end_marker.len();
                let end = text::line_end(src, marker_end);
                (src[state.cursor()..end].to_string(), end)
            }
            None => (src[state.cursor()..].to_string(), src.len()),
        }
    };
    state.append_token(Token::BlockHtml { raw });
    end
}

/// Collect raw HTML up to the next blank line, which is not consumed.
fn html_to_blank_line<I>(state: &mut BlockState<'_, I>) -> usize {
    let (raw, end) = {
        let src = state.src();
        match text::next_blank_line(src, state.cursor()) {
            Some(blank) => (src[state.cursor()..blank].to_string(), blank),
            None => (src[state.cursor()..].to_string(), src.len()),
        }
    };
    state.append_token(Token::BlockHtml { raw });
    end
}

/// Whether the rest of the line completes a lone open or close tag.
fn is_lone_tag_line<I>(state: &BlockState<'_, I>, from: usize, closing: bool) -> bool {
    let line_end = text::line_end(state.src(), from);
    let rest = &state.src()[from..line_end];
    if closing {
        html::is_close_tag_end(rest)
    } else {
        html::is_open_tag_end(rest)
    }
}
