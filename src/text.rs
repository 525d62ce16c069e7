//! Line and tab helpers shared by the block scanners.
//!
//! Tabs are only significant at a line start: a tab preceded by up to three
//! spaces counts as indentation out to a tab stop. Container handlers expand
//! those prefixes before re-parsing accumulated text so that column-based
//! rules (code indentation, continuation width) see plain spaces.

use std::borrow::Cow;

/// Expand a `{0,3} spaces + tab` prefix on every line out to `width` columns.
///
/// A prefix already at or past `width` columns just drops the tab.
pub(crate) fn expand_leading_tab(text: &str, width: usize) -> Cow<'_, str> {
    if !has_leading_tab(text) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for line in text.split_inclusive('\n') {
        match leading_tab(line) {
            Some(spaces) => {
                for _ in 0..spaces.max(width) {
                    out.push(' ');
                }
                out.push_str(&line[spaces + 1..]);
            }
            None => out.push_str(line),
        }
    }
    Cow::Owned(out)
}

/// Replace a `{0,3} spaces + tab` prefix on every line with the spaces plus
/// four more (the second-tab rule for container content).
pub(crate) fn expand_tab(text: &str) -> Cow<'_, str> {
    if !has_leading_tab(text) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for line in text.split_inclusive('\n') {
        match leading_tab(line) {
            Some(spaces) => {
                for _ in 0..spaces + 4 {
                    out.push(' ');
                }
                out.push_str(&line[spaces + 1..]);
            }
            None => out.push_str(line),
        }
    }
    Cow::Owned(out)
}

/// Byte count of a `{0,3} spaces` run directly followed by a tab, if any.
fn leading_tab(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut spaces = 0;
    while spaces < 3 && spaces < bytes.len() && bytes[spaces] == b' ' {
        spaces += 1;
    }
    (bytes.get(spaces) == Some(&b'\t')).then_some(spaces)
}

fn has_leading_tab(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        if leading_tab(&text[pos..]).is_some() {
            return true;
        }
        match memchr::memchr(b'\n', &bytes[pos..]) {
            Some(off) => pos += off + 1,
            None => return false,
        }
    }
    false
}

/// A line consisting only of blank bytes and a terminating newline.
///
/// A whitespace-only final line without a newline is not blank; it falls
/// through to paragraph text.
pub(crate) fn is_blank_line(line: &str) -> bool {
    match line.strip_suffix('\n') {
        Some(body) => body.bytes().all(|b| matches!(b, b' ' | b'\t' | 0x0b | 0x0c)),
        None => false,
    }
}

/// Whether accumulated container text ends in a blank line (`\n[ \t]*\n`).
pub(crate) fn ends_with_blank_line(text: &str) -> bool {
    match text.strip_suffix('\n') {
        Some(body) => body.trim_end_matches([' ', '\t']).ends_with('\n'),
        None => false,
    }
}

/// Position just past the newline that ends the line containing `pos`,
/// or the end of the buffer.
pub(crate) fn line_end(src: &str, pos: usize) -> usize {
    match memchr::memchr(b'\n', &src.as_bytes()[pos..]) {
        Some(off) => pos + off + 1,
        None => src.len(),
    }
}

pub(crate) fn at_line_start(src: &str, pos: usize) -> bool {
    pos == 0 || src.as_bytes()[pos - 1] == b'\n'
}

/// Start of the first blank line at or after `from`, scanning whole lines.
pub(crate) fn next_blank_line(src: &str, from: usize) -> Option<usize> {
    let mut pos = if at_line_start(src, from) {
        from
    } else {
        line_end(src, from)
    };
    while pos < src.len() {
        let end = line_end(src, pos);
        if is_blank_line(&src[pos..end]) {
            return Some(pos);
        }
        pos = end;
    }
    None
}

/// Match `[ \t]*\n` at `pos`, returning the position after the newline.
pub(crate) fn blank_to_line_end(src: &str, pos: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut i = pos;
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
        i += 1;
    }
    (bytes.get(i) == Some(&b'\n')).then(|| i + 1)
}

/// Strip up to `max` leading spaces from every line.
pub(crate) fn dedent_up_to(text: &str, max: usize) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let bytes = line.as_bytes();
        let mut n = 0;
        while n < max && n < bytes.len() && bytes[n] == b' ' {
            n += 1;
        }
        out.push_str(&line[n..]);
    }
    out
}

/// Remove one backslash before each ASCII punctuation character.
pub(crate) fn unescape_char(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_punctuation() {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}
