//! Link reference definitions and the shared parse environment.
//!
//! Definitions like `[label]: /url "title"` produce no output of their own;
//! they are collected into an [`Environment`] during the block pass so a
//! later inline pass can resolve `[label]` references against it. Labels
//! match case-insensitively with entity and backslash escapes decoded and
//! internal whitespace collapsed. The first definition for a label wins.

use std::collections::HashMap;

use rustc_hash::FxBuildHasher as FastHashBuilder;

use crate::text::unescape_char;

/// A link reference definition (destination + optional title).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRefDef {
    /// Link destination, with backslash escapes removed.
    pub url: String,
    /// Link title, with backslash escapes removed.
    pub title: Option<String>,
}

impl LinkRefDef {
    pub fn new(url: impl Into<String>, title: Option<String>) -> Self {
        Self {
            url: url.into(),
            title,
        }
    }
}

/// Shared state produced by the block pass and consumed by inline parsing.
///
/// Holds the document's link reference definitions, keyed by normalized
/// label.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    link_refs: HashMap<String, LinkRefDef, FastHashBuilder>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition under an already-normalized label. First definition
    /// wins; later duplicates are ignored.
    pub fn insert_link_ref(&mut self, label: String, def: LinkRefDef) {
        self.link_refs.entry(label).or_insert(def);
    }

    /// Look up a definition by raw label text.
    pub fn get_link_ref(&self, label: &str) -> Option<&LinkRefDef> {
        self.link_refs.get(&normalize_label(label))
    }

    /// Look up a definition by already-normalized label.
    pub fn get_link_ref_normalized(&self, label: &str) -> Option<&LinkRefDef> {
        self.link_refs.get(label)
    }

    /// Whether a definition exists for the raw label text.
    pub fn contains_link_ref(&self, label: &str) -> bool {
        self.link_refs.contains_key(&normalize_label(label))
    }

    pub fn len(&self) -> usize {
        self.link_refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.link_refs.is_empty()
    }

    /// Iterate over `(normalized label, definition)` pairs in arbitrary
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LinkRefDef)> {
        self.link_refs.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Normalize a link label: decode entities, process backslash escapes,
/// collapse internal whitespace to single spaces, trim, and case-fold.
pub fn normalize_label(label: &str) -> String {
    let decoded = html_escape::decode_html_entities(label);

    let mut unescaped = String::with_capacity(decoded.len());
    let mut chars = decoded.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if is_label_escapable(next) {
                    unescaped.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        unescaped.push(c);
    }

    let mut out = String::with_capacity(unescaped.len());
    let mut last_was_space = true;

    for ch in unescaped.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
            continue;
        }

        last_was_space = false;
        if ch == 'ß' || ch == 'ẞ' {
            // Unicode case folding maps the sharp s to "ss"
            out.push_str("ss");
        } else {
            for lc in ch.to_lowercase() {
                out.push(lc);
            }
        }
    }

    if out.ends_with(' ') {
        out.pop();
    }
    out
}

#[inline]
fn is_label_escapable(c: char) -> bool {
    matches!(c, '[' | ']' | '\\')
}

/// Scan a link destination starting at `pos` (just past `]:`).
///
/// Skips spaces, tabs and at most one newline, then reads either an
/// angle-bracketed destination (no newlines inside) or a bare run of
/// non-whitespace bytes with balanced parentheses. Returns the raw
/// destination text and the position just past it.
pub(crate) fn scan_link_dest(src: &str, pos: usize) -> Option<(&str, usize)> {
    let bytes = src.as_bytes();
    let mut i = skip_dest_gap(bytes, pos)?;

    if bytes.get(i) == Some(&b'<') {
        i += 1;
        let start = i;
        while i < bytes.len() {
            match bytes[i] {
                b'>' => return Some((&src[start..i], i + 1)),
                b'\n' | b'<' => return None,
                b'\\' if i + 1 < bytes.len() && bytes[i + 1] != b'\n' => i += 2,
                _ => i += 1,
            }
        }
        return None;
    }

    let start = i;
    let mut parens = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r' => break,
            b'(' => {
                parens += 1;
                i += 1;
            }
            b')' => {
                if parens == 0 {
                    break;
                }
                parens -= 1;
                i += 1;
            }
            b'\\' if i + 1 < bytes.len() && !bytes[i + 1].is_ascii_whitespace() => i += 2,
            _ => i += 1,
        }
    }
    (i > start).then(|| (&src[start..i], i))
}

/// Spaces/tabs and at most one newline before a destination. Fails on a
/// blank line or end of input.
fn skip_dest_gap(bytes: &[u8], pos: usize) -> Option<usize> {
    let mut i = pos;
    let mut saw_newline = false;
    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' => i += 1,
            b'\n' if !saw_newline => {
                saw_newline = true;
                i += 1;
            }
            b'\n' => return None,
            _ => return Some(i),
        }
    }
    None
}

/// Scan an optional link title after a destination, not reading past `max`.
///
/// The title must be separated from the destination by whitespace (spaces,
/// tabs and at most one newline) and wrapped in `"..."`, `'...'` or `(...)`.
/// Returns the unescaped title and the position just past the closing
/// delimiter.
pub(crate) fn scan_link_title(src: &str, pos: usize, max: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    let mut i = pos;
    let mut saw_newline = false;
    while i < max {
        match bytes[i] {
            b' ' | b'\t' => i += 1,
            b'\n' if !saw_newline => {
                saw_newline = true;
                i += 1;
            }
            _ => break,
        }
    }
    if i == pos || i >= max {
        return None;
    }

    let open = bytes[i];
    let close = match open {
        b'"' => b'"',
        b'\'' => b'\'',
        b'(' => b')',
        _ => return None,
    };
    i += 1;
    let start = i;
    while i < max {
        let b = bytes[i];
        if b == close {
            return Some((unescape_char(&src[start..i]), i + 1));
        }
        if b == b'(' && open == b'(' {
            return None;
        }
        if b == b'\\' && i + 1 < max {
            i += 2;
        } else {
            i += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize_label("Foo"), "foo");
        assert_eq!(normalize_label("  Foo   Bar  "), "foo bar");
        assert_eq!(normalize_label("Foo\n  Bar"), "foo bar");
    }

    #[test]
    fn test_normalize_escapes() {
        assert_eq!(normalize_label(r"a\[b\]"), "a[b]");
        assert_eq!(normalize_label(r"a\\b"), r"a\b");
        // non-escapable sequences keep the backslash
        assert_eq!(normalize_label(r"a\*b"), r"a\*b");
    }

    #[test]
    fn test_normalize_entities() {
        assert_eq!(normalize_label("&amp;"), "&");
        assert_eq!(normalize_label("caf&eacute;"), "café");
    }

    #[test]
    fn test_normalize_sharp_s() {
        assert_eq!(normalize_label("STRASSE"), "strasse");
        assert_eq!(normalize_label("straße"), "strasse");
        assert_eq!(normalize_label("STRAẞE"), "strasse");
    }

    #[test]
    fn test_first_definition_wins() {
        let mut env = Environment::new();
        env.insert_link_ref("a".into(), LinkRefDef::new("/first", None));
        env.insert_link_ref("a".into(), LinkRefDef::new("/second", None));
        assert_eq!(
            env.get_link_ref("a").map(|d| d.url.as_str()),
            Some("/first")
        );
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_lookup_normalizes() {
        let mut env = Environment::new();
        env.insert_link_ref(normalize_label("Foo Bar"), LinkRefDef::new("/url", None));
        assert!(env.contains_link_ref("FOO   bar"));
        assert!(env.get_link_ref("foo bar").is_some());
        assert!(env.get_link_ref("foobar").is_none());
    }

    #[test]
    fn test_scan_dest_bare() {
        assert_eq!(scan_link_dest(" /url rest", 0), Some(("/url", 5)));
        assert_eq!(scan_link_dest("\n /url", 0), Some(("/url", 6)));
        // a blank line before the destination fails
        assert_eq!(scan_link_dest(" \n\n/url", 0), None);
    }

    #[test]
    fn test_scan_dest_parens() {
        assert_eq!(scan_link_dest(" /a(b)c", 0), Some(("/a(b)c", 7)));
        // an unbalanced close paren ends the destination
        assert_eq!(scan_link_dest(" /a)b", 0), Some(("/a", 3)));
        assert_eq!(scan_link_dest(r" /a\)b", 0), Some((r"/a\)b", 6)));
    }

    #[test]
    fn test_scan_dest_angle() {
        assert_eq!(scan_link_dest(" <with space>", 0), Some(("with space", 13)));
        assert_eq!(scan_link_dest(" <>", 0), Some(("", 3)));
        // unterminated or multi-line brackets fail
        assert_eq!(scan_link_dest(" <a\nb>", 0), None);
        assert_eq!(scan_link_dest(" <ab", 0), None);
    }

    #[test]
    fn test_scan_title() {
        let src = " \"the title\"\n";
        assert_eq!(
            scan_link_title(src, 0, src.len()),
            Some(("the title".into(), 12))
        );
        let src = "\n   'next line'\n";
        assert_eq!(
            scan_link_title(src, 0, src.len()),
            Some(("next line".into(), 15))
        );
    }

    #[test]
    fn test_scan_title_requires_gap() {
        // no whitespace between destination and title
        assert_eq!(scan_link_title("\"t\"", 0, 3), None);
    }

    #[test]
    fn test_scan_title_parens() {
        let src = " (title)";
        assert_eq!(scan_link_title(src, 0, 8), Some(("title".into(), 8)));
        // a raw open paren inside a paren title is not allowed
        assert_eq!(scan_link_title(" (a(b)", 0, 6), None);
        assert_eq!(scan_link_title(r" (a\(b)", 0, 7), Some(("a(b".into(), 7)));
    }

    #[test]
    fn test_scan_title_escapes() {
        let src = r#" "a\"b""#;
        assert_eq!(scan_link_title(src, 0, src.len()), Some(("a\"b".into(), 7)));
    }
}
