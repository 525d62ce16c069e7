//! HTML block classification: tag tables and tag scanning.
//!
//! Raw HTML blocks are recognized by seven rules. Which rule applies hangs
//! on the first tag of the line: `pre`/`script`/`style`/`textarea` run to a
//! literal close tag, known block-level tags run to a blank line, and
//! anything else must be a complete open or close tag on its own line.

/// How an HTML block opener was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlKind {
    /// `<!--`, terminated by `-->`.
    Comment,
    /// `<?`, terminated by `?>`.
    Pi,
    /// `<![CDATA[`, terminated by `]]>`.
    Cdata,
    /// `<!` followed by an uppercase letter, terminated by `>`.
    Declaration,
    /// `<name`, with the tag name captured by the match.
    OpenTag,
    /// `</name`, with the tag name captured by the match.
    CloseTag,
}

/// Tag names that open or close an HTML block running to a blank line.
/// Sorted for binary search.
pub(crate) const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "base",
    "basefont",
    "blockquote",
    "body",
    "caption",
    "center",
    "col",
    "colgroup",
    "dd",
    "details",
    "dialog",
    "dir",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "frame",
    "frameset",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "head",
    "header",
    "hr",
    "html",
    "iframe",
    "legend",
    "li",
    "link",
    "main",
    "menu",
    "menuitem",
    "meta",
    "nav",
    "noframes",
    "ol",
    "optgroup",
    "option",
    "p",
    "param",
    "section",
    "source",
    "summary",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "title",
    "tr",
    "track",
    "ul",
];

/// Tags whose content runs to a literal close tag instead of a blank line.
pub(crate) const PRE_TAGS: &[&str] = &["pre", "script", "style", "textarea"];

#[inline]
pub(crate) fn is_block_tag(name: &str) -> bool {
    BLOCK_TAGS.binary_search(&name).is_ok()
}

#[inline]
pub(crate) fn is_pre_tag(name: &str) -> bool {
    PRE_TAGS.binary_search(&name).is_ok()
}

/// End of an HTML tag name (`[A-Za-z][A-Za-z0-9-]*`) starting at `pos`.
pub(crate) fn scan_tag_name(src: &str, pos: usize) -> Option<usize> {
    let bytes = src.as_bytes();
    if !bytes.get(pos).is_some_and(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let mut i = pos + 1;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }
    Some(i)
}

/// Whether `rest` (everything after an open tag's name, through the end of
/// the line) completes the tag: attributes, optional `/`, `>`, and only
/// whitespace after.
pub(crate) fn is_open_tag_end(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    let mut i = 0;
    loop {
        let ws_start = i;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        // an attribute needs whitespace before its name
        if i > ws_start && i < bytes.len() && is_attr_name_start(bytes[i]) {
            i += 1;
            while i < bytes.len() && is_attr_name_byte(bytes[i]) {
                i += 1;
            }
            // optional `= value`; only committed when the `=` is there
            let mut j = i;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if bytes.get(j) == Some(&b'=') {
                j += 1;
                while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                    j += 1;
                }
                match bytes.get(j) {
                    Some(&quote @ (b'"' | b'\'')) => {
                        j += 1;
                        while j < bytes.len() && bytes[j] != quote {
                            j += 1;
                        }
                        if j >= bytes.len() {
                            return false;
                        }
                        j += 1;
                    }
                    _ => {
                        let value_start = j;
                        while j < bytes.len() && !ends_unquoted_value(bytes[j]) {
                            j += 1;
                        }
                        if j == value_start {
                            return false;
                        }
                    }
                }
                i = j;
            }
            continue;
        }
        i = ws_start;
        break;
    }
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
        i += 1;
    }
    if bytes.get(i) == Some(&b'/') {
        i += 1;
    }
    if bytes.get(i) != Some(&b'>') {
        return false;
    }
    i += 1;
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
        i += 1;
    }
    if bytes.get(i) == Some(&b'\n') {
        i += 1;
    }
    i == bytes.len()
}

/// Whether `rest` (everything after a close tag's name, through the end of
/// the line) completes the tag: `>` and only whitespace after.
pub(crate) fn is_close_tag_end(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    let mut i = 0;
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
        i += 1;
    }
    if bytes.get(i) != Some(&b'>') {
        return false;
    }
    i += 1;
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
        i += 1;
    }
    if bytes.get(i) == Some(&b'\n') {
        i += 1;
    }
    i == bytes.len()
}

#[inline]
fn is_attr_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b':'
}

#[inline]
fn is_attr_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b':' | b'-')
}

#[inline]
fn ends_unquoted_value(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'"' | b'\'' | b'=' | b'<' | b'>' | b'`')
}
