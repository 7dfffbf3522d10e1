//! Conversion between Go string literal syntax and plain text.
//!
//! Go has two literal forms: interpreted (`"..."`, backslash escapes) and raw
//! (`` `...` ``, verbatim, may span lines, cannot contain a backtick).

use memchr::memchr;
use phf::phf_map;

/// Single-character escapes valid inside an interpreted string literal.
static SIMPLE_ESCAPES: phf::Map<u8, u8> = phf_map! {
    b'a' => 0x07,
    b'b' => 0x08,
    b'f' => 0x0c,
    b'n' => b'\n',
    b'r' => b'\r',
    b't' => b'\t',
    b'v' => 0x0b,
    b'\\' => b'\\',
    b'"' => b'"',
};

/// Strip one layer of delimiters and return the text the literal denotes.
///
/// Malformed input (too short, unbalanced delimiters) is returned unchanged.
/// Returns `None` when an interpreted literal holds an escape sequence that
/// is invalid or denotes bytes that are not UTF-8 text.
pub fn decode(raw: &str) -> Option<String> {
    if raw.len() < 2 {
        return Some(raw.to_string());
    }
    let bytes = raw.as_bytes();
    match (bytes[0], bytes[raw.len() - 1]) {
        (b'`', b'`') => Some(raw[1..raw.len() - 1].replace('\r', "")),
        (b'"', b'"') => unescape(&raw[1..raw.len() - 1]),
        _ => Some(raw.to_string()),
    }
}

/// Render text as a Go string literal.
///
/// - Text containing a backtick cannot be raw, so it is flattened onto one
///   line (whitespace runs collapsed, newlines turned into spaces, trimmed)
///   and emitted as an interpreted literal.
/// - Multi-line text is emitted as a raw literal with the query on its own
///   lines between the delimiters.
/// - Anything else becomes an interpreted literal.
///
/// Text holding a control character a raw literal cannot carry (a raw
/// literal drops `\r`, and Go source may not contain NUL) also becomes an
/// interpreted literal, with newlines escaped rather than flattened.
pub fn encode(text: &str) -> String {
    if text.contains('`') {
        format!("\"{}\"", escape(&flatten(text)))
    } else if text.chars().any(needs_escape_in_raw) {
        format!("\"{}\"", escape(text))
    } else if text.contains('\n') {
        format!("`\n{}\n`", text)
    } else {
        format!("\"{}\"", escape(text))
    }
}

/// Whitespace as matched by `\s` in RE2 syntax.
fn is_space(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0c' | '\r' | ' ')
}

/// Collapse runs of two or more whitespace characters into a single space,
/// turn lone newlines into spaces, and trim both ends.
fn flatten(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if !is_space(c) {
            out.push(c);
            continue;
        }
        let mut run = 1;
        while chars.peek().copied().is_some_and(is_space) {
            chars.next();
            run += 1;
        }
        if run >= 2 || c == '\n' {
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out.trim_matches(is_space).to_string()
}

fn needs_escape_in_raw(c: char) -> bool {
    c.is_control() && c != '\n' && c != '\t'
}

/// Escape text for an interpreted literal. Control characters other than tab
/// are written as escapes, never raw.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push('\t'),
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\x0c' => out.push_str("\\f"),
            '\x0b' => out.push_str("\\v"),
            c if c.is_control() => {
                let code = u32::from(c);
                if code < 0x80 {
                    out.push_str(&format!("\\x{:02x}", code));
                } else {
                    out.push_str(&format!("\\u{:04x}", code));
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn unescape(inner: &str) -> Option<String> {
    let bytes = inner.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while let Some(offset) = memchr(b'\\', &bytes[i..]) {
        let slash = i + offset;
        out.extend_from_slice(&bytes[i..slash]);
        let kind = *bytes.get(slash + 1)?;
        i = slash + 2;

        if let Some(&b) = SIMPLE_ESCAPES.get(&kind) {
            out.push(b);
            continue;
        }
        match kind {
            b'0'..=b'7' => {
                let digits = inner.get(slash + 1..slash + 4)?;
                let value = u32::from_str_radix(digits, 8).ok()?;
                out.push(u8::try_from(value).ok()?);
                i = slash + 4;
            }
            b'x' => {
                let digits = inner.get(i..i + 2)?;
                out.push(u8::from_str_radix(digits, 16).ok()?);
                i += 2;
            }
            b'u' | b'U' => {
                let width = if kind == b'u' { 4 } else { 8 };
                let digits = inner.get(i..i + width)?;
                let c = char::from_u32(u32::from_str_radix(digits, 16).ok()?)?;
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                i += width;
            }
            _ => return None,
        }
    }
    out.extend_from_slice(&bytes[i..]);
    String::from_utf8(out).ok()
}
