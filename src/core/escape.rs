//! Math span escaping
//!
//! Math content has to survive one pass through the Markdown renderer
//! before the math engine sees it. Inside every `$$...$$` and `$...$` span:
//!
//! 1. every backslash is doubled, so `\alpha` reaches the engine as `\alpha`
//!    and a `\\` row break as `\\`;
//! 2. `_`, `{` and `}` get a backslash prefix, so underscores are not read as
//!    emphasis and braces are not reformatted.
//!
//! Each character is mapped independently, so no sentinel text is ever
//! inserted and the mapping is undone exactly by one Markdown unescape
//! (see [`unescape_math_content`]).
//!
//! The text is scanned once into typed [`Segment`]s. Block spans are claimed
//! before inline spans so a `$$` pair is never split at its first `$`.

use tracing::trace;

use super::environment::find_environment;

/// A piece of text classified by the math scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text outside any math span
    Plain(&'a str),
    /// Content between single dollars
    InlineMath(&'a str),
    /// Content between double dollars
    BlockMath(&'a str),
}

impl Segment<'_> {
    /// Serialize the segment back with its content escaped
    pub fn escaped(&self) -> String {
        match self {
            Segment::Plain(text) => text.to_string(),
            Segment::InlineMath(content) => format!("${}$", escape_math_content(content)),
            Segment::BlockMath(content) => format!("$$ {} $$", escape_math_content(content)),
        }
    }

    pub fn is_math(&self) -> bool {
        !matches!(self, Segment::Plain(_))
    }
}

/// Escape Markdown-significant characters in math content
pub fn escape_math_content(content: &str) -> String {
    let mut result = String::with_capacity(content.len() + content.len() / 4);
    for ch in content.chars() {
        match ch {
            '\\' => result.push_str(r"\\"),
            '_' => result.push_str(r"\_"),
            '{' => result.push_str(r"\{"),
            '}' => result.push_str(r"\}"),
            c => result.push(c),
        }
    }
    result
}

/// Undo [`escape_math_content`] the way a Markdown renderer does
pub fn unescape_math_content(escaped: &str) -> String {
    let mut result = String::with_capacity(escaped.len());
    let mut chars = escaped.chars().peekable();
    while let Some(ch) = chars.next() {
        match (ch, chars.peek()) {
            ('\\', Some(&next)) if matches!(next, '\\' | '_' | '{' | '}') => {
                result.push(next);
                chars.next();
            }
            (c, _) => result.push(c),
        }
    }
    result
}

/// Split text into plain and math segments
///
/// - `$$` opens a block span closed by the next `$$`, across lines.
/// - `$` opens an inline span closed by the next `$` in the same paragraph;
///   a blank line ends the search.
/// - `\$` is a literal dollar and never opens or closes a span.
/// - Unclosed openers stay in the surrounding plain text.
/// - Complete `equation` / `align` environments are opaque; they belong to
///   the environment rewriter.
pub fn split_math_segments(text: &str) -> Vec<Segment<'_>> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => match find_environment(text, i) {
                Some(found) => i = found.end,
                None => i += 2,
            },
            b'$' if bytes.get(i + 1) == Some(&b'$') => match find_block_close(bytes, i + 2) {
                Some(close) => {
                    push_plain(&mut segments, &text[plain_start..i]);
                    segments.push(Segment::BlockMath(&text[i + 2..close]));
                    i = close + 2;
                    plain_start = i;
                }
                None => i += 2,
            },
            b'$' => match find_inline_close(bytes, i + 1) {
                Some(close) => {
                    push_plain(&mut segments, &text[plain_start..i]);
                    segments.push(Segment::InlineMath(&text[i + 1..close]));
                    i = close + 1;
                    plain_start = i;
                }
                None => i += 1,
            },
            _ => i += 1,
        }
    }

    if plain_start < bytes.len() {
        segments.push(Segment::Plain(&text[plain_start..]));
    }
    segments
}

fn push_plain<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str) {
    if !text.is_empty() {
        segments.push(Segment::Plain(text));
    }
}

fn find_block_close(bytes: &[u8], from: usize) -> Option<usize> {
    let mut j = from;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'$' if bytes.get(j + 1) == Some(&b'$') => return Some(j),
            _ => j += 1,
        }
    }
    None
}

fn find_inline_close(bytes: &[u8], from: usize) -> Option<usize> {
    let mut j = from;
    while j < bytes.len() {
        match bytes[j] {
            b'\n' if starts_blank_line(&bytes[j + 1..]) => return None,
            b'\\' if bytes.get(j + 1) != Some(&b'\n') => j += 2,
            b'$' => return Some(j),
            _ => j += 1,
        }
    }
    None
}

/// A whitespace-only line after a line break ends the paragraph
fn starts_blank_line(rest: &[u8]) -> bool {
    rest.iter()
        .find(|&&b| !matches!(b, b' ' | b'\t' | b'\r'))
        .map_or(true, |&b| b == b'\n')
}

/// Escape the content of every math span in `text`
pub fn escape_math_spans(text: &str) -> String {
    let segments = split_math_segments(text);
    trace!(
        spans = segments.iter().filter(|s| s.is_math()).count(),
        "escaping math spans"
    );
    segments.iter().map(Segment::escaped).collect()
}
