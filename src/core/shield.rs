//! Block shielding and restoration
//!
//! Markdown tables and code are swapped for opaque placeholders before the
//! math stages run, then put back byte-for-byte right before the text is
//! handed to the Markdown renderer.
//!
//! Placeholders are built from Unicode private-use characters and ASCII
//! letters and digits only, so none of the math stages (which rewrite `$`,
//! `\`, `_`, `{`, `}`) can alter them.
//!
//! ## Example
//!
//! ```rust
//! use mathmark::shield::{shield_tables, restore_blocks};
//!
//! let source = "| a_b | c |\n|---|---|\n| 1 | 2 |\n";
//! let (shielded, registry) = shield_tables(source);
//! assert!(!shielded.contains('|'));
//! assert_eq!(restore_blocks(&shielded, &registry), source);
//! ```

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

const PLACEHOLDER_OPEN: char = '\u{F8F0}';
const PLACEHOLDER_CLOSE: char = '\u{F8F1}';
const PLACEHOLDER_TAG: &str = "MMSHIELD";

lazy_static! {
    /// A `| ... |` table row (leading/trailing whitespace allowed)
    static ref TABLE_ROW: Regex = Regex::new(r"^[ \t]*\|.*\|\s*$").unwrap();

    /// A header separator row made only of `|`, `-`, `:` and whitespace
    static ref TABLE_SEPARATOR: Regex = Regex::new(r"^[ \t]*\|[-:\s|]*\|\s*$").unwrap();
}

/// What a shielded block was
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShieldKind {
    /// Markdown pipe table
    Table,
    /// Fenced code block (``` or ~~~)
    FencedCode,
    /// Inline code span
    CodeSpan,
}

/// One shielded block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShieldedBlock {
    pub kind: ShieldKind,
    pub original: String,
}

/// Ordered placeholder → original block mapping for a single transform
#[derive(Debug, Default, Clone)]
pub struct ShieldRegistry {
    blocks: IndexMap<String, ShieldedBlock>,
}

impl ShieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block and return the placeholder standing in for it
    pub fn insert(&mut self, kind: ShieldKind, original: &str) -> String {
        let placeholder = placeholder_for(self.blocks.len());
        self.blocks.insert(
            placeholder.clone(),
            ShieldedBlock {
                kind,
                original: original.to_string(),
            },
        );
        placeholder
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &ShieldedBlock)> {
        self.blocks.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of blocks of the given kind
    pub fn count(&self, kind: ShieldKind) -> usize {
        self.blocks.values().filter(|b| b.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Placeholder token for the `index`-th shielded block
pub fn placeholder_for(index: usize) -> String {
    format!(
        "{}{}{}{}",
        PLACEHOLDER_OPEN, PLACEHOLDER_TAG, index, PLACEHOLDER_CLOSE
    )
}

// =============================================================================
// Tables
// =============================================================================

/// Shield every well-formed table block into a fresh registry
pub fn shield_tables(text: &str) -> (String, ShieldRegistry) {
    let mut registry = ShieldRegistry::new();
    let shielded = shield_tables_into(text, &mut registry);
    (shielded, registry)
}

/// Shield every well-formed table block, appending to `registry`
///
/// A table is a header row, a separator row, and at least one body row, all
/// on consecutive lines. Anything else is left for the Markdown renderer.
pub fn shield_tables_into(text: &str, registry: &mut ShieldRegistry) -> String {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut result = String::with_capacity(text.len());
    let mut i = 0;

    while i < lines.len() {
        match table_extent(&lines, i) {
            Some(end) => {
                let block = lines[i..end].concat();
                // The final line break stays in the text so the placeholder
                // keeps its own line.
                let (body, newline) = match block.strip_suffix('\n') {
                    Some(body) => (body, "\n"),
                    None => (block.as_str(), ""),
                };
                result.push_str(&registry.insert(ShieldKind::Table, body));
                result.push_str(newline);
                i = end;
            }
            None => {
                result.push_str(lines[i]);
                i += 1;
            }
        }
    }

    result
}

/// End line (exclusive) of a table starting at `start`, if one does
fn table_extent(lines: &[&str], start: usize) -> Option<usize> {
    let header = lines.get(start)?;
    let separator = lines.get(start + 1)?;
    let first_row = lines.get(start + 2)?;

    if !is_table_row(header) || !is_table_separator(separator) || !is_table_row(first_row) {
        return None;
    }

    let mut end = start + 3;
    while end < lines.len() && is_table_row(lines[end]) {
        end += 1;
    }
    Some(end)
}

fn is_table_row(line: &str) -> bool {
    TABLE_ROW.is_match(line.trim_end_matches('\n'))
}

fn is_table_separator(line: &str) -> bool {
    let line = line.trim_end_matches('\n');
    TABLE_SEPARATOR.is_match(line) && line.contains('-')
}

// =============================================================================
// Code
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FenceChar {
    Backtick,
    Tilde,
}

/// Shield fenced code blocks, then inline code spans, appending to `registry`
pub fn shield_code_into(text: &str, registry: &mut ShieldRegistry) -> String {
    let fenced = shield_fences(text, registry);
    shield_code_spans(&fenced, registry)
}

fn parse_fence_line(line: &str) -> Option<(FenceChar, usize)> {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() && i < 3 && bytes[i] == b' ' {
        i += 1;
    }
    let ch = *bytes.get(i)?;
    let fence_char = match ch {
        b'`' => FenceChar::Backtick,
        b'~' => FenceChar::Tilde,
        _ => return None,
    };
    let count = bytes[i..].iter().take_while(|&&b| b == ch).count();
    if count < 3 {
        return None;
    }
    Some((fence_char, count))
}

/// Closing fences carry no info string
fn is_bare_fence(line: &str) -> bool {
    line.trim().trim_start_matches(['`', '~']).is_empty()
}

fn shield_fences(text: &str, registry: &mut ShieldRegistry) -> String {
    let mut result = String::with_capacity(text.len());
    // (char, length, byte offset of the opening line)
    let mut open: Option<(FenceChar, usize, usize)> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        match (open, parse_fence_line(line.trim_end_matches(['\n', '\r']))) {
            (None, Some((ch, len))) => open = Some((ch, len, start)),
            (None, None) => result.push_str(line),
            (Some((open_ch, open_len, open_start)), Some((ch, len)))
                if ch == open_ch && len >= open_len && is_bare_fence(line) =>
            {
                let block = &text[open_start..offset];
                let (body, newline) = match block.strip_suffix('\n') {
                    Some(body) => (body, "\n"),
                    None => (block, ""),
                };
                result.push_str(&registry.insert(ShieldKind::FencedCode, body));
                result.push_str(newline);
                open = None;
            }
            (Some(_), _) => {}
        }
    }

    // An unclosed fence runs to the end of the input.
    if let Some((_, _, open_start)) = open {
        result.push_str(&registry.insert(ShieldKind::FencedCode, &text[open_start..]));
    }

    result
}

fn shield_code_spans(text: &str, registry: &mut ShieldRegistry) -> String {
    let bytes = text.as_bytes();
    let mut result = String::with_capacity(text.len());
    let mut plain_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => {
                let run = backtick_run(bytes, i);
                match find_closing_run(text, i + run, run) {
                    Some(close_end) => {
                        result.push_str(&text[plain_start..i]);
                        let span = &text[i..close_end];
                        result.push_str(&registry.insert(ShieldKind::CodeSpan, span));
                        i = close_end;
                        plain_start = i;
                    }
                    None => i += run,
                }
            }
            _ => i += 1,
        }
    }

    result.push_str(&text[plain_start.min(text.len())..]);
    result
}

fn backtick_run(bytes: &[u8], start: usize) -> usize {
    bytes[start..].iter().take_while(|&&b| b == b'`').count()
}

/// End offset of the first run of exactly `run` backticks at or after
/// `from`, without crossing a blank line
fn find_closing_run(text: &str, from: usize, run: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' if text[i + 1..].trim_start_matches([' ', '\t', '\r']).starts_with('\n') => {
                return None;
            }
            b'`' => {
                let len = backtick_run(bytes, i);
                if len == run {
                    return Some(i + len);
                }
                i += len;
            }
            _ => i += 1,
        }
    }
    None
}

// =============================================================================
// Restoration
// =============================================================================

/// Put every shielded block back, verbatim
///
/// Entries are restored newest first so a placeholder nested inside a later
/// block (a code span inside a table row) is revealed before it is replaced.
pub fn restore_blocks(text: &str, registry: &ShieldRegistry) -> String {
    let mut result = text.to_string();
    for (placeholder, block) in registry.iter().rev() {
        if result.contains(placeholder) {
            result = result.replacen(placeholder, &block.original, 1);
        } else {
            warn!(
                kind = ?block.kind,
                placeholder = %placeholder.escape_unicode(),
                "shielded block lost before restoration"
            );
        }
    }
    result
}
