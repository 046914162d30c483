//! Math delimiter normalization
//!
//! Rewrites LaTeX's bracket and parenthesis delimiters into the dollar
//! convention the math engine is configured for:
//!
//! - `\[ ... \]` becomes `$$ ... $$`
//! - `\( ... \)` becomes `$ ... $`
//!
//! Matching is non-greedy: the first closing delimiter after an opener ends
//! the span, and spans may cover several lines. Inline spans stay inside one
//! paragraph, and an empty `\(\)` is dropped so it cannot fuse with a
//! neighbouring `$`. Content is not touched here.

/// Normalize both delimiter styles, display math first
pub fn normalize_delimiters(text: &str) -> String {
    let display = rewrite_pair(text, r"\[", r"\]", "$$");
    rewrite_pair(&display, r"\(", r"\)", "$")
}

/// Replace every `open ... close` pair with `wrap ... wrap`
fn rewrite_pair(text: &str, open: &str, close: &str, wrap: &str) -> String {
    let inline = wrap == "$";
    let mut result = String::with_capacity(text.len());
    let mut copied = 0;
    let mut cursor = 0;

    while let Some(open_at) = find_delimiter(text, cursor, open) {
        let content_start = open_at + open.len();
        let Some(close_at) = find_delimiter(text, content_start, close) else {
            // No closer anywhere after this opener, so no later opener can
            // match either.
            break;
        };
        let content = &text[content_start..close_at];

        // Inline math lives inside one paragraph.
        if inline && crosses_blank_line(content) {
            cursor = content_start;
            continue;
        }

        result.push_str(&text[copied..open_at]);
        // An empty inline pair would fuse with a neighbouring `$` into `$$`.
        if !(inline && content.is_empty()) {
            result.push_str(wrap);
            result.push_str(content);
            result.push_str(wrap);
        }

        cursor = close_at + close.len();
        copied = cursor;
    }

    result.push_str(&text[copied..]);
    result
}

/// Whether a whitespace-only line sits between the first and last line
fn crosses_blank_line(content: &str) -> bool {
    let lines: Vec<&str> = content.split('\n').collect();
    lines.len() > 2 && lines[1..lines.len() - 1].iter().any(|l| l.trim().is_empty())
}

/// Find `delimiter` at or after `from`, skipping occurrences whose leading
/// backslash is itself escaped (`\\[2pt]` is a row break, not a display
/// opener)
fn find_delimiter(text: &str, from: usize, delimiter: &str) -> Option<usize> {
    text[from..]
        .match_indices(delimiter)
        .map(|(at, _)| from + at)
        .find(|&at| preceding_backslashes(text, at) % 2 == 0)
}

/// Count consecutive backslashes immediately before `at`
pub(crate) fn preceding_backslashes(text: &str, at: usize) -> usize {
    text.as_bytes()[..at]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count()
}
