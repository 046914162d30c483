//! The protection pipeline
//!
//! Stages run strictly in order, each consuming the previous stage's output:
//!
//! 1. code shield (optional) and table shield
//! 2. delimiter normalization
//! 3. math span escaping
//! 4. environment rewriting
//! 5. restoration of shielded blocks
//!
//! The result is plain Markdown that an off-the-shelf renderer can convert
//! without destroying the math, and that the math engine can typeset once
//! the renderer has unescaped it.

use tracing::debug;

use super::delimiters::normalize_delimiters;
use super::environment::rewrite_environments;
use super::escape::escape_math_spans;
use super::options::PreviewOptions;
use super::shield::{
    restore_blocks, shield_code_into, shield_tables_into, ShieldKind, ShieldRegistry,
};

/// Protect `text` with default options
pub fn protect_markdown(text: &str) -> String {
    protect_markdown_with_options(text, &PreviewOptions::default())
}

/// Protect `text` so Markdown rendering leaves its math intact
///
/// Never fails: malformed tables, delimiters and environments pass through
/// as literal text.
pub fn protect_markdown_with_options(text: &str, options: &PreviewOptions) -> String {
    let mut registry = ShieldRegistry::new();

    let code_shielded = if options.shield_code {
        shield_code_into(text, &mut registry)
    } else {
        text.to_string()
    };
    let shielded = shield_tables_into(&code_shielded, &mut registry);
    debug!(
        tables = registry.count(ShieldKind::Table),
        fenced = registry.count(ShieldKind::FencedCode),
        spans = registry.count(ShieldKind::CodeSpan),
        "shielded blocks"
    );

    let normalized = if options.normalize_delimiters {
        normalize_delimiters(&shielded)
    } else {
        shielded
    };

    let escaped = escape_math_spans(&normalized);

    let rewritten = if options.rewrite_environments {
        rewrite_environments(&escaped)
    } else {
        escaped
    };

    let restored = restore_blocks(&rewritten, &registry);
    debug!(input = text.len(), output = restored.len(), "protected markdown");
    restored
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_input() {
        assert_eq!(protect_markdown(""), "");
    }

    #[test]
    fn test_plain_markdown_untouched() {
        let text = "# Title\n\nSome *emphasis* and a [link](http://x.y/a_b).\n";
        assert_eq!(protect_markdown(text), text);
    }

    #[test]
    fn test_display_brackets_become_escaped_block() {
        assert_eq!(protect_markdown(r"\[x_y\]"), r"$$ x\_y $$");
    }

    #[test]
    fn test_inline_parens_become_escaped_inline() {
        assert_eq!(protect_markdown(r"see \(\alpha_1\)"), r"see $\\alpha\_1$");
    }

    #[test]
    fn test_table_next_to_math() {
        let text = "| a_b | c |\n|---|---|\n| 1 | 2 |\n\n\\[x_y\\]\n";
        let protected = protect_markdown(text);
        assert_eq!(
            protected,
            "| a_b | c |\n|---|---|\n| 1 | 2 |\n\n$$ x\\_y $$\n"
        );
    }

    #[test]
    fn test_code_is_not_escaped() {
        let text = "`$a_b$` and $a_b$\n\n```\n$$ x_1 $$\n```\n";
        assert_eq!(
            protect_markdown(text),
            "`$a_b$` and $a\\_b$\n\n```\n$$ x_1 $$\n```\n"
        );
    }

    #[test]
    fn test_code_escaped_when_shield_disabled() {
        let opts = PreviewOptions::tables_only();
        assert_eq!(
            protect_markdown_with_options("`$a_b$`", &opts),
            "`$a\\_b$`"
        );
    }

    #[test]
    fn test_stages_can_be_disabled() {
        let opts = PreviewOptions {
            normalize_delimiters: false,
            rewrite_environments: false,
            ..Default::default()
        };
        let text = r"\(x\) \begin{equation}y\end{equation}";
        assert_eq!(protect_markdown_with_options(text, &opts), text);
    }

    #[test]
    fn test_deterministic() {
        let text = "| t |\n|---|\n| $x$ |\n\n$$a_b$$ \\begin{align}c\\\\d\\end{align}";
        assert_eq!(protect_markdown(text), protect_markdown(text));
    }
}
