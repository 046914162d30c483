//! # mathmark
//!
//! Live preview transform for Markdown with embedded LaTeX math.
//!
//! Markdown and LaTeX disagree about `_`, `{`, `}`, `\`, `|` and `$`. This
//! crate protects math from the Markdown renderer (and tables and code from
//! the math stages) so an off-the-shelf CommonMark renderer and MathJax can
//! share one source text.
//!
//! ## Features
//!
//! - **Shielding**: tables and code are swapped out while math is rewritten
//! - **Delimiters**: `\[ \]` and `\( \)` become `$$ $$` and `$ $`
//! - **Escaping**: math spans survive one Markdown pass unchanged
//! - **Environments**: `equation` and `align` become block math
//! - **Document**: a styled page that loads and runs MathJax
//! - **Debounce**: re-render only once typing pauses
//!
//! ## Usage Examples
//!
//! ### Protecting Markdown
//!
//! ```rust
//! use mathmark::protect_markdown;
//!
//! let protected = protect_markdown(r"Energy: \(E = m_0 c^2\)");
//! assert_eq!(protected, r"Energy: $E = m\_0 c^2$");
//! ```
//!
//! ### Rendering a Document
//!
//! ```rust
//! use mathmark::{Preview, PreviewOptions};
//!
//! let preview = Preview::new(PreviewOptions::default());
//! let page = preview.render_document("# Notes\n\n$$\\int_0^1 x\\,dx$$\n");
//! assert!(page.contains(r"$$ \int_0^1 x\,dx $$"));
//! ```

/// Core transform modules
pub mod core;

/// Markdown rendering, document assembly and display surfaces
pub mod render;

/// Debounced render scheduling
pub mod schedule;

/// Utility modules
pub mod utils;

// Re-export core transform functions
pub use crate::core::{delimiters, environment, escape, pipeline, shield};
pub use crate::core::{
    escape_math_content, escape_math_spans, normalize_delimiters, protect_markdown,
    protect_markdown_with_options, restore_blocks, rewrite_environments, shield_tables,
    unescape_math_content, Environment, PreviewOptions, Segment, ShieldKind, ShieldRegistry,
    DEFAULT_DEBOUNCE_MS, DEFAULT_MATHJAX_URL,
};

// Re-export rendering
pub use render::{document, markdown, surface};
pub use render::{
    ComrakRenderer, DisplaySurface, DocumentAssembler, FileSurface, MarkdownRenderer,
    MemorySurface, Preview,
};

// Re-export scheduling
pub use schedule::{Debouncer, LivePreview, RenderScheduler};

// Re-export utilities
pub use utils::error::{PreviewError, PreviewResult};

/// Protect, render and assemble `text` with default options
pub fn render_document(text: &str) -> String {
    Preview::default().render_document(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_document_default() {
        let doc = render_document(r"\begin{equation}E=mc^2\end{equation}");
        assert!(doc.contains("$$ E=mc^2 $$"));
        assert!(doc.contains("window.MathJax"));
    }

    #[test]
    fn test_protect_markdown_reexport() {
        assert_eq!(protect_markdown("$a_b$"), r"$a\_b$");
    }
}
