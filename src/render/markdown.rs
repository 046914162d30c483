//! Markdown rendering collaborator
//!
//! The renderer only ever sees protected text: tables and code are back in
//! place verbatim, and math spans carry the escapes it is expected to undo.

use comrak::{markdown_to_html, Options};

/// Converts protected Markdown into an HTML fragment
pub trait MarkdownRenderer {
    fn render(&self, protected: &str) -> String;
}

/// CommonMark + GFM tables via comrak
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComrakRenderer {
    allow_raw_html: bool,
}

impl ComrakRenderer {
    pub fn new(allow_raw_html: bool) -> Self {
        Self { allow_raw_html }
    }

    fn options(&self) -> Options<'static> {
        let mut options = Options::default();
        // Fenced code blocks are part of CommonMark; tables are an extension.
        options.extension.table = true;
        options.render.r#unsafe = self.allow_raw_html;
        options
    }
}

impl MarkdownRenderer for ComrakRenderer {
    fn render(&self, protected: &str) -> String {
        markdown_to_html(protected, &self.options())
    }
}

impl<F> MarkdownRenderer for F
where
    F: Fn(&str) -> String,
{
    fn render(&self, protected: &str) -> String {
        self(protected)
    }
}
