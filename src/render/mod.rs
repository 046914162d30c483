//! Rendering modules
//!
//! - `markdown`: the Markdown renderer seam and its comrak implementation
//! - `document`: the HTML page around a rendered fragment
//! - `surface`: where finished documents go

pub mod document;
pub mod markdown;
pub mod surface;

pub use document::DocumentAssembler;
pub use markdown::{ComrakRenderer, MarkdownRenderer};
pub use surface::{DisplaySurface, FileSurface, MemorySurface};

use tracing::debug;

use crate::core::options::PreviewOptions;
use crate::core::pipeline::protect_markdown_with_options;

/// The whole preview pipeline: protect, render, assemble
///
/// Rendering is deterministic: the same text always produces the same
/// document, byte for byte.
#[derive(Debug, Clone)]
pub struct Preview<R = ComrakRenderer> {
    options: PreviewOptions,
    renderer: R,
    assembler: DocumentAssembler,
}

impl Preview<ComrakRenderer> {
    pub fn new(options: PreviewOptions) -> Self {
        let renderer = ComrakRenderer::new(options.allow_raw_html);
        Self::with_renderer(options, renderer)
    }
}

impl Default for Preview<ComrakRenderer> {
    fn default() -> Self {
        Self::new(PreviewOptions::default())
    }
}

impl<R: MarkdownRenderer> Preview<R> {
    pub fn with_renderer(options: PreviewOptions, renderer: R) -> Self {
        let assembler = DocumentAssembler::from_options(&options);
        Self {
            options,
            renderer,
            assembler,
        }
    }

    pub fn options(&self) -> &PreviewOptions {
        &self.options
    }

    /// Protected Markdown, ready for the renderer
    pub fn protect(&self, text: &str) -> String {
        protect_markdown_with_options(text, &self.options)
    }

    /// Rendered HTML fragment
    pub fn render_fragment(&self, text: &str) -> String {
        let protected = self.protect(text);
        self.renderer.render(&protected)
    }

    /// Complete HTML document
    pub fn render_document(&self, text: &str) -> String {
        let fragment = self.render_fragment(text);
        let document = self.assembler.assemble(&fragment);
        debug!(fragment = fragment.len(), document = document.len(), "rendered document");
        document
    }
}
