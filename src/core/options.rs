//! Preview options
//!
//! Options can be built in code, loaded from a TOML file, or overridden from
//! the command line. Every field has a default so a partial file is valid.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::utils::error::{PreviewError, PreviewResult};

/// Quiet interval between the last edit and the render it triggers.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Math engine loaded by the assembled document.
pub const DEFAULT_MATHJAX_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/mathjax/3.2.0/es5/tex-mml-chtml.js";

/// Options controlling the transform, render and scheduling stages
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewOptions {
    /// Debounce quiet interval in milliseconds
    pub debounce_ms: u64,
    /// Shield fenced code blocks and inline code spans from the math stages
    pub shield_code: bool,
    /// Rewrite `\[ \]` and `\( \)` into dollar delimiters
    pub normalize_delimiters: bool,
    /// Rewrite `equation` / `align` environments into block math
    pub rewrite_environments: bool,
    /// Let raw HTML in the source through the Markdown renderer
    pub allow_raw_html: bool,
    /// Script URL of the math-typesetting engine
    pub mathjax_url: String,
    /// Optional document title
    pub title: Option<String>,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            shield_code: true,
            normalize_delimiters: true,
            rewrite_environments: true,
            allow_raw_html: false,
            mathjax_url: DEFAULT_MATHJAX_URL.to_string(),
            title: None,
        }
    }
}

impl PreviewOptions {
    /// Tables-only shielding: code blocks go through the math stages like
    /// any other text.
    pub fn tables_only() -> Self {
        Self {
            shield_code: false,
            ..Default::default()
        }
    }

    /// The debounce interval as a [`Duration`]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Parse options from TOML source
    pub fn from_toml_str(source: &str) -> PreviewResult<Self> {
        let options: PreviewOptions = toml::from_str(source)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a TOML file
    pub fn load(path: impl AsRef<Path>) -> PreviewResult<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// Reject values the scheduler or assembler cannot work with
    pub fn validate(&self) -> PreviewResult<()> {
        if self.debounce_ms == 0 {
            return Err(PreviewError::config("debounce_ms must be greater than zero"));
        }
        if self.mathjax_url.trim().is_empty() {
            return Err(PreviewError::config("mathjax_url must not be empty"));
        }
        Ok(())
    }
}
