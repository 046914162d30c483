//! HTML document assembly
//!
//! Wraps a rendered fragment in a self-contained page: fixed style rules, a
//! MathJax configuration matching the protection pipeline (dollar
//! delimiters, `processEscapes: false`, AMS tags), an async engine script
//! and a load hook that runs one typeset pass.
//!
//! ## Example
//!
//! ```rust
//! use mathmark::document::DocumentAssembler;
//!
//! let page = DocumentAssembler::default().assemble("<p>$x$</p>");
//! assert!(page.starts_with("<!DOCTYPE html>"));
//! assert!(page.contains("processEscapes: false"));
//! ```

use std::fmt::Write;

use crate::core::options::{PreviewOptions, DEFAULT_MATHJAX_URL};

/// MathJax configuration, set before the engine script loads
const MATHJAX_CONFIG: &str = r#"<script>
window.MathJax = {
  tex: {
    inlineMath: [['$', '$']],
    displayMath: [['$$', '$$']],
    processEscapes: false,
    tags: 'ams'
  },
  svg: {
    fontCache: 'global'
  }
};
</script>"#;

const TYPESET_HOOK: &str = r#"<script>
document.addEventListener("DOMContentLoaded", function() {
  if (window.MathJax) {
    window.MathJax.typeset && window.MathJax.typeset();
  }
});
</script>"#;

const STYLE: &str = r#"<style>
::-webkit-scrollbar { width: 10px; background: rgba(0, 0, 0, 0.05); }
::-webkit-scrollbar-thumb { background: rgba(0, 0, 0, 0.2); border-radius: 5px; }
::-webkit-scrollbar-thumb:hover { background: rgba(0, 0, 0, 0.3); }
body {
  font-family: "Helvetica Neue", Arial;
  margin: 25px;
  line-height: 1.8;
  color: #333;
  background-color: #fcfcfa;
}
h1, h2, h3, h4, h5, h6 {
  color: #2c3e50;
  margin-top: 1.5em;
  margin-bottom: 0.8em;
  font-weight: 600;
}
h1 { font-size: 2em; }
h2 { font-size: 1.7em; }
h3 { font-size: 1.4em; }
h4 { font-size: 1.2em; }
pre {
  background: #f8f8f8;
  padding: 15px;
  border-radius: 8px;
  overflow-x: auto;
  border: 1px solid #e0e0e0;
  margin: 1.2em 0;
}
code {
  font-family: Consolas, Monaco, "Andale Mono", monospace;
  font-size: 0.9em;
  background-color: #f0f0f0;
  padding: 2px 4px;
  border-radius: 3px;
}
pre code { background-color: transparent; padding: 0; border-radius: 0; }
.math { color: #2e7d32; padding: 5px 0; }
p { margin: 0.8em 0; white-space: pre-wrap; word-wrap: break-word; }
ul, ol { padding-left: 2em; margin: 0.8em 0; }
li { margin: 0.4em 0; }
blockquote {
  border-left: 4px solid #4CAF50;
  margin: 1em 0;
  color: #555;
  background-color: #f9f9f9;
  padding: 10px 15px;
  border-radius: 0 5px 5px 0;
}
a { color: #3498db; text-decoration: none; }
a:hover { text-decoration: underline; }
table { border-collapse: collapse; width: 100%; margin: 1em 0; overflow-x: auto; display: block; }
th, td { border: 1px solid #ddd; padding: 8px 12px; text-align: left; }
th { background-color: #f2f2f2; font-weight: bold; }
tr:nth-child(even) { background-color: #f9f9f9; }
img { max-width: 100%; height: auto; display: block; margin: 1em auto; border-radius: 5px; }
hr { border: 0; height: 1px; background-color: #ddd; margin: 1.5em 0; }
</style>"#;

/// Builds complete HTML documents around rendered fragments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentAssembler {
    mathjax_url: String,
    title: Option<String>,
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self {
            mathjax_url: DEFAULT_MATHJAX_URL.to_string(),
            title: None,
        }
    }
}

impl DocumentAssembler {
    pub fn new(mathjax_url: impl Into<String>) -> Self {
        Self {
            mathjax_url: mathjax_url.into(),
            title: None,
        }
    }

    pub fn from_options(options: &PreviewOptions) -> Self {
        Self {
            mathjax_url: options.mathjax_url.clone(),
            title: options.title.clone(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Wrap `fragment` in a full document
    pub fn assemble(&self, fragment: &str) -> String {
        let mut doc = String::with_capacity(fragment.len() + STYLE.len() + 1024);

        doc.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        if let Some(ref title) = self.title {
            let _ = writeln!(doc, "<title>{}</title>", escape_html(title));
        }
        doc.push_str(MATHJAX_CONFIG);
        doc.push('\n');
        let _ = writeln!(
            doc,
            "<script src=\"{}\" async></script>",
            escape_html(&self.mathjax_url)
        );
        doc.push_str(STYLE);
        doc.push_str("\n</head>\n<body>\n");
        doc.push_str(fragment);
        if !fragment.ends_with('\n') {
            doc.push('\n');
        }
        doc.push_str(TYPESET_HOOK);
        doc.push_str("\n</body>\n</html>\n");

        doc
    }
}

/// Escape text for an HTML attribute or text node
fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            c => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_shell() {
        let doc = DocumentAssembler::default().assemble("<p>hello</p>\n");
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<body>\n<p>hello</p>\n<script>"));
        assert!(doc.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_mathjax_config() {
        let doc = DocumentAssembler::default().assemble("");
        assert!(doc.contains("inlineMath: [['$', '$']]"));
        assert!(doc.contains("displayMath: [['$$', '$$']]"));
        assert!(doc.contains("processEscapes: false"));
        assert!(doc.contains("tags: 'ams'"));
        assert!(doc.contains("fontCache: 'global'"));
        let engine = format!("<script src=\"{}\" async></script>", DEFAULT_MATHJAX_URL);
        assert!(doc.contains(&engine));
    }

    #[test]
    fn test_config_precedes_engine_and_hook_follows_body() {
        let doc = DocumentAssembler::default().assemble("<p>x</p>");
        let config = doc.find("window.MathJax = {").unwrap();
        let engine = doc.find("async></script>").unwrap();
        let body = doc.find("<p>x</p>").unwrap();
        let hook = doc.find("DOMContentLoaded").unwrap();
        assert!(config < engine && engine < body && body < hook);
    }

    #[test]
    fn test_title_is_escaped() {
        let doc = DocumentAssembler::default()
            .with_title("a < b & c")
            .assemble("");
        assert!(doc.contains("<title>a &lt; b &amp; c</title>"));
    }

    #[test]
    fn test_custom_engine_url() {
        let doc = DocumentAssembler::new("/static/mathjax.js").assemble("");
        assert!(doc.contains("<script src=\"/static/mathjax.js\" async></script>"));
    }

    #[test]
    fn test_pure() {
        let assembler = DocumentAssembler::default();
        assert_eq!(assembler.assemble("<p>a</p>"), assembler.assemble("<p>a</p>"));
    }
}
