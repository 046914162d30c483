//! Core transform modules
//!
//! This module contains the text-transform pipeline:
//! - `shield`: table and code shielding, and restoration
//! - `delimiters`: `\[ \]` / `\( \)` normalization
//! - `escape`: math span scanning and escaping
//! - `environment`: `equation` / `align` rewriting
//! - `pipeline`: the stages composed in order

pub mod delimiters;
pub mod environment;
pub mod escape;
pub mod options;
pub mod pipeline;
pub mod shield;

pub use delimiters::normalize_delimiters;
pub use environment::{escape_align_content, rewrite_environments, Environment};
pub use escape::{
    escape_math_content, escape_math_spans, split_math_segments, unescape_math_content, Segment,
};
pub use options::{PreviewOptions, DEFAULT_DEBOUNCE_MS, DEFAULT_MATHJAX_URL};
pub use pipeline::{protect_markdown, protect_markdown_with_options};
pub use shield::{
    restore_blocks, shield_code_into, shield_tables, shield_tables_into, ShieldKind,
    ShieldRegistry, ShieldedBlock,
};
