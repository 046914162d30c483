//! Render scheduling
//!
//! - `debounce`: the clock-injected single-slot debouncer
//! - `scheduler`: a tokio task driving it, and a live preview built on top

pub mod debounce;
pub mod scheduler;

pub use debounce::Debouncer;
pub use scheduler::{run_debounced, LivePreview, RenderScheduler};
