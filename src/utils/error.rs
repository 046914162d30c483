//! Error handling for mathmark
//!
//! The text transform itself never fails: malformed input degrades to
//! literal text. Errors only come from the edges around it, such as reading
//! and writing files, loading configuration or talking to a stopped
//! render scheduler.

use thiserror::Error;

/// Preview error type
#[derive(Debug, Error)]
pub enum PreviewError {
    /// IO error (reading sources, writing rendered documents)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration file or value could not be used
    #[error("Invalid configuration: {message}")]
    Config { message: String },
    /// Invalid input (bad CLI combination, unreadable encoding)
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
    /// The background render scheduler is gone
    #[error("Render scheduler stopped: {message}")]
    Scheduler { message: String },
}

impl From<toml::de::Error> for PreviewError {
    fn from(err: toml::de::Error) -> Self {
        PreviewError::Config {
            message: err.to_string(),
        }
    }
}

/// Result type for preview operations
pub type PreviewResult<T> = Result<T, PreviewError>;

// Convenience constructors for errors
impl PreviewError {
    pub fn config(message: impl Into<String>) -> Self {
        PreviewError::Config {
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        PreviewError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn scheduler(message: impl Into<String>) -> Self {
        PreviewError::Scheduler {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = PreviewError::config("debounce_ms must be positive");
        let msg = err.to_string();
        assert!(msg.contains("Invalid configuration"));
        assert!(msg.contains("debounce_ms"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "notes.md");
        let err: PreviewError = io.into();
        assert!(matches!(err, PreviewError::Io(_)));
        assert!(err.to_string().contains("notes.md"));
    }

    #[test]
    fn test_toml_error_conversion() {
        let parsed: Result<toml::Value, _> = toml::from_str("debounce_ms = ");
        let err: PreviewError = parsed.unwrap_err().into();
        assert!(matches!(err, PreviewError::Config { .. }));
    }

    #[test]
    fn test_scheduler_error_display() {
        let err = PreviewError::scheduler("channel closed");
        assert_eq!(err.to_string(), "Render scheduler stopped: channel closed");
    }
}
