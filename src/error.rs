//! Error handling for the linevis pipeline
//!
//! This module defines custom error types and a Result alias for use
//! throughout the crate.

use thiserror::Error;

/// Main error type for linevis operations
///
/// Framing and per-line parse failures are not errors in this sense: they
/// travel through the pipeline as events so the stream keeps flowing. This
/// type covers the fallible edges, configuration files and the recording
/// sink.
#[derive(Error, Debug)]
pub enum LinevisError {
    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to the recording sink
    #[error("Recording error: {0}")]
    Recording(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<LinevisError>,
    },
}

impl LinevisError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        LinevisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for linevis operations
pub type Result<T> = std::result::Result<T, LinevisError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LinevisError::Config("missing delimiter".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing delimiter");
    }

    #[test]
    fn test_error_with_context() {
        let err = LinevisError::Config("missing delimiter".to_string());
        let with_ctx = err.with_context("Failed to load profile");
        assert!(with_ctx.to_string().contains("Failed to load profile"));
    }

    #[test]
    fn test_result_ext_context() {
        let res: Result<()> = Err(LinevisError::Recording("disk full".to_string()));
        let err = res.context("while flushing rows").unwrap_err();
        assert!(err.to_string().contains("while flushing rows"));
    }
}
