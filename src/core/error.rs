//! Error types for pipeline assembly and rendering

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building, rendering or writing a pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error in {context}: {message}")]
    Configuration { context: String, message: String },

    #[error("Invalid expression reference: {0}")]
    InvalidReference(String),

    #[error("Duplicate job name: {0}")]
    DuplicateJobName(String),

    #[error("Duplicate environment variable: {0}")]
    DuplicateVariable(String),

    #[error("Job '{job}' depends on unknown job '{dependency}'")]
    UnresolvedDependency { job: String, dependency: String },

    #[error("Job '{job}' depends on '{dependency}', which must be declared before it")]
    DependencyOrder { job: String, dependency: String },

    #[error("Failed to write {}: {source}", .path.display())]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize workflow: {0}")]
    Serialization(#[from] serde_yaml::Error),
}

impl PipelineError {
    /// Shorthand for a configuration error
    pub fn configuration(context: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::Configuration {
            context: context.into(),
            message: message.into(),
        }
    }
}

/// Result alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Fail with a configuration error when `value` is empty or whitespace
pub(crate) fn require_non_empty(context: &str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PipelineError::configuration(
            context,
            format!("'{}' must not be empty", field),
        ));
    }
    Ok(())
}
