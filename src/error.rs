use thiserror::Error;

/// Unified error type for git-resource operations
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results in git-resource
pub type Result<T> = std::result::Result<T, ResourceError>;

impl ResourceError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ResourceError::Config(msg.into())
    }

    /// Create a pattern error naming the offending pattern
    pub fn pattern(pattern: impl Into<String>, reason: impl ToString) -> Self {
        ResourceError::Pattern {
            pattern: pattern.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a repository error with context
    pub fn repository(msg: impl Into<String>) -> Self {
        ResourceError::Repository(msg.into())
    }
}
