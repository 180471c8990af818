use thiserror::Error;

pub type ScoringResult<T> = Result<T, ScoringError>;

/// Failure categories surfaced by every scoring operation
#[derive(Debug, Error)]
pub enum ScoringError {
    /// Rule set missing, malformed, or pointing at a tournament that is gone
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Malformed telemetry or request input
    #[error("validation error: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    /// Transient storage failure, the caller decides whether to retry
    #[error("storage error: {0:#}")]
    Storage(anyhow::Error),
    /// Stats API unreachable or answering with an error status
    #[error("stats API error: {0:#}")]
    Upstream(anyhow::Error),
}

impl ScoringError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ScoringError::Configuration(_) => "configuration",
            ScoringError::Validation(_) => "validation",
            ScoringError::NotFound(_) => "not_found",
            ScoringError::Storage(_) => "storage",
            ScoringError::Upstream(_) => "upstream",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ScoringError::Storage(_) | ScoringError::Upstream(_))
    }
}

/// Add context to fetch errors
pub fn fetch_context(url: &str) -> String {
    format!("Failed to fetch from: {}", url)
}

/// Add context to parse errors
pub fn parse_context(data_type: &str) -> String {
    format!("Failed to parse {}", data_type)
}
