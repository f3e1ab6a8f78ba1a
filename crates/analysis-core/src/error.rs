use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The remote service answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// Transport-level failure (connect, timeout, TLS, rate limiting).
    #[error("API error: {0}")]
    ApiError(String),

    /// The response body could not be decoded.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Valid response with no usable records.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AnalysisError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            AnalysisError::ApiError(_) => true,
            AnalysisError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
