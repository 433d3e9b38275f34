//! Errors raised by the Linode API client

use super::common::ApiErrorEntry;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to the Linode API failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("{action} returned errors: {}", join_errors(.errors))]
    ApiError {
        action: String,
        errors: Vec<ApiErrorEntry>,
    },

    #[error("API returned HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    #[error("malformed API envelope: {0}")]
    ParseError(String),

    #[error("API key rejected")]
    AuthError,

    #[error("no response within {0}s")]
    Timeout(u64),

    #[error("rate limited by the Linode API")]
    RateLimited,

    #[error("Linode API unavailable")]
    ServiceUnavailable,
}

impl ApiError {
    /// Error codes reported by the service, if any
    pub fn codes(&self) -> Vec<i64> {
        match self {
            ApiError::ApiError { errors, .. } => errors.iter().map(|e| e.code).collect(),
            _ => Vec::new(),
        }
    }
}

fn join_errors(errors: &[ApiErrorEntry]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
