use thiserror::Error;

/// Errors from talking to the backend.
///
/// Only transport-level trouble lands here. A backend function answering
/// 200 with an in-band refusal is a verdict, not an error; see
/// [`crate::api::TransitionVerdict`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed (connect, timeout, TLS)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body was not the shape we expected
    #[error("could not decode backend response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL is unusable
    #[error("invalid API URL '{0}': must start with http:// or https://")]
    InvalidUrl(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
