//! Error taxonomy for outbound API calls.
//!
//! Every variant that crosses the [`HttpClient`](super::HttpClient) boundary
//! has already produced exactly one user-visible notification; callers handle
//! control flow only and never re-present the failure.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received.
    #[error("network request failed")]
    Network(#[source] reqwest::Error),

    /// A response arrived with a non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Success status, but the response envelope carried a failure code.
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    /// Success envelope whose payload did not match the expected shape.
    #[error("failed to decode response payload")]
    Decode(#[source] serde_json::Error),
}
