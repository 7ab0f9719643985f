use thiserror::Error;

use super::common::ApiErrorDetails;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error (HTTP {status}): {message}")]
    ApiError {
        status: u16,
        message: String,
        #[source]
        details: Option<Box<ApiErrorDetails>>,
    },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Authentication failed")]
    AuthError,

    #[error("Invalid endpoint {0:?}: expected http(s)://host[:port]")]
    InvalidEndpoint(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),
}

impl ApiError {
    /// The appliance reports absent objects with a 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::ApiError { status: 404, .. })
    }
}
