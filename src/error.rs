//! Client error types

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Errors raised by the HAFAS REST client
#[derive(Debug, Error)]
pub enum Error {
    /// The configured endpoint is not a usable absolute URL
    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    /// A required argument was missing or empty; no request was issued
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Connection to the endpoint failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The caller-supplied request timeout elapsed
    #[error("Request timed out")]
    Timeout,

    /// The server answered with a non-2xx status
    #[error("{message}")]
    HttpError {
        /// Response status code
        status: StatusCode,
        /// Display message; gains a ` – <msg>` suffix when the server
        /// sent a JSON error body carrying a `msg` field
        message: String,
        /// Parsed JSON error body, present when the failure response
        /// declared `application/json`
        body: Option<Value>,
    },

    /// A 2xx response body could not be decoded as JSON
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl Error {
    /// Status code of an HTTP-level failure
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Parsed JSON error body attached to an HTTP-level failure
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        match self {
            Self::HttpError {
                body: Some(body), ..
            } => Some(body),
            _ => None,
        }
    }

    /// Returns true if retrying the call could plausibly succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionFailed(_) | Self::Timeout => true,
            Self::HttpError { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::InvalidEndpoint(_) | Self::InvalidArgument(_) | Self::ParseError(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_http_error_display_carries_server_message() {
        let err = Error::HttpError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "HTTP 500 Internal Server Error – not found".to_string(),
            body: Some(json!({"msg": "not found"})),
        };
        assert!(err.to_string().ends_with("– not found"));
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(err.body(), Some(&json!({"msg": "not found"})));
    }

    #[test]
    fn test_http_error_without_body() {
        let err = Error::HttpError {
            status: StatusCode::NOT_FOUND,
            message: "HTTP 404 Not Found".to_string(),
            body: None,
        };
        assert_eq!(err.to_string(), "HTTP 404 Not Found");
        assert_eq!(err.body(), None);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(Error::ConnectionFailed("refused".to_string()).is_retryable());
        assert!(Error::Timeout.is_retryable());
        assert!(
            Error::HttpError {
                status: StatusCode::BAD_GATEWAY,
                message: "HTTP 502 Bad Gateway".to_string(),
                body: None,
            }
            .is_retryable()
        );
        assert!(
            Error::HttpError {
                status: StatusCode::TOO_MANY_REQUESTS,
                message: "HTTP 429 Too Many Requests".to_string(),
                body: None,
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_non_retryable_errors() {
        assert!(!Error::InvalidEndpoint("nope".to_string()).is_retryable());
        assert!(!Error::InvalidArgument("stop id".to_string()).is_retryable());
        assert!(!Error::ParseError("bad json".to_string()).is_retryable());
        assert!(
            !Error::HttpError {
                status: StatusCode::NOT_FOUND,
                message: "HTTP 404 Not Found".to_string(),
                body: None,
            }
            .is_retryable()
        );
    }
}
