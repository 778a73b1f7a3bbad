//! Error type for the Anthropic client.

use thiserror::Error;

/// Failures talking to the Messages endpoint.
///
/// None of these ever reach the simulation: the narrator swaps them for
/// placeholder text.
#[derive(Debug, Error)]
pub enum AnthropicError {
    /// HTTP 429. `retry_after_ms` comes from the `retry-after` header.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Any other non-success status, with the response body as message.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// A success response with no non-blank text block.
    #[error("response contained no text content")]
    EmptyContent,

    /// No answer within the client's request timeout.
    #[error("request timed out")]
    Timeout,

    /// Transport failure (DNS, refused connection, timeout, bad body).
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_display() {
        let err = AnthropicError::RateLimited {
            retry_after_ms: 5000,
        };
        assert_eq!(err.to_string(), "rate limited, retry after 5000ms");
    }

    #[test]
    fn api_error_display() {
        let err = AnthropicError::ApiError {
            status: 401,
            message: "Invalid API key".into(),
        };
        assert_eq!(err.to_string(), "API error (status 401): Invalid API key");
        assert_eq!(
            AnthropicError::EmptyContent.to_string(),
            "response contained no text content"
        );
        assert_eq!(AnthropicError::Timeout.to_string(), "request timed out");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AnthropicError>();
    }
}
