use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::MessageSender;
use super::error::AnthropicError;
use super::types::{MessagesRequest, MessagesResponse};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const DEFAULT_RETRY_AFTER_MS: u64 = 1000;

pub struct AnthropicClient {
    api_key: String,
    client: Client,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: String) -> Result<Self, AnthropicError> {
        Self::with_base_url(api_key, API_URL.to_string())
    }

    /// Create a client pointing at a custom base URL (useful for testing).
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, AnthropicError> {
        Self::build(api_key, base_url, REQUEST_TIMEOUT)
    }

    fn build(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, AnthropicError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            api_key,
            client,
            base_url,
        })
    }
}

impl MessageSender for AnthropicClient {
    /// Send one request. A success without any non-blank text block is
    /// reported as [`AnthropicError::EmptyContent`].
    async fn send_message(
        &self,
        req: &MessagesRequest,
    ) -> Result<MessagesResponse, AnthropicError> {
        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(req)
            .send()
            .await
            .map_err(transport_error)?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(AnthropicError::RateLimited {
                retry_after_ms: retry_after_ms(response.headers()),
            }),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                let message = match body.trim() {
                    "" => status.canonical_reason().unwrap_or("unknown error").to_string(),
                    text => text.to_string(),
                };
                Err(AnthropicError::ApiError {
                    status: status.as_u16(),
                    message,
                })
            }
            _ => {
                let body: MessagesResponse = response.json().await.map_err(transport_error)?;
                if body.first_text().is_none_or(str::is_empty) {
                    return Err(AnthropicError::EmptyContent);
                }
                debug!(
                    model = %body.model,
                    output_tokens = body.usage.output_tokens,
                    "Narrative text received"
                );
                Ok(body)
            }
        }
    }
}

fn transport_error(e: reqwest::Error) -> AnthropicError {
    if e.is_timeout() {
        AnthropicError::Timeout
    } else {
        AnthropicError::NetworkError(e)
    }
}

/// `retry-after` is given in whole seconds.
fn retry_after_ms(headers: &HeaderMap) -> u64 {
    headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| secs.saturating_mul(1000))
        .unwrap_or(DEFAULT_RETRY_AFTER_MS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AnthropicClient {
        AnthropicClient::with_base_url("sk-test".into(), server.uri()).unwrap()
    }

    fn request() -> MessagesRequest {
        MessagesRequest::user("claude-haiku-4-5-20251001", 64, "log line please")
    }

    #[tokio::test]
    async fn sends_key_and_version_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-api-key", "sk-test"))
            .and(header("anthropic-version", API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "content": [{"type": "text", "text": "Pipeline green."}],
                "model": "claude-haiku-4-5-20251001",
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 12, "output_tokens": 4}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client_for(&server).send_message(&request()).await.unwrap();
        assert_eq!(resp.first_text(), Some("Pipeline green."));
    }

    #[tokio::test]
    async fn maps_429_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3"))
            .mount(&server)
            .await;

        let err = client_for(&server).send_message(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            AnthropicError::RateLimited {
                retry_after_ms: 3000
            }
        ));
    }

    #[tokio::test]
    async fn maps_server_error_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = client_for(&server).send_message(&request()).await.unwrap_err();
        match err {
            AnthropicError::ApiError { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "overloaded");
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_error_body_uses_status_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).send_message(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            AnthropicError::ApiError { status: 503, ref message } if message == "Service Unavailable"
        ));
    }

    #[tokio::test]
    async fn missing_retry_after_defaults_to_one_second() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = client_for(&server).send_message(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            AnthropicError::RateLimited {
                retry_after_ms: DEFAULT_RETRY_AFTER_MS
            }
        ));
    }

    #[tokio::test]
    async fn success_without_text_is_empty_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_2",
                "content": [{"type": "text", "text": "   "}],
                "model": "claude-haiku-4-5-20251001",
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 12, "output_tokens": 0}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).send_message(&request()).await.unwrap_err();
        assert!(matches!(err, AnthropicError::EmptyContent));
    }

    #[tokio::test]
    async fn slow_answer_is_a_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{}")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client =
            AnthropicClient::build("sk-test".into(), server.uri(), Duration::from_millis(50))
                .unwrap();
        let err = client.send_message(&request()).await.unwrap_err();
        assert!(matches!(err, AnthropicError::Timeout));
    }
}
