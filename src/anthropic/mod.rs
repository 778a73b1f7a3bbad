//! Minimal client for the Anthropic Messages API, used to generate the
//! decorative narrative text of a running pod.

pub mod client;
pub mod error;
pub mod types;

use std::future::Future;

pub use client::AnthropicClient;
pub use error::AnthropicError;
pub use types::{ContentBlock, Message, MessagesRequest, MessagesResponse, Usage};

/// Anything that can answer a Messages request.
///
/// Implemented by [`AnthropicClient`]; tests substitute canned senders.
pub trait MessageSender: Send + Sync {
    fn send_message(
        &self,
        req: &MessagesRequest,
    ) -> impl Future<Output = Result<MessagesResponse, AnthropicError>> + Send;
}
