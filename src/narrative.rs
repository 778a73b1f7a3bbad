//! Flavor text for the office floor: log lines and hallway dialogue.
//!
//! Every call resolves to a non-empty string. Provider failures are swallowed
//! and replaced with fixed placeholders; nothing here can influence the
//! simulation.

use tracing::debug;

use crate::anthropic::{AnthropicError, MessageSender, MessagesRequest};
use crate::pod::LaborUnit;

pub const LOG_LINE_FALLBACK: &str = "Executing task...";
pub const LOG_LINE_EMPTY: &str = "Heartbeat detected.";
pub const DIALOGUE_FALLBACK: &str = "Syncing data units...";
pub const DIALOGUE_EMPTY: &str = "Tasks aligned. Proceeding.";

const LOG_LINE_MAX_TOKENS: u32 = 48;
const DIALOGUE_MAX_TOKENS: u32 = 96;

/// Generates narrative text through an optional [`MessageSender`].
///
/// Without a sender (no API key configured) it answers with the failure
/// placeholders straight away.
pub struct Narrator<S> {
    sender: Option<S>,
    model: String,
}

impl<S: MessageSender> Narrator<S> {
    pub fn new(sender: Option<S>, model: impl Into<String>) -> Self {
        Self {
            sender,
            model: model.into(),
        }
    }

    pub fn is_online(&self) -> bool {
        self.sender.is_some()
    }

    /// One short technical log line for `unit` working on `task`.
    pub async fn log_line(&self, unit: &LaborUnit, task: &str) -> String {
        let prompt = format!(
            "Generate a single short professional log line (under 10 words) for an AI agent \
             named {} working on \"{task}\". Tone: Technical, efficient.",
            unit.label()
        );
        self.generate(prompt, LOG_LINE_MAX_TOKENS, LOG_LINE_EMPTY, LOG_LINE_FALLBACK)
            .await
    }

    /// Two-line exchange where `speaker` just finished a task and briefs `listener`.
    pub async fn dialogue(&self, speaker: &LaborUnit, listener: &LaborUnit) -> String {
        let (a, b) = (speaker.label(), listener.label());
        let prompt = format!(
            "Generate a 2-line dialogue between {a} ({}) and {b} ({}).\n\
             Context: {a} just finished a task and is updating {b}. Keep it under 20 words total.",
            speaker.role, listener.role
        );
        self.generate(prompt, DIALOGUE_MAX_TOKENS, DIALOGUE_EMPTY, DIALOGUE_FALLBACK)
            .await
    }

    async fn generate(
        &self,
        prompt: String,
        max_tokens: u32,
        on_empty: &str,
        on_error: &str,
    ) -> String {
        let Some(sender) = &self.sender else {
            return on_error.to_string();
        };
        let req = MessagesRequest::user(&self.model, max_tokens, prompt);
        match sender.send_message(&req).await {
            Ok(resp) => match resp.first_text() {
                Some(text) if !text.is_empty() => text.to_string(),
                _ => on_empty.to_string(),
            },
            Err(AnthropicError::EmptyContent) => on_empty.to_string(),
            Err(e) => {
                debug!(error = %e, "Narrative request failed, using placeholder");
                on_error.to_string()
            }
        }
    }
}
