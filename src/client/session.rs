use super::backend::ChatBackend;
use super::notice::Notice;
use crate::models::{ChatMessage, SamplingConfig, TokenUsage};
use crate::server::types::ChatData;
use crate::tokens::{calculate_optimal_tokens, is_response_truncated, retry_budget};
use tracing::{debug, warn};

pub const EMPTY_RESPONSE_FALLBACK: &str = "I apologize, but I couldn't generate a proper response. Please try asking your question in a different way.";

const INVALID_FIELDS_HINT: &str =
    "Invalid parameter configuration. Check the max_tokens, temperature, top_k and top_p settings.";

/// In-memory chat transcript plus the sampling settings used for the next message.
pub struct ChatSession<B: ChatBackend> {
    backend: B,
    config: SamplingConfig,
    auto_adjust: bool,
    messages: Vec<ChatMessage>,
    last_usage: Option<TokenUsage>,
    notices: Vec<Notice>,
}

impl<B: ChatBackend> ChatSession<B> {
    pub fn new(backend: B, config: SamplingConfig, auto_adjust: bool) -> Self {
        Self {
            backend,
            config,
            auto_adjust,
            messages: Vec::new(),
            last_usage: None,
            notices: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    pub fn last_usage(&self) -> Option<&TokenUsage> {
        self.last_usage.as_ref()
    }

    /// Drain the notices raised since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn update_config(&mut self, key: &str, value: &str) -> Result<(), String> {
        self.config.set_field(key, value)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.last_usage = None;
        self.notices.push(Notice::success("Chat cleared successfully!"));
    }

    /// Send `prompt` and append the reply (or an error entry) to the transcript.
    ///
    /// Returns the appended reply, or `None` when nothing was sent because the
    /// prompt was blank or the sampling config is invalid.
    pub async fn send(&mut self, prompt: &str) -> Option<&ChatMessage> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return None;
        }

        let config_errors = self.config.validate();
        if !config_errors.is_empty() {
            self.notices.push(Notice::error(format!(
                "Invalid configuration:\n{}",
                config_errors.join("\n")
            )));
            return None;
        }

        let request_config = self.adjust_budget(prompt);

        self.messages.push(ChatMessage::user(prompt));

        let result = self.backend.send_chat(prompt, &request_config).await;
        let reply = match result {
            Ok(data) => self.complete_reply(prompt, request_config, data).await,
            Err(err) => {
                let message = describe_failure(&err.to_string());
                warn!(error = %err, "Chat request failed");
                self.notices
                    .push(Notice::error(format!("Failed to send message: {}", message)));
                ChatMessage::error(format!("Error: {}", message))
            }
        };

        self.messages.push(reply);
        self.messages.last()
    }

    /// Raise `max_tokens` when the prompt looks like it needs a longer reply
    /// than currently allowed. The raised value sticks for later messages.
    fn adjust_budget(&mut self, prompt: &str) -> SamplingConfig {
        let analysis = calculate_optimal_tokens(prompt, self.config.max_tokens);
        debug!(
            predicted = analysis.predicted,
            recommended = analysis.recommended,
            current = self.config.max_tokens,
            "Token analysis"
        );

        if !self.auto_adjust || !analysis.should_increase {
            return self.config;
        }

        self.notices.push(Notice::warning(format!(
            "Max tokens adjusted from {} to {} based on the predicted response length",
            self.config.max_tokens, analysis.recommended
        )));
        self.config.max_tokens = analysis.recommended;
        self.config
    }

    async fn complete_reply(
        &mut self,
        prompt: &str,
        request_config: SamplingConfig,
        data: ChatData,
    ) -> ChatMessage {
        let mut content = non_empty_or_fallback(data.response);
        let mut usage = data.token_usage;
        self.last_usage = Some(usage);

        let mut was_truncated =
            is_response_truncated(&content, Some(&usage), request_config.max_tokens);
        if !was_truncated {
            return ChatMessage::assistant(content, Some(usage), false);
        }

        // At most one retry per message, and only below the ceiling
        let Some(retry_tokens) = retry_budget(request_config.max_tokens) else {
            return ChatMessage::assistant(content, Some(usage), true);
        };

        warn!(
            max_tokens = request_config.max_tokens,
            retry_tokens, "Response looks truncated, retrying"
        );
        self.notices.push(Notice::warning(format!(
            "Response appears truncated. Retrying with {} tokens...",
            retry_tokens
        )));

        let retry_config = request_config.with_max_tokens(retry_tokens);
        let retry_result = self.backend.send_chat(prompt, &retry_config).await;
        match retry_result {
            Ok(retry) => {
                content = non_empty_or_fallback(retry.response);
                usage = retry.token_usage;
                self.last_usage = Some(usage);
                self.config.max_tokens = retry_tokens;

                was_truncated = is_response_truncated(&content, Some(&usage), retry_tokens);
                if was_truncated {
                    self.notices.push(Notice::warning(format!(
                        "Response may still be truncated at {} tokens",
                        retry_tokens
                    )));
                } else {
                    self.notices.push(Notice::warning(format!(
                        "Response recovered with {} tokens",
                        retry_tokens
                    )));
                }
            }
            Err(err) => {
                warn!(error = %err, "Retry failed");
                self.notices.push(Notice::warning(
                    "Retry failed, keeping the truncated response",
                ));
            }
        }

        ChatMessage::assistant(content, Some(usage), was_truncated)
    }
}

fn non_empty_or_fallback(response: String) -> String {
    if response.trim().is_empty() {
        EMPTY_RESPONSE_FALLBACK.to_string()
    } else {
        response
    }
}

fn describe_failure(message: &str) -> String {
    if message.contains("422") && message.contains("invalid_fields") {
        INVALID_FIELDS_HINT.to_string()
    } else {
        message.to_string()
    }
}
