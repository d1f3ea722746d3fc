use crate::error::{ChatError, Result};
use crate::models::{SamplingConfig, SamplingOverrides};
use crate::server::types::{ChatData, ChatRequest, ChatResponse, HealthResponse};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// The relay as seen from a chat client.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send_chat(&self, prompt: &str, config: &SamplingConfig) -> Result<ChatData>;
}

/// Talks to a running relay over HTTP.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self
            .http
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ChatError::ApiError { status, message });
        }

        Ok(response.json::<HealthResponse>().await?)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send_chat(&self, prompt: &str, config: &SamplingConfig) -> Result<ChatData> {
        let request = ChatRequest {
            prompt: Some(prompt.to_string()),
            config: Some(SamplingOverrides::from(*config)),
        };
        debug!(max_tokens = config.max_tokens, "Sending chat request");

        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?;

        // Failures come back with the same envelope, so parse the body whatever the status
        let status = response.status();
        let text = response.text().await?;
        let body: ChatResponse = serde_json::from_str(&text).map_err(|e| {
            if status.is_success() {
                ChatError::JsonError(e)
            } else {
                ChatError::ApiError {
                    status: status.as_u16(),
                    message: text.clone(),
                }
            }
        })?;

        into_chat_data(body)
    }
}

/// Unwrap a relay envelope into its payload or an error carrying the relay's message.
pub fn into_chat_data(body: ChatResponse) -> Result<ChatData> {
    match body {
        ChatResponse {
            success: true,
            data: Some(data),
            ..
        } => Ok(data),
        ChatResponse { error, message, .. } => Err(ChatError::Other(
            error
                .or(message)
                .unwrap_or_else(|| "Unknown error occurred".to_string()),
        )),
    }
}
