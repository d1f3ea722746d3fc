use crate::api::models::{ModelRef, Prediction, PredictionRequest, PredictionStatus};
use crate::api::response::{extract_error, extract_output};
use crate::config::ServerConfig;
use crate::error::{ChatError, Result};
use crate::models::ProviderInput;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("granite-chat/", env!("CARGO_PKG_VERSION"));

/// Something that can turn a prompt plus sampling parameters into reply text.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    async fn generate(&self, input: &ProviderInput) -> Result<String>;

    fn model_name(&self) -> &str;
}

/// Client for the Replicate predictions API.
pub struct ReplicateClient {
    http: reqwest::Client,
    has_token: bool,
    endpoint: String,
    model_name: String,
    model: ModelRef,
    request_timeout: Duration,
    poll_interval: Duration,
}

impl ReplicateClient {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let model = ModelRef::parse(&config.model)?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.api_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
                    ChatError::ConfigError(format!("Invalid authorization header: {}", e))
                })?,
            );
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            has_token: config.api_token.is_some(),
            endpoint: config.api_endpoint.clone(),
            model_name: config.model.clone(),
            model,
            request_timeout: Duration::from_secs(config.request_timeout),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        })
    }

    async fn create_prediction(&self, input: &ProviderInput) -> Result<Prediction> {
        let url = self.model.predictions_url(&self.endpoint);
        let body = PredictionRequest {
            version: self.model.version(),
            input,
        };

        debug!(url = %url, "Creating prediction");
        let response = self
            .http
            .post(&url)
            .header(HeaderName::from_static("prefer"), HeaderValue::from_static("wait"))
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await?;

        parse_prediction(response).await
    }

    async fn fetch_prediction(&self, url: &str) -> Result<Prediction> {
        let response = self
            .http
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await?;
        parse_prediction(response).await
    }

    fn poll_url(&self, prediction: &Prediction) -> String {
        prediction
            .urls
            .as_ref()
            .and_then(|urls| urls.get.clone())
            .unwrap_or_else(|| format!("{}/predictions/{}", self.endpoint, prediction.id))
    }

    async fn run_prediction(&self, input: &ProviderInput) -> Result<String> {
        let mut prediction = self.create_prediction(input).await?;
        info!(id = %prediction.id, status = ?prediction.status, "Prediction created");

        while !prediction.status.is_terminal() {
            tokio::time::sleep(self.poll_interval).await;
            let url = self.poll_url(&prediction);
            prediction = self.fetch_prediction(&url).await?;
            debug!(id = %prediction.id, status = ?prediction.status, "Polled prediction");
        }

        match prediction.status {
            PredictionStatus::Succeeded => Ok(extract_output(prediction.output.as_ref())),
            PredictionStatus::Failed => Err(ChatError::ProviderError(extract_error(
                prediction.error.as_ref(),
            ))),
            PredictionStatus::Aborted => Err(ChatError::ProviderError(format!(
                "prediction {} was aborted",
                prediction.id
            ))),
            _ => Err(ChatError::ProviderError(format!(
                "prediction {} was canceled",
                prediction.id
            ))),
        }
    }
}

#[async_trait]
impl InferenceProvider for ReplicateClient {
    async fn generate(&self, input: &ProviderInput) -> Result<String> {
        if !self.has_token {
            return Err(ChatError::MissingApiToken);
        }

        // The whole create-and-poll exchange shares one deadline
        let deadline = Instant::now() + self.request_timeout;
        match tokio::time::timeout_at(deadline, self.run_prediction(input)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    timeout_secs = self.request_timeout.as_secs(),
                    "Prediction did not finish before the timeout"
                );
                Err(ChatError::Timeout)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

async fn parse_prediction(response: reqwest::Response) -> Result<Prediction> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ChatError::InvalidApiToken(error_text),
            StatusCode::TOO_MANY_REQUESTS => ChatError::RateLimited(error_text),
            _ => ChatError::ApiError {
                status: status.as_u16(),
                message: error_text,
            },
        });
    }

    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}
