use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use tracing::{error, info};

use super::error::{ApiError, ApiResult};
use super::types::{ChatData, ChatRequest, ChatResponse, HealthResponse};
use super::AppState;
use crate::models::{SamplingConfig, TokenUsage};

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Chat relay is running".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<ChatResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::bad_request("Invalid request body", rejection.body_text())
    })?;

    let prompt = request
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Prompt is required", "Please provide a non-empty prompt"))?
        .to_string();

    let config: SamplingConfig = request
        .config
        .unwrap_or_default()
        .apply_to(state.relay.sampling);
    let input = state.relay.provider_input(&prompt, &config);

    info!(
        model = state.provider.model_name(),
        prompt_chars = prompt.chars().count(),
        max_tokens = config.max_tokens,
        temperature = config.temperature,
        top_p = config.top_p,
        top_k = config.top_k,
        "Relaying chat request"
    );

    let response = state.provider.generate(&input).await.map_err(|err| {
        error!(error = %err, "Inference request failed");
        ApiError::upstream(&err)
    })?;

    let token_usage = TokenUsage::estimate(&prompt, &response, config.max_tokens);
    info!(
        response_tokens = token_usage.response_tokens,
        total_tokens = token_usage.total_tokens,
        "Inference request completed"
    );

    Ok(Json(ChatResponse::ok(ChatData {
        prompt,
        response,
        config,
        token_usage,
    })))
}
