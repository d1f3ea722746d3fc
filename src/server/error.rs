use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::types::ChatResponse;
use crate::error::{friendly_upstream_message, ChatError};

/// Failure of a relay request, rendered as `{success: false, error, message?}`.
#[derive(Debug)]
pub struct ApiError {
    pub status_code: StatusCode,
    pub error: String,
    pub message: Option<String>,
}

impl ApiError {
    pub fn bad_request(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::BAD_REQUEST,
            error: error.into(),
            message: Some(message.into()),
        }
    }

    /// Upstream provider failure. The friendly text goes in `error`, the raw
    /// one in `message`.
    pub fn upstream(err: &ChatError) -> Self {
        let raw = err.to_string();
        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            error: friendly_upstream_message(&raw),
            message: Some(raw),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code, Json(ChatResponse::failure(self.error, self.message))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
