//! HTTP relay between chat clients and the inference provider.
//!
//! - GET  /api/health - liveness check
//! - POST /api/chat   - forward a prompt and sampling parameters, relay the text back

pub mod error;
mod handlers;
pub mod types;

use anyhow::Result;
use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::{InferenceProvider, ReplicateClient};
use crate::config::ServerConfig;
use crate::models::{ProviderInput, SamplingConfig};

/// Server-side request defaults merged under every chat request.
#[derive(Debug, Clone)]
pub struct RelayDefaults {
    pub sampling: SamplingConfig,
    pub min_tokens: u32,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
}

impl RelayDefaults {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            sampling: config.sampling,
            min_tokens: config.min_tokens,
            presence_penalty: config.presence_penalty,
            frequency_penalty: config.frequency_penalty,
        }
    }

    pub fn provider_input(&self, prompt: &str, config: &SamplingConfig) -> ProviderInput {
        ProviderInput {
            prompt: prompt.to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_p: config.top_p,
            top_k: config.top_k,
            min_tokens: self.min_tokens,
            presence_penalty: self.presence_penalty,
            frequency_penalty: self.frequency_penalty,
        }
    }
}

impl Default for RelayDefaults {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            min_tokens: 0,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn InferenceProvider>,
    pub relay: Arc<RelayDefaults>,
}

impl AppState {
    pub fn new(provider: Arc<dyn InferenceProvider>, relay: RelayDefaults) -> Self {
        Self {
            provider,
            relay: Arc::new(relay),
        }
    }
}

/// Create the router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/health", get(handlers::health_handler))
        .route("/api/chat", post(handlers::chat_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(config: ServerConfig) -> Result<()> {
    if config.api_token.is_none() {
        warn!("REPLICATE_API_TOKEN is not set, chat requests will fail until it is provided");
    }

    let provider = ReplicateClient::new(&config)?;
    let state = AppState::new(Arc::new(provider), RelayDefaults::from_config(&config));

    let app = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));

    info!(model = %config.model, "Using model");
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
