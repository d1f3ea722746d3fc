use serde::{Deserialize, Serialize};

use super::defaults::{default_min_tokens, default_penalty, is_default_penalty};

/// `server:` section of the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSection {
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub request_timeout: Option<u64>,
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
    #[serde(default = "default_min_tokens")]
    pub min_tokens: u32,
    #[serde(default = "default_penalty", skip_serializing_if = "is_default_penalty")]
    pub presence_penalty: f64,
    #[serde(default = "default_penalty", skip_serializing_if = "is_default_penalty")]
    pub frequency_penalty: f64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: None,
            endpoint: None,
            model: None,
            request_timeout: None,
            poll_interval_ms: None,
            min_tokens: default_min_tokens(),
            presence_penalty: default_penalty(),
            frequency_penalty: default_penalty(),
        }
    }
}
