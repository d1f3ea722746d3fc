use crate::models::SamplingConfig;
use serde::{Deserialize, Serialize};

/// `sampling:` section of the config file. Unset fields keep the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SamplingSection {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub top_p: Option<f64>,
    #[serde(default)]
    pub top_k: Option<u32>,
}

impl SamplingSection {
    pub fn resolve(&self) -> SamplingConfig {
        let defaults = SamplingConfig::default();
        SamplingConfig {
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            top_p: self.top_p.unwrap_or(defaults.top_p),
            top_k: self.top_k.unwrap_or(defaults.top_k),
        }
    }
}

/// `client:` section of the config file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClientSection {
    #[serde(default)]
    pub backend_url: Option<String>,
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub auto_adjust: Option<bool>,
}
