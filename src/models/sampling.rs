use serde::{Deserialize, Serialize};

pub const DEFAULT_TEMPERATURE: f64 = 0.6;
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_TOP_P: f64 = 0.9;
pub const DEFAULT_TOP_K: u32 = 50;

const MIN_TEMPERATURE: f64 = 0.1;
const MIN_TOP_P: f64 = 0.1;

/// Sampling parameters the user can edit between messages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub top_k: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl SamplingConfig {
    /// Check the client-side minimums. Every violation is reported, not just the first.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        check_float("temperature", self.temperature, MIN_TEMPERATURE, &mut errors);
        if self.max_tokens < 1 {
            errors.push("Field 'max_tokens' must not be less than 1".to_string());
        }
        check_float("top_p", self.top_p, MIN_TOP_P, &mut errors);
        if self.top_k < 1 {
            errors.push("Field 'top_k' must not be less than 1".to_string());
        }

        errors
    }

    /// Set a single field by its wire name, parsing `value` for that field's type.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        match key {
            "temperature" => self.temperature = parse_float(key, value)?,
            "top_p" => self.top_p = parse_float(key, value)?,
            "max_tokens" => self.max_tokens = parse_int(key, value)?,
            "top_k" => self.top_k = parse_int(key, value)?,
            other => return Err(format!("Unknown config field '{}'", other)),
        }
        Ok(())
    }

    pub fn with_max_tokens(self, max_tokens: u32) -> Self {
        Self { max_tokens, ..self }
    }
}

fn check_float(name: &str, value: f64, min: f64, errors: &mut Vec<String>) {
    if value.is_nan() {
        errors.push(format!("Field '{}' must not be empty", name));
    } else if value < min {
        errors.push(format!("Field '{}' must not be less than {}", name, min));
    }
}

fn parse_float(key: &str, value: &str) -> Result<f64, String> {
    value
        .parse::<f64>()
        .map_err(|_| format!("Field '{}' must be a number", key))
}

fn parse_int(key: &str, value: &str) -> Result<u32, String> {
    value
        .parse::<u32>()
        .map_err(|_| format!("Field '{}' must be a whole number", key))
}

/// Partial sampling config as accepted by `POST /api/chat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

impl SamplingOverrides {
    pub fn apply_to(&self, base: SamplingConfig) -> SamplingConfig {
        SamplingConfig {
            temperature: self.temperature.unwrap_or(base.temperature),
            max_tokens: self.max_tokens.unwrap_or(base.max_tokens),
            top_p: self.top_p.unwrap_or(base.top_p),
            top_k: self.top_k.unwrap_or(base.top_k),
        }
    }
}

impl From<SamplingConfig> for SamplingOverrides {
    fn from(config: SamplingConfig) -> Self {
        Self {
            temperature: Some(config.temperature),
            max_tokens: Some(config.max_tokens),
            top_p: Some(config.top_p),
            top_k: Some(config.top_k),
        }
    }
}

/// The full `input` object sent to the model: the prompt, the user's sampling
/// parameters and the provider-only knobs configured on the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderInput {
    pub prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
    pub top_k: u32,
    pub min_tokens: u32,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
}
