use std::fmt;

#[derive(Debug)]
pub enum ChatError {
    ApiError {
        status: u16,
        message: String,
    },
    MissingApiToken,
    InvalidApiToken(String),
    RateLimited(String),
    ProviderError(String),
    ConfigError(String),
    NetworkError(reqwest::Error),
    Timeout,
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    YamlError(serde_yaml::Error),
    Other(String),
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::ApiError { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            ChatError::MissingApiToken => {
                write!(f, "REPLICATE_API_TOKEN is not set, an API token is required")
            }
            ChatError::InvalidApiToken(msg) => write!(f, "Invalid API token: {}", msg),
            ChatError::RateLimited(msg) => write!(f, "Provider rate limit exceeded: {}", msg),
            ChatError::ProviderError(msg) => write!(f, "Prediction failed: {}", msg),
            ChatError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ChatError::NetworkError(e) => write!(f, "Network error: {}", e),
            ChatError::Timeout => write!(f, "Request timeout"),
            ChatError::IoError(e) => write!(f, "IO error: {}", e),
            ChatError::JsonError(e) => write!(f, "JSON error: {}", e),
            ChatError::YamlError(e) => write!(f, "YAML error: {}", e),
            ChatError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ChatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChatError::NetworkError(e) => Some(e),
            ChatError::IoError(e) => Some(e),
            ChatError::JsonError(e) => Some(e),
            ChatError::YamlError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatError::Timeout
        } else {
            ChatError::NetworkError(err)
        }
    }
}

impl From<std::io::Error> for ChatError {
    fn from(err: std::io::Error) -> Self {
        ChatError::IoError(err)
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::JsonError(err)
    }
}

impl From<serde_yaml::Error> for ChatError {
    fn from(err: serde_yaml::Error) -> Self {
        ChatError::YamlError(err)
    }
}

impl From<anyhow::Error> for ChatError {
    fn from(err: anyhow::Error) -> Self {
        ChatError::Other(err.to_string())
    }
}

impl From<String> for ChatError {
    fn from(msg: String) -> Self {
        ChatError::Other(msg)
    }
}

impl From<&str> for ChatError {
    fn from(msg: &str) -> Self {
        ChatError::Other(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;

/// Map a raw upstream error message to something a chat user can act on.
/// Messages that match none of the known patterns are passed through.
pub fn friendly_upstream_message(raw: &str) -> String {
    let lower = raw.to_lowercase();

    if lower.contains("api token") {
        "Invalid or missing Replicate API token. Check REPLICATE_API_TOKEN on the server.".to_string()
    } else if lower.contains("rate limit") {
        "Rate limit exceeded. Please wait a moment and try again.".to_string()
    } else if lower.contains("timeout") {
        "The model took too long to respond. Please try again.".to_string()
    } else {
        raw.to_string()
    }
}
