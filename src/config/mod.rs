mod api;
pub mod defaults;
mod sampling;
mod validation;

use crate::cli::{ClientArgs, ServeArgs};
use crate::error::{ChatError, Result};
use crate::models::SamplingConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub use api::ServerSection;
pub use sampling::{ClientSection, SamplingSection};
pub use validation::{expand_env_var_in_string, expand_optional};

use defaults::{
    default_auto_adjust, default_client_timeout, default_poll_interval_ms, default_port,
    default_request_timeout, DEFAULT_API_ENDPOINT, DEFAULT_BACKEND_URL, DEFAULT_MODEL,
};

pub const CONFIG_FILE_NAME: &str = ".granite-chat.yaml";

/// Settings for the relay backend.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub api_token: Option<String>,
    pub api_endpoint: String,
    pub model: String,
    pub port: u16,
    pub request_timeout: u64,
    pub poll_interval_ms: u64,
    pub min_tokens: u32,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
    pub sampling: SamplingConfig,
}

/// Settings for the terminal chat client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub backend_url: String,
    pub timeout: u64,
    pub auto_adjust: bool,
    pub sampling: SamplingConfig,
}

/// On-disk configuration, YAML or JSON.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub sampling: SamplingSection,
    #[serde(default)]
    pub client: ClientSection,
}

fn env_lookup(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a numeric environment variable. Set but unparsable is an error.
fn env_number<T, F>(env: &F, name: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match env(name) {
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            ChatError::ConfigError(format!("{} must be {}, got '{}'", name, what, raw))
        }),
        None => Ok(None),
    }
}

impl ServerConfig {
    pub fn from_env_and_args(args: &ServeArgs) -> Result<Self> {
        let file_config = FileConfig::load()?;
        Self::from_sources(args, &file_config, env_lookup)
    }

    /// Resolve each setting as CLI args > env var > config file > default.
    pub fn from_sources<F>(args: &ServeArgs, file: &FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // The token is only ever read from the environment
        let api_token = env("REPLICATE_API_TOKEN");

        let port = match args.port {
            Some(port) => port,
            None => env_number(&env, "PORT", "a valid port number")?
                .or(file.server.port)
                .unwrap_or_else(default_port),
        };

        let api_endpoint = args
            .api_endpoint
            .clone()
            .or_else(|| env("REPLICATE_API_ENDPOINT"))
            .or_else(|| expand_optional(&file.server.endpoint))
            .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        let model = args
            .model
            .clone()
            .or_else(|| env("REPLICATE_MODEL"))
            .or_else(|| expand_optional(&file.server.model))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let request_timeout = env_number(&env, "REPLICATE_TIMEOUT", "a number of seconds")?
            .or(file.server.request_timeout)
            .unwrap_or_else(default_request_timeout);

        let poll_interval_ms = file
            .server
            .poll_interval_ms
            .unwrap_or_else(default_poll_interval_ms);

        Ok(ServerConfig {
            api_token,
            api_endpoint,
            model,
            port,
            request_timeout,
            poll_interval_ms,
            min_tokens: file.server.min_tokens,
            presence_penalty: file.server.presence_penalty,
            frequency_penalty: file.server.frequency_penalty,
            sampling: file.sampling.resolve(),
        })
    }
}

impl ClientConfig {
    pub fn from_env_and_args(args: &ClientArgs) -> Result<Self> {
        let file_config = FileConfig::load()?;
        Self::from_sources(args, &file_config, env_lookup)
    }

    pub fn from_sources<F>(args: &ClientArgs, file: &FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_url = args
            .backend
            .clone()
            .or_else(|| env("GRANITE_CHAT_BACKEND"))
            .or_else(|| expand_optional(&file.client.backend_url))
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout = env_number(&env, "GRANITE_CHAT_TIMEOUT", "a number of seconds")?
            .or(file.client.timeout)
            .unwrap_or_else(default_client_timeout);

        let auto_adjust = if args.no_auto_adjust {
            false
        } else {
            file.client.auto_adjust.unwrap_or_else(default_auto_adjust)
        };

        let mut sampling = file.sampling.resolve();
        if let Some(temperature) = args.temperature {
            sampling.temperature = temperature;
        }
        if let Some(max_tokens) = args.max_tokens {
            sampling.max_tokens = max_tokens;
        }
        if let Some(top_p) = args.top_p {
            sampling.top_p = top_p;
        }
        if let Some(top_k) = args.top_k {
            sampling.top_k = top_k;
        }

        Ok(ClientConfig {
            backend_url,
            timeout,
            auto_adjust,
            sampling,
        })
    }
}

impl FileConfig {
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        // No config file found, return default
        Ok(FileConfig::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|s| s.to_str());
        let config: FileConfig = if matches!(extension, Some("yaml") | Some("yml")) {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))?
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config file: {}", path.display()))?
        };

        Ok(config)
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. Current directory (local override)
        paths.push(PathBuf::from(".granite-chat.yaml"));
        paths.push(PathBuf::from(".granite-chat.yml"));
        paths.push(PathBuf::from(".granite-chat.json"));

        // 2. User's config directory
        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("granite-chat");
            paths.push(config_dir.join("granite-chat.yaml"));
            paths.push(config_dir.join("granite-chat.yml"));
            paths.push(config_dir.join("granite-chat.json"));
        }

        paths
    }

    pub fn example() -> Self {
        FileConfig {
            server: ServerSection {
                port: Some(default_port()),
                endpoint: Some(DEFAULT_API_ENDPOINT.to_string()),
                model: Some(DEFAULT_MODEL.to_string()),
                request_timeout: Some(default_request_timeout()),
                poll_interval_ms: Some(default_poll_interval_ms()),
                ..ServerSection::default()
            },
            sampling: {
                let defaults = SamplingConfig::default();
                SamplingSection {
                    temperature: Some(defaults.temperature),
                    max_tokens: Some(defaults.max_tokens),
                    top_p: Some(defaults.top_p),
                    top_k: Some(defaults.top_k),
                }
            },
            client: ClientSection {
                backend_url: Some(DEFAULT_BACKEND_URL.to_string()),
                timeout: Some(default_client_timeout()),
                auto_adjust: Some(default_auto_adjust()),
            },
        }
    }

    /// Write the example config to `path`, refusing to overwrite an existing file.
    pub fn write_example(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(ChatError::ConfigError(format!(
                "{} already exists, not overwriting",
                path.display()
            )));
        }
        let yaml = serde_yaml::to_string(&Self::example())?;
        fs::write(path, yaml)?;
        Ok(())
    }
}
