use crate::error::{ChatError, Result};
use crate::models::ProviderInput;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A model reference, either `owner/name` (latest official version) or
/// `owner/name:version` (pinned version).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelRef {
    Official { owner: String, name: String },
    Versioned { owner: String, name: String, version: String },
}

impl ModelRef {
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        let (path, version) = match reference.split_once(':') {
            Some((path, version)) => (path, Some(version)),
            None => (reference, None),
        };

        let (owner, name) = path
            .split_once('/')
            .filter(|(owner, name)| !owner.is_empty() && !name.is_empty() && !name.contains('/'))
            .ok_or_else(|| {
                ChatError::ConfigError(format!(
                    "Invalid model reference '{}', expected owner/name or owner/name:version",
                    reference
                ))
            })?;

        match version {
            Some(version) if !version.is_empty() => Ok(ModelRef::Versioned {
                owner: owner.to_string(),
                name: name.to_string(),
                version: version.to_string(),
            }),
            Some(_) => Err(ChatError::ConfigError(format!(
                "Model reference '{}' has an empty version",
                reference
            ))),
            None => Ok(ModelRef::Official {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
        }
    }

    /// URL that creates a prediction for this model under `endpoint`.
    pub fn predictions_url(&self, endpoint: &str) -> String {
        match self {
            ModelRef::Official { owner, name } => {
                format!("{}/models/{}/{}/predictions", endpoint, owner, name)
            }
            ModelRef::Versioned { .. } => format!("{}/predictions", endpoint),
        }
    }

    pub fn version(&self) -> Option<&str> {
        match self {
            ModelRef::Official { .. } => None,
            ModelRef::Versioned { version, .. } => Some(version),
        }
    }
}

#[derive(Serialize)]
pub struct PredictionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<&'a str>,
    pub input: &'a ProviderInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    Aborted,
    #[serde(other)]
    Unknown,
}

impl PredictionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PredictionStatus::Succeeded
                | PredictionStatus::Failed
                | PredictionStatus::Canceled
                | PredictionStatus::Aborted
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionUrls {
    pub get: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub urls: Option<PredictionUrls>,
}
