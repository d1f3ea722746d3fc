use serde::{Deserialize, Serialize};

/// Estimated token accounting for one exchange. Counts are `ceil(chars / 4)`,
/// not provider-reported numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub response_tokens: u32,
    pub total_tokens: u32,
    pub max_tokens: u32,
}

impl TokenUsage {
    pub fn estimate(prompt: &str, response: &str, max_tokens: u32) -> Self {
        let prompt_tokens = chars_to_tokens(prompt);
        let response_tokens = chars_to_tokens(response);
        Self {
            prompt_tokens,
            response_tokens,
            total_tokens: prompt_tokens + response_tokens,
            max_tokens,
        }
    }
}

fn chars_to_tokens(text: &str) -> u32 {
    let chars = text.chars().count() as u32;
    chars.div_ceil(4)
}
