//! Heuristic token budgeting.
//!
//! Nothing here talks to a tokenizer. The numbers are rough estimates used to
//! pick a `max_tokens` before sending a prompt and to guess afterwards whether
//! the reply was cut off.

use crate::models::TokenUsage;

pub const MIN_RECOMMENDED_TOKENS: u32 = 256;
pub const MAX_TOKENS_CEILING: u32 = 4096;
pub const BASE_RESPONSE_TOKENS: u32 = 100;

/// Multipliers are kept in tenths so the arithmetic stays exact.
const DEFAULT_MULTIPLIER_TENTHS: u64 = 20;
/// 20% safety buffer on top of the prediction, as a percentage.
const BUFFER_PERCENT: u64 = 120;
/// Share of `max_tokens` a reply may use before it counts as cut off.
const TRUNCATION_USAGE_PERCENT: u64 = 95;

pub struct PromptCategory {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub multiplier_tenths: u64,
}

pub const PROMPT_CATEGORIES: &[PromptCategory] = &[
    PromptCategory {
        name: "explain",
        keywords: &["explain", "elaborate", "detail", "comprehensive"],
        multiplier_tenths: 30,
    },
    PromptCategory {
        name: "code",
        keywords: &["code", "programming", "function", "script"],
        multiplier_tenths: 40,
    },
    PromptCategory {
        name: "essay",
        keywords: &["essay", "article", "write", "story"],
        multiplier_tenths: 50,
    },
    PromptCategory {
        name: "list",
        keywords: &["list", "steps", "tutorial", "guide"],
        multiplier_tenths: 35,
    },
    PromptCategory {
        name: "analyze",
        keywords: &["analyze", "comparison", "compare"],
        multiplier_tenths: 35,
    },
    PromptCategory {
        name: "summary",
        keywords: &["summary", "summarize"],
        multiplier_tenths: 15,
    },
    PromptCategory {
        name: "brief",
        keywords: &["yes", "no", "simple", "brief"],
        multiplier_tenths: 5,
    },
];

pub const ELLIPSIS_ENDINGS: &[&str] = &["...", "…"];
pub const TRUNCATION_MARKERS: &[&str] = &["[truncated]", "..."];
const TERMINAL_PUNCTUATION: &[char] = &['.', '!', '?'];

/// Estimate the token count of `text` by blending word and character counts:
/// `ceil(words / 0.75 + chars / 4)`.
pub fn estimate_tokens(text: &str) -> u32 {
    if text.is_empty() {
        return 0;
    }

    // A non-empty string always counts as at least one word, even if it is
    // only whitespace.
    let words = text.split_whitespace().count().max(1) as u64;
    let chars = text.chars().count() as u64;

    // words / 0.75 + chars / 4 == (16 * words + 3 * chars) / 12
    (16 * words + 3 * chars).div_ceil(12) as u32
}

/// The largest multiplier (in tenths) among the categories whose keywords
/// appear in `prompt`, never lower than the default of 2.
pub fn prompt_multiplier_tenths(prompt: &str) -> u64 {
    let lower_prompt = prompt.to_lowercase();

    PROMPT_CATEGORIES
        .iter()
        .filter(|category| {
            category
                .keywords
                .iter()
                .any(|&keyword| lower_prompt.contains(keyword))
        })
        .map(|category| category.multiplier_tenths)
        .fold(DEFAULT_MULTIPLIER_TENTHS, u64::max)
}

/// Predict how many tokens the reply to `prompt` will need, including a 20% buffer.
pub fn predict_response_tokens(prompt: &str) -> u32 {
    let multiplier = prompt_multiplier_tenths(prompt);
    let prompt_tokens = estimate_tokens(prompt) as u64;

    let estimated_tenths = (prompt_tokens * multiplier).max(BASE_RESPONSE_TOKENS as u64 * 10);

    (estimated_tenths * BUFFER_PERCENT).div_ceil(1000) as u32
}

/// Guess whether `content` was cut off by the token budget.
///
/// Without usage information (or with zero response tokens) nothing can be
/// said and the answer is `false`.
pub fn is_response_truncated(content: &str, usage: Option<&TokenUsage>, max_tokens: u32) -> bool {
    let Some(usage) = usage else {
        return false;
    };
    if usage.response_tokens == 0 {
        return false;
    }

    let near_budget =
        usage.response_tokens as u64 * 100 >= max_tokens as u64 * TRUNCATION_USAGE_PERCENT;
    let ends_with_ellipsis = ELLIPSIS_ENDINGS.iter().any(|e| content.ends_with(e));
    let missing_terminal_punctuation = !content.ends_with(TERMINAL_PUNCTUATION);
    let has_marker = TRUNCATION_MARKERS.iter().any(|m| content.contains(m));

    near_budget || ends_with_ellipsis || missing_terminal_punctuation || has_marker
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAnalysis {
    pub predicted: u32,
    pub recommended: u32,
    pub should_increase: bool,
}

/// Predict a budget for `prompt`, clamp it to `[256, 4096]` and report whether
/// it exceeds the currently configured `max_tokens`.
pub fn calculate_optimal_tokens(prompt: &str, current_max_tokens: u32) -> TokenAnalysis {
    let predicted = predict_response_tokens(prompt);
    let recommended = predicted.clamp(MIN_RECOMMENDED_TOKENS, MAX_TOKENS_CEILING);

    TokenAnalysis {
        predicted,
        recommended,
        should_increase: recommended > current_max_tokens,
    }
}

/// Budget for the single retry after a truncated reply: 1.5x the current
/// budget (at least one more token), capped at 4096. `None` once the ceiling
/// has been reached.
pub fn retry_budget(current_max_tokens: u32) -> Option<u32> {
    if current_max_tokens >= MAX_TOKENS_CEILING {
        return None;
    }
    let current = current_max_tokens as u64;
    let grown = (current * 3 / 2).max(current + 1);
    Some(grown.min(MAX_TOKENS_CEILING as u64) as u32)
}
