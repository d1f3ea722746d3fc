use regex::Regex;
use std::sync::LazyLock;

static CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(\w+)?\n?([\s\S]*?)```").expect("code block pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    Code { language: String, code: String },
}

/// Split a reply into prose and fenced code blocks.
///
/// Whitespace-only prose between blocks is dropped. Unterminated fences are
/// left in the prose. A reply without any fences comes back as a single text part.
pub fn parse_content(text: &str) -> Vec<ContentPart> {
    let mut parts = Vec::new();
    let mut last_index = 0;

    for caps in CODE_BLOCK.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };

        let before = &text[last_index..whole.start()];
        if !before.trim().is_empty() {
            parts.push(ContentPart::Text(before.to_string()));
        }

        let language = caps
            .get(1)
            .map(|m| m.as_str().to_lowercase())
            .unwrap_or_else(|| "text".to_string());
        let code = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();

        parts.push(ContentPart::Code {
            language,
            code: code.to_string(),
        });
        last_index = whole.end();
    }

    let remaining = &text[last_index..];
    if !remaining.trim().is_empty() {
        parts.push(ContentPart::Text(remaining.to_string()));
    }

    if parts.is_empty() {
        parts.push(ContentPart::Text(text.to_string()));
    }

    parts
}
