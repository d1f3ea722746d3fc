use granite_chat::client::{Notice, NoticeLevel};
use granite_chat::error::friendly_upstream_message;
use granite_chat::models::{SamplingConfig, TokenUsage};
use granite_chat::repl::{parse_command, ReplCommand};
use granite_chat::ui::{format_usage, parse_content, ContentPart};

#[test]
fn test_parse_content_plain_text() {
    let parts = parse_content("Just prose.");
    assert_eq!(parts, vec![ContentPart::Text("Just prose.".to_string())]);
}

#[test]
fn test_parse_content_splits_code_blocks() {
    let text = "Here you go:\n```Rust\nfn main() {}\n```\nThat's it.";
    let parts = parse_content(text);

    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], ContentPart::Text("Here you go:\n".to_string()));
    assert_eq!(
        parts[1],
        ContentPart::Code {
            language: "rust".to_string(),
            code: "fn main() {}".to_string(),
        }
    );
    assert_eq!(parts[2], ContentPart::Text("\nThat's it.".to_string()));
}

#[test]
fn test_parse_content_block_without_language() {
    let parts = parse_content("```\nls -la\n```");
    assert_eq!(
        parts,
        vec![ContentPart::Code {
            language: "text".to_string(),
            code: "ls -la".to_string(),
        }]
    );
}

#[test]
fn test_parse_content_unterminated_fence_stays_text() {
    let text = "Start\n```python\nprint(1)";
    assert_eq!(parse_content(text), vec![ContentPart::Text(text.to_string())]);
}

#[test]
fn test_parse_command() {
    assert_eq!(parse_command("  "), ReplCommand::Empty);
    assert_eq!(
        parse_command("what is rust?"),
        ReplCommand::Send("what is rust?".to_string())
    );
    assert_eq!(parse_command("/clear"), ReplCommand::Clear);
    assert_eq!(parse_command("/config"), ReplCommand::ShowConfig);
    assert_eq!(parse_command("/help"), ReplCommand::Help);
    assert_eq!(parse_command("/quit"), ReplCommand::Quit);
    assert_eq!(parse_command("/exit"), ReplCommand::Quit);
    assert_eq!(
        parse_command("/set max_tokens 1024"),
        ReplCommand::Set {
            key: "max_tokens".to_string(),
            value: "1024".to_string(),
        }
    );
}

#[test]
fn test_parse_command_errors() {
    assert!(matches!(parse_command("/set top_k"), ReplCommand::Unknown(_)));
    match parse_command("/frobnicate") {
        ReplCommand::Unknown(msg) => assert!(msg.contains("/frobnicate")),
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_format_usage_flags_truncation() {
    let usage = TokenUsage {
        prompt_tokens: 10,
        response_tokens: 96,
        total_tokens: 106,
        max_tokens: 100,
    };
    let line = format_usage(&usage);
    assert!(line.contains("10 prompt + 96 response = 106 total"));
    assert!(line.contains("Truncated"));

    let usage = TokenUsage {
        response_tokens: 40,
        total_tokens: 50,
        ..usage
    };
    assert!(!format_usage(&usage).contains("Truncated"));
}

#[test]
fn test_friendly_upstream_message() {
    assert!(friendly_upstream_message("Invalid API token: nope").contains("REPLICATE_API_TOKEN"));
    assert!(friendly_upstream_message("Provider RATE LIMIT exceeded").starts_with("Rate limit"));
    assert!(friendly_upstream_message("Request timeout").contains("too long"));
    assert_eq!(
        friendly_upstream_message("Prediction failed: boom"),
        "Prediction failed: boom"
    );
}

#[test]
fn test_sampling_validate_defaults_ok() {
    assert!(SamplingConfig::default().validate().is_empty());
}

#[test]
fn test_sampling_validate_reports_every_field() {
    let config = SamplingConfig {
        temperature: 0.05,
        max_tokens: 0,
        top_p: f64::NAN,
        top_k: 0,
    };

    let errors = config.validate();

    assert_eq!(errors.len(), 4);
    assert!(errors[0].contains("temperature"));
    assert!(errors[1].contains("max_tokens"));
    assert!(errors[2].contains("top_p") && errors[2].contains("empty"));
    assert!(errors[3].contains("top_k"));
}

#[test]
fn test_sampling_set_field() {
    let mut config = SamplingConfig::default();

    config.set_field("top_p", " 0.75 ").unwrap();
    config.set_field("max_tokens", "2048").unwrap();
    assert_eq!(config.top_p, 0.75);
    assert_eq!(config.max_tokens, 2048);

    assert!(config.set_field("max_tokens", "-1").is_err());
    assert!(config.set_field("temperature", "hot").is_err());
    assert!(config.set_field("seed", "1").is_err());
    assert_eq!(config.max_tokens, 2048);
}

#[test]
fn test_notice_levels() {
    assert_eq!(Notice::info("Thinking...").level, NoticeLevel::Info);
    assert_eq!(Notice::success("ok").level, NoticeLevel::Success);
    assert_eq!(Notice::warning("hmm").level, NoticeLevel::Warning);
    let error = Notice::error("bad");
    assert_eq!(error.level, NoticeLevel::Error);
    assert_eq!(error.text, "bad");
}
