use super::highlight::CodeHighlighter;
use super::parser::{parse_content, ContentPart};
use crate::client::{Notice, NoticeLevel};
use crate::models::{ChatMessage, Role, SamplingConfig, TokenUsage};
use colored::*;

const TRUNCATION_NOTE: &str = "⚠ This response may be truncated by the token limit. Try raising max_tokens for a more complete answer.";

/// Render an assistant reply: prose as is, fenced code highlighted.
pub fn render_reply(text: &str, highlighter: &CodeHighlighter) -> String {
    let mut output = String::new();

    for part in parse_content(text) {
        match part {
            ContentPart::Text(text) => {
                output.push_str(text.trim_matches('\n'));
                output.push('\n');
            }
            ContentPart::Code { language, code } => {
                output.push_str(&highlighter.render_block(&code, &language));
            }
        }
    }

    output
}

/// Display one transcript entry
pub fn display_message(message: &ChatMessage, highlighter: &CodeHighlighter) {
    let time = message.timestamp.format("%H:%M:%S").to_string();

    match message.role {
        Role::User => {
            println!("{} {}", "You".blue().bold(), time.dimmed());
            println!("{}", message.text);
        }
        Role::Assistant => {
            println!("{} {}", "Assistant".green().bold(), time.dimmed());
            print!("{}", render_reply(&message.text, highlighter));
            if message.was_truncated {
                println!("{}", TRUNCATION_NOTE.yellow());
            }
            if let Some(usage) = &message.token_usage {
                println!("{}", format!("{} tokens", usage.response_tokens).dimmed());
            }
        }
        Role::Error => {
            println!("{} {}", "Error".red().bold(), time.dimmed());
            println!("{}", message.text.red());
        }
    }
    println!();
}

pub fn display_notice(notice: &Notice) {
    let line = match notice.level {
        NoticeLevel::Success => format!("✓ {}", notice.text).green(),
        NoticeLevel::Info => format!("ℹ {}", notice.text).cyan(),
        NoticeLevel::Warning => format!("⚠ {}", notice.text).yellow(),
        NoticeLevel::Error => format!("✗ {}", notice.text).red(),
    };
    eprintln!("{}", line);
}

pub fn display_notices(notices: &[Notice]) {
    for notice in notices {
        display_notice(notice);
    }
}

/// One-line summary of the last exchange's token usage.
pub fn format_usage(usage: &TokenUsage) -> String {
    let mut line = format!(
        "Last response: {} prompt + {} response = {} total tokens (limit {})",
        usage.prompt_tokens, usage.response_tokens, usage.total_tokens, usage.max_tokens
    );
    if usage.response_tokens as u64 * 100 >= usage.max_tokens as u64 * 95 {
        line.push_str(" ⚠ Truncated");
    }
    line
}

pub fn display_usage(usage: &TokenUsage) {
    println!("{}", format_usage(usage).dimmed());
}

pub fn display_config(config: &SamplingConfig) {
    println!("{}", "Model configuration".bold());
    println!("  temperature: {}  {}", config.temperature, "(higher = more creative)".dimmed());
    println!("  max_tokens:  {}  {}", config.max_tokens, "(response length limit)".dimmed());
    println!("  top_p:       {}  {}", config.top_p, "(nucleus sampling)".dimmed());
    println!("  top_k:       {}  {}", config.top_k, "(vocabulary diversity)".dimmed());
    println!(
        "{}",
        "Max tokens auto-adjust if responses get truncated.".dimmed()
    );
}

pub fn display_welcome(backend_url: &str) {
    println!("{}", "Granite chat".bold());
    println!("{}", format!("Connected to {}", backend_url).dimmed());
    println!(
        "{}",
        "Type a message and press Enter. /help lists commands.".dimmed()
    );
    println!();
}

pub fn display_help() {
    println!("{}", "Commands".bold());
    println!("  /clear              Clear the conversation");
    println!("  /config             Show sampling parameters");
    println!("  /set <key> <value>  Set temperature, max_tokens, top_p or top_k");
    println!("  /help               Show this help");
    println!("  /quit               Exit");
}
