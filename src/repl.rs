use crate::client::{ChatBackend, ChatSession, HttpBackend, Notice};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::models::Role;
use crate::ui::{
    display_config, display_help, display_message, display_notice, display_notices,
    display_usage, display_welcome, CodeHighlighter,
};
use colored::*;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Send(String),
    Clear,
    ShowConfig,
    Set { key: String, value: String },
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_command(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    if !line.starts_with('/') {
        return ReplCommand::Send(line.to_string());
    }

    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    match command {
        "/clear" => ReplCommand::Clear,
        "/config" => ReplCommand::ShowConfig,
        "/help" => ReplCommand::Help,
        "/quit" | "/exit" => ReplCommand::Quit,
        "/set" => match (words.next(), words.next()) {
            (Some(key), Some(value)) => ReplCommand::Set {
                key: key.to_string(),
                value: value.to_string(),
            },
            _ => ReplCommand::Unknown("usage: /set <key> <value>".to_string()),
        },
        other => ReplCommand::Unknown(format!("unknown command {}", other)),
    }
}

fn new_session(config: &ClientConfig) -> Result<ChatSession<HttpBackend>> {
    let backend = HttpBackend::new(&config.backend_url, config.timeout)?;
    Ok(ChatSession::new(backend, config.sampling, config.auto_adjust))
}

/// Interactive chat loop against the relay.
pub async fn run_chat(config: ClientConfig) -> Result<()> {
    let mut session = new_session(&config)?;
    if let Err(e) = session.backend().health().await {
        warn!(error = %e, "Backend health check failed");
        display_notice(&Notice::warning(format!(
            "Backend at {} is not reachable yet: {}",
            session.backend().base_url(),
            e
        )));
    }

    let highlighter = CodeHighlighter::new();
    display_welcome(&config.backend_url);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".blue().bold());
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            ReplCommand::Empty => continue,
            ReplCommand::Quit => break,
            ReplCommand::Help => display_help(),
            ReplCommand::ShowConfig => display_config(session.config()),
            ReplCommand::Clear => session.clear(),
            ReplCommand::Set { key, value } => match session.update_config(&key, &value) {
                Ok(()) => display_notice(&Notice::success(format!("{} set to {}", key, value))),
                Err(e) => display_notice(&Notice::error(e)),
            },
            ReplCommand::Unknown(msg) => display_notice(&Notice::error(msg)),
            ReplCommand::Send(prompt) => {
                display_notice(&Notice::info("Thinking..."));
                send_and_display(&mut session, &prompt, &highlighter).await;
            }
        }

        display_notices(&session.take_notices());
    }

    Ok(())
}

/// Send a single prompt and print the reply. Fails if the reply is an error entry.
pub async fn run_ask(config: ClientConfig, prompt: &str) -> Result<()> {
    let mut session = new_session(&config)?;
    let highlighter = CodeHighlighter::new();

    let failed = send_and_display(&mut session, prompt, &highlighter).await;
    display_notices(&session.take_notices());

    if failed {
        return Err("chat request failed".into());
    }
    Ok(())
}

/// Returns true when nothing was sent or the exchange ended in an error entry.
async fn send_and_display<B: ChatBackend>(
    session: &mut ChatSession<B>,
    prompt: &str,
    highlighter: &CodeHighlighter,
) -> bool {
    let failed = match session.send(prompt).await {
        Some(reply) => {
            display_message(reply, highlighter);
            reply.role == Role::Error
        }
        None => true,
    };

    if let Some(usage) = session.last_usage() {
        display_usage(usage);
    }
    failed
}
