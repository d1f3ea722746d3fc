use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::Path;
use std::process;
use tracing_subscriber::{fmt, EnvFilter};

use granite_chat::cli::{Args, Command};
use granite_chat::config::{ClientConfig, FileConfig, ServerConfig, CONFIG_FILE_NAME};
use granite_chat::{repl, server};

fn init_tracing(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    fmt().with_env_filter(filter).with_target(false).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    match args.command {
        Command::Serve(serve_args) => {
            init_tracing("granite_chat=info,tower_http=info");
            let config = ServerConfig::from_env_and_args(&serve_args)?;
            server::run(config).await?;
        }
        Command::Chat(client_args) => {
            // Keep the terminal quiet unless RUST_LOG asks otherwise
            init_tracing("granite_chat=error");
            let config = exit_on_error(ClientConfig::from_env_and_args(&client_args));
            repl::run_chat(config).await?;
        }
        Command::Ask(ask_args) => {
            init_tracing("granite_chat=error");
            let config = exit_on_error(ClientConfig::from_env_and_args(&ask_args.client));
            let prompt = ask_args.prompt.join(" ");
            if let Err(e) = repl::run_ask(config, &prompt).await {
                eprintln!("{} {}", "Error:".red(), e);
                process::exit(1);
            }
        }
        Command::ConfigInit => {
            let path = Path::new(CONFIG_FILE_NAME);
            match FileConfig::write_example(path) {
                Ok(()) => println!("{}", format!("Wrote {}", path.display()).green()),
                Err(e) => {
                    eprintln!("{} {}", "Error:".red(), e);
                    process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn exit_on_error<T>(result: granite_chat::error::Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    }
}
