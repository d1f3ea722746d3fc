use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "granite-chat")]
#[command(about = "Chat relay and terminal client for hosted Replicate models", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP relay backend
    Serve(ServeArgs),
    /// Start an interactive chat session against a running backend
    Chat(ClientArgs),
    /// Send a single prompt and print the reply
    Ask(AskArgs),
    /// Write an example config file to the current directory
    ConfigInit,
}

#[derive(ClapArgs, Debug, Default)]
pub struct ServeArgs {
    #[arg(short = 'p', long = "port", help = "Port to listen on (default: 5000)")]
    pub port: Option<u16>,

    #[arg(
        short = 'm',
        long = "model",
        help = "Replicate model reference (owner/name or owner/name:version)"
    )]
    pub model: Option<String>,

    #[arg(long = "api-endpoint", help = "Custom Replicate API base URL")]
    pub api_endpoint: Option<String>,
}

#[derive(ClapArgs, Debug, Default)]
pub struct ClientArgs {
    #[arg(
        short = 'b',
        long = "backend",
        help = "Backend base URL (default: http://localhost:5000)"
    )]
    pub backend: Option<String>,

    #[arg(long = "temperature", help = "Sampling temperature")]
    pub temperature: Option<f64>,

    #[arg(long = "max-tokens", help = "Maximum response tokens")]
    pub max_tokens: Option<u32>,

    #[arg(long = "top-p", help = "Nucleus sampling threshold")]
    pub top_p: Option<f64>,

    #[arg(long = "top-k", help = "Vocabulary diversity (top k)")]
    pub top_k: Option<u32>,

    #[arg(
        long = "no-auto-adjust",
        help = "Do not raise max_tokens before sending based on the predicted reply length"
    )]
    pub no_auto_adjust: bool,
}

#[derive(ClapArgs, Debug)]
pub struct AskArgs {
    #[command(flatten)]
    pub client: ClientArgs,

    #[arg(help = "Prompt to send", required = true)]
    pub prompt: Vec<String>,
}
