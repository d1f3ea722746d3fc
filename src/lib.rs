pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod repl;
pub mod server;
pub mod tokens;
pub mod ui;
