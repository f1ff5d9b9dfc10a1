//! Command line entry points
//!
//! - `serve`: run the gateway
//! - `check`: validate configuration and exit

pub mod check;
pub mod serve;

use clap::{Args, Parser, Subcommand};

/// MAI Scam Gateway - authorized LLM forwarding for scam detection
#[derive(Parser)]
#[command(name = "mai-scam-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Validate configuration, policies and secrets without serving
    Check,
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Override `server.host`
    #[arg(long)]
    pub host: Option<String>,

    /// Override `server.port`
    #[arg(long, short)]
    pub port: Option<u16>,
}
