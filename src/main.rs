//! Entry point for consult-mcp, an MCP server that hands hard problems to a
//! hosted reasoning model.
//!
//! This binary loads environment variables, sets up stderr logging, parses CLI
//! arguments via [`cli`], and dispatches to the chosen subcommand.

mod agent;
mod cli;
mod config;
mod constants;
mod consult;
mod context;
mod message;
mod provider;
mod server;
mod session;
mod tools;

use anyhow::Result;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr; stdout belongs to JSON-RPC. `RUST_LOG` overrides the
/// default `info` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();
    let cli = cli::parse();
    cli::run(cli).await
}
