//! Command-line interface definition and dispatch for consult-mcp.
//!
//! With no subcommand the binary runs the MCP stdio server. `ask` and
//! `config show` are for checking a setup by hand from a terminal.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::{redact, Config};
use crate::consult::{ConsultOutcome, ConsultRequest, Consultant};
use crate::provider::{resolve_endpoint, ApiStyle};
use crate::server;

/// Top-level CLI structure for consult-mcp.
#[derive(Parser)]
#[command(
    name = "consult-mcp",
    version,
    about = "MCP server that consults a reasoning model with file-inspection tools"
)]
pub struct Cli {
    /// Config file to use instead of the global and project files
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Model to use (overrides config)
    #[arg(short, long, global = true)]
    pub model: Option<String>,
    /// API shape to use: responses or chat_completions (overrides config)
    #[arg(long, global = true, value_parser = parse_api)]
    pub api: Option<ApiStyle>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands. Without one, `serve` runs.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the MCP server on stdin/stdout
    Serve,
    /// Ask a one-shot question through the same pipeline the server uses
    Ask {
        /// The question to ask
        prompt: Vec<String>,
        /// Skip the context-gathering check
        #[arg(long)]
        no_gather: bool,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the resolved config and selected endpoint
    Show,
}

/// Parses command-line arguments into a [`Cli`] struct.
pub fn parse() -> Cli {
    Cli::parse()
}

fn parse_api(s: &str) -> std::result::Result<ApiStyle, String> {
    ApiStyle::from_str(s).map_err(|e| e.to_string())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if cli.api.is_some() {
        config.api = cli.api;
    }
    Ok(config)
}

/// Dispatches the parsed CLI command to its handler.
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let (consultant, _) = Consultant::from_config(&config)?;
            server::serve(consultant).await
        }
        Commands::Ask { prompt, no_gather } => {
            let prompt = prompt.join(" ");
            if prompt.trim().is_empty() {
                bail!("No prompt provided. Usage: consult-mcp ask \"your question here\"");
            }

            let (consultant, endpoint) = Consultant::from_config(&config)?;
            println!(
                "{} [model: {}, api: {}]",
                "consult-mcp".bold().cyan(),
                config.model.yellow(),
                endpoint.style,
            );
            println!();
            println!("{} {}", ">".green().bold(), prompt);
            println!();

            let request = ConsultRequest {
                auto_gather_context: !no_gather,
                ..ConsultRequest::new(prompt)
            };
            match consultant.consult(request).await {
                ConsultOutcome::Answer(text) => println!("{text}"),
                ConsultOutcome::NeedContext(text) => {
                    println!("{}", "The model needs more context:".yellow().bold());
                    println!();
                    println!("{text}");
                }
                ConsultOutcome::Failed(message) => bail!(message),
            }
            Ok(())
        }
        Commands::Config {
            action: ConfigAction::Show,
        } => {
            match &cli.config {
                Some(path) => println!("{} {}", "Config file:".bold(), path.display()),
                None => println!("{} {}", "Config path:".bold(), Config::config_path()?.display()),
            }
            println!();
            println!("{}", toml::to_string_pretty(&config.redacted())?);

            match resolve_endpoint(&config) {
                Ok(endpoint) => {
                    println!("{} {}", "Provider:".bold(), endpoint.provider);
                    println!("{} {}", "Base URL:".bold(), endpoint.base_url);
                    println!("{} {}", "API:".bold(), endpoint.style.label());
                    println!("{} {}", "API key:".bold(), redact(&endpoint.api_key));
                }
                Err(e) => println!("{} {}", "Endpoint:".bold(), e.to_string().red()),
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["consult-mcp"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_ask_collects_words() {
        let cli = Cli::try_parse_from(["consult-mcp", "ask", "why", "is", "it", "slow", "--no-gather"])
            .unwrap();
        match cli.command {
            Some(Commands::Ask { prompt, no_gather }) => {
                assert_eq!(prompt.join(" "), "why is it slow");
                assert!(no_gather);
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "consult-mcp",
            "config",
            "show",
            "--model",
            "o3",
            "--config",
            "/tmp/c.toml",
        ])
        .unwrap();
        assert_eq!(cli.model.as_deref(), Some("o3"));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn test_api_flag_parses_style() {
        let cli = Cli::try_parse_from(["consult-mcp", "--api", "chat-completions"]).unwrap();
        assert_eq!(cli.api, Some(ApiStyle::ChatCompletions));
        assert!(Cli::try_parse_from(["consult-mcp", "--api", "soap"]).is_err());
    }

    #[test]
    fn test_model_flag_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.toml");
        std::fs::write(&path, "model = \"gpt-5\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "consult-mcp",
            "--config",
            path.to_str().unwrap(),
            "--model",
            "o3",
        ])
        .unwrap();
        assert_eq!(load_config(&cli).unwrap().model, "o3");
    }
}
