// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Autolote - WhatsApp conversational sales assistant for a used-car lot.
//!
//! Binary entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod serve;

/// Autolote - WhatsApp conversational sales assistant for a used-car lot.
#[derive(Parser, Debug)]
#[command(name = "autolote", version, about, long_about = None)]
struct Cli {
    /// Path to an explicit config file (default: ./autolote.toml + env).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook server and turn controller.
    Serve,
    /// Print the resolved configuration.
    Config,
}

fn load_config(path: Option<&PathBuf>) -> autolote_config::AutoloteConfig {
    let loaded = match path {
        Some(path) => autolote_config::load_config_from_path(path),
        None => autolote_config::load_config(),
    };
    match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("autolote: invalid configuration: {e}");
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("autolote serve: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("autolote config: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("autolote: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_serve_with_config_path() {
        let cli = Cli::try_parse_from(["autolote", "serve", "--config", "/tmp/autolote.toml"])
            .unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));
        assert_eq!(
            cli.config.as_deref(),
            Some(std::path::Path::new("/tmp/autolote.toml"))
        );
    }

    #[test]
    fn default_config_loads_without_files() {
        let config = load_config(None);
        assert_eq!(config.agent.persona_name, "Carlos");
    }
}
