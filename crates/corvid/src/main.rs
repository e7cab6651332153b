// SPDX-FileCopyrightText: 2026 Corvid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Corvid - a connection-resilient conversational bot runtime.
//!
//! This is the binary entry point for the Corvid bot.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use corvid_config::{ConfigError, CorvidConfig};

/// Corvid - a connection-resilient conversational bot runtime.
#[derive(Parser, Debug)]
#[command(name = "corvid", version, about, long_about = None)]
struct Cli {
    /// Load configuration from a specific file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the bot runtime.
    Serve,
    /// Print the resolved configuration.
    Config,
}

fn load_config(cli: &Cli) -> Result<CorvidConfig, Vec<ConfigError>> {
    match &cli.config {
        Some(path) => match corvid_config::load_config_from_path(path) {
            Ok(config) => {
                corvid_config::validation::validate_config(&config)?;
                Ok(config)
            }
            Err(err) => Err(corvid_config::diagnostic::figment_to_config_errors(err)),
        },
        None => corvid_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(errors) => {
            corvid_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            // Transport adapters are separate crates linked by distribution
            // builds; this workspace ships the runtime only. See
            // corvid::serve::run_serve for the entry point adapters use.
            eprintln!("error: no transport adapter is compiled into this build");
            std::process::exit(2);
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("error: failed to render configuration: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("corvid: use --help for available commands");
        }
    }
}
