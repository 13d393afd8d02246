// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crax - a Discord chat bot backed by a local Ollama model.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use crax_config::CraxConfig;

/// Crax - a Discord chat bot backed by a local Ollama model.
#[derive(Parser, Debug)]
#[command(name = "crax", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the Discord bot (default).
    Serve,
    /// Chat with the bot in the terminal.
    Shell,
    /// Print the effective configuration with secrets redacted.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => crax_config::load_and_validate_path(path),
        None => crax_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            crax_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Shell => shell::run_shell(config).await,
        Commands::Config => print_config(&config),
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

fn print_config(config: &CraxConfig) -> Result<(), crax_core::CraxError> {
    let rendered = toml::to_string_pretty(&config.redacted())
        .map_err(|e| crax_core::CraxError::Internal(format!("failed to render config: {e}")))?;
    print!("{rendered}");
    Ok(())
}
