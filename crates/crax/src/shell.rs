// SPDX-FileCopyrightText: 2026 Crax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `crax shell` command implementation.
//!
//! A local REPL that talks to the same dispatcher, memory file, and
//! backend as the Discord bot, as user `local`.

use std::sync::Arc;

use colored::Colorize;
use crax_agent::decor;
use crax_config::CraxConfig;
use crax_core::error::CraxError;
use crax_ollama::OllamaBackend;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::serve::build_dispatcher;

const SHELL_USER_ID: &str = "local";
const SHELL_DISPLAY_NAME: &str = "you";

/// Runs the `crax shell` interactive REPL.
pub async fn run_shell(config: CraxConfig) -> Result<(), CraxError> {
    let backend = Arc::new(OllamaBackend::new(&config.ollama)?);
    let dispatcher = build_dispatcher(&config, backend).await;

    let mut rl = DefaultEditor::new()
        .map_err(|e| CraxError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "crax shell".bold().green());
    println!("Type {} to exit.\n", "/quit".yellow());

    let prompt = format!("{}> ", SHELL_DISPLAY_NAME.green());
    let bot_name = config.agent.name.as_str();
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                match dispatcher
                    .send(trimmed, SHELL_USER_ID, SHELL_DISPLAY_NAME)
                    .await
                {
                    Ok(reply) => println!("{}: {}", bot_name.cyan(), decor::scrub(&reply)),
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}
