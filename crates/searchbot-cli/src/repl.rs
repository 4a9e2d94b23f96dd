//! Interactive REPL.
//!
//! Uses `rustyline` for readline-style editing with persistent history.

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use searchbot_core::config::Config;
use searchbot_core::utils::get_history_path;

use crate::console::ConsoleChat;
use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// A line typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Exit,
    Clear,
    /// `/model` shows the current model; `/model NAME` switches.
    Model(Option<String>),
    /// `/results` shows the count; `/results N` sets it.
    Results(Option<String>),
    History,
    Help,
    /// A `/word` that names no command.
    Unknown(String),
    Ask(String),
}

fn parse_command(input: &str) -> ReplCommand {
    let trimmed = input.trim();
    if is_exit_command(trimmed) {
        return ReplCommand::Exit;
    }

    let (head, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((h, rest)) => (h, Some(rest.trim().to_string()).filter(|a| !a.is_empty())),
        None => (trimmed, None),
    };

    match head {
        "/clear" => ReplCommand::Clear,
        "/model" => ReplCommand::Model(arg),
        "/results" => ReplCommand::Results(arg),
        "/history" => ReplCommand::History,
        "/help" => ReplCommand::Help,
        _ if head.starts_with('/') => ReplCommand::Unknown(head.to_string()),
        _ => ReplCommand::Ask(trimmed.to_string()),
    }
}

/// Run the interactive REPL loop.
pub async fn run(mut chat: ConsoleChat, config: &Config) -> Result<()> {
    helpers::print_banner();
    println!(
        "{}",
        "Type a question, /help for commands, or \"exit\" to quit.".dimmed()
    );
    println!();
    if let Some(last) = chat.transcript().last() {
        helpers::print_entry(last);
        println!();
    }

    let mut editor = create_editor()?;

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => break,
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        if input.trim().is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(&input);

        match parse_command(&input) {
            ReplCommand::Exit => {
                println!("\nGoodbye! 👋");
                break;
            }
            ReplCommand::Clear => {
                let transcript = chat.clear();
                if let Some(notice) = transcript.last() {
                    helpers::print_entry(notice);
                }
            }
            ReplCommand::Model(None) => {
                println!("  Model: {}", chat.model().bold());
                println!("  Available: {}", config.agent.models.join(", ").dimmed());
            }
            ReplCommand::Model(Some(name)) => {
                if config.is_known_model(&name) {
                    println!("  Model set to {}", name.bold());
                    chat.set_model(name);
                } else {
                    println!(
                        "  {} unknown model '{}' (available: {})",
                        "✗".red(),
                        name,
                        config.agent.models.join(", ")
                    );
                }
            }
            ReplCommand::Results(None) => {
                println!("  Max results per source: {}", chat.max_results());
            }
            ReplCommand::Results(Some(arg)) => match arg.parse::<u32>() {
                Ok(n) => {
                    let used = chat.set_max_results(n);
                    println!("  Max results per source set to {used}");
                }
                Err(_) => println!("  {} expected a number from 1 to 5", "✗".red()),
            },
            ReplCommand::History => {
                for entry in &chat.transcript().entries {
                    helpers::print_entry(entry);
                }
            }
            ReplCommand::Help => print_help(),
            ReplCommand::Unknown(name) => {
                println!("  {} unknown command {}, see /help", "✗".red(), name.bold());
            }
            ReplCommand::Ask(question) => {
                debug!(question = %question, "processing input");
                chat.ask(&question).await;
            }
        }
    }

    save_history(&mut editor);

    Ok(())
}

fn print_help() {
    println!("  /clear          clear the chat history");
    println!("  /model [NAME]   show or switch the model");
    println!("  /results [N]    show or set results per source (1-5)");
    println!("  /history        show the transcript");
    println!("  /help           show this list");
    println!("  exit            quit");
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = get_history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = get_history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
