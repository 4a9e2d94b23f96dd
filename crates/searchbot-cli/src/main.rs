//! SearchBot CLI: entry point.
//!
//! # Commands
//!
//! - `searchbot chat [-m MESSAGE] [-s SESSION]`: ask a question or start the REPL
//! - `searchbot serve`: run the web chat
//! - `searchbot status`: show configuration and key status
//! - `searchbot onboard`: write the default config and data directories

mod console;
mod helpers;
mod onboard;
mod repl;
mod status;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use searchbot_agent::SearchAgent;
use searchbot_core::config::{key_status, load_config, verify_api_keys, Config};
use searchbot_core::session::SessionManager;
use searchbot_providers::http_provider::create_provider;
use searchbot_web::{start_server, AppState};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 🔎 SearchBot: an LLM research assistant with web, arXiv and Wikipedia search
#[derive(Parser)]
#[command(name = "searchbot", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant (single-shot or interactive REPL)
    Chat {
        /// Single question (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Conversation name; the transcript is kept across runs
        #[arg(short, long, default_value = "default")]
        session: String,

        /// Model to use instead of the configured default
        #[arg(long)]
        model: Option<String>,

        /// Results fetched from each source (1-5)
        #[arg(long)]
        max_results: Option<u32>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Start the web chat
    Serve {
        /// Address to bind (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to the configured port)
        #[arg(long)]
        port: Option<u16>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show configuration and API key status
    Status,

    /// Write the default configuration and create data directories
    Onboard,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = helpers::load_env_file(Path::new(".env")) {
        eprintln!("warning: ignoring .env: {e}");
    }
    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            message,
            session,
            model,
            max_results,
            logs,
        } => {
            init_logging(logs);
            run_chat(message, session, model, max_results, logs).await
        }
        Commands::Serve { host, port, logs } => {
            init_logging(logs);
            run_serve(host, port).await
        }
        Commands::Status => status::run(),
        Commands::Onboard => onboard::run(),
    }
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(
    message: Option<String>,
    session: String,
    model: Option<String>,
    max_results: Option<u32>,
    show_logs: bool,
) -> Result<()> {
    let config = load_config(None);

    if let Some(model) = &model {
        if !config.is_known_model(model) {
            anyhow::bail!(
                "unknown model '{model}' (available: {})",
                config.agent.models.join(", ")
            );
        }
    }

    let agent = build_agent(&config)?;
    let sessions = SessionManager::new(None, config.chat.clone())
        .context("failed to create session manager")?;

    let chat = console::ConsoleChat::new(
        agent,
        sessions,
        format!("cli:{session}"),
        model,
        max_results.unwrap_or(config.search.max_results),
        show_logs,
    );

    match message {
        Some(msg) => {
            info!(session = %session, "processing single question");
            chat.ask(&msg).await;
        }
        None => repl::run(chat, &config).await?,
    }

    Ok(())
}

/// Build a `SearchAgent` after checking that every required key is present.
pub fn build_agent(config: &Config) -> Result<SearchAgent> {
    verify_api_keys(config)?;
    let provider = create_provider(config).map_err(|e| anyhow::anyhow!(e))?;
    Ok(SearchAgent::new(
        Arc::new(provider),
        config.agent.clone(),
        config.search.clone(),
    ))
}

// ─────────────────────────────────────────────
// Serve command
// ─────────────────────────────────────────────

async fn run_serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = load_config(None);
    let host = host.unwrap_or_else(|| config.web.host.clone());
    let port = port.unwrap_or(config.web.port);

    let keys = key_status(&config);
    let agent = if keys.is_ready() {
        Some(build_agent(&config)?)
    } else {
        warn!(missing = ?keys.missing, "API keys missing; chat requests will be rejected");
        None
    };

    let sessions = SessionManager::new(None, config.chat.clone())
        .context("failed to create session manager")?;

    helpers::print_banner();
    println!("  Web chat: http://{host}:{port}");
    println!();

    let state = AppState::new(config, sessions, keys, agent);
    start_server(&host, port, state).await?;
    Ok(())
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("searchbot=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
