//! `searchbot onboard`: write the default config and create data directories.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use searchbot_core::config::{save_config, Config};
use searchbot_core::utils::get_data_path;
use searchbot_providers::registry::PROVIDERS;

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔎 SearchBot — Setup".cyan().bold());
    println!();

    setup(&get_data_path())?;

    println!();
    println!("  {}", "API keys".bold());
    for spec in PROVIDERS {
        println!(
            "    {:<20} set {} ({})",
            spec.display_name,
            spec.env_key,
            spec.key_url.dimmed()
        );
    }

    println!();
    println!(
        "{}",
        "  Setup complete! Run `searchbot chat` or `searchbot serve` to start.".green()
    );
    println!();

    Ok(())
}

/// Create `config.json`, `sessions/` and `history/` under `data_dir`.
/// An existing config file is left untouched.
fn setup(data_dir: &Path) -> Result<()> {
    let config_path = data_dir.join("config.json");

    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        save_config(&Config::default(), Some(&config_path))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    }

    for dir in ["sessions", "history"] {
        let path = data_dir.join(dir);
        std::fs::create_dir_all(&path)?;
        println!("  {} {} at {}", "✓".green(), dir, path.display());
    }

    Ok(())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
