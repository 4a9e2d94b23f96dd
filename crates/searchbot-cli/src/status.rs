//! `searchbot status`: show configuration, key status and search settings.

use anyhow::Result;
use colored::Colorize;

use searchbot_core::config::{get_config_path, key_status, load_config};
use searchbot_providers::registry::{find_by_name, PROVIDERS};

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "🔎 SearchBot Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );

    let agent = &config.agent;
    println!("  {:<18} {}", "Provider:".bold(), agent.provider);
    println!("  {:<18} {}", "Model:".bold(), agent.model);
    println!(
        "  {:<18} {}",
        "Models:".bold(),
        agent.models.join(", ").dimmed()
    );
    println!(
        "  {:<18} {} | max_tokens: {} | max_iterations: {}",
        "Parameters:".bold(),
        format!("temp: {}", agent.temperature).dimmed(),
        format!("{}", agent.max_tokens).dimmed(),
        format!("{}", agent.max_iterations).dimmed(),
    );
    println!(
        "  {:<18} {}",
        "History to model:".bold(),
        if agent.include_history { "on" } else { "off" }
    );

    // Keys
    println!();
    let keys = key_status(&config);
    if keys.is_ready() {
        println!("  {} {}", "✓".green(), "API keys loaded".bold());
    } else {
        println!(
            "  {} {} {}",
            "✗".red(),
            "Missing API keys:".bold(),
            keys.missing.join(", ")
        );
        if let Some(spec) = find_by_name(&keys.provider) {
            println!("    get a {} key at {}", spec.display_name, spec.key_url);
        }
    }

    println!();
    println!("  {}", "Providers:".bold());
    let providers_map = config.providers.to_map();
    for spec in PROVIDERS {
        let status = match providers_map.get(spec.name) {
            Some(p) if p.is_configured() => format!("{} (key set)", "✓".green()),
            _ => format!("{}", "· not configured".dimmed()),
        };
        println!("    {:<20} {}", spec.display_name, status);
    }

    // Search
    let search = &config.search;
    println!();
    println!("  {}", "Search:".bold());
    println!("    {:<20} {}", "Results per source", search.max_results);
    println!("    {:<20} {}", "Content chars", search.max_content_chars);
    println!("    {:<20} {}s", "Timeout", search.timeout_secs);
    println!("    {:<20} {}", "Chat history", config.chat.max_history);
    println!(
        "    {:<20} http://{}:{}",
        "Web chat", config.web.host, config.web.port
    );

    println!();

    Ok(())
}
