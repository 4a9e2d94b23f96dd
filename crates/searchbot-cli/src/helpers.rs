//! Shared CLI helpers: `.env` loading, answer printing and banner.

use std::path::Path;

use colored::Colorize;

use searchbot_core::types::{ChatEntry, ChatRole, Source};

/// Load `KEY=value` pairs from `path` into the process environment.
///
/// Variables already set win over the file. A missing file is not an
/// error; returns whether anything was read.
pub fn load_env_file(path: &Path) -> Result<bool, dotenvy::Error> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Print an answer followed by the sources it relied on.
pub fn print_answer(answer: &str, sources: &[Source]) {
    println!();
    println!("{}", "🔎 SearchBot".cyan().bold());
    if answer.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{answer}");
    }
    if !sources.is_empty() {
        println!();
        println!("{}", "Sources".bold());
        for line in source_lines(sources) {
            println!("  {}", line.dimmed());
        }
    }
    println!();
}

fn source_lines(sources: &[Source]) -> Vec<String> {
    sources
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}. {} ({}): {}", i + 1, s.tool, s.query, s.excerpt.replace('\n', " ")))
        .collect()
}

/// Print one transcript entry (for `/history`).
pub fn print_entry(entry: &ChatEntry) {
    let who = match entry.role {
        ChatRole::User => "You".green().bold(),
        ChatRole::Assistant => "SearchBot".cyan().bold(),
    };
    println!(
        "{} {} {}",
        entry.timestamp.format("%H:%M").to_string().dimmed(),
        who,
        entry.content
    );
}

/// Print the banner shown at REPL and server start.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "🔎 SearchBot".cyan().bold(), version.dimmed());
    println!();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_lines_are_numbered() {
        let sources = vec![
            Source {
                tool: "Wikipedia".into(),
                query: "Rust".into(),
                excerpt: "Page: Rust\nSummary: ...".into(),
            },
            Source {
                tool: "Web Search".into(),
                query: "rust lang".into(),
                excerpt: "Title: Rust".into(),
            },
        ];
        let lines = source_lines(&sources);
        assert_eq!(lines[0], "1. Wikipedia (Rust): Page: Rust Summary: ...");
        assert!(lines[1].starts_with("2. Web Search"));
    }

    #[test]
    fn env_file_fills_unset_variables_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "SEARCHBOT_ENV_FILE_FRESH=from-file\nSEARCHBOT_ENV_FILE_PRESET=from-file\n",
        )
        .unwrap();
        std::env::set_var("SEARCHBOT_ENV_FILE_PRESET", "from-shell");

        assert!(load_env_file(&path).unwrap());
        assert_eq!(std::env::var("SEARCHBOT_ENV_FILE_FRESH").unwrap(), "from-file");
        assert_eq!(std::env::var("SEARCHBOT_ENV_FILE_PRESET").unwrap(), "from-shell");
    }

    #[test]
    fn missing_env_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!load_env_file(&dir.path().join(".env")).unwrap());
    }
}
