//! Utility helpers: path resolution and string manipulation.

use std::path::PathBuf;

/// Get the SearchBot data directory (e.g. `~/.searchbot/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".searchbot")
}

/// Get the sessions directory (e.g. `~/.searchbot/sessions/`).
pub fn get_sessions_path() -> PathBuf {
    get_data_path().join("sessions")
}

/// Get the REPL history file (e.g. `~/.searchbot/history/cli_history`).
pub fn get_history_path() -> PathBuf {
    get_data_path().join("history").join("cli_history")
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Hard cap on characters, no marker. Used for tool payload limits.
pub fn take_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Sanitize a string for use as a filename.
pub fn safe_filename(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode the handful of HTML entities search backends actually emit.
///
/// `&amp;` goes last so `&amp;lt;` decodes once, to `&lt;`.
pub fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        let result = truncate_string("hello world, this is a long string", 15);
        assert_eq!(result, "hello world,...");
    }

    #[test]
    fn test_truncate_unicode() {
        let result = truncate_string("こんにちは世界です", 5);
        assert_eq!(result, "こん...");
    }

    #[test]
    fn test_take_chars() {
        assert_eq!(take_chars("abcdef", 3), "abc");
        assert_eq!(take_chars("ab", 3), "ab");
        assert_eq!(take_chars("日本語", 2), "日本");
    }

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename("hello world!"), "hello_world_");
        assert_eq!(safe_filename("a/b/c"), "a_b_c");
        assert_eq!(safe_filename("my-file_v2.txt"), "my-file_v2.txt");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a\n b\t\tc  "), "a b c");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("A &amp; B &lt;C&gt; &#x27;q&#x27;"), "A & B <C> 'q'");
    }

    #[test]
    fn test_decode_entities_escaped_once() {
        assert_eq!(decode_entities("use &amp;lt;T&amp;gt; here"), "use &lt;T&gt; here");
    }

    #[test]
    fn test_data_path_ends_with_searchbot() {
        assert!(get_data_path().ends_with(".searchbot"));
        assert!(get_sessions_path().parent().unwrap().ends_with(".searchbot"));
        assert!(get_history_path().ends_with("history/cli_history"));
    }
}
