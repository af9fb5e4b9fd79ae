//! String utilities for the domain layer.

/// Truncate a string to at most `max_len` characters, ending in `...` when cut
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Strip surrounding whitespace and any leading/trailing quote characters.
pub fn strip_quotes(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("héllo wörld", 30), "héllo wörld");
        // counted in characters, not bytes
        assert_eq!(truncate("héllo wörld", 5), "hé...");
        assert_eq!(truncate("日本語のタイトルです", 8), "日本語のタ...");
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("  \"Rust Error Handling\" "), "Rust Error Handling");
        assert_eq!(strip_quotes("'Async Basics'"), "Async Basics");
        assert_eq!(strip_quotes("Plain"), "Plain");
    }
}
