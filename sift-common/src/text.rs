//! Text utilities shared by sift services

/// Truncate a string to at most `max_chars` characters.
///
/// Counts characters, not bytes, so multi-byte input never panics on a
/// boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}

/// Collapse runs of whitespace (including newlines) into single spaces
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_string_unchanged() {
        assert_eq!(truncate_chars("hello", 10), "hello");
    }

    #[test]
    fn truncate_long_string() {
        assert_eq!(truncate_chars("hello world", 5), "hello");
    }

    #[test]
    fn truncate_multibyte_does_not_panic() {
        let s = "héllo wörld";
        assert_eq!(truncate_chars(s, 6), "héllo ");
    }

    #[test]
    fn collapse_mixed_whitespace() {
        assert_eq!(collapse_whitespace("a  b\n\tc   d"), "a b c d");
    }
}
