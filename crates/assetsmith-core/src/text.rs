//! Small text helpers.

/// Truncate `s` to at most `max_chars` characters.
///
/// Counts `char`s rather than bytes so multi-byte text is never split mid-codepoint.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_chars_short() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn truncate_chars_exact() {
        assert_eq!(truncate_chars("hello", 5), "hello");
    }

    #[test]
    fn truncate_chars_long() {
        let long = "x".repeat(750);
        let truncated = truncate_chars(&long, 500);
        assert_eq!(truncated.chars().count(), 500);
    }

    #[test]
    fn truncate_chars_multibyte() {
        assert_eq!(truncate_chars("ảnh đẹp", 3), "ảnh");
        assert_eq!(truncate_chars("🗡️🗡️", 1), "🗡");
    }
}
