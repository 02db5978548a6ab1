/// Truncate to at most `max_chars` characters, appending "..." when truncated.
///
/// Counts characters, not bytes, so multi-byte text never splits mid-char.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 3 {
        return s.chars().take(max_chars).collect();
    }
    let mut out: String = s.chars().take(max_chars - 3).collect();
    out.push_str("...");
    out
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Largest char boundary in `s` that is `<= offset`.
pub fn floor_char_boundary(s: &str, offset: usize) -> usize {
    if offset >= s.len() {
        return s.len();
    }
    let mut end = offset;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_strings_are_untouched() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
    }

    #[test]
    fn long_strings_get_ellipsis_within_limit() {
        let out = truncate_chars("abcdefghij", 8);
        assert_eq!(out, "abcde...");
        assert_eq!(out.chars().count(), 8);
    }

    #[test]
    fn multibyte_text_is_cut_on_chars() {
        let out = truncate_chars("가나다라마바사", 5);
        assert_eq!(out, "가나...");
    }

    #[test]
    fn tiny_limits_skip_the_ellipsis() {
        assert_eq!(truncate_chars("abcdef", 2), "ab");
    }

    #[test]
    fn collapse_whitespace_joins_lines() {
        assert_eq!(collapse_whitespace("  npm\n  test   --watch "), "npm test --watch");
    }

    #[test]
    fn floor_char_boundary_backs_off_inside_char() {
        let s = "a가b";
        assert_eq!(floor_char_boundary(s, 2), 1);
        assert_eq!(floor_char_boundary(s, 4), 4);
        assert_eq!(floor_char_boundary(s, 99), s.len());
    }
}
