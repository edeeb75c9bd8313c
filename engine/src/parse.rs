use crate::types::QueryTerms;

/// Collapse whitespace runs to single spaces and trim both ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a raw query into lowercase, non-empty terms
/// (e.g., "  Rust   Traits " -> ["rust", "traits"])
pub fn tokenize_query(query: &str) -> QueryTerms {
    query
        .split_whitespace()
        .map(|s| s.chars().map(fold_char).collect())
        .collect()
}

/// Lowercase a single char without changing the char count.
/// Matching works on char positions, so a fold must stay one-to-one.
/// Final sigma folds to the medial form, since `Σ` lowercases to `σ`.
pub(crate) fn fold_char(c: char) -> char {
    match c {
        'ς' => 'σ',
        _ => c.to_lowercase().next().unwrap_or(c),
    }
}

pub(crate) fn folded_chars(s: &str) -> Vec<char> {
    s.chars().map(fold_char).collect()
}

/// Find `needle` in `haystack` at or after `from` (char positions)
pub(crate) fn find_chars(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == *needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\t b  c "), "a b c");
        assert_eq!(normalize_whitespace(" \n "), "");
    }

    #[test]
    fn test_tokenize_query() {
        assert_eq!(tokenize_query("  Rust   Traits "), vec!["rust", "traits"]);
        assert!(tokenize_query("   ").is_empty());
    }

    #[test]
    fn test_tokenize_folds_like_text() {
        // Context-free: each char folds the same way the searched text does
        assert_eq!(tokenize_query("ΟΔΟΣ"), vec!["οδοσ"]);
        assert_eq!(tokenize_query("οδος"), vec!["οδοσ"]);
        assert_eq!(tokenize_query("İstanbul"), vec!["istanbul"]);
        assert_eq!(folded_chars("ΟΔΟΣ"), folded_chars("οδος"));
    }

    #[test]
    fn test_find_chars() {
        let hay = folded_chars("Hello World");
        assert_eq!(find_chars(&hay, &folded_chars("world"), 0), Some(6));
        assert_eq!(find_chars(&hay, &folded_chars("o"), 5), Some(7));
        assert_eq!(find_chars(&hay, &folded_chars("xyz"), 0), None);
        assert_eq!(find_chars(&hay, &[], 0), None);
    }
}
