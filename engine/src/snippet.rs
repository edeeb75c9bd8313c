//! Excerpt selection around the earliest query-term occurrence.

use crate::parse::{fold_char, folded_chars, find_chars, normalize_whitespace};

/// Excerpt length when no term occurs in the body
const HEAD_LEN: usize = 180;
/// Context kept before and after the first match
const BEFORE: usize = 60;
const AFTER: usize = 120;
/// How far each edge may drift further to land on a space
const LEFT_SLACK: usize = 30;
const RIGHT_SLACK: usize = 80;

pub const ELLIPSIS: char = '…';

/// Build a plain-text excerpt of `body` for the given terms.
///
/// Positions are counted in chars, so multi-byte text is never cut inside
/// a code point.
pub fn build_snippet(body: &str, terms: &[String]) -> String {
    let text = normalize_whitespace(body);
    if text.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let folded: Vec<char> = chars.iter().copied().map(fold_char).collect();

    let Some(first) = first_match(&folded, terms) else {
        let mut head: String = chars.iter().take(HEAD_LEN).collect();
        if chars.len() > HEAD_LEN {
            head.push(ELLIPSIS);
        }
        return head;
    };

    let mut start = first.saturating_sub(BEFORE);
    let mut end = (first + AFTER).min(chars.len());

    while start > 0 && chars[start] != ' ' && first - start < BEFORE + LEFT_SLACK {
        start -= 1;
    }
    while end < chars.len() && chars[end] != ' ' && end - first < AFTER + RIGHT_SLACK {
        end += 1;
    }

    let window: String = chars[start..end].iter().collect();
    let mut snippet = String::with_capacity(window.len() + 6);
    if start > 0 {
        snippet.push(ELLIPSIS);
    }
    snippet.push_str(window.trim());
    if end < chars.len() {
        snippet.push(ELLIPSIS);
    }
    snippet
}

/// Leftmost occurrence of any term; ties across terms go to the leftmost position
fn first_match(folded: &[char], terms: &[String]) -> Option<usize> {
    terms
        .iter()
        .filter(|t| !t.is_empty())
        .filter_map(|t| find_chars(folded, &folded_chars(t), 0))
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn terms(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_short_body_is_kept_whole() {
        let body = "The quick brown fox jumps over the lazy dog";
        let snippet = build_snippet(body, &terms(&["fox"]));
        assert_eq!(snippet, body);
        assert!(!snippet.contains(ELLIPSIS));
    }

    #[test]
    fn test_no_match_takes_head() {
        let body = "a".repeat(250);
        let snippet = build_snippet(&body, &terms(&["zzz"]));
        assert_eq!(snippet.chars().count(), 181);
        assert!(snippet.ends_with(ELLIPSIS));

        let short = build_snippet("just a few words", &terms(&["zzz"]));
        assert_eq!(short, "just a few words");
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(build_snippet("  \n ", &terms(&["a"])), "");
    }

    #[test]
    fn test_whitespace_is_normalized() {
        let snippet = build_snippet("  alpha\n\n  beta\tgamma ", &terms(&["beta"]));
        assert_eq!(snippet, "alpha beta gamma");
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let snippet = build_snippet("Nothing here but TRAITS", &terms(&["traits"]));
        assert!(snippet.contains("TRAITS"));
    }

    #[test]
    fn test_window_centers_on_match_with_ellipses() {
        let words: Vec<String> = (0..100).map(|i| format!("word{:02}", i)).collect();
        let mut body = words.join(" ");
        body.push_str(" needle ");
        body.push_str(&words.join(" "));

        let snippet = build_snippet(&body, &terms(&["needle"]));
        assert!(snippet.starts_with(ELLIPSIS));
        assert!(snippet.ends_with(ELLIPSIS));
        assert!(snippet.contains("needle"));

        let inner: String = snippet
            .trim_start_matches(ELLIPSIS)
            .trim_end_matches(ELLIPSIS)
            .to_string();
        // Edges land on word boundaries
        assert!(inner.starts_with("word"));
        assert!(inner.split(' ').all(|w| w == "needle" || w.len() == 6));
    }

    #[test]
    fn test_leftmost_term_wins() {
        let mut body = "x".repeat(300);
        body.push_str(" beta ");
        body.push_str(&"y".repeat(10));
        body.push_str(" alpha ");
        body.push_str(&"z".repeat(300));

        let snippet = build_snippet(&body, &terms(&["alpha", "beta"]));
        assert!(snippet.contains("beta"));
    }

    #[test]
    fn test_multibyte_text() {
        let body = format!("{} café {}", "é".repeat(200), "ü".repeat(200));
        let snippet = build_snippet(&body, &terms(&["café"]));
        assert!(snippet.contains("café"));
    }

    #[test]
    fn test_finds_greek_and_turkish_capitals() {
        use crate::parse::tokenize_query;
        let filler = "lorem ".repeat(100);
        let body = format!("{}ΟΔΟΣ and İstanbul {}", filler, filler);

        let snippet = build_snippet(&body, &tokenize_query("ΟΔΟΣ"));
        assert!(snippet.contains("ΟΔΟΣ"));
        assert!(snippet.starts_with(ELLIPSIS));

        let snippet = build_snippet(&body, &tokenize_query("İstanbul"));
        assert!(snippet.contains("İstanbul"));
    }

    proptest! {
        #[test]
        fn prop_snippet_is_bounded(
            words in prop::collection::vec("[a-z]{1,12}", 0..120),
            term in "[a-z]{1,4}",
        ) {
            let body = words.join(" ");
            let snippet = build_snippet(&body, &[term]);
            // 90 before + 200 after + two ellipses
            prop_assert!(snippet.chars().count() <= 292);
        }

        #[test]
        fn prop_matched_term_is_visible(
            before in prop::collection::vec("[a-z]{1,12}", 0..60),
            after in prop::collection::vec("[a-z]{1,12}", 0..60),
        ) {
            let body = format!("{} QUERYTERM {}", before.join(" "), after.join(" "));
            let snippet = build_snippet(&body, &terms(&["queryterm"]));
            prop_assert!(snippet.contains("QUERYTERM"));
        }
    }
}
