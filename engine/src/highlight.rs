//! Query-term highlighting for excerpts.
//!
//! Highlighting runs in two steps: [`highlight_spans`] picks the char ranges
//! to emphasize, and [`render_marked`] escapes the text and wraps those
//! ranges in `<mark>`. Matching sees raw text, so a term never matches
//! inside an entity like `&amp;`, and the markup is balanced by construction.
//!
//! Overlap rule: terms are tried longest first (ties keep query order) and
//! each match is claimed only if it touches no span claimed before it. A
//! later match that overlaps a claimed span is dropped whole.

use crate::parse::{folded_chars, find_chars};
use std::cmp::Reverse;
use std::ops::Range;

const MARK_OPEN: &str = "<mark>";
const MARK_CLOSE: &str = "</mark>";

/// HTML-escape text for use as element content or attribute value
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        push_escaped(&mut out, c);
    }
    out
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(c),
    }
}

/// Non-overlapping char ranges of `text` to emphasize, sorted by start
pub fn highlight_spans(text: &str, terms: &[String]) -> Vec<Range<usize>> {
    let haystack = folded_chars(text);

    let mut ordered: Vec<Vec<char>> = terms
        .iter()
        .filter(|t| !t.is_empty())
        .map(|t| folded_chars(t))
        .collect();
    // Stable sort keeps query order among equal lengths
    ordered.sort_by_key(|t| Reverse(t.len()));

    let mut spans: Vec<Range<usize>> = Vec::new();
    for term in &ordered {
        let mut from = 0;
        while let Some(start) = find_chars(&haystack, term, from) {
            let span = start..start + term.len();
            if !spans.iter().any(|s| s.start < span.end && span.start < s.end) {
                spans.push(span.clone());
            }
            from = span.end;
        }
    }

    spans.sort_by_key(|s| s.start);
    spans
}

/// Escape `text` and wrap each span in `<mark>`.
///
/// Spans must be sorted and disjoint; empty or out-of-order spans are skipped.
pub fn render_marked(text: &str, spans: &[Range<usize>]) -> String {
    let mut out =
        String::with_capacity(text.len() + spans.len() * (MARK_OPEN.len() + MARK_CLOSE.len()));
    let mut pending = spans.iter().filter(|s| s.start < s.end).peekable();
    let mut open_until: Option<usize> = None;

    for (i, c) in text.chars().enumerate() {
        if open_until == Some(i) {
            out.push_str(MARK_CLOSE);
            open_until = None;
        }
        if open_until.is_none() {
            while pending.next_if(|s| s.start < i).is_some() {}
            if let Some(span) = pending.next_if(|s| s.start == i) {
                out.push_str(MARK_OPEN);
                open_until = Some(span.end);
            }
        }
        push_escaped(&mut out, c);
    }
    if open_until.is_some() {
        out.push_str(MARK_CLOSE);
    }
    out
}

/// Escape a plain-text snippet and emphasize every query term in it
pub fn highlight(snippet: &str, terms: &[String]) -> String {
    if terms.is_empty() {
        return escape_html(snippet);
    }
    render_marked(snippet, &highlight_spans(snippet, terms))
}
