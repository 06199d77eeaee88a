/// Pure text utilities shared by the scorer, quality gate, and trust engine.
///
/// These functions contain NO side effects - they take inputs and return
/// outputs without touching databases, making API calls, or performing I/O.
use std::collections::HashSet;

/// Normalize free text: lowercase, strip punctuation, collapse whitespace, trim.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// URL slug for a title: normalize, then hyphenate.
pub fn slugify(text: &str) -> String {
    normalize(text).split_whitespace().collect::<Vec<_>>().join("-")
}

/// Strip HTML tags, leaving a space where each tag was so words don't fuse.
pub fn strip_html_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Lowercase alphabetic tokens of length >= 3, HTML-stripped.
pub fn content_tokens(html: &str) -> Vec<String> {
    normalize(&strip_html_tags(html))
        .split_whitespace()
        .filter(|w| w.len() >= 3)
        .map(|w| w.to_string())
        .collect()
}

/// Contiguous 3-word shingles over the given tokens.
pub fn shingles(tokens: &[String]) -> HashSet<String> {
    if tokens.len() < 3 {
        return HashSet::new();
    }
    tokens.windows(3).map(|w| w.join(" ")).collect()
}

/// Jaccard similarity of two sets: |intersection| / |union|, 0 if either is empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// Word set of a title: normalized words longer than 2 characters.
pub fn word_set(text: &str) -> HashSet<String> {
    normalize(text)
        .split_whitespace()
        .filter(|w| w.len() > 2)
        .map(|w| w.to_string())
        .collect()
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
