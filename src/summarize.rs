use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

static SENTENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^.!?]+[.!?]+(?:\s|$)|[^.!?]+$").unwrap());
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z'-]*").unwrap());

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "of", "in", "on", "to", "for", "with", "as", "by",
    "at", "is", "are", "was", "were", "be", "been", "it", "its", "this", "that", "these",
    "those", "from", "we", "our", "their", "they", "has", "have", "had", "not", "no", "can",
    "which", "also",
];

/// Extractive summary: score each sentence by the frequency of its content
/// words across the whole text, keep the top `max_sentences`, and emit them
/// verbatim in their original order.
pub fn summarize(text: &str, max_sentences: usize) -> String {
    if max_sentences == 0 {
        return String::new();
    }

    let sentences: Vec<&str> = SENTENCE_RE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect();
    if sentences.len() <= max_sentences {
        return sentences.join(" ");
    }

    let mut frequencies: HashMap<String, usize> = HashMap::new();
    for word in WORD_RE.find_iter(text) {
        let lower = word.as_str().to_lowercase();
        if !STOP_WORDS.contains(&lower.as_str()) {
            *frequencies.entry(lower).or_insert(0) += 1;
        }
    }

    let mut scored: Vec<(usize, f64)> = sentences
        .iter()
        .enumerate()
        .map(|(i, sentence)| {
            let words: Vec<String> = WORD_RE
                .find_iter(sentence)
                .map(|w| w.as_str().to_lowercase())
                .collect();
            let score: usize = words
                .iter()
                .filter_map(|w| frequencies.get(w))
                .sum();
            // Normalize so long sentences don't win on length alone.
            let normalized = if words.is_empty() {
                0.0
            } else {
                score as f64 / words.len() as f64
            };
            (i, normalized)
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let mut selected: Vec<usize> = scored
        .into_iter()
        .take(max_sentences)
        .map(|(i, _)| i)
        .collect();
    selected.sort_unstable();

    selected
        .into_iter()
        .map(|i| sentences[i])
        .collect::<Vec<_>>()
        .join(" ")
}
