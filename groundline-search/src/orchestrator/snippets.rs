//! Supporting-sentence extraction from source snippets.
//!
//! Splits a snippet into sentences, scores each by query-term hits
//! normalised by `word_count^0.3` (short, dense sentences win), and keeps
//! the best few.

use crate::types::RankedSource;

/// Words ignored when extracting query terms for sentence scoring.
const STOP_WORDS: &[&str] = &["what", "when", "where", "who", "why", "how", "the", "a", "an"];

/// Sentences at or below this length are ignored.
const MIN_SENTENCE_CHARS: usize = 20;

/// Picks the snippet sentences that best support a query.
#[derive(Debug, Clone)]
pub struct SnippetExtractor {
    max_snippet_chars: usize,
    per_source: usize,
}

impl Default for SnippetExtractor {
    fn default() -> Self {
        Self::new(300, 2)
    }
}

impl SnippetExtractor {
    /// Extractor keeping `per_source` sentences of at most
    /// `max_snippet_chars` characters each.
    pub fn new(max_snippet_chars: usize, per_source: usize) -> Self {
        Self {
            max_snippet_chars,
            per_source,
        }
    }

    /// Best supporting sentences from `snippet`, most relevant first.
    ///
    /// Truncated sentences end in `...`.
    pub fn extract(&self, snippet: &str, query: &str) -> Vec<String> {
        if snippet.trim().is_empty() || self.per_source == 0 {
            return Vec::new();
        }

        let terms = query_terms(query);
        let mut scored: Vec<(&str, f64)> = split_sentences(snippet)
            .into_iter()
            .filter(|sentence| sentence.chars().count() > MIN_SENTENCE_CHARS)
            .map(|sentence| (sentence, sentence_score(sentence, &terms)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        scored
            .into_iter()
            .take(self.per_source)
            .map(|(sentence, _)| self.truncate(sentence))
            .collect()
    }

    /// Fill `enhanced_snippets` on every ranked source.
    pub fn enhance(&self, sources: &mut [RankedSource], query: &str) {
        for source in sources {
            source.enhanced_snippets = self.extract(&source.source.snippet, query);
        }
    }

    fn truncate(&self, sentence: &str) -> String {
        if sentence.chars().count() <= self.max_snippet_chars {
            return sentence.to_string();
        }
        let mut cut: String = sentence.chars().take(self.max_snippet_chars).collect();
        cut.push_str("...");
        cut
    }
}

/// Split text after `.`, `!` or `?` followed by whitespace.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut prev: Option<char> = None;
    let mut iter = text.char_indices().peekable();

    while let Some((idx, c)) = iter.next() {
        if c.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            sentences.push(&text[start..idx]);
            let mut next_start = idx + c.len_utf8();
            while let Some(&(j, w)) = iter.peek() {
                if !w.is_whitespace() {
                    break;
                }
                next_start = j + w.len_utf8();
                iter.next();
            }
            start = next_start;
            prev = None;
            continue;
        }
        prev = Some(c);
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

fn query_terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| word.chars().count() >= 3)
        .filter(|word| !STOP_WORDS.contains(word))
        .map(str::to_owned)
        .collect()
}

fn sentence_score(sentence: &str, terms: &[String]) -> f64 {
    let lower = sentence.to_lowercase();
    let hits = terms.iter().filter(|t| lower.contains(t.as_str())).count() as f64;
    let words = sentence.split_whitespace().count();
    if words == 0 {
        hits
    } else {
        hits / (words as f64).powf(0.3)
    }
}
