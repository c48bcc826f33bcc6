//! Multi-factor relevance scoring for retrieved sources.
//!
//! Each source gets four sub-scores:
//! - Title match: fraction of query key terms found in the title
//! - Snippet match: the same over the snippet, plus a bonus when the whole
//!   query appears verbatim
//! - Freshness: publish-year bucket relative to the current year
//! - Domain authority: fixed high/medium tiers
//!
//! Formula: `score = Σ weight_i * subscore_i`, clamped to `[0, 1]`.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::types::{RankedSource, ScoreBreakdown, SourceCandidate};

/// Words ignored when extracting key terms from a query.
const STOP_WORDS: &[&str] = &[
    "what", "when", "where", "who", "why", "how", "is", "are", "was", "were", "the", "a", "an",
    "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "from", "as", "this",
    "that", "these", "those", "can", "could", "would", "should", "may", "might", "will", "shall",
    "do", "does", "did", "have", "has", "had",
];

/// URL fragments that mark a high-authority domain.
const HIGH_AUTHORITY: &[&str] = &[
    "wikipedia.org",
    "github.com",
    "stackoverflow.com",
    ".gov",
    ".edu",
    "arxiv.org",
    "nature.com",
    "science.org",
    "nytimes.com",
    "bbc.com",
    "reuters.com",
    "theguardian.com",
];

/// URL fragments that mark a medium-authority domain.
const MEDIUM_AUTHORITY: &[&str] = &[
    "medium.com",
    "techcrunch.com",
    "wired.com",
    "forbes.com",
    ".org",
    "cnn.com",
    "bloomberg.com",
];

/// Bonus added to the snippet match when the query appears verbatim.
const EXACT_PHRASE_BONUS: f64 = 0.3;

/// Freshness score for sources without a usable publish date.
const NEUTRAL_FRESHNESS: f64 = 0.5;

/// Minimum key-term length, in characters.
const MIN_TERM_CHARS: usize = 4;

/// Weights for the four relevance sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingWeights {
    /// Weight of the title match.
    pub title: f64,
    /// Weight of the snippet match.
    pub snippet: f64,
    /// Weight of the freshness bucket.
    pub freshness: f64,
    /// Weight of the domain authority tier.
    pub domain: f64,
}

impl RankingWeights {
    /// Build a weight set.
    pub const fn new(title: f64, snippet: f64, freshness: f64, domain: f64) -> Self {
        Self {
            title,
            snippet,
            freshness,
            domain,
        }
    }

    /// Sum of all four weights.
    pub fn total(&self) -> f64 {
        self.title + self.snippet + self.freshness + self.domain
    }

    fn combine(&self, breakdown: &ScoreBreakdown) -> f64 {
        self.title * breakdown.title_match
            + self.snippet * breakdown.snippet_match
            + self.freshness * breakdown.freshness
            + self.domain * breakdown.domain_authority
    }
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self::new(0.35, 0.40, 0.15, 0.10)
    }
}

/// Scores and orders sources against a query.
#[derive(Debug, Clone)]
pub struct SourceRanker {
    weights: RankingWeights,
    current_year: i32,
}

impl Default for SourceRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceRanker {
    /// Ranker with default weights, dated against the system clock.
    pub fn new() -> Self {
        Self {
            weights: RankingWeights::default(),
            current_year: chrono::Utc::now().year(),
        }
    }

    /// Replace the weight set.
    #[must_use]
    pub fn with_weights(mut self, weights: RankingWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Pin the year freshness buckets are measured from.
    #[must_use]
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    /// The active weight set.
    pub fn weights(&self) -> RankingWeights {
        self.weights
    }

    /// Score every source, sort descending by score and keep at most
    /// `max_sources`.
    ///
    /// The sort is stable: equal scores keep their input order. This is a
    /// pure function of its inputs and the ranker's settings.
    pub fn rank(
        &self,
        sources: Vec<SourceCandidate>,
        query: &str,
        max_sources: usize,
    ) -> Vec<RankedSource> {
        let terms = key_terms(query);
        let query_lower = query.to_lowercase();

        let mut ranked: Vec<RankedSource> = sources
            .into_iter()
            .map(|source| {
                let breakdown = self.breakdown(&source, &query_lower, &terms);
                let score = self.weights.combine(&breakdown);
                RankedSource::new(source, breakdown, score)
            })
            .collect();

        sort_by_score(&mut ranked);
        ranked.truncate(max_sources);
        ranked
    }

    /// Compute the four sub-scores for one source.
    pub fn breakdown(
        &self,
        source: &SourceCandidate,
        query_lower: &str,
        terms: &[String],
    ) -> ScoreBreakdown {
        let title = source.title.to_lowercase();
        let snippet = source.snippet.to_lowercase();

        let mut snippet_match = term_coverage(&snippet, terms);
        if !query_lower.is_empty() && snippet.contains(query_lower) {
            snippet_match = (snippet_match + EXACT_PHRASE_BONUS).min(1.0);
        }

        ScoreBreakdown {
            title_match: term_coverage(&title, terms),
            snippet_match,
            freshness: self.freshness(source),
            domain_authority: domain_authority(&source.url),
        }
    }

    /// Freshness bucket for a source's publish year.
    pub fn freshness(&self, source: &SourceCandidate) -> f64 {
        match source.publish_year() {
            Some(year) if year >= self.current_year - 1 => 1.0,
            Some(year) if year >= self.current_year - 2 => 0.8,
            Some(year) if year >= self.current_year - 3 => 0.6,
            Some(_) => 0.4,
            None => NEUTRAL_FRESHNESS,
        }
    }
}

/// Sort ranked sources by descending score, keeping ties in input order.
pub fn sort_by_score(sources: &mut [RankedSource]) {
    sources.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
}

/// Extract lowercase key terms (4+ word characters, stop words removed).
///
/// Repeated words are kept, so a repeated term weighs more.
pub fn key_terms(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| word.chars().count() >= MIN_TERM_CHARS)
        .filter(|word| !STOP_WORDS.contains(word))
        .map(str::to_owned)
        .collect()
}

/// Domain authority tier for a URL: 1.0 high, 0.7 medium, 0.5 otherwise.
pub fn domain_authority(url: &str) -> f64 {
    let url = url.to_lowercase();
    if HIGH_AUTHORITY.iter().any(|domain| url.contains(domain)) {
        1.0
    } else if MEDIUM_AUTHORITY.iter().any(|domain| url.contains(domain)) {
        0.7
    } else {
        0.5
    }
}

fn term_coverage(haystack: &str, terms: &[String]) -> f64 {
    let hits = terms.iter().filter(|term| haystack.contains(term.as_str())).count();
    (hits as f64 / terms.len().max(1) as f64).min(1.0)
}
