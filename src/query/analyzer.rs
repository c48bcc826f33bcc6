//! Rule-based query analysis.
//!
//! Intent is the first intent whose pattern matches, in table order.
//! Keywords keep the capitalisation of likely proper nouns. The enhanced
//! query gains the current year for fresh-data queries and a generic
//! qualifier for queries too short to be specific.

use chrono::Datelike;
use regex::Regex;
use std::sync::LazyLock;

use super::{AnalyzedQuery, Intent, SearchHints, TemporalContext, TimeRelevance};

/// Intent patterns in priority order. Earlier entries win.
static INTENT_PATTERNS: LazyLock<Vec<(Intent, Regex)>> = LazyLock::new(|| {
    [
        (Intent::Factual, r"\b(what|who|when|where|which)\s+(is|are|was|were)\b"),
        (Intent::Factual, r"\b(define|definition of|meaning of)\b"),
        (Intent::Factual, r"\b(how many|how much)\b"),
        (Intent::Comparison, r"\b(difference between|compare|vs|versus)\b"),
        (Intent::Comparison, r"\b(better|worse|superior|inferior)\b"),
        (Intent::Comparison, r"\b(advantages|disadvantages|pros|cons)\b"),
        (Intent::HowTo, r"\b(how to|how do|how can)\b"),
        (Intent::HowTo, r"\b(steps to|guide to|tutorial)\b"),
        (Intent::HowTo, r"\b(learn|teach me)\b"),
        (Intent::Explanation, r"\b(why|how does|explain|describe)\b"),
        (Intent::Explanation, r"\b(what causes|what makes)\b"),
        (Intent::Explanation, r"\b(reason for|purpose of)\b"),
        (Intent::Recommendation, r"\b(best|top|recommend|suggest)\b"),
        (Intent::Recommendation, r"\b(should i|which one|what to choose)\b"),
        (Intent::Analysis, r"\b(analyze|analysis|review|evaluate)\b"),
        (Intent::Analysis, r"\b(impact of|effect of|consequence)\b"),
        (Intent::CurrentEvents, r"\b(latest|recent|news|current|today|now)\b"),
    ]
    .into_iter()
    .map(|(intent, pattern)| {
        let re = Regex::new(&format!("(?i){pattern}")).expect("valid intent pattern");
        (intent, re)
    })
    .collect()
});

static KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z][a-z]*[A-Za-z0-9]*\b").expect("valid keyword pattern"));

static RECENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(recent(ly)?|latest|current(ly)?|now|today|this week|this month)\b")
        .expect("valid recent pattern")
});

static HISTORICAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(history|historical|origins?|invented|founded|created)\b")
        .expect("valid historical pattern")
});

static FUTURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(future|upcoming|will|predictions?|forecasts?)\b")
        .expect("valid future pattern")
});

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").expect("valid year pattern"));

const KEYWORD_STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "can", "of", "at",
    "by", "for", "with", "about", "as", "into", "through", "during", "before", "after", "above",
    "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under", "again",
    "further", "then", "once",
];

/// Maximum phrasings returned by expansion, including the original.
const MAX_EXPANSIONS: usize = 3;

/// Qualifier appended to queries with fewer than two keywords.
const SHORT_QUERY_QUALIFIER: &str = "information details";

/// Classifies, expands, and enhances raw queries.
#[derive(Debug, Clone)]
pub struct QueryAnalyzer {
    current_year: i32,
}

impl Default for QueryAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryAnalyzer {
    /// Analyzer dated against the system clock.
    pub fn new() -> Self {
        Self {
            current_year: chrono::Utc::now().year(),
        }
    }

    /// Pin the year used for "recent" detection and query enhancement.
    #[must_use]
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    /// Run every analysis step.
    pub fn analyze(&self, query: &str) -> AnalyzedQuery {
        let intent = self.classify_intent(query);
        let keywords = extract_keywords(query);
        let expanded_queries = self.expand(query, intent, &keywords);
        let temporal_context = detect_temporal_context(query);
        let enhanced_query = self.enhance(query, &keywords, &temporal_context);

        tracing::debug!(
            %intent,
            keywords = keywords.len(),
            fresh = temporal_context.requires_fresh_data,
            "analyzed query"
        );

        AnalyzedQuery {
            original: query.to_string(),
            intent,
            keywords,
            expanded_queries,
            temporal_context,
            enhanced_query,
        }
    }

    /// First matching intent in priority order, defaulting to factual.
    pub fn classify_intent(&self, query: &str) -> Intent {
        if let Some((intent, _)) = INTENT_PATTERNS.iter().find(|(_, re)| re.is_match(query)) {
            return *intent;
        }
        if self.mentions_recent_year(query) {
            return Intent::CurrentEvents;
        }
        Intent::Factual
    }

    /// Up to three phrasings keyed off intent, the original first.
    ///
    /// Case-insensitive duplicates are removed, order preserved.
    pub fn expand(&self, query: &str, intent: Intent, keywords: &[String]) -> Vec<String> {
        let mut expanded = vec![query.to_string()];

        match intent {
            Intent::HowTo => {
                expanded.push(format!("{query} tutorial"));
                expanded.push(format!("{query} guide"));
                expanded.push(format!("step by step {query}"));
            }
            Intent::Comparison => {
                for keyword in keywords.iter().filter(|k| k.chars().count() > 3) {
                    expanded.push(format!("{keyword} comparison"));
                    expanded.push(format!("{keyword} review"));
                }
            }
            Intent::Explanation => {
                expanded.push(format!("understanding {query}"));
                expanded.push(format!("{query} explained"));
            }
            Intent::Recommendation => {
                let joined = keywords.join(" ");
                expanded.push(format!("best {joined}"));
                expanded.push(format!("top {joined}"));
            }
            Intent::CurrentEvents => {
                expanded.push(format!("{query} {}", self.current_year));
                expanded.push(format!("{query} latest"));
            }
            Intent::Factual | Intent::Analysis => {}
        }

        if keywords.len() > 2 {
            expanded.push(keywords[..3].join(" "));
        }

        let mut unique = dedup_case_insensitive(expanded);
        unique.truncate(MAX_EXPANSIONS);
        unique
    }

    /// The string sent to retrieval.
    pub fn enhance(&self, query: &str, keywords: &[String], temporal: &TemporalContext) -> String {
        let mut enhanced = query.to_string();

        if temporal.requires_fresh_data {
            let year = self.current_year.to_string();
            if !enhanced.contains(&year) {
                enhanced = format!("{enhanced} {year}");
            }
        }

        if keywords.len() < 2 {
            enhanced = format!("{enhanced} {SHORT_QUERY_QUALIFIER}");
        }

        enhanced
    }

    /// Retrieval hints for an intent.
    pub fn search_hints(&self, intent: Intent, temporal: &TemporalContext) -> SearchHints {
        let mut hints = SearchHints {
            prefer_fresh_sources: temporal.requires_fresh_data,
            expected_sources: 5,
            domain_preferences: Vec::new(),
        };

        match intent {
            Intent::Factual => {
                hints.domain_preferences = vec!["wikipedia", "encyclopedia", ".edu", ".gov"];
                hints.expected_sources = 3;
            }
            Intent::HowTo => {
                hints.domain_preferences = vec!["tutorial", "guide", "documentation"];
            }
            Intent::CurrentEvents => {
                hints.domain_preferences = vec!["news", "reuters", "bbc", "nytimes"];
                hints.prefer_fresh_sources = true;
                hints.expected_sources = 7;
            }
            Intent::Comparison => hints.expected_sources = 8,
            Intent::Explanation | Intent::Recommendation | Intent::Analysis => {}
        }

        hints
    }

    fn mentions_recent_year(&self, query: &str) -> bool {
        let recent = [
            (self.current_year - 1).to_string(),
            self.current_year.to_string(),
        ];
        query
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .any(|word| recent.iter().any(|year| year == word))
    }
}

/// Keywords longer than two characters, stop words removed.
///
/// Capitalised words keep their case (likely proper nouns); the rest are
/// lowercased. Case-insensitive repeats are dropped.
pub fn extract_keywords(query: &str) -> Vec<String> {
    let words = KEYWORD_RE
        .find_iter(query)
        .map(|m| m.as_str())
        .filter(|word| word.chars().count() > 2)
        .filter(|word| !KEYWORD_STOP_WORDS.contains(&word.to_lowercase().as_str()))
        .map(|word| {
            if word.starts_with(|c: char| c.is_uppercase()) {
                word.to_string()
            } else {
                word.to_lowercase()
            }
        })
        .collect();
    dedup_case_insensitive(words)
}

/// Time signals: recent beats historical beats future.
pub fn detect_temporal_context(query: &str) -> TemporalContext {
    let mut context = TemporalContext::default();

    if RECENT_RE.is_match(query) {
        context.time_relevance = TimeRelevance::Recent;
        context.requires_fresh_data = true;
    } else if HISTORICAL_RE.is_match(query) {
        context.time_relevance = TimeRelevance::Historical;
    } else if FUTURE_RE.is_match(query) {
        context.time_relevance = TimeRelevance::Future;
    }

    context.specific_year = YEAR_RE
        .find(query)
        .and_then(|m| m.as_str().parse().ok());

    context
}

fn dedup_case_insensitive(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}
