//! Query understanding: intent, keywords, temporal context, expansion, and
//! decomposition of complex questions into sub-queries.
//!
//! Everything here is rule-based and request-scoped. Pattern tables are
//! process-wide constants evaluated in a fixed priority order.

pub mod analyzer;
pub mod decompose;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

pub use analyzer::QueryAnalyzer;
pub use decompose::{QueryDecomposer, SearchDepth, SubQueryPlan};

/// What the user is trying to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Look up a fact.
    #[default]
    Factual,
    /// Weigh two or more things against each other.
    Comparison,
    /// Learn how to do something.
    HowTo,
    /// Understand why or how something works.
    Explanation,
    /// Get a suggestion.
    Recommendation,
    /// Evaluate impact or quality.
    Analysis,
    /// Hear about something happening now.
    CurrentEvents,
}

impl Intent {
    /// Wire name (`how_to`, `current_events`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Factual => "factual",
            Self::Comparison => "comparison",
            Self::HowTo => "how_to",
            Self::Explanation => "explanation",
            Self::Recommendation => "recommendation",
            Self::Analysis => "analysis",
            Self::CurrentEvents => "current_events",
        }
    }

    /// Intents that usually need several searches to cover.
    pub fn benefits_from_multiple_searches(&self) -> bool {
        matches!(
            self,
            Self::Comparison | Self::Analysis | Self::Recommendation
        )
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which period a query is about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRelevance {
    /// No time signal.
    #[default]
    Any,
    /// Current or very recent.
    Recent,
    /// The past.
    Historical,
    /// Predictions and upcoming events.
    Future,
}

/// Time-related signals found in a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalContext {
    /// Period the query is about.
    pub time_relevance: TimeRelevance,
    /// First four-digit year (1900-2099) mentioned, if any.
    pub specific_year: Option<i32>,
    /// Whether results should be as fresh as possible.
    pub requires_fresh_data: bool,
}

/// A fully analysed query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedQuery {
    /// Raw user text.
    pub original: String,
    /// Classified intent.
    pub intent: Intent,
    /// Ordered, de-duplicated keywords.
    pub keywords: Vec<String>,
    /// Up to three phrasings, the original first.
    pub expanded_queries: Vec<String>,
    /// Time signals.
    pub temporal_context: TemporalContext,
    /// The string actually sent to retrieval.
    pub enhanced_query: String,
}

/// Retrieval hints derived from intent and temporal context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHints {
    /// Prefer recently published sources.
    pub prefer_fresh_sources: bool,
    /// How many sources a good answer usually needs.
    pub expected_sources: usize,
    /// URL fragments likely to hold good answers.
    pub domain_preferences: Vec<&'static str>,
}

static CONVERSATIONAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Greetings
        r"^(hi|hello|hey|howdy|greetings|good morning|good afternoon|good evening)[\s,!.]*$",
        r"^(hi|hello|hey)\s+(there|friend|buddy)",
        r"^how\s+(are|r)\s+you",
        r"^what'?s\s+up",
        r"^sup\b",
        // Jokes
        r"tell\s+(me\s+)?a\s+joke",
        r"make\s+me\s+laugh",
        r"say\s+something\s+funny",
        // About the assistant
        r"^who\s+are\s+you",
        r"^what\s+are\s+you",
        r"^what\s+can\s+you\s+do",
        r"^help\s*$",
        // Thanks and goodbyes
        r"^(thanks|thank\s+you|thx|ty)[\s!.]*$",
        r"^(bye|goodbye|see\s+you|later)[\s!.]*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid conversational pattern"))
    .collect()
});

const QUESTION_WORDS: &[&str] = &["what", "when", "where", "who", "why", "how", "which"];
const CASUAL_WORDS: &[&str] = &["hi", "hello", "hey", "yo", "sup", "hola", "thanks", "bye"];

/// Whether a query is small talk that needs no retrieval.
///
/// Greetings, jokes, thanks, goodbyes, and questions about the assistant
/// match. So do one- or two-word queries containing a casual word and no
/// question word.
pub fn is_conversational(query: &str) -> bool {
    let lower = query.trim().to_lowercase();
    if CONVERSATIONAL_PATTERNS.iter().any(|re| re.is_match(&lower)) {
        return true;
    }

    let words: Vec<&str> = lower.split_whitespace().collect();
    words.len() <= 2
        && !words.iter().any(|w| QUESTION_WORDS.contains(w))
        && words.iter().any(|w| CASUAL_WORDS.contains(w))
}
