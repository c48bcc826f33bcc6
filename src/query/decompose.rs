//! Complex-query detection and Pro Search planning.
//!
//! A complex query is split into at most `max_sub_queries` simpler ones by
//! the first template that applies. When none does, the plan is the
//! original query alone, so a plan is never empty.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Phrases that mark a query as needing more than one search.
static COMPLEXITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(compar(?:e|es|ed|ing)|difference between|vs|versus|pros and cons|advantages and disadvantages|how and why|what and how|when and where|multiple|several|various|different|comprehensive|detailed|in-depth|thorough)\b",
    )
    .expect("valid complexity pattern")
});

static COMPARISON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(compar(?:e|es|ed|ing|ison)|differences?|vs|versus)\b")
        .expect("valid comparison pattern")
});

static PROS_CONS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(pros and cons|advantages and disadvantages)\b")
        .expect("valid pros/cons pattern")
});

static DEPTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(comprehensive|detailed|in-depth|thorough)\b").expect("valid depth pattern")
});

/// Framing removed when extracting the topic of a query. Longer phrases
/// come first so they win over their prefixes.
static TOPIC_FRAMING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(comprehensive guide to|detailed overview of|advantages and disadvantages of|pros and cons of|how and why|what and how|tell me about|what is|what are|how does|how do|why is|why are|when is|when are|where is|where are|explain|describe|in-depth|thorough|detailed)\b",
    )
    .expect("valid topic framing pattern")
});

const MULTI_TOPIC_CONJUNCTIONS: &[&str] = &[" and ", " or ", " as well as ", " along with "];

/// Queries longer than this many words count as complex.
const LONG_QUERY_WORDS: usize = 15;

/// Words that never name a compared entity.
const NON_ENTITY_WORDS: &[&str] = &[
    "compare", "comparison", "comparing", "compared", "between", "difference", "differences",
    "vs", "vs.", "versus", "and", "what", "which", "who", "how", "why", "when", "where", "is",
    "are", "was", "were", "the", "a", "an", "of", "to", "in", "for", "with", "better", "or",
];

/// Most entities a comparison is split into.
const MAX_COMPARED_ENTITIES: usize = 3;

/// Seconds per sub-query search and for the final synthesis.
const SECONDS_PER_SUB_QUERY: f64 = 2.5;
const SYNTHESIS_SECONDS: f64 = 4.0;

/// How hard a Pro Search plan digs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    /// One or two sub-queries.
    #[default]
    Moderate,
    /// More than two sub-queries.
    Deep,
}

/// Sub-queries for one Pro Search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubQueryPlan {
    pub original_query: String,
    /// Never empty.
    pub sub_queries: Vec<String>,
    /// True when answers from several sub-queries must be combined.
    pub synthesis_required: bool,
    pub search_depth: SearchDepth,
}

impl SubQueryPlan {
    /// Rough wall-clock estimate for running the plan.
    pub fn estimated_seconds(&self) -> u64 {
        (self.sub_queries.len() as f64 * SECONDS_PER_SUB_QUERY + SYNTHESIS_SECONDS) as u64
    }

    /// Status line announcing the plan.
    pub fn status_message(&self) -> String {
        format!(
            "Pro Search activated: breaking the query into {} sub-queries (about {}s)",
            self.sub_queries.len(),
            self.estimated_seconds()
        )
    }
}

/// Splits complex questions into simpler sub-queries.
#[derive(Debug, Clone, Copy)]
pub struct QueryDecomposer {
    max_sub_queries: usize,
}

impl Default for QueryDecomposer {
    fn default() -> Self {
        Self::new(3)
    }
}

impl QueryDecomposer {
    /// Decomposer returning at most `max_sub_queries` (at least one).
    pub fn new(max_sub_queries: usize) -> Self {
        Self {
            max_sub_queries: max_sub_queries.max(1),
        }
    }

    pub fn max_sub_queries(&self) -> usize {
        self.max_sub_queries
    }

    /// Whether a query would benefit from Pro Search.
    pub fn is_complex(&self, query: &str) -> bool {
        let lower = query.to_lowercase();
        let conjunctions = MULTI_TOPIC_CONJUNCTIONS
            .iter()
            .filter(|c| lower.contains(*c))
            .count();

        COMPLEXITY_RE.is_match(query)
            || query.matches('?').count() > 1
            || conjunctions >= 2
            || query.split_whitespace().count() > LONG_QUERY_WORDS
    }

    /// Pro Search runs when requested, or for complex queries when
    /// `auto_detect` is on.
    pub fn should_use_pro_search(&self, query: &str, requested: bool, auto_detect: bool) -> bool {
        requested || (auto_detect && self.is_complex(query))
    }

    /// Sub-queries from the first template that applies, else `[query]`.
    pub fn decompose(&self, query: &str) -> Vec<String> {
        let lower = query.to_lowercase();
        let mut sub_queries = Vec::new();

        if COMPARISON_RE.is_match(query) {
            let entities = comparison_entities(query);
            if entities.len() >= 2 {
                sub_queries.extend(
                    entities
                        .iter()
                        .map(|e| format!("What is {e}? Key features and characteristics")),
                );
            }
        } else if PROS_CONS_RE.is_match(query) {
            let topic = main_topic(query);
            sub_queries.push(format!("What are the advantages and benefits of {topic}?"));
            sub_queries.push(format!("What are the disadvantages and drawbacks of {topic}?"));
        } else if query.matches('?').count() > 1 {
            sub_queries.extend(
                query
                    .split('?')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(|part| format!("{part}?")),
            );
        } else if lower.contains("how and why") {
            let topic = main_topic(query);
            sub_queries.push(format!("How does {topic} work?"));
            sub_queries.push(format!("Why is {topic} important or necessary?"));
        } else if lower.contains("what and how") {
            let topic = main_topic(query);
            sub_queries.push(format!("What is {topic}?"));
            sub_queries.push(format!("How does {topic} work or function?"));
        } else if DEPTH_RE.is_match(query) {
            let topic = main_topic(query);
            sub_queries.push(format!("What is {topic}? Basic overview and definition"));
            sub_queries.push(format!("{topic}: Key features, characteristics, and details"));
            sub_queries.push(format!("{topic}: Current trends, applications, and implications"));
        }

        if sub_queries.is_empty() {
            sub_queries.push(query.to_string());
        }
        sub_queries.truncate(self.max_sub_queries);
        sub_queries
    }

    /// Full plan for a query.
    pub fn plan(&self, query: &str) -> SubQueryPlan {
        let sub_queries = self.decompose(query);
        let search_depth = if sub_queries.len() > 2 {
            SearchDepth::Deep
        } else {
            SearchDepth::Moderate
        };
        tracing::debug!(
            sub_queries = sub_queries.len(),
            ?search_depth,
            "planned pro search"
        );
        SubQueryPlan {
            original_query: query.to_string(),
            synthesis_required: sub_queries.len() > 1,
            search_depth,
            sub_queries,
        }
    }
}

/// Up to three compared entities in query order, original casing kept.
fn comparison_entities(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| c.is_ascii_punctuation() && c != '+' && c != '#'))
        .filter(|word| word.chars().count() > 2)
        .filter(|word| !NON_ENTITY_WORDS.contains(&word.to_lowercase().as_str()))
        .take(MAX_COMPARED_ENTITIES)
        .map(str::to_string)
        .collect()
}

/// The query with question framing removed, lowercased.
///
/// Falls back to the whole query when too little is left.
fn main_topic(query: &str) -> String {
    let stripped = TOPIC_FRAMING_RE.replace_all(query, " ").replace('?', " ");
    let topic = stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let topic = topic.strip_prefix("the ").unwrap_or(&topic).to_string();

    if topic.chars().count() < 3 {
        query.to_string()
    } else {
        topic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decomposer() -> QueryDecomposer {
        QueryDecomposer::default()
    }

    #[test]
    fn two_questions_split() {
        let query = "What is the capital of France? How big is its population?";
        let d = decomposer();
        assert!(d.is_complex(query));
        assert_eq!(
            d.decompose(query),
            vec!["What is the capital of France?", "How big is its population?"]
        );
    }

    #[test]
    fn complexity_signals() {
        let d = decomposer();
        assert!(d.is_complex("rust vs go"));
        assert!(d.is_complex("pros and cons of nuclear power"));
        assert!(d.is_complex("cats and dogs or birds"));
        assert!(d.is_complex(
            "one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen"
        ));
        assert!(!d.is_complex("capital of France"));
        assert!(!d.is_complex("the canvas drawing api"));
    }

    #[test]
    fn comparison_splits_per_entity() {
        let sub = decomposer().decompose("Compare Python vs Rust?");
        assert_eq!(
            sub,
            vec![
                "What is Python? Key features and characteristics",
                "What is Rust? Key features and characteristics"
            ]
        );
    }

    #[test]
    fn comparison_with_one_entity_falls_back() {
        let query = "compare prices";
        assert_eq!(decomposer().decompose(query), vec![query]);
    }

    #[test]
    fn pros_and_cons_gives_two() {
        let sub = decomposer().decompose("What are the pros and cons of remote work?");
        assert_eq!(
            sub,
            vec![
                "What are the advantages and benefits of remote work?",
                "What are the disadvantages and drawbacks of remote work?"
            ]
        );
    }

    #[test]
    fn how_and_why_templates() {
        let sub = decomposer().decompose("how and why photosynthesis");
        assert_eq!(sub.len(), 2);
        assert!(sub[0].starts_with("How does "));
        assert!(sub[1].starts_with("Why is "));
    }

    #[test]
    fn comprehensive_template_is_deep() {
        let plan = decomposer().plan("a comprehensive look at quantum computing");
        assert_eq!(plan.sub_queries.len(), 3);
        assert_eq!(plan.search_depth, SearchDepth::Deep);
        assert!(plan.synthesis_required);
        assert_eq!(plan.estimated_seconds(), 11);
    }

    #[test]
    fn no_template_returns_query() {
        let query = "when and where was the battle fought";
        let plan = decomposer().plan(query);
        assert_eq!(plan.sub_queries, vec![query]);
        assert!(!plan.synthesis_required);
        assert_eq!(plan.search_depth, SearchDepth::Moderate);
        assert_eq!(plan.estimated_seconds(), 6);
    }

    #[test]
    fn max_bounds_output() {
        let query = "a? b? c? d? e?";
        assert_eq!(decomposer().decompose(query).len(), 3);
        assert_eq!(QueryDecomposer::new(1).decompose(query), vec!["a?"]);
        assert_eq!(QueryDecomposer::new(0).max_sub_queries(), 1);
    }

    #[test]
    fn pro_search_decision() {
        let d = decomposer();
        assert!(d.should_use_pro_search("hello", true, false));
        assert!(d.should_use_pro_search("rust vs go", false, true));
        assert!(!d.should_use_pro_search("rust vs go", false, false));
    }
}
