//! Claim-to-source matching and inline `[n]` citation injection.
//!
//! Sentences that look like factual claims are matched against every
//! source; each claim gets all sources whose support score reaches the
//! threshold. Only when no sentence is cited at all does matching fall back
//! to whole paragraphs.

use std::sync::LazyLock;

use groundline_search::orchestrator::snippets::split_sentences;
use groundline_search::RankedSource;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::CitationConfig;

/// Patterns marking a sentence as a checkable claim, in priority order.
static CLAIM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // statistics
        r"\b\d+\.?\d*\s*(?:percent|%|million|billion|thousand)",
        // definitions
        r"\b(?:is|are|was|were|has|have|had)\s+(?:a|an|the)?",
        // research
        r"\b(?:according to|research shows|studies indicate)",
        // history
        r"\b(?:founded|created|launched|developed|invented)",
        // geography
        r"\b(?:located|situated|found in|based in)",
        // money
        r"\b(?:costs?|prices?|worth|valued)",
        // measurement
        r"\b(?:measures?|weighs?|spans?|reaches?)",
        // composition
        r"\b(?:consists of|contains?|includes?|comprises?)",
        // purpose
        r"\b(?:used for|designed to|serves as|functions as)",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).expect("valid claim pattern"))
    .collect()
});

static TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w{4,}\b").expect("valid term pattern"));

static CITATION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\d+(?:,\d+)*\]").expect("valid citation marker pattern"));

const CLAIM_STOP_WORDS: &[&str] = &[
    "that", "this", "with", "from", "have", "been", "were", "what", "when", "where",
];

/// Claim prefix and snippet prefix compared for textual similarity.
const CLAIM_SIMILARITY_CHARS: usize = 100;
const SNIPPET_SIMILARITY_CHARS: usize = 200;

/// Leading key terms checked against the source URL.
const URL_TERMS: usize = 3;

/// Sentences longer than this are expected to carry citations.
const CITABLE_SENTENCE_CHARS: usize = 30;

/// One claim and the sources backing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Verbatim sentence or paragraph from the answer.
    pub claim: String,
    /// 1-based source indices in ascending order.
    pub sources: Vec<usize>,
}

/// Claims in the order they were found.
pub type CitationMap = Vec<Citation>;

/// Result of citing an answer.
#[derive(Debug, Clone, PartialEq)]
pub struct CitedAnswer {
    pub text: String,
    pub citations: CitationMap,
    /// Every source that was offered, cited or not.
    pub sources: Vec<RankedSource>,
}

/// Matches claims to sources and writes citation markers into the text.
#[derive(Debug, Clone, Default)]
pub struct CitationInjector {
    config: CitationConfig,
}

impl CitationInjector {
    pub fn new(config: CitationConfig) -> Self {
        Self { config }
    }

    /// Cite `text` against `sources`.
    ///
    /// Sentence-level claims are tried first. If none is supported, each
    /// paragraph of at least `min_paragraph_chars` is matched instead.
    pub fn cite(&self, text: &str, sources: Vec<RankedSource>) -> CitedAnswer {
        if sources.is_empty() {
            return CitedAnswer {
                text: text.to_string(),
                citations: Vec::new(),
                sources,
            };
        }

        let citations: CitationMap = self
            .extract_claims(text)
            .into_iter()
            .filter_map(|claim| {
                let supporting = self.supporting_sources(&claim, &sources);
                (!supporting.is_empty()).then_some(Citation {
                    claim,
                    sources: supporting,
                })
            })
            .collect();

        let (text, citations) = if citations.is_empty() {
            self.cite_paragraphs(text, &sources)
        } else {
            (inject(text, &citations), citations)
        };

        tracing::debug!(
            claims = citations.len(),
            sources = sources.len(),
            "injected citations"
        );
        CitedAnswer {
            text,
            citations,
            sources,
        }
    }

    /// Sentences that look like factual claims, each once, in text order.
    pub fn extract_claims(&self, text: &str) -> Vec<String> {
        let mut claims: Vec<String> = Vec::new();
        for sentence in split_sentences(text) {
            let sentence = sentence.trim();
            if sentence.chars().count() < self.config.min_claim_chars {
                continue;
            }
            let factual = CLAIM_PATTERNS.iter().any(|re| re.is_match(sentence))
                || sentence.chars().any(|c| c.is_ascii_digit());
            if factual && !claims.iter().any(|c| c == sentence) {
                claims.push(sentence.to_string());
            }
        }
        claims
    }

    /// 1-based indices of every source whose support score for `claim`
    /// reaches the similarity threshold.
    pub fn supporting_sources(&self, claim: &str, sources: &[RankedSource]) -> Vec<usize> {
        let claim_lower = claim.to_lowercase();
        let terms: Vec<&str> = TERM_RE
            .find_iter(&claim_lower)
            .map(|m| m.as_str())
            .filter(|t| !CLAIM_STOP_WORDS.contains(t))
            .collect();

        sources
            .iter()
            .enumerate()
            .filter(|(_, source)| {
                self.support_score(claim, &terms, source) >= self.config.similarity_threshold
            })
            .map(|(i, _)| i + 1)
            .collect()
    }

    fn support_score(&self, claim: &str, terms: &[&str], source: &RankedSource) -> f64 {
        let title = source.title().to_lowercase();
        let snippet = source.snippet().to_lowercase();
        let url = source.url().to_lowercase();

        let title_hits = terms.iter().filter(|t| title.contains(*t)).count();
        let snippet_hits = terms.iter().filter(|t| snippet.contains(*t)).count();

        let claim_head: String = claim.chars().take(CLAIM_SIMILARITY_CHARS).collect();
        let snippet_head: String = snippet.chars().take(SNIPPET_SIMILARITY_CHARS).collect();
        let similarity = similarity(&claim_head, &snippet_head);

        let url_bonus = if terms.iter().take(URL_TERMS).any(|t| url.contains(*t)) {
            self.config.url_term_boost
        } else {
            0.0
        };

        title_hits as f64 * self.config.title_term_boost
            + snippet_hits as f64 * self.config.snippet_term_boost
            + similarity
            + url_bonus
    }

    fn cite_paragraphs(&self, text: &str, sources: &[RankedSource]) -> (String, CitationMap) {
        let mut citations = Vec::new();
        let paragraphs: Vec<String> = text
            .split("\n\n")
            .map(|paragraph| {
                if paragraph.chars().count() < self.config.min_paragraph_chars {
                    return paragraph.to_string();
                }
                let head: String = paragraph.chars().take(SNIPPET_SIMILARITY_CHARS).collect();
                let supporting = self.supporting_sources(&head, sources);
                if supporting.is_empty() {
                    return paragraph.to_string();
                }
                let trimmed = paragraph.trim_end();
                let cited = append_citation(trimmed, &supporting);
                citations.push(Citation {
                    claim: trimmed.to_string(),
                    sources: supporting,
                });
                cited
            })
            .collect();
        (paragraphs.join("\n\n"), citations)
    }
}

/// Insert each citation after the first verbatim occurrence of its claim.
///
/// Longer claims go first so a claim contained in another is not cited
/// inside it. Claims no longer present verbatim are skipped.
pub fn inject(text: &str, citations: &[Citation]) -> String {
    let mut ordered: Vec<&Citation> = citations
        .iter()
        .filter(|c| !c.sources.is_empty())
        .collect();
    ordered.sort_by(|a, b| b.claim.len().cmp(&a.claim.len()));

    let mut out = text.to_string();
    for citation in ordered {
        if citation.claim.is_empty() || !out.contains(&citation.claim) {
            tracing::trace!(claim = %citation.claim, "claim not found verbatim; skipped");
            continue;
        }
        let replacement = append_citation(&citation.claim, &citation.sources);
        out = out.replacen(&citation.claim, &replacement, 1);
    }
    out
}

/// `[1]` or `[1,2,...]`.
pub fn format_marker(sources: &[usize]) -> String {
    let joined = sources
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("[{joined}]")
}

/// Whether the answer carries at least one marker per three sentences
/// longer than 30 characters.
pub fn has_adequate_citations(text: &str) -> bool {
    let markers = CITATION_MARKER.find_iter(text).count();
    let citable = split_sentences(text)
        .iter()
        .filter(|s| s.chars().count() > CITABLE_SENTENCE_CHARS)
        .count();
    markers as f64 >= citable as f64 / 3.0
}

/// Marker placed before a trailing period, else appended.
fn append_citation(claim: &str, sources: &[usize]) -> String {
    let marker = format_marker(sources);
    match claim.strip_suffix('.') {
        Some(body) => format!("{body} {marker}."),
        None => format!("{claim} {marker}"),
    }
}

fn similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim();
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    f64::from(similar::TextDiff::from_chars(a.as_str(), b).ratio())
}

#[cfg(test)]
mod tests {
    use super::*;
    use groundline_search::{ScoreBreakdown, SourceCandidate};

    fn source(title: &str, url: &str, snippet: &str) -> RankedSource {
        RankedSource::new(
            SourceCandidate::new(title, url, snippet),
            ScoreBreakdown::default(),
            0.5,
        )
    }

    fn paris() -> RankedSource {
        source(
            "Paris - Wikipedia",
            "https://en.wikipedia.org/wiki/Paris",
            "Paris is the capital and most populous city of France.",
        )
    }

    #[test]
    fn paris_example() {
        let cited =
            CitationInjector::default().cite("Paris is the capital of France.", vec![paris()]);
        assert_eq!(cited.text, "Paris is the capital of France [1].");
        assert_eq!(cited.citations.len(), 1);
        assert_eq!(cited.citations[0].sources, vec![1]);
    }

    #[test]
    fn inject_round_trip() {
        let text = "Intro words. Rust was released in 2015. Outro words";
        let citations = vec![Citation {
            claim: "Rust was released in 2015.".into(),
            sources: vec![1, 2],
        }];
        let out = inject(text, &citations);
        assert_eq!(out, "Intro words. Rust was released in 2015 [1,2]. Outro words");
        assert_eq!(out.matches("[1,2]").count(), 1);

        let citations = vec![Citation {
            claim: "Outro words".into(),
            sources: vec![3],
        }];
        assert_eq!(inject(text, &citations), format!("{text} [3]"));
    }

    #[test]
    fn missing_claim_skipped() {
        let citations = vec![Citation {
            claim: "Not in the text.".into(),
            sources: vec![1],
        }];
        assert_eq!(inject("Something else.", &citations), "Something else.");
    }

    #[test]
    fn only_first_occurrence_cited() {
        let citations = vec![Citation {
            claim: "Water boils at 100 degrees".into(),
            sources: vec![1],
        }];
        let text = "Water boils at 100 degrees\nWater boils at 100 degrees";
        assert_eq!(
            inject(text, &citations),
            "Water boils at 100 degrees [1]\nWater boils at 100 degrees"
        );
    }

    #[test]
    fn longer_claims_injected_first() {
        let citations = vec![
            Citation {
                claim: "The tower is 330 metres".into(),
                sources: vec![2],
            },
            Citation {
                claim: "The tower is 330 metres tall and was built in 1889.".into(),
                sources: vec![1],
            },
        ];
        let text = "The tower is 330 metres tall and was built in 1889.";
        assert_eq!(
            inject(text, &citations),
            "The tower is 330 metres [2] tall and was built in 1889 [1]."
        );
    }

    #[test]
    fn claims_need_length_and_a_signal() {
        let injector = CitationInjector::default();
        let claims = injector.extract_claims(
            "Short one. The bridge spans 1.2 kilometres across the bay! Lovely weather today, truly lovely.",
        );
        assert_eq!(claims, vec!["The bridge spans 1.2 kilometres across the bay!"]);
    }

    #[test]
    fn all_supporting_sources_kept() {
        let sources = vec![
            paris(),
            source("Zoo", "https://zoo.example", "zzz"),
            source("France facts", "https://facts.example/france", "Paris capital facts."),
        ];
        let supporting = CitationInjector::default()
            .supporting_sources("Paris is the capital of France.", &sources);
        assert_eq!(supporting, vec![1, 3]);
    }

    #[test]
    fn paragraph_fallback_when_no_sentence_cited() {
        let injector = CitationInjector::new(CitationConfig {
            min_claim_chars: 1000,
            ..Default::default()
        });
        let text = "Paris is the capital of France and its largest city by far\n\nok";
        let cited = injector.cite(text, vec![paris()]);
        assert_eq!(
            cited.text,
            "Paris is the capital of France and its largest city by far [1]\n\nok"
        );
        assert_eq!(cited.citations.len(), 1);
    }

    #[test]
    fn no_sources_leaves_text() {
        let cited = CitationInjector::default().cite("Paris is the capital of France.", vec![]);
        assert_eq!(cited.text, "Paris is the capital of France.");
        assert!(cited.citations.is_empty());
    }

    #[test]
    fn all_sources_returned() {
        let sources = vec![paris(), source("Cats", "https://cats.example", "Cats purr.")];
        let cited = CitationInjector::default().cite("Paris is the capital of France.", sources);
        assert_eq!(cited.sources.len(), 2);
    }

    #[test]
    fn adequacy_check() {
        let cited = "This sentence is long enough to count here [1]. Another sentence that is long enough too. \
                     And a third sentence that is long enough too.";
        assert!(has_adequate_citations(cited));
        let uncited = "This sentence is long enough to count here. Another sentence that is long enough too.";
        assert!(!has_adequate_citations(uncited));
        assert!(has_adequate_citations("short."));
    }

    #[test]
    fn marker_format() {
        assert_eq!(format_marker(&[1]), "[1]");
        assert_eq!(format_marker(&[1, 2, 3]), "[1,2,3]");
    }
}
