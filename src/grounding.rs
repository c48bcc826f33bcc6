//! Post-generation grounding validation.
//!
//! Scores how much of an answer's vocabulary also appears in the source
//! snippets and flags generalisation phrases the sources never use.

use std::collections::HashSet;

use groundline_search::RankedSource;
use serde::{Deserialize, Serialize};

use crate::config::GroundingConfig;

/// Phrases that often introduce claims from general knowledge.
const GENERALISATION_PHRASES: &[&str] = &[
    "in general",
    "typically",
    "usually",
    "often",
    "commonly",
    "it is known that",
    "studies show",
    "research indicates",
];

/// How well an answer is supported by its sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundingReport {
    /// Share of the answer's meaningful terms found in the sources.
    pub grounding_score: f64,
    pub appears_grounded: bool,
    /// Generalisation phrases used by the answer but by no source.
    pub potential_hallucinations: Vec<String>,
    pub matching_terms_count: usize,
    pub total_terms_count: usize,
}

/// Validates answers against the sources they were generated from.
#[derive(Debug, Clone, Default)]
pub struct GroundingValidator {
    config: GroundingConfig,
}

impl GroundingValidator {
    pub fn new(config: GroundingConfig) -> Self {
        Self { config }
    }

    /// Score `answer` against the snippets of `sources`.
    ///
    /// An answer without meaningful terms scores 0.0.
    pub fn validate(&self, answer: &str, sources: &[RankedSource]) -> GroundingReport {
        let source_terms: HashSet<String> = sources
            .iter()
            .flat_map(|s| meaningful_terms(s.snippet(), self.config.min_term_chars))
            .collect();
        let answer_terms: HashSet<String> =
            meaningful_terms(answer, self.config.min_term_chars).collect();

        let matching = answer_terms.intersection(&source_terms).count();
        let total = answer_terms.len();
        let grounding_score = if total == 0 {
            0.0
        } else {
            matching as f64 / total as f64
        };

        let answer_lower = answer.to_lowercase();
        let snippets_lower: Vec<String> = sources
            .iter()
            .map(|s| s.snippet().to_lowercase())
            .collect();
        let potential_hallucinations = GENERALISATION_PHRASES
            .iter()
            .filter(|phrase| answer_lower.contains(*phrase))
            .filter(|phrase| !snippets_lower.iter().any(|s| s.contains(*phrase)))
            .map(|phrase| (*phrase).to_string())
            .collect();

        GroundingReport {
            grounding_score,
            appears_grounded: grounding_score > self.config.grounded_threshold,
            potential_hallucinations,
            matching_terms_count: matching,
            total_terms_count: total,
        }
    }
}

/// Lowercased whitespace-separated words that are purely alphabetic and
/// longer than `min_chars`.
fn meaningful_terms(text: &str, min_chars: usize) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(str::to_lowercase)
        .filter(move |w| w.chars().count() > min_chars && w.chars().all(char::is_alphabetic))
}

#[cfg(test)]
mod tests {
    use super::*;
    use groundline_search::{ScoreBreakdown, SourceCandidate};

    fn source(snippet: &str) -> RankedSource {
        RankedSource::new(
            SourceCandidate::new("t", "https://example.com", snippet),
            ScoreBreakdown::default(),
            0.5,
        )
    }

    #[test]
    fn empty_answer_scores_zero() {
        let report = GroundingValidator::default().validate("", &[source("anything here")]);
        assert_eq!(report.grounding_score, 0.0);
        assert!(!report.appears_grounded);
        assert_eq!(report.total_terms_count, 0);
    }

    #[test]
    fn short_words_do_not_count() {
        let report = GroundingValidator::default().validate("It is a cat.", &[]);
        assert_eq!(report.total_terms_count, 0);
        assert_eq!(report.grounding_score, 0.0);
    }

    #[test]
    fn subset_of_source_terms_scores_one() {
        let sources = [source("Photosynthesis converts sunlight into chemical energy")];
        let report = GroundingValidator::default()
            .validate("Photosynthesis converts sunlight quickly", &sources);
        // "quickly" has 7 letters and is not in the source.
        assert_eq!(report.total_terms_count, 4);
        assert_eq!(report.matching_terms_count, 3);
        assert!((report.grounding_score - 0.75).abs() < 1e-9);
        assert!(report.appears_grounded);

        let report = GroundingValidator::default()
            .validate("photosynthesis CONVERTS sunlight", &sources);
        assert_eq!(report.grounding_score, 1.0);
    }

    #[test]
    fn punctuated_words_are_ignored() {
        let report = GroundingValidator::default()
            .validate("Sunlight, photosynthesis.", &[source("sunlight photosynthesis")]);
        assert_eq!(report.total_terms_count, 0);
    }

    #[test]
    fn ungrounded_answer_flagged() {
        let sources = [source("Volcanoes erupt molten basalt")];
        let report = GroundingValidator::default()
            .validate("Economic forecasts predict growing markets", &sources);
        assert_eq!(report.matching_terms_count, 0);
        assert!(!report.appears_grounded);
    }

    #[test]
    fn generalisation_phrases_unless_sourced() {
        let sources = [source("Studies show that sleep improves memory.")];
        let report = GroundingValidator::default().validate(
            "Studies show sleep helps. In general, people typically sleep eight hours.",
            &sources,
        );
        assert_eq!(report.potential_hallucinations, vec!["in general", "typically"]);
    }
}
