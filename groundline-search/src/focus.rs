//! Focus modes: named presets that bias ranking and prompt phrasing toward a
//! content domain.
//!
//! Each mode carries a preferred-domain list, a ranking-weight override, a
//! quality floor, a freshness preference and a prompt modifier. All of it is
//! static data, shared freely across requests.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::orchestrator::scoring::{sort_by_score, RankingWeights};
use crate::types::RankedSource;

/// A content-domain preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusMode {
    /// General web search. No boost, default weights.
    #[default]
    Web,
    /// Scholarly sources; domain authority dominates.
    Academic,
    /// Programming documentation and Q&A; freshness matters.
    Code,
    /// Style guides and dictionaries.
    Writing,
    /// Recent reporting from established outlets.
    News,
}

impl FocusMode {
    /// Mode name as used on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Academic => "academic",
            Self::Code => "code",
            Self::Writing => "writing",
            Self::News => "news",
        }
    }

    /// Look a mode up by name, case-insensitively. Unknown names fall back to
    /// [`FocusMode::Web`].
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        Self::all()
            .iter()
            .copied()
            .find(|mode| mode.name().eq_ignore_ascii_case(name))
            .unwrap_or_default()
    }

    /// Returns all modes.
    pub fn all() -> &'static [FocusMode] {
        &[
            Self::Web,
            Self::Academic,
            Self::Code,
            Self::Writing,
            Self::News,
        ]
    }

    /// URL fragments that earn the focus boost.
    pub fn preferred_domains(&self) -> &'static [&'static str] {
        match self {
            Self::Web => &[],
            Self::Academic => &[
                ".edu",
                ".gov",
                "scholar.google.com",
                "arxiv.org",
                "pubmed.ncbi.nlm.nih.gov",
                "jstor.org",
                "springer.com",
                "sciencedirect.com",
                "nature.com",
                "science.org",
                "ieee.org",
                "acm.org",
                "researchgate.net",
            ],
            Self::Code => &[
                "stackoverflow.com",
                "github.com",
                "docs.python.org",
                "developer.mozilla.org",
                "docs.microsoft.com",
                "dev.to",
                "medium.com/tag/programming",
                "reddit.com/r/programming",
                "hackernews",
                "geeksforgeeks.org",
                "tutorialspoint.com",
            ],
            Self::Writing => &[
                "grammarly.com",
                "purdue.edu/owl",
                "chicagomanualofstyle.org",
                "apastyle.org",
                "merriam-webster.com",
                "thesaurus.com",
                "writingexplained.org",
                "literarydevices.net",
            ],
            Self::News => &[
                "reuters.com",
                "apnews.com",
                "bbc.com",
                "nytimes.com",
                "theguardian.com",
                "washingtonpost.com",
                "cnn.com",
                "bloomberg.com",
                "ft.com",
                "economist.com",
                "axios.com",
            ],
        }
    }

    /// Ranking weights for this mode.
    pub fn ranking_weights(&self) -> RankingWeights {
        match self {
            Self::Web | Self::Writing => RankingWeights::default(),
            Self::Academic => RankingWeights::new(0.30, 0.35, 0.05, 0.30),
            Self::Code => RankingWeights::new(0.35, 0.40, 0.20, 0.05),
            Self::News => RankingWeights::new(0.30, 0.35, 0.30, 0.05),
        }
    }

    /// Quality floor for this mode, or `None` to use the configured default.
    pub fn min_quality_score(&self) -> Option<f64> {
        match self {
            Self::Web => None,
            Self::Academic => Some(0.4),
            Self::Code | Self::Writing => Some(0.3),
            Self::News => Some(0.35),
        }
    }

    /// Whether recent sources are preferred.
    pub fn prefers_fresh(&self) -> bool {
        matches!(self, Self::Code | Self::News)
    }

    /// Preferred maximum source age in days, if any.
    pub fn max_age_days(&self) -> Option<u32> {
        match self {
            Self::News => Some(30),
            _ => None,
        }
    }

    /// Prompt paragraph appended after the base prompt. Empty for web.
    pub fn prompt_modifier(&self) -> &'static str {
        match self {
            Self::Web => "",
            Self::Academic => ACADEMIC_MODIFIER,
            Self::Code => CODE_MODIFIER,
            Self::Writing => WRITING_MODIFIER,
            Self::News => NEWS_MODIFIER,
        }
    }

    /// Append this mode's prompt modifier to `base_prompt`.
    pub fn modify_prompt(&self, base_prompt: &str) -> String {
        let modifier = self.prompt_modifier();
        if modifier.is_empty() {
            base_prompt.to_string()
        } else {
            format!("{base_prompt}\n\n{modifier}")
        }
    }

    /// Boost sources on preferred domains by `boost` (capped at 1.0) and
    /// re-sort by the boosted score.
    ///
    /// Only the first matching domain counts. Modes without preferred
    /// domains return the list untouched.
    pub fn apply(&self, mut sources: Vec<RankedSource>, boost: f64) -> Vec<RankedSource> {
        let preferred = self.preferred_domains();
        if preferred.is_empty() {
            return sources;
        }

        let mut boosted = 0usize;
        for source in &mut sources {
            let url = source.url().to_lowercase();
            if preferred.iter().any(|domain| url.contains(domain)) {
                source.relevance_score = (source.relevance_score + boost).min(1.0);
                boosted += 1;
            }
        }
        tracing::debug!(mode = %self, boosted, "applied focus boost");

        sort_by_score(&mut sources);
        sources
    }
}

impl fmt::Display for FocusMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const ACADEMIC_MODIFIER: &str = "You are providing an academic, scholarly response.

Requirements:
1. Use formal, academic language
2. Cite sources using [1], [2] format consistently
3. Include methodology details when relevant
4. Acknowledge limitations and alternative viewpoints
5. Prioritize peer-reviewed sources
6. Provide context and background information
7. Use precise, technical terminology

Format your response as a scholarly summary with proper citations.";

const CODE_MODIFIER: &str = "You are providing a technical, code-focused response.

Requirements:
1. Include code examples when relevant (use ```language syntax)
2. Explain technical concepts clearly
3. Mention version compatibility and dependencies
4. Include best practices and common pitfalls
5. Provide working code snippets when possible
6. Explain time/space complexity for algorithms
7. Link to official documentation

Format your response with:
- Clear explanations
- Well-commented code examples
- Step-by-step implementation details";

const WRITING_MODIFIER: &str = "You are providing writing guidance and style recommendations.

Requirements:
1. Focus on clarity, style, and proper grammar
2. Provide examples of good and bad usage
3. Explain the reasoning behind recommendations
4. Include style guide references when applicable
5. Suggest improvements and alternatives
6. Address both formal and informal contexts
7. Be prescriptive but acknowledge style variations

Format your response with:
- Clear examples
- Before/after comparisons when helpful
- Style tips and best practices";

const NEWS_MODIFIER: &str = "You are providing a news-focused response.

Requirements:
1. Prioritize recent, breaking information
2. Include publication dates and sources
3. Present multiple perspectives when applicable
4. Distinguish facts from opinions
5. Provide context and background
6. Note any developing/changing situations
7. Cite reputable news sources

Format your response with:
- Latest developments first
- Clear attribution of sources
- Balanced coverage";
