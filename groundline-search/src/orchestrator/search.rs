//! Source preparation chain: dedup, post-filter, rank, extract, floor, focus.
//!
//! Turns the raw, duplicate-laden candidate list from a Retrieval Source into
//! the ranked set a grounded prompt is built from. Every stage is a pure
//! function of its inputs; nothing here fails on malformed source data.

use crate::config::SourceConfig;
use crate::filters::FilterSet;
use crate::focus::FocusMode;
use crate::types::{RankedSource, SourceCandidate};

use super::dedup::deduplicate;
use super::quality::filter_low_quality;
use super::scoring::SourceRanker;
use super::snippets::SnippetExtractor;

/// Ranked sources plus how many unique candidates were reviewed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedSources {
    /// Final sources, best first.
    pub sources: Vec<RankedSource>,
    /// Unique candidates reviewed (after deduplication).
    pub reviewed: usize,
}

impl PreparedSources {
    /// Number of sources selected.
    pub fn selected(&self) -> usize {
        self.sources.len()
    }
}

/// Runs the preparation chain with a fixed configuration.
#[derive(Debug, Clone)]
pub struct SourcePreparer {
    config: SourceConfig,
    current_year: Option<i32>,
}

impl SourcePreparer {
    /// Preparer using `config`, dated against the system clock.
    pub fn new(config: SourceConfig) -> Self {
        Self {
            config,
            current_year: None,
        }
    }

    /// Pin the year freshness is measured from.
    #[must_use]
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Run the chain.
    ///
    /// # Pipeline
    ///
    /// 1. Deduplicate by normalised URL (first occurrence wins)
    /// 2. Re-apply domain/date filters locally
    /// 3. Rank with the focus mode's weights, capped for the search depth
    /// 4. Extract supporting sentences per source
    /// 5. Drop sources below the quality floor (lowered under Pro Search)
    /// 6. Boost preferred domains and re-sort
    pub fn prepare(
        &self,
        candidates: Vec<SourceCandidate>,
        query: &str,
        focus: FocusMode,
        pro_search: bool,
        filters: &FilterSet,
    ) -> PreparedSources {
        let fetched = candidates.len();

        // 1. Deduplicate.
        let deduped = deduplicate(candidates);
        let reviewed = deduped.len();
        tracing::debug!(fetched, unique = reviewed, "deduplicated sources");

        // 2. Local filters.
        let filtered = filters.post_filter(deduped);
        if filtered.len() != reviewed {
            tracing::debug!(
                dropped = reviewed - filtered.len(),
                "post-filter removed sources"
            );
        }

        // 3. Rank.
        let mut ranker = SourceRanker::new().with_weights(focus.ranking_weights());
        if let Some(year) = self.current_year {
            ranker = ranker.with_current_year(year);
        }
        let cap = self.config.source_cap(pro_search);
        let mut ranked = ranker.rank(filtered, query, cap);

        // 4. Supporting sentences.
        SnippetExtractor::new(self.config.max_snippet_chars, self.config.enhanced_snippets)
            .enhance(&mut ranked, query);

        // 5. Quality floor.
        let base_floor = focus
            .min_quality_score()
            .unwrap_or(self.config.min_quality_score);
        let floor = self.config.quality_floor(base_floor, pro_search);
        let kept = filter_low_quality(ranked, floor);

        // 6. Focus boost.
        let sources = focus.apply(kept, self.config.focus_boost);

        tracing::info!(
            reviewed,
            selected = sources.len(),
            mode = %focus,
            pro_search,
            "prepared sources"
        );

        PreparedSources { sources, reviewed }
    }
}
