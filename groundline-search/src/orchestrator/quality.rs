//! Quality floor for ranked sources.

use crate::types::RankedSource;

/// Drop every source whose relevance score is below `min_score`.
///
/// Sources exactly at the floor survive. Order is preserved.
pub fn filter_low_quality(sources: Vec<RankedSource>, min_score: f64) -> Vec<RankedSource> {
    sources
        .into_iter()
        .filter(|source| source.relevance_score >= min_score)
        .collect()
}
