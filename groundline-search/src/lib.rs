//! # groundline-search
//!
//! Source retrieval seam and source preparation for grounded answers.
//!
//! This crate owns everything between a raw question and the ranked list of
//! sources a grounded prompt is built from. It never talks to the network
//! itself: a [`RetrievalSource`] implementation supplies candidates, and the
//! preparation chain turns them into [`RankedSource`] values.
//!
//! ## Design
//!
//! - Filters compose into the back-end's boolean query syntax and are
//!   re-applied locally after retrieval
//! - Sources are deduplicated by normalised URL, first occurrence wins
//! - Multi-factor ranking (title, snippet, freshness, domain authority) with
//!   per-focus-mode weights and a stable sort
//! - A quality floor, lowered under Pro Search, drops weak matches
//! - Focus modes boost preferred domains in a second ranking pass
//! - Retrieval failures become an empty source list, never an error
//!
//! ## Security
//!
//! - No network listeners or clients, this is a pure library
//! - Query text is logged only at trace level

pub mod config;
pub mod error;
pub mod filters;
pub mod focus;
pub mod orchestrator;
pub mod retrieval;
pub mod types;

pub use config::SourceConfig;
pub use error::{Result, SearchError};
pub use filters::{available_filters, DateFilter, DomainPreset, FileType, FilterSet};
pub use focus::FocusMode;
pub use orchestrator::dedup::{deduplicate, merge_source_lists};
pub use orchestrator::scoring::{RankingWeights, SourceRanker};
pub use orchestrator::search::{PreparedSources, SourcePreparer};
pub use orchestrator::snippets::SnippetExtractor;
pub use retrieval::{fetch_sources, RetrievalSource, StaticRetrieval};
pub use types::{parse_sources, RankedSource, ScoreBreakdown, SourceCandidate};

/// Prepare raw candidates for prompting with the given configuration.
///
/// Convenience wrapper around [`SourcePreparer::prepare`].
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid. Source data itself
/// never causes an error.
///
/// # Examples
///
/// ```
/// use groundline_search::{prepare_sources, FilterSet, FocusMode, SourceCandidate, SourceConfig};
///
/// let candidates = vec![
///     SourceCandidate::new("Rust", "http://www.rust-lang.org/", "The Rust language"),
///     SourceCandidate::new("Rust (dup)", "https://rust-lang.org", "The Rust language"),
/// ];
/// let prepared = prepare_sources(
///     candidates,
///     "rust language",
///     FocusMode::Web,
///     false,
///     &FilterSet::default(),
///     &SourceConfig::default(),
/// )?;
/// assert_eq!(prepared.reviewed, 1);
/// # Ok::<(), groundline_search::SearchError>(())
/// ```
pub fn prepare_sources(
    candidates: Vec<SourceCandidate>,
    query: &str,
    focus: FocusMode,
    pro_search: bool,
    filters: &FilterSet,
    config: &SourceConfig,
) -> Result<PreparedSources> {
    config.validate()?;
    Ok(SourcePreparer::new(config.clone()).prepare(candidates, query, focus, pro_search, filters))
}
