//! Source preparation: dedup, scoring, quality floor, supporting snippets.
//!
//! This module deduplicates candidates by normalised URL, scores them on
//! title, snippet, freshness and domain authority, drops weak matches, and
//! returns a sorted, truncated set ready for prompt building.

pub mod dedup;
pub mod quality;
pub mod scoring;
pub mod search;
pub mod snippets;
pub mod url_normalize;
