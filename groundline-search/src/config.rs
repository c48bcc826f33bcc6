//! Source preparation configuration with sensible defaults.
//!
//! [`SourceConfig`] controls how many results are requested, how many survive
//! ranking, the quality floor, and the focus-mode boost. The defaults match a
//! single ten-result retrieval call.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Configuration for retrieving and preparing sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Results requested from the Retrieval Source per query.
    pub num_results: usize,
    /// Maximum sources kept after ranking.
    pub max_sources: usize,
    /// Maximum sources kept after ranking when Pro Search is active.
    pub pro_max_sources: usize,
    /// Quality floor used when a focus mode does not set its own.
    pub min_quality_score: f64,
    /// Multiplier applied to the quality floor under Pro Search, so more
    /// sources survive for synthesis.
    pub pro_quality_factor: f64,
    /// Score boost for sources on a focus mode's preferred domains.
    pub focus_boost: f64,
    /// Supporting sentences extracted per ranked source.
    pub enhanced_snippets: usize,
    /// Character cap for each extracted sentence.
    pub max_snippet_chars: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            num_results: 10,
            max_sources: 10,
            pro_max_sources: 15,
            min_quality_score: 0.2,
            pro_quality_factor: 0.75,
            focus_boost: 0.2,
            enhanced_snippets: 2,
            max_snippet_chars: 300,
        }
    }
}

impl SourceConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `num_results`, `max_sources` and `pro_max_sources` must be greater than 0
    /// - `min_quality_score`, `pro_quality_factor` and `focus_boost` must lie in `[0, 1]`
    /// - `max_snippet_chars` must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.num_results == 0 {
            return Err(SearchError::Config(
                "num_results must be greater than 0".into(),
            ));
        }
        if self.max_sources == 0 || self.pro_max_sources == 0 {
            return Err(SearchError::Config(
                "max_sources and pro_max_sources must be greater than 0".into(),
            ));
        }
        for (name, value) in [
            ("min_quality_score", self.min_quality_score),
            ("pro_quality_factor", self.pro_quality_factor),
            ("focus_boost", self.focus_boost),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SearchError::Config(format!(
                    "{name} must be between 0.0 and 1.0"
                )));
            }
        }
        if self.max_snippet_chars == 0 {
            return Err(SearchError::Config(
                "max_snippet_chars must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Source cap for the current search depth.
    pub fn source_cap(&self, pro_search: bool) -> usize {
        if pro_search {
            self.pro_max_sources
        } else {
            self.max_sources
        }
    }

    /// Quality floor for a base floor (usually the focus mode's) and depth.
    pub fn quality_floor(&self, base: f64, pro_search: bool) -> f64 {
        if pro_search {
            base * self.pro_quality_factor
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = SourceConfig::default();
        assert_eq!(config.num_results, 10);
        assert_eq!(config.max_sources, 10);
        assert_eq!(config.pro_max_sources, 15);
        assert!((config.min_quality_score - 0.2).abs() < f64::EPSILON);
        assert!((config.focus_boost - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.enhanced_snippets, 2);
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(SourceConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_num_results_rejected() {
        let config = SourceConfig {
            num_results: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("num_results"));
    }

    #[test]
    fn zero_max_sources_rejected() {
        let config = SourceConfig {
            pro_max_sources: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_sources"));
    }

    #[test]
    fn out_of_range_floor_rejected() {
        let config = SourceConfig {
            min_quality_score: 1.5,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min_quality_score"));
    }

    #[test]
    fn negative_boost_rejected() {
        let config = SourceConfig {
            focus_boost: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn pro_search_lowers_floor_and_raises_cap() {
        let config = SourceConfig::default();
        assert_eq!(config.source_cap(false), 10);
        assert_eq!(config.source_cap(true), 15);
        assert!((config.quality_floor(0.2, false) - 0.2).abs() < 1e-9);
        assert!((config.quality_floor(0.2, true) - 0.15).abs() < 1e-9);
    }

    #[test]
    fn partial_fields_fall_back_to_defaults() {
        let config: SourceConfig = serde_json::from_str(r#"{"max_sources": 5}"#).expect("parse");
        assert_eq!(config.max_sources, 5);
        assert_eq!(config.num_results, 10);
    }
}
