//! Configuration types for the grounding pipeline.

use groundline_search::SourceConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::GroundlineError;

/// Top-level configuration for the grounding pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundlineConfig {
    /// Retrieval and source preparation settings.
    pub sources: SourceConfig,
    /// Claim-to-source matching settings.
    pub citation: CitationConfig,
    /// Post-generation grounding validation settings.
    pub grounding: GroundingConfig,
    /// Grounded prompt settings.
    pub prompt: PromptConfig,
    /// Query decomposition settings.
    pub pro_search: ProSearchConfig,
    /// Parameters forwarded to the Text Generator for the answer.
    pub generation: GenerationConfig,
    /// Follow-up question generation settings.
    pub related_questions: RelatedQuestionsConfig,
}

/// Claim-to-source matching configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitationConfig {
    /// Minimum support score for a source to be cited for a claim.
    pub similarity_threshold: f64,
    /// Added per query term found in the source title.
    pub title_term_boost: f64,
    /// Added per query term found in the source snippet.
    pub snippet_term_boost: f64,
    /// Added once when a leading key term appears in the source URL.
    pub url_term_boost: f64,
    /// Sentences must be longer than this to count as claims.
    pub min_claim_chars: usize,
    /// Paragraphs must be longer than this for the paragraph fallback.
    pub min_paragraph_chars: usize,
}

impl Default for CitationConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.3,
            title_term_boost: 0.3,
            snippet_term_boost: 0.2,
            url_term_boost: 0.1,
            min_claim_chars: 20,
            min_paragraph_chars: 50,
        }
    }
}

/// Grounding validation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundingConfig {
    /// An answer is grounded when its score exceeds this.
    pub grounded_threshold: f64,
    /// Terms must be strictly longer than this many characters.
    pub min_term_chars: usize,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            grounded_threshold: 0.3,
            min_term_chars: 5,
        }
    }
}

/// Grounded prompt configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Sources listed in the prompt.
    pub max_sources: usize,
    /// Sources listed in the prompt under Pro Search.
    pub pro_max_sources: usize,
    /// Prepend worked examples of grounded answers.
    pub few_shot_examples: bool,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_sources: 10,
            pro_max_sources: 15,
            few_shot_examples: false,
        }
    }
}

/// Query decomposition configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProSearchConfig {
    /// Upper bound on sub-queries per plan.
    pub max_sub_queries: usize,
    /// Turn Pro Search on automatically for complex queries.
    pub auto_detect: bool,
}

impl Default for ProSearchConfig {
    fn default() -> Self {
        Self {
            max_sub_queries: 3,
            auto_detect: true,
        }
    }
}

/// Sampling parameters passed through to the Text Generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Sampling temperature.
    pub temperature: f64,
    /// Nucleus sampling threshold.
    pub top_p: f64,
    /// Top-k sampling cutoff.
    pub top_k: u32,
    /// Maximum tokens to generate.
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

/// Follow-up question generation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelatedQuestionsConfig {
    /// Whether to ask the generator for follow-up questions.
    pub enabled: bool,
    /// Maximum questions returned.
    pub max_questions: usize,
    /// Lines of this length or shorter are discarded.
    pub min_chars: usize,
    /// Leading characters of the answer included in the prompt.
    pub summary_chars: usize,
    /// Sampling temperature for the follow-up call.
    pub temperature: f64,
    /// Token limit for the follow-up call.
    pub max_output_tokens: u32,
}

impl Default for RelatedQuestionsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_questions: 4,
            min_chars: 10,
            summary_chars: 500,
            temperature: 0.7,
            max_output_tokens: 256,
        }
    }
}

impl RelatedQuestionsConfig {
    /// Generation parameters for the follow-up call.
    pub fn generation(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            ..GenerationConfig::default()
        }
    }
}

impl GroundlineConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| GroundlineError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| GroundlineError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/groundline/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("groundline").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("groundline")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/groundline-config/config.toml")
        }
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`GroundlineError::Config`] naming the first invalid field.
    pub fn validate(&self) -> crate::error::Result<()> {
        self.sources.validate()?;

        for (name, value) in [
            ("citation.similarity_threshold", self.citation.similarity_threshold),
            ("citation.title_term_boost", self.citation.title_term_boost),
            ("citation.snippet_term_boost", self.citation.snippet_term_boost),
            ("citation.url_term_boost", self.citation.url_term_boost),
            ("grounding.grounded_threshold", self.grounding.grounded_threshold),
            ("generation.top_p", self.generation.top_p),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{name} must be between 0.0 and 1.0")));
            }
        }

        for (name, value) in [
            ("generation.temperature", self.generation.temperature),
            ("related_questions.temperature", self.related_questions.temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(invalid(format!("{name} must be between 0.0 and 2.0")));
            }
        }

        for (name, value) in [
            ("prompt.max_sources", self.prompt.max_sources),
            ("prompt.pro_max_sources", self.prompt.pro_max_sources),
            ("pro_search.max_sub_queries", self.pro_search.max_sub_queries),
            ("related_questions.max_questions", self.related_questions.max_questions),
            ("generation.max_output_tokens", self.generation.max_output_tokens as usize),
            (
                "related_questions.max_output_tokens",
                self.related_questions.max_output_tokens as usize,
            ),
        ] {
            if value == 0 {
                return Err(invalid(format!("{name} must be greater than 0")));
            }
        }

        Ok(())
    }
}

fn invalid(message: String) -> GroundlineError {
    GroundlineError::Config(message)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GroundlineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.prompt.max_sources, 10);
        assert_eq!(config.pro_search.max_sub_queries, 3);
        assert!((config.citation.similarity_threshold - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.generation.top_k, 40);
        assert_eq!(config.related_questions.max_questions, 4);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut config = GroundlineConfig::default();
        config.citation.similarity_threshold = 0.45;
        config.prompt.few_shot_examples = true;
        config.sources.max_sources = 7;

        config.save_to_file(&path).expect("save");
        assert!(path.exists());

        let loaded = GroundlineConfig::from_file(&path).expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[grounding]\ngrounded_threshold = 0.5\n").expect("write");

        let loaded = GroundlineConfig::from_file(&path).expect("load");
        assert!((loaded.grounding.grounded_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(loaded.grounding.min_term_chars, 5);
        assert_eq!(loaded.sources.num_results, 10);
    }

    #[test]
    fn from_file_nonexistent_returns_io_error() {
        let result = GroundlineConfig::from_file(std::path::Path::new("/nonexistent/groundline.toml"));
        assert_eq!(result.unwrap_err().code(), "IO_ERROR");
    }

    #[test]
    fn from_file_invalid_toml_returns_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").expect("write");

        let result = GroundlineConfig::from_file(&path);
        assert_eq!(result.unwrap_err().code(), "CONFIG_INVALID");
    }

    #[test]
    fn out_of_range_threshold_rejected() {
        let mut config = GroundlineConfig::default();
        config.citation.similarity_threshold = 1.2;
        let err = config.validate().unwrap_err();
        assert!(err.message().contains("similarity_threshold"));
    }

    #[test]
    fn zero_sub_queries_rejected() {
        let mut config = GroundlineConfig::default();
        config.pro_search.max_sub_queries = 0;
        let err = config.validate().unwrap_err();
        assert!(err.message().contains("max_sub_queries"));
    }

    #[test]
    fn hot_temperature_rejected() {
        let mut config = GroundlineConfig::default();
        config.generation.temperature = 3.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_source_section_surfaces_as_config_error() {
        let mut config = GroundlineConfig::default();
        config.sources.num_results = 0;
        assert_eq!(config.validate().unwrap_err().code(), "CONFIG_INVALID");
    }

    #[test]
    fn related_questions_generation_overrides() {
        let generation = RelatedQuestionsConfig::default().generation();
        assert_eq!(generation.max_output_tokens, 256);
        assert!((generation.top_p - 0.95).abs() < f64::EPSILON);
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = GroundlineConfig::default_config_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.ends_with("config.toml"));
        assert!(path_str.contains("groundline"));
    }
}
