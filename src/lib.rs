//! Groundline: retrieval-augmented answers that stay grounded in their sources.
//!
//! A raw question and a noisy list of web search results become a ranked
//! source set, a prompt that confines the model to those sources, an HTML
//! answer streamed as the model writes it, and a final pass that scores
//! grounding and injects `[n]` citations.
//!
//! # Architecture
//!
//! Stages run strictly in order for each request:
//! - **Query analysis**: intent, keywords, temporal context, enhanced query
//! - **Decomposition**: complex questions split into sub-queries (Pro Search)
//! - **Source preparation** (`groundline-search`): filters, dedup, ranking,
//!   quality floor, focus-mode boost
//! - **Prompting**: grounded or conversational prompt
//! - **Generation**: any [`TextGenerator`], streamed through the
//!   [`StreamingMarkupReconstructor`]
//! - **Validation**: grounding report and citation injection
//!
//! The two external collaborators are seams: [`RetrievalSource`] and
//! [`TextGenerator`]. This crate performs no network I/O of its own.
//!
//! [`RetrievalSource`]: groundline_search::RetrievalSource

pub mod citation;
pub mod config;
pub mod error;
pub mod generator;
pub mod grounding;
pub mod markup;
pub mod pipeline;
pub mod prompt;
pub mod query;

pub use citation::{CitationInjector, CitedAnswer};
pub use config::GroundlineConfig;
pub use error::{GroundlineError, Result};
pub use generator::{DeltaStream, ScriptedGenerator, TextGenerator};
pub use grounding::{GroundingReport, GroundingValidator};
pub use markup::StreamingMarkupReconstructor;
pub use pipeline::{Pipeline, PipelineEvent, SearchRequest};
pub use query::{AnalyzedQuery, QueryAnalyzer, QueryDecomposer, SubQueryPlan};
