//! The caller-facing grounding pipeline.
//!
//! [`Pipeline::run`] drives one request through analysis, retrieval, source
//! preparation, prompting, streamed generation, grounding validation,
//! citation injection, and related-question generation, yielding
//! [`PipelineEvent`]s as it goes.

use std::sync::LazyLock;

use futures_util::{Stream, StreamExt};
use groundline_search::{
    fetch_sources, merge_source_lists, FilterSet, FocusMode, RankedSource, RetrievalSource,
    SourcePreparer,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::citation::{has_adequate_citations, CitationInjector};
use crate::config::GroundlineConfig;
use crate::error::GroundlineError;
use crate::generator::TextGenerator;
use crate::grounding::{GroundingReport, GroundingValidator};
use crate::markup::{clean_markdown, render_html, StreamingMarkupReconstructor};
use crate::prompt::{related_questions_prompt, PromptBuilder, PromptContext};
use crate::query::{is_conversational, QueryAnalyzer, QueryDecomposer, SubQueryPlan};

static QUESTION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\.\-\*\)\]\s]+").expect("valid question prefix pattern"));

const SEARCHING_STATUS: &str = "Searching the web...";

/// One question to answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub query: String,
    /// Focus mode name; unknown names fall back to web.
    pub focus_mode: String,
    /// Force Pro Search. Complex queries may enable it anyway.
    pub pro_search: bool,
    pub filters: FilterSet,
    /// Summary of earlier turns, owned by the caller.
    pub conversation_context: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_focus_mode(mut self, focus_mode: impl Into<String>) -> Self {
        self.focus_mode = focus_mode.into();
        self
    }

    pub fn with_pro_search(mut self, pro_search: bool) -> Self {
        self.pro_search = pro_search;
        self
    }

    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_conversation_context(mut self, context: impl Into<String>) -> Self {
        self.conversation_context = Some(context.into());
        self
    }
}

/// Progress and results of one request, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// Human-readable progress line.
    Status { message: String },
    /// The query actually sent to retrieval.
    EnhancedQuery { query: String },
    /// Candidates left after dedup and how many were kept.
    SourcesSelected { reviewed: usize, selected: usize },
    /// Incremental HTML for the answer being generated.
    Delta { html: String },
    /// Final citation-annotated HTML body.
    Answer { html: String },
    /// Every source offered to the generator.
    Sources { sources: Vec<RankedSource> },
    Grounding(GroundingReport),
    RelatedQuestions { questions: Vec<String> },
    Done,
    /// Terminal failure.
    Error { code: String, message: String },
    /// The caller cancelled; no further events follow.
    Cancelled,
}

impl PipelineEvent {
    /// Whether no further events follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error { .. } | Self::Cancelled)
    }
}

impl From<GroundlineError> for PipelineEvent {
    fn from(err: GroundlineError) -> Self {
        Self::Error {
            code: err.code().to_string(),
            message: err.message().to_string(),
        }
    }
}

/// Grounded question answering over a Retrieval Source and a Text Generator.
///
/// All per-request state lives inside [`Pipeline::run`], so one pipeline can
/// serve concurrent requests.
pub struct Pipeline<R, G> {
    retrieval: R,
    generator: G,
    config: GroundlineConfig,
    analyzer: QueryAnalyzer,
    decomposer: QueryDecomposer,
    preparer: SourcePreparer,
    prompts: PromptBuilder,
    validator: GroundingValidator,
    citations: CitationInjector,
}

impl<R: RetrievalSource, G: TextGenerator> Pipeline<R, G> {
    /// Build a pipeline. The configuration is validated up front.
    ///
    /// # Errors
    ///
    /// Returns [`GroundlineError::Config`] if any section is invalid.
    pub fn new(retrieval: R, generator: G, config: GroundlineConfig) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self {
            analyzer: QueryAnalyzer::new(),
            decomposer: QueryDecomposer::new(config.pro_search.max_sub_queries),
            preparer: SourcePreparer::new(config.sources.clone()),
            prompts: PromptBuilder::new(config.prompt.clone()),
            validator: GroundingValidator::new(config.grounding.clone()),
            citations: CitationInjector::new(config.citation.clone()),
            retrieval,
            generator,
            config,
        })
    }

    /// Pin the year used for freshness scoring and temporal detection.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.analyzer = self.analyzer.with_current_year(year);
        self.preparer = self.preparer.with_current_year(year);
        self
    }

    pub fn config(&self) -> &GroundlineConfig {
        &self.config
    }

    /// Answer `request`, yielding events until a terminal one.
    ///
    /// Cancelling `cancel` mid-stream yields [`PipelineEvent::Cancelled`] and
    /// discards the partial answer. Dropping the stream has the same effect.
    pub fn run(
        &self,
        request: SearchRequest,
        cancel: CancellationToken,
    ) -> impl Stream<Item = PipelineEvent> + Send + '_ {
        async_stream::stream! {
            let query = request.query.trim().to_string();
            if query.is_empty() {
                yield PipelineEvent::from(GroundlineError::InvalidRequest(
                    "query must not be empty".into(),
                ));
                return;
            }

            let focus = FocusMode::from_name(&request.focus_mode);
            let conversational = is_conversational(&query);
            let analysis = self.analyzer.analyze(&query);
            let hints = self.analyzer.search_hints(analysis.intent, &analysis.temporal_context);
            tracing::info!(
                intent = analysis.intent.name(),
                focus = %focus,
                conversational,
                "analysed query"
            );
            tracing::debug!(
                keywords = ?analysis.keywords,
                expected_sources = hints.expected_sources,
                prefer_fresh = hints.prefer_fresh_sources,
                domains = ?hints.domain_preferences,
                "search hints"
            );

            let pro_plan: Option<SubQueryPlan> = (!conversational
                && self.decomposer.should_use_pro_search(
                    &query,
                    request.pro_search,
                    self.config.pro_search.auto_detect,
                ))
            .then(|| self.decomposer.plan(&query));
            if let Some(plan) = &pro_plan {
                tracing::info!(
                    sub_queries = plan.sub_queries.len(),
                    depth = ?plan.search_depth,
                    "pro search activated"
                );
                yield PipelineEvent::Status { message: plan.status_message() };
            }

            yield PipelineEvent::EnhancedQuery { query: analysis.enhanced_query.clone() };

            let mut sources: Vec<RankedSource> = Vec::new();
            if !conversational {
                yield PipelineEvent::Status { message: SEARCHING_STATUS.to_string() };

                let search_queries: Vec<&str> = match &pro_plan {
                    Some(plan) if plan.sub_queries.len() > 1 => {
                        plan.sub_queries.iter().map(String::as_str).collect()
                    }
                    _ => vec![analysis.enhanced_query.as_str()],
                };

                let mut lists = Vec::with_capacity(search_queries.len());
                for search_query in search_queries {
                    if cancel.is_cancelled() {
                        yield PipelineEvent::Cancelled;
                        return;
                    }
                    lists.push(
                        fetch_sources(
                            &self.retrieval,
                            search_query,
                            self.config.sources.num_results,
                            &request.filters,
                        )
                        .await,
                    );
                }

                let prepared = self.preparer.prepare(
                    merge_source_lists(lists),
                    &query,
                    focus,
                    pro_plan.is_some(),
                    &request.filters,
                );
                tracing::info!(
                    reviewed = prepared.reviewed,
                    selected = prepared.selected(),
                    "prepared sources"
                );
                yield PipelineEvent::SourcesSelected {
                    reviewed: prepared.reviewed,
                    selected: prepared.selected(),
                };
                sources = prepared.sources;
            }

            if cancel.is_cancelled() {
                yield PipelineEvent::Cancelled;
                return;
            }

            let prompt = self.prompts.build(&PromptContext {
                query: &query,
                sources: &sources,
                conversation_context: request.conversation_context.as_deref(),
                focus,
                pro_plan: pro_plan.as_ref(),
            });

            let mut deltas = match self.generator.generate(&prompt, &self.config.generation).await {
                Ok(deltas) => deltas,
                Err(err) => {
                    tracing::warn!(generator = self.generator.name(), error = %err, "generation failed");
                    yield PipelineEvent::from(err);
                    return;
                }
            };

            let mut reconstructor = StreamingMarkupReconstructor::new();
            let mut answer = String::new();
            loop {
                let next = tokio::select! {
                    biased;
                    () = cancel.cancelled() => None,
                    next = deltas.next() => Some(next),
                };
                match next {
                    None => {
                        tracing::info!(partial_chars = answer.len(), "generation cancelled");
                        yield PipelineEvent::Cancelled;
                        return;
                    }
                    Some(None) => break,
                    Some(Some(Ok(delta))) => {
                        answer.push_str(&delta);
                        let html = reconstructor.push(&delta);
                        if !html.is_empty() {
                            yield PipelineEvent::Delta { html };
                        }
                    }
                    Some(Some(Err(err))) => {
                        tracing::warn!(generator = self.generator.name(), error = %err, "answer stream failed");
                        yield PipelineEvent::from(err);
                        return;
                    }
                }
            }
            let tail = reconstructor.flush();
            if !tail.is_empty() {
                yield PipelineEvent::Delta { html: tail };
            }
            drop(deltas);

            let report = self.validator.validate(&answer, &sources);
            if !sources.is_empty() {
                if report.appears_grounded {
                    tracing::debug!(score = report.grounding_score, "answer appears grounded");
                } else {
                    tracing::warn!(score = report.grounding_score, "answer may not be grounded in sources");
                }
                if !report.potential_hallucinations.is_empty() {
                    tracing::warn!(
                        phrases = ?report.potential_hallucinations,
                        "answer uses generalisations absent from sources"
                    );
                }
            }

            let cited = self.citations.cite(&clean_markdown(&answer), sources);
            if !cited.sources.is_empty() && !has_adequate_citations(&cited.text) {
                tracing::warn!(citations = cited.citations.len(), "answer is sparsely cited");
            }

            yield PipelineEvent::Answer { html: render_html(&cited.text) };
            yield PipelineEvent::Sources { sources: cited.sources };
            yield PipelineEvent::Grounding(report);

            let questions = self.related_questions(&query, &answer).await;
            yield PipelineEvent::RelatedQuestions { questions };
            yield PipelineEvent::Done;
        }
    }

    /// Ask the generator for follow-up questions. Failures give an empty list.
    async fn related_questions(&self, query: &str, answer: &str) -> Vec<String> {
        let settings = &self.config.related_questions;
        if !settings.enabled || answer.trim().is_empty() {
            return Vec::new();
        }

        let prompt = related_questions_prompt(query, answer, settings.summary_chars);
        match self.generator.complete(&prompt, &settings.generation()).await {
            Ok(text) => parse_related_questions(&text, settings.max_questions, settings.min_chars),
            Err(err) => {
                tracing::warn!(error = %err, "related question generation failed");
                Vec::new()
            }
        }
    }
}

/// One question per line with numbering and bullets stripped. Lines of
/// `min_chars` characters or fewer are dropped.
pub fn parse_related_questions(text: &str, max: usize, min_chars: usize) -> Vec<String> {
    text.lines()
        .map(|line| QUESTION_PREFIX.replace(line.trim(), "").trim().to_string())
        .filter(|q| q.chars().count() > min_chars)
        .take(max)
        .collect()
}
