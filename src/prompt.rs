//! Prompt assembly for the Text Generator.
//!
//! With sources, the prompt pins the model to the enumerated source block
//! and tells it to name what the sources are missing instead of guessing.
//! Without sources it falls back to a plain conversational prompt.

use std::fmt::Write as _;

use groundline_search::{FocusMode, RankedSource};

use crate::config::PromptConfig;
use crate::query::SubQueryPlan;

const GROUNDING_RULES: &str = "CRITICAL GROUNDING RULES:
1. ONLY use information from the sources provided below
2. Every factual claim must be based on the sources
3. If the sources don't contain enough information to answer the question, say \"The available sources don't provide enough information about [specific aspect]\"
4. Do not make assumptions or inferences beyond what the sources state
5. Do not use your general knowledge - rely exclusively on the provided sources
6. When you reference information, it must come directly from the sources";

const GROUNDED_FORMAT: &str = "Provide a comprehensive answer using ONLY the information from the sources above. Format your response with:
- Clear paragraphs
- Use **bold** for key terms
- Use bullet points (-) for lists
- Keep it natural and well-organized

Remember: If information is not in the sources, acknowledge the limitation rather than guessing.";

const CONVERSATIONAL_FORMAT: &str = "Format your response with:
- Clear paragraphs
- Use **bold** sparingly for emphasis
- Use bullet points (-) for lists when appropriate
- Keep it natural and concise";

const FEW_SHOT_EXAMPLES: &str = "EXAMPLES OF GOOD GROUNDED RESPONSES:

Example 1:
Question: \"What is the capital of France?\"
Sources: [1] \"Paris is the capital and most populous city of France...\"
Good Response: \"Paris is the capital of France [1].\"
Bad Response: \"Paris is the capital of France. It's known for the Eiffel Tower and has a population of 2 million.\" (Extra info not in sources)

Example 2:
Question: \"How does photosynthesis work?\"
Sources: [Sources don't contain info about photosynthesis]
Good Response: \"The available sources don't provide information about how photosynthesis works.\"
Bad Response: \"Photosynthesis is the process where plants convert light to energy...\" (Using general knowledge)

---

";

const PRO_SEARCH_REQUIREMENTS: &str = "PRO SEARCH MODE - Enhanced Requirements:
1. Provide a COMPREHENSIVE, in-depth answer that covers multiple angles
2. Organize your response with clear section headings (use ## for main sections)
3. Include MORE details and context than a standard search would
4. Address nuances, implications, and related considerations
5. Synthesize information from ALL available sources
6. Provide a brief conclusion or summary at the end
7. Use proper markdown formatting for better readability";

const PRO_SEARCH_CLOSING: &str =
    "Make this answer notably more thorough and insightful than a standard response.";

/// Everything a prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub query: &'a str,
    pub sources: &'a [RankedSource],
    /// Summary of earlier turns, supplied by the caller.
    pub conversation_context: Option<&'a str>,
    pub focus: FocusMode,
    /// Present when Pro Search is on.
    pub pro_plan: Option<&'a SubQueryPlan>,
}

/// Builds grounded and conversational prompts.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    config: PromptConfig,
}

impl PromptBuilder {
    pub fn new(config: PromptConfig) -> Self {
        Self { config }
    }

    /// The full prompt: base prompt, focus modifier, then the Pro Search
    /// block when a plan is present.
    pub fn build(&self, ctx: &PromptContext<'_>) -> String {
        let cap = if ctx.pro_plan.is_some() {
            self.config.pro_max_sources
        } else {
            self.config.max_sources
        };

        let mut prompt = if ctx.sources.is_empty() {
            conversational_prompt(ctx.query)
        } else {
            let grounded =
                grounded_prompt(ctx.query, ctx.sources, ctx.conversation_context, cap);
            if self.config.few_shot_examples {
                with_few_shot_examples(&grounded)
            } else {
                grounded
            }
        };

        prompt = ctx.focus.modify_prompt(&prompt);

        if let Some(plan) = ctx.pro_plan {
            prompt.push_str("\n\n");
            prompt.push_str(&pro_search_block(plan));
        }

        tracing::debug!(
            sources = ctx.sources.len().min(cap),
            focus = %ctx.focus,
            pro = ctx.pro_plan.is_some(),
            chars = prompt.len(),
            "built prompt"
        );
        prompt
    }
}

/// Prompt for questions answered without sources.
pub fn conversational_prompt(query: &str) -> String {
    format!(
        "Please provide a clear, helpful response to this question: {query}\n\n{CONVERSATIONAL_FORMAT}"
    )
}

/// Prompt restricting the answer to the first `max_sources` sources.
pub fn grounded_prompt(
    query: &str,
    sources: &[RankedSource],
    conversation_context: Option<&str>,
    max_sources: usize,
) -> String {
    let mut prompt = String::new();
    if let Some(context) = conversation_context.filter(|c| !c.trim().is_empty()) {
        let _ = write!(prompt, "Previous conversation context:\n{context}\n\n");
    }
    let _ = write!(
        prompt,
        "You are a search assistant that provides accurate, well-sourced answers.\n\n\
         {GROUNDING_RULES}\n\n\
         SOURCES:\n{}\n\n\
         USER QUESTION: {query}\n\n\
         {GROUNDED_FORMAT}",
        format_sources(sources, max_sources)
    );
    prompt
}

/// Numbered source block, 1-indexed.
pub fn format_sources(sources: &[RankedSource], max_sources: usize) -> String {
    sources
        .iter()
        .take(max_sources)
        .enumerate()
        .map(|(i, source)| {
            let title = if source.title().is_empty() {
                "Untitled"
            } else {
                source.title()
            };
            format!(
                "[{}] {title}\nURL: {}\nContent: {}",
                i + 1,
                source.url(),
                source.snippet()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Prepend worked grounding examples.
pub fn with_few_shot_examples(base_prompt: &str) -> String {
    format!("{FEW_SHOT_EXAMPLES}{base_prompt}")
}

/// Extra requirements for Pro Search answers, with the researched
/// sub-queries listed.
pub fn pro_search_block(plan: &SubQueryPlan) -> String {
    let mut block = String::from(PRO_SEARCH_REQUIREMENTS);
    if plan.synthesis_required {
        block.push_str("\n\nThe sources were gathered by researching these sub-questions:");
        for (i, sub) in plan.sub_queries.iter().enumerate() {
            let _ = write!(block, "\n{}. {sub}", i + 1);
        }
    }
    block.push_str("\n\n");
    block.push_str(PRO_SEARCH_CLOSING);
    block
}

/// Prompt asking for follow-up questions about an answer.
///
/// Only the first `summary_chars` characters of the answer are included.
pub fn related_questions_prompt(query: &str, answer: &str, summary_chars: usize) -> String {
    let summary: String = answer.chars().take(summary_chars).collect();
    format!(
        "Based on this question and answer, suggest 3-4 relevant follow-up questions that a user might want to ask next.

Original Question: {query}

Answer Summary: {summary}...

Generate ONLY follow-up questions that are:
1. Directly related to the topic
2. Natural next steps in the conversation
3. Not repetitive of the original question
4. Contextually relevant to the answer provided

If no good follow-up questions can be generated, return an empty list.

Format: Return ONLY the questions, one per line, without numbering or bullet points."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryDecomposer;
    use groundline_search::{ScoreBreakdown, SourceCandidate};

    fn ranked(title: &str, url: &str, snippet: &str) -> RankedSource {
        RankedSource::new(
            SourceCandidate::new(title, url, snippet),
            ScoreBreakdown::default(),
            0.5,
        )
    }

    fn ctx<'a>(query: &'a str, sources: &'a [RankedSource]) -> PromptContext<'a> {
        PromptContext {
            query,
            sources,
            conversation_context: None,
            focus: FocusMode::Web,
            pro_plan: None,
        }
    }

    #[test]
    fn no_sources_gives_conversational_prompt() {
        let prompt = PromptBuilder::default().build(&ctx("hello", &[]));
        assert!(prompt.starts_with("Please provide a clear, helpful response"));
        assert!(!prompt.contains("GROUNDING RULES"));
    }

    #[test]
    fn grounded_prompt_enumerates_sources() {
        let sources = vec![
            ranked("Paris", "https://en.wikipedia.org/wiki/Paris", "Paris is the capital."),
            ranked("", "https://example.com", "Other text."),
        ];
        let prompt = PromptBuilder::default().build(&ctx("capital of France", &sources));
        assert!(prompt.contains("[1] Paris\nURL: https://en.wikipedia.org/wiki/Paris"));
        assert!(prompt.contains("[2] Untitled"));
        assert!(prompt.contains("USER QUESTION: capital of France"));
        assert!(prompt.contains("acknowledge the limitation"));
    }

    #[test]
    fn source_block_is_capped() {
        let sources: Vec<RankedSource> = (0..12)
            .map(|i| ranked(&format!("S{i}"), &format!("https://s{i}.com"), "text"))
            .collect();
        let prompt = PromptBuilder::default().build(&ctx("q", &sources));
        assert!(prompt.contains("[10] S9"));
        assert!(!prompt.contains("[11]"));
    }

    #[test]
    fn conversation_context_comes_first() {
        let sources = vec![ranked("A", "https://a.com", "alpha")];
        let mut c = ctx("and then?", &sources);
        c.conversation_context = Some("We discussed Rust.");
        let prompt = PromptBuilder::default().build(&c);
        assert!(prompt.starts_with("Previous conversation context:\nWe discussed Rust."));
    }

    #[test]
    fn few_shot_examples_prepended_when_enabled() {
        let sources = vec![ranked("A", "https://a.com", "alpha")];
        let builder = PromptBuilder::new(PromptConfig {
            few_shot_examples: true,
            ..Default::default()
        });
        let prompt = builder.build(&ctx("q", &sources));
        assert!(prompt.starts_with("EXAMPLES OF GOOD GROUNDED RESPONSES"));
    }

    #[test]
    fn focus_modifier_appended_even_without_sources() {
        let mut c = ctx("latest on fusion", &[]);
        c.focus = FocusMode::News;
        let prompt = PromptBuilder::default().build(&c);
        assert!(prompt.ends_with(FocusMode::News.prompt_modifier()));
    }

    #[test]
    fn pro_block_lists_sub_queries_and_raises_cap() {
        let plan = QueryDecomposer::default()
            .plan("What is the capital of France? How big is its population?");
        let sources: Vec<RankedSource> = (0..12)
            .map(|i| ranked(&format!("S{i}"), &format!("https://s{i}.com"), "text"))
            .collect();
        let mut c = ctx(&plan.original_query, &sources);
        c.pro_plan = Some(&plan);
        let prompt = PromptBuilder::default().build(&c);
        assert!(prompt.contains("[12] S11"));
        assert!(prompt.contains("PRO SEARCH MODE"));
        assert!(prompt.contains("1. What is the capital of France?"));
        assert!(prompt.contains("2. How big is its population?"));
    }

    #[test]
    fn related_prompt_truncates_summary() {
        let answer = "x".repeat(800);
        let prompt = related_questions_prompt("q", &answer, 500);
        assert!(prompt.contains(&format!("Answer Summary: {}...", "x".repeat(500))));
        assert!(!prompt.contains(&"x".repeat(501)));
    }
}
