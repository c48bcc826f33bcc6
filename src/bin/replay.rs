//! Replay a recorded search through the grounding pipeline.
//!
//! Reads one JSON object from stdin:
//!
//! ```json
//! { "request": { "query": "..." }, "sources": [...], "answer": "..." }
//! ```
//!
//! `sources` are raw search results and `answer` is the text the generator
//! should stream back. An optional `related_questions` string scripts the
//! follow-up call. Each `PipelineEvent` is written to stdout as one JSON
//! line.
//!
//! An optional first argument names a TOML config file. All tracing output
//! goes to stderr so that stdout remains a clean JSON channel.

use std::io::{Read, Write};

use anyhow::Context;
use futures_util::StreamExt;
use groundline::{GroundlineConfig, Pipeline, ScriptedGenerator, SearchRequest};
use groundline_search::{parse_sources, StaticRetrieval};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Deserialize)]
struct Recording {
    request: SearchRequest,
    #[serde(default)]
    sources: serde_json::Value,
    answer: String,
    #[serde(default)]
    related_questions: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("groundline=info,groundline_search=info")
            }),
        )
        .init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => {
            let path = std::path::PathBuf::from(path);
            GroundlineConfig::from_file(&path)
                .with_context(|| format!("loading config from {}", path.display()))?
        }
        None => GroundlineConfig::default(),
    };

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("reading recording from stdin")?;
    let recording: Recording = serde_json::from_str(&input).context("parsing recording")?;

    let candidates = parse_sources(&recording.sources);
    tracing::info!(sources = candidates.len(), "replaying recording");

    let mut script = vec![recording.answer];
    script.extend(recording.related_questions);
    let pipeline = Pipeline::new(
        StaticRetrieval::new(candidates),
        ScriptedGenerator::new(script),
        config,
    )?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let events = pipeline.run(recording.request, cancel);
    futures_util::pin_mut!(events);

    let mut stdout = std::io::stdout().lock();
    while let Some(event) = events.next().await {
        serde_json::to_writer(&mut stdout, &event)?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
    }

    tracing::info!("replay finished");
    Ok(())
}
