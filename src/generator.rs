//! Text Generator seam.
//!
//! A [`TextGenerator`] turns a prompt into an ordered stream of text deltas.
//! A generator without streaming support returns a one-element stream.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};

use crate::config::GenerationConfig;
use crate::error::{GroundlineError, Result};

/// A boxed stream of text deltas.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// An LLM back-end.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Start generating a response to `prompt`.
    ///
    /// # Errors
    ///
    /// [`GroundlineError::Generation`] if the request is refused; a stream
    /// that breaks later yields [`GroundlineError::Stream`].
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<DeltaStream>;

    /// Generate and collect the whole response.
    async fn complete(&self, prompt: &str, config: &GenerationConfig) -> Result<String> {
        let mut stream = self.generate(prompt, config).await?;
        let mut text = String::new();
        while let Some(delta) = stream.next().await {
            text.push_str(&delta?);
        }
        Ok(text)
    }
}

/// Replays canned responses, one per `generate` call, split into
/// word-sized deltas. Once the script runs out every call yields an empty
/// stream.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
        }
    }

    /// Responses not yet served.
    pub fn remaining(&self) -> usize {
        self.responses.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _prompt: &str, _config: &GenerationConfig) -> Result<DeltaStream> {
        let next = self
            .responses
            .lock()
            .map_err(|_| GroundlineError::Generation("script lock poisoned".into()))?
            .pop_front()
            .unwrap_or_default();
        let deltas: Vec<Result<String>> = word_deltas(&next).into_iter().map(Ok).collect();
        Ok(Box::pin(futures_util::stream::iter(deltas)))
    }
}

/// Split text into deltas of one word plus its trailing whitespace.
///
/// Concatenating the deltas gives back the input.
pub fn word_deltas(text: &str) -> Vec<String> {
    text.split_inclusive(char::is_whitespace)
        .map(str::to_string)
        .collect()
}
