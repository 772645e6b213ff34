//! Grounded answer generation
//!
//! [`AnswerSynthesizer`] wraps retrieved context and the question in a fixed
//! prompt and makes exactly one call to a [`Completer`]. The reply is
//! returned verbatim: no retry, no streaming, no post-processing.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{Error, Result};

/// System instruction sent with every completion
pub const SYSTEM_INSTRUCTION: &str = "Use only the provided context.";

/// Trait for chat completion backends
#[async_trait]
pub trait Completer: Send + Sync {
    /// Complete `user_prompt` under `system_instruction`.
    async fn complete(&self, system_instruction: &str, user_prompt: &str) -> Result<String>;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

/// Build the grounded prompt for `question` over `context`.
#[must_use]
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "Answer using only the following knowledge. If unsure, say \"I don't know.\"\n\
         \n\
         ---\n\
         {context}\n\
         ---\n\
         \n\
         Q: {question}\n\
         A:"
    )
}

#[derive(Clone)]
pub struct AnswerSynthesizer {
    completer: Arc<dyn Completer>,
}

impl AnswerSynthesizer {
    #[must_use]
    pub fn new(completer: Arc<dyn Completer>) -> Self {
        Self { completer }
    }

    /// Answer `question` from `context` with a single completion call.
    pub async fn synthesize(&self, context: &str, question: &str) -> Result<String> {
        let prompt = build_prompt(context, question);
        let answer = self
            .completer
            .complete(SYSTEM_INSTRUCTION, &prompt)
            .await
            .map_err(|e| match e {
                Error::Completion(_) => e,
                other => Error::Completion(other.to_string()),
            })?;

        tracing::debug!(model = self.completer.model_name(), chars = answer.len(), "answer generated");
        Ok(answer)
    }
}

mod openai;

pub use openai::*;
