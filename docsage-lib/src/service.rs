//! Question answering front door
//!
//! [`AskService::ask`] never fails: every outcome, including an empty
//! knowledge base or a broken upstream API, becomes an [`AskResponse`] that
//! serializes to either `{"answer": ...}` or `{"error": ...}`.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::answer::AnswerSynthesizer;
use crate::search::RetrievalPipeline;
use crate::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AskResponse {
    Answer { answer: String },
    Error { error: String },
}

impl From<Result<String>> for AskResponse {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(answer) => Self::Answer { answer },
            Err(e) => Self::Error {
                error: e.to_string(),
            },
        }
    }
}

/// Retrieval followed by grounded synthesis.
#[derive(Clone)]
pub struct AskService {
    retrieval: RetrievalPipeline,
    synthesizer: AnswerSynthesizer,
    top_k: usize,
}

impl AskService {
    #[must_use]
    pub fn new(retrieval: RetrievalPipeline, synthesizer: AnswerSynthesizer, top_k: usize) -> Self {
        Self {
            retrieval,
            synthesizer,
            top_k,
        }
    }

    /// Answer `question`, reporting failures in the response body.
    pub async fn ask(&self, question: &str) -> AskResponse {
        info!(question, "received question");
        let result = self.try_ask(question).await;
        match &result {
            Ok(_) => info!("answer generated"),
            Err(e) => warn!(error = %e, "question failed"),
        }
        result.into()
    }

    /// Same as [`ask`](Self::ask) but with the error kept typed.
    pub async fn try_ask(&self, question: &str) -> Result<String> {
        if question.trim().is_empty() {
            return Err(Error::InvalidInput("question is empty".to_string()));
        }
        let context = self.retrieval.retrieve(question, self.top_k).await?;
        self.synthesizer.synthesize(&context, question).await
    }

    #[must_use]
    pub fn retrieval(&self) -> &RetrievalPipeline {
        &self.retrieval
    }
}
