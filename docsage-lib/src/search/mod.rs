//! Question-to-context retrieval
//!
//! Combines the vectorizer and a shared, read-only knowledge base.
//!
//! # Usage
//!
//! ```ignore
//! use docsage_lib::search::RetrievalPipeline;
//!
//! let pipeline = RetrievalPipeline::new(knowledge.clone(), vectorizer);
//! let context = pipeline.retrieve("How do I select a line?", 3).await?;
//! ```

use std::sync::Arc;

use crate::embed::Vectorizer;
use crate::knowledge::KnowledgeBase;
use crate::{Error, Result};

/// A retrieved chunk with its distance to the question
#[derive(Debug, Clone, PartialEq)]
pub struct Passage {
    pub position: usize,
    /// Squared Euclidean distance (lower is closer)
    pub distance: f32,
    pub text: String,
}

/// Retrieval over a built knowledge base.
#[derive(Clone)]
pub struct RetrievalPipeline {
    knowledge: Arc<KnowledgeBase>,
    vectorizer: Vectorizer,
}

impl RetrievalPipeline {
    #[must_use]
    pub fn new(knowledge: Arc<KnowledgeBase>, vectorizer: Vectorizer) -> Self {
        Self {
            knowledge,
            vectorizer,
        }
    }

    /// The `k` chunks nearest to `question`, nearest first.
    ///
    /// Fails with [`Error::EmptyKnowledgeBase`] before calling the embedder
    /// when there is nothing to search.
    pub async fn retrieve_passages(&self, question: &str, k: usize) -> Result<Vec<Passage>> {
        if self.knowledge.is_empty() {
            return Err(Error::EmptyKnowledgeBase);
        }

        let query = self.vectorizer.embed(question).await?;
        let neighbors = self.knowledge.search(&query, k)?;

        Ok(neighbors
            .into_iter()
            .filter_map(|n| match self.knowledge.document(n.position) {
                Some(text) => Some(Passage {
                    position: n.position,
                    distance: n.distance,
                    text: text.to_string(),
                }),
                None => {
                    // only reachable if the index and documents fell out of step
                    tracing::warn!(
                        position = n.position,
                        documents = self.knowledge.len(),
                        "dropping neighbor with no document"
                    );
                    None
                }
            })
            .collect())
    }

    /// Retrieved chunk texts joined by newlines, nearest first.
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<String> {
        let passages = self.retrieve_passages(question, k).await?;
        Ok(join_context(&passages))
    }

    /// Returns the shared knowledge base.
    #[must_use]
    pub fn knowledge(&self) -> &Arc<KnowledgeBase> {
        &self.knowledge
    }
}

/// Assemble passages into a context block.
#[must_use]
pub fn join_context(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
