//! Text embedding
//!
//! [`Embedder`] is the raw embedding capability (a remote API in production,
//! a fake in tests). [`Vectorizer`] wraps it and guarantees that every vector
//! it hands out has the configured dimension and only finite components, so
//! callers never see a partially usable vector.
//!
//! # Usage
//!
//! ```ignore
//! use docsage_lib::embed::{OpenAiEmbedder, Vectorizer};
//!
//! let embedder = OpenAiEmbedder::new(&config.embedding, api_key)?;
//! let vectorizer = Vectorizer::new(Arc::new(embedder), 1536);
//! let vector = vectorizer.embed("How do I select a line?").await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::{Error, Result};

/// A vector embedding - fixed size array of floats
pub type Embedding = Vec<f32>;

/// Trait for text embedding backends
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single piece of text.
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

/// Dimension-checked front end over an [`Embedder`].
#[derive(Clone)]
pub struct Vectorizer {
    embedder: Arc<dyn Embedder>,
    dimension: usize,
}

impl Vectorizer {
    #[must_use]
    pub fn new(embedder: Arc<dyn Embedder>, dimension: usize) -> Self {
        Self {
            embedder,
            dimension,
        }
    }

    /// The dimension every returned vector has.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    /// Embed `text`, reporting any backend failure as [`Error::Embedding`].
    pub async fn embed(&self, text: &str) -> Result<Embedding> {
        let vector = self.embedder.embed(text).await.map_err(|e| match e {
            Error::Embedding(_) => e,
            other => Error::Embedding(other.to_string()),
        })?;

        if vector.len() != self.dimension {
            return Err(Error::Embedding(format!(
                "{} returned {} dimensions, expected {}",
                self.embedder.model_name(),
                vector.len(),
                self.dimension
            )));
        }
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(Error::Embedding(format!(
                "{} returned a vector with non-finite components",
                self.embedder.model_name()
            )));
        }

        Ok(vector)
    }
}

mod openai;

pub use openai::*;
