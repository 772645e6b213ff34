//! Document chunking
//!
//! Source text is cut into contiguous, non-overlapping windows of a fixed
//! number of characters. Windows whose trimmed text is shorter than the
//! configured minimum are never embedded.
//!
//! # Usage
//!
//! ```ignore
//! use docsage_lib::chunk::{Chunker, FixedSizeChunker};
//!
//! let chunker = FixedSizeChunker::new(1000)?;
//! let chunks = chunker.chunk(&page_text, source_index);
//! let admitted = chunks.iter().filter(|c| c.is_admissible(50));
//! ```

use serde::{Deserialize, Serialize};

use crate::Result;

/// A chunk of source text
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Chunk {
    /// The text content of this chunk
    pub text: String,
    /// Index of the source document (position in the seed list)
    pub source_index: usize,
    /// Character offset of this chunk within its source
    pub offset: usize,
}

impl Chunk {
    /// Whether this chunk is long enough to be admitted into the knowledge base.
    #[must_use]
    pub fn is_admissible(&self, min_len: usize) -> bool {
        is_admissible(&self.text, min_len)
    }
}

/// Minimum-length filter: counts characters after trimming surrounding whitespace.
#[must_use]
pub fn is_admissible(text: &str, min_len: usize) -> bool {
    text.trim().chars().count() >= min_len
}

/// Trait for document chunking strategies
pub trait Chunker: Send + Sync {
    /// Split content into chunks, tagging each with `source_index`.
    fn chunk(&self, content: &str, source_index: usize) -> Vec<Chunk>;

    /// Returns the name of this chunking strategy
    fn name(&self) -> &str;
}

/// Split `text` into segments of at most `chunk_size` characters.
///
/// Fails only when `chunk_size` is zero.
pub fn chunk(text: &str, chunk_size: usize) -> Result<Vec<String>> {
    let chunker = FixedSizeChunker::new(chunk_size)?;
    Ok(chunker
        .chunk(text, 0)
        .into_iter()
        .map(|c| c.text)
        .collect())
}

mod fixed;

pub use fixed::*;
