use crate::chunk::{Chunk, Chunker};
use crate::{Error, Result};

/// Fixed-size chunker - splits by character count
///
/// Windows are contiguous and never overlap; the last one may be shorter.
/// Sizes are counted in `char`s so a window never splits a code point.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
}

impl FixedSizeChunker {
    /// Create a chunker producing windows of at most `chunk_size` characters.
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidInput(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        Ok(Self { chunk_size })
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl Chunker for FixedSizeChunker {
    fn name(&self) -> &str {
        "fixed"
    }

    fn chunk(&self, content: &str, source_index: usize) -> Vec<Chunk> {
        let mut chunks = Vec::with_capacity(content.len() / self.chunk_size + 1);

        // byte start of the current window, its char offset and char length
        let mut start = 0;
        let mut offset = 0;
        let mut count = 0;

        for (i, _) in content.char_indices() {
            if count == self.chunk_size {
                chunks.push(Chunk {
                    text: content[start..i].to_string(),
                    source_index,
                    offset,
                });
                start = i;
                offset += count;
                count = 0;
            }
            count += 1;
        }

        if count > 0 {
            chunks.push(Chunk {
                text: content[start..].to_string(),
                source_index,
                offset,
            });
        }
        chunks
    }
}
