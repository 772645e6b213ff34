//! The knowledge base: chunk texts and their vectors, position-aligned
//!
//! # Storage Model
//!
//! Position `i` in the index and `documents[i]` describe the same chunk.
//! Every write goes through [`KnowledgeBase::insert`], which adds to the
//! index first (the only step that can fail) and appends the text only after
//! that succeeded, so `index.len() == documents.len()` always holds.
//!
//! # Lifecycle
//!
//! ```text
//! load(paths) --Some--> KnowledgeBase --Arc--> query path (read-only)
//!      |                      ^
//!     None                    |
//!      v                      |
//! read seed list -> build -> persist
//! ```
//!
//! A single bad URL or chunk never aborts a build; failures are logged,
//! counted in the [`BuildReport`] and skipped.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::chunk::{Chunker, FixedSizeChunker};
use crate::config::Config;
use crate::embed::Vectorizer;
use crate::fetch::Fetcher;
use crate::index::{FlatIndex, Neighbor, VectorIndex};
use crate::Result;

/// Knobs for a build pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub chunk_size: usize,
    pub min_chunk_len: usize,
    /// Embedding calls allowed in flight at once
    pub embed_concurrency: usize,
}

impl From<&Config> for BuildOptions {
    fn from(config: &Config) -> Self {
        Self {
            chunk_size: config.chunking.chunk_size,
            min_chunk_len: config.chunking.min_chunk_len,
            embed_concurrency: config.build.embed_concurrency,
        }
    }
}

/// Counts gathered during a build pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub urls_attempted: usize,
    pub urls_failed: usize,
    /// Chunks produced by the chunker, before length filtering
    pub chunks_scraped: usize,
    /// Chunks that passed the minimum-length filter
    pub chunks_admitted: usize,
    pub embedding_failures: usize,
    pub vectors_indexed: usize,
}

/// Chunk texts and their vectors, built once and then shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeBase {
    index: FlatIndex,
    documents: Vec<String>,
}

impl KnowledgeBase {
    /// Create an empty knowledge base for vectors of `dimension` components.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            index: FlatIndex::new(dimension),
            documents: Vec::new(),
        }
    }

    /// Fetch, chunk, embed and index every URL in order.
    ///
    /// Only invalid options fail the call; fetch and embedding failures are
    /// skipped and counted in the returned report.
    pub async fn build(
        &mut self,
        urls: &[String],
        fetcher: &dyn Fetcher,
        vectorizer: &Vectorizer,
        options: &BuildOptions,
    ) -> Result<BuildReport> {
        let chunker = FixedSizeChunker::new(options.chunk_size)?;
        let concurrency = options.embed_concurrency.max(1);
        let mut report = BuildReport::default();

        info!(urls = urls.len(), "building knowledge base");

        for (source_index, url) in urls.iter().enumerate() {
            report.urls_attempted += 1;
            info!(url = %url, "scraping");

            let text = match fetcher.fetch(url).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(url = %url, error = %e, "skipping url");
                    report.urls_failed += 1;
                    continue;
                }
            };
            if text.trim().is_empty() {
                warn!(url = %url, "page has no text");
            }

            let chunks = chunker.chunk(&text, source_index);
            report.chunks_scraped += chunks.len();

            let admitted: Vec<_> = chunks
                .into_iter()
                .filter(|c| c.is_admissible(options.min_chunk_len))
                .collect();
            report.chunks_admitted += admitted.len();

            // embeddings may run concurrently but arrive in chunk order, and
            // this loop is the only writer
            let mut embedded = stream::iter(admitted)
                .map(|chunk| async move {
                    let result = vectorizer.embed(&chunk.text).await;
                    (chunk, result)
                })
                .buffered(concurrency);

            while let Some((chunk, result)) = embedded.next().await {
                let outcome = result.and_then(|vector| self.insert(chunk.text, &vector));
                match outcome {
                    Ok(position) => {
                        debug!(position, source_index, offset = chunk.offset, "indexed chunk");
                        report.vectors_indexed += 1;
                    }
                    Err(e) => {
                        warn!(
                            url = %url,
                            offset = chunk.offset,
                            error = %e,
                            "skipping chunk"
                        );
                        report.embedding_failures += 1;
                    }
                }
            }
        }

        info!(
            documents = self.documents.len(),
            vectors = self.index.len(),
            urls_failed = report.urls_failed,
            embedding_failures = report.embedding_failures,
            "knowledge base built"
        );
        Ok(report)
    }

    /// Add one chunk: the vector goes in first, the text only if that worked.
    pub(crate) fn insert(&mut self, text: String, vector: &[f32]) -> Result<usize> {
        let position = self.index.add(vector)?;
        self.documents.push(text);
        debug_assert_eq!(self.index.len(), self.documents.len());
        Ok(position)
    }

    /// Nearest stored chunks to `query`, nearest first.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.index.search(query, k)
    }

    /// Chunk text at `position`
    #[must_use]
    pub fn document(&self, position: usize) -> Option<&str> {
        self.documents.get(position).map(String::as_str)
    }

    #[must_use]
    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    /// Vector stored at `position`
    #[must_use]
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        self.index.vector(position)
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Number of stored chunks
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

mod persist;
mod seed;

pub use persist::*;
pub use seed::*;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{FailingEmbedder, KeywordEmbedder, StaticFetcher};

    fn options(chunk_size: usize, min_chunk_len: usize) -> BuildOptions {
        BuildOptions {
            chunk_size,
            min_chunk_len,
            embed_concurrency: 1,
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    fn keyword_vectorizer() -> Vectorizer {
        let embedder = KeywordEmbedder::new(&["voice", "cursor", "hat"]);
        let dimension = embedder.dimension();
        Vectorizer::new(Arc::new(embedder), dimension)
    }

    #[test]
    fn test_insert_keeps_arrays_aligned() {
        let mut kb = KnowledgeBase::new(2);
        assert_eq!(kb.insert("first".into(), &[1.0, 0.0]).unwrap(), 0);
        assert_eq!(kb.insert("second".into(), &[0.0, 1.0]).unwrap(), 1);

        assert!(kb.insert("bad".into(), &[1.0]).is_err());
        assert_eq!(kb.len(), 2);
        assert_eq!(kb.index.len(), 2);
        assert_eq!(kb.document(1), Some("second"));
        assert_eq!(kb.vector(1), Some(&[0.0, 1.0][..]));
    }

    #[tokio::test]
    async fn test_build_filters_short_chunks() {
        // 60 chars then 49 chars with a chunk size of 60
        let text = format!("{}{}", "voice ".repeat(10), "c".repeat(49));
        let fetcher = StaticFetcher::new(&[("https://a", text.as_str())]);

        let mut kb = KnowledgeBase::new(3);
        let report = kb
            .build(&urls(&["https://a"]), &fetcher, &keyword_vectorizer(), &options(60, 50))
            .await
            .unwrap();

        assert_eq!(report.chunks_scraped, 2);
        assert_eq!(report.chunks_admitted, 1);
        assert_eq!(report.vectors_indexed, 1);
        assert_eq!(kb.documents(), &["voice ".repeat(10)]);
    }

    #[tokio::test]
    async fn test_build_admits_exactly_min_len() {
        let text = "h".repeat(50);
        let fetcher = StaticFetcher::new(&[("https://a", text.as_str())]);

        let mut kb = KnowledgeBase::new(3);
        let report = kb
            .build(&urls(&["https://a"]), &fetcher, &keyword_vectorizer(), &options(1000, 50))
            .await
            .unwrap();

        assert_eq!(report.vectors_indexed, 1);
        assert_eq!(kb.len(), 1);
    }

    #[tokio::test]
    async fn test_build_skips_failed_url() {
        let page = "cursor ".repeat(20);
        let fetcher = StaticFetcher::new(&[("https://a", page.as_str()), ("https://c", page.as_str())]);

        let mut kb = KnowledgeBase::new(3);
        let report = kb
            .build(
                &urls(&["https://a", "https://b", "https://c"]),
                &fetcher,
                &keyword_vectorizer(),
                &options(1000, 50),
            )
            .await
            .unwrap();

        assert_eq!(report.urls_attempted, 3);
        assert_eq!(report.urls_failed, 1);
        assert_eq!(report.vectors_indexed, 2);
        assert_eq!(kb.len(), 2);
    }

    #[tokio::test]
    async fn test_build_with_failing_embedder_is_empty() {
        let page = "hat ".repeat(40);
        let fetcher = StaticFetcher::new(&[("https://a", page.as_str())]);
        let vectorizer = Vectorizer::new(Arc::new(FailingEmbedder), 3);

        let mut kb = KnowledgeBase::new(3);
        let report = kb
            .build(&urls(&["https://a"]), &fetcher, &vectorizer, &options(50, 5))
            .await
            .unwrap();

        assert_eq!(report.chunks_admitted, 4);
        assert_eq!(report.embedding_failures, 4);
        assert_eq!(report.vectors_indexed, 0);
        assert!(kb.is_empty());
        assert_eq!(kb.index.len(), 0);
    }

    #[tokio::test]
    async fn test_build_skips_individual_embedding_failures() {
        let text = format!("{}{}{}", "a".repeat(50), "b".repeat(50), "c".repeat(50));
        let fetcher = StaticFetcher::new(&[("https://a", text.as_str())]);
        let embedder = KeywordEmbedder::new(&["a", "c"]).failing_on("bbbb");
        let vectorizer = Vectorizer::new(Arc::new(embedder), 2);

        let mut kb = KnowledgeBase::new(2);
        let report = kb
            .build(&urls(&["https://a"]), &fetcher, &vectorizer, &options(50, 50))
            .await
            .unwrap();

        assert_eq!(report.embedding_failures, 1);
        assert_eq!(kb.documents(), &["a".repeat(50), "c".repeat(50)]);
        assert_eq!(kb.vector(1), Some(&[0.0, 50.0][..]));
    }

    #[tokio::test]
    async fn test_concurrent_build_preserves_order() {
        let text: String = (0..20).map(|i| format!("{i:0>50}")).collect();
        let fetcher = StaticFetcher::new(&[("https://a", text.as_str())]);

        let opts = BuildOptions {
            chunk_size: 50,
            min_chunk_len: 50,
            embed_concurrency: 8,
        };
        let mut kb = KnowledgeBase::new(3);
        kb.build(&urls(&["https://a"]), &fetcher, &keyword_vectorizer(), &opts)
            .await
            .unwrap();

        assert_eq!(kb.len(), 20);
        for i in 0..20 {
            assert_eq!(kb.document(i), Some(format!("{i:0>50}").as_str()));
        }
    }

    #[tokio::test]
    async fn test_build_rejects_zero_chunk_size() {
        let fetcher = StaticFetcher::new(&[]);
        let mut kb = KnowledgeBase::new(3);
        let result = kb
            .build(&urls(&["https://a"]), &fetcher, &keyword_vectorizer(), &options(0, 50))
            .await;
        assert!(result.is_err());
    }
}
