//! The embedding index contract consumed by the retriever.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// A chunk stored in an index together with its embedding.
///
/// Owned by the index; callers only ever see [`SearchResult`]s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// The indexed chunk.
    pub chunk: Chunk,
    /// The chunk's embedding.
    pub vector: Vec<f32>,
    /// Whether `vector` was scaled to unit length.
    pub normalized: bool,
}

/// A nearest-neighbour index over one corpus of chunks.
///
/// The index is built once, then queried concurrently. Backends (in-memory,
/// remote vector stores) are swappable behind this trait without touching the
/// retriever or pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use ragqa_core::{EmbeddingIndex, InMemoryIndex};
///
/// let index = InMemoryIndex::new(Arc::new(embedder));
/// index.build(chunks).await?;
/// let results = index.query("what is coriander", 5).await?;
/// ```
#[async_trait]
pub trait EmbeddingIndex: Send + Sync {
    /// Embed every chunk once and store it. Returns the number of entries.
    ///
    /// Rebuilding an index that has already been built is unsupported.
    async fn build(&self, chunks: Vec<Chunk>) -> Result<usize>;

    /// Return at most `k` chunks ordered by descending similarity to `text`,
    /// ties broken by ascending `sequence_index`.
    ///
    /// Returns fewer than `k` results when the corpus is smaller than `k`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexUnavailable`](crate::error::RagError::IndexUnavailable)
    /// if called before [`build`](EmbeddingIndex::build) has completed.
    async fn query(&self, text: &str, k: usize) -> Result<Vec<SearchResult>>;

    /// Whether [`build`](EmbeddingIndex::build) has completed.
    async fn is_built(&self) -> bool;
}
