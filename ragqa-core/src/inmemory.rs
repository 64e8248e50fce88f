//! In-memory embedding index using cosine similarity.
//!
//! [`InMemoryIndex`] keeps its entries in a `Vec` behind a
//! `tokio::sync::RwLock`: one writer while building, any number of readers
//! afterwards. Nothing is persisted across restarts.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::document::{Chunk, SearchResult};
use crate::embedding::{EmbeddingProvider, l2_normalize};
use crate::error::{RagError, Result};
use crate::vectorstore::{EmbeddingIndex, IndexEntry};

const BACKEND: &str = "InMemory";

/// An in-memory [`EmbeddingIndex`] backed by an [`EmbeddingProvider`].
///
/// Vectors are L2-normalized on the way in, so similarity is a plain dot
/// product and behaves as cosine similarity in `[-1, 1]`.
///
/// # Example
///
/// ```rust,ignore
/// use ragqa_core::{HashEmbeddingProvider, InMemoryIndex};
///
/// let index = InMemoryIndex::new(Arc::new(HashEmbeddingProvider::default()));
/// ```
pub struct InMemoryIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    entries: RwLock<Option<Vec<IndexEntry>>>,
}

impl InMemoryIndex {
    /// Create an empty, unbuilt index.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder, entries: RwLock::new(None) }
    }

    /// Number of indexed entries (zero before build).
    pub async fn len(&self) -> usize {
        self.entries.read().await.as_ref().map_or(0, Vec::len)
    }

    /// Whether the index holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn already_built() -> RagError {
        RagError::VectorStoreError {
            backend: BACKEND.to_string(),
            message: "index has already been built".to_string(),
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[async_trait]
impl EmbeddingIndex for InMemoryIndex {
    async fn build(&self, chunks: Vec<Chunk>) -> Result<usize> {
        if self.entries.read().await.is_some() {
            return Err(Self::already_built());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(RagError::EmbeddingError {
                provider: self.embedder.name().to_string(),
                message: format!(
                    "expected {} embeddings, received {}",
                    chunks.len(),
                    vectors.len()
                ),
            });
        }

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, mut vector)| {
                let normalized = l2_normalize(&mut vector);
                IndexEntry { chunk, vector, normalized }
            })
            .collect();
        let count = entries.len();

        let mut slot = self.entries.write().await;
        if slot.is_some() {
            return Err(Self::already_built());
        }
        *slot = Some(entries);

        info!(
            backend = BACKEND,
            embedder = self.embedder.name(),
            entry_count = count,
            "index built"
        );
        Ok(count)
    }

    async fn query(&self, text: &str, k: usize) -> Result<Vec<SearchResult>> {
        let entries = self.entries.read().await;
        let Some(entries) = entries.as_ref() else {
            return Err(RagError::IndexUnavailable(
                "query issued before the index was built".to_string(),
            ));
        };
        if k == 0 || entries.is_empty() {
            return Ok(Vec::new());
        }

        let mut query_vector = self.embedder.embed(text).await?;
        l2_normalize(&mut query_vector);

        let mut scored: Vec<SearchResult> = entries
            .iter()
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                score: dot(&entry.vector, &query_vector),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.chunk.sequence_index.cmp(&b.chunk.sequence_index))
        });
        scored.truncate(k);

        debug!(backend = BACKEND, k, result_count = scored.len(), "index queried");
        Ok(scored)
    }

    async fn is_built(&self) -> bool {
        self.entries.read().await.is_some()
    }
}
