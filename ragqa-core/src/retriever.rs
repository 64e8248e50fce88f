//! Fixed-policy top-k retrieval.

use std::sync::Arc;

use tracing::debug;

use crate::document::Chunk;
use crate::error::Result;
use crate::vectorstore::EmbeddingIndex;

/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 5;

/// A thin wrapper over an [`EmbeddingIndex`] that always runs a similarity
/// search for the configured `top_k`.
///
/// Only chunks are returned. The index's similarity scores are dropped so
/// that confidence is computed independently by the
/// [`ConfidenceScorer`](crate::scoring::ConfidenceScorer).
#[derive(Clone)]
pub struct Retriever {
    index: Arc<dyn EmbeddingIndex>,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever returning at most `top_k` chunks per question.
    pub fn new(index: Arc<dyn EmbeddingIndex>, top_k: usize) -> Self {
        Self { index, top_k }
    }

    /// The number of chunks requested per question.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// The underlying index.
    pub fn index(&self) -> &Arc<dyn EmbeddingIndex> {
        &self.index
    }

    /// Retrieve the chunks most similar to `question`, most similar first.
    ///
    /// # Errors
    ///
    /// Propagates index errors, including
    /// [`RagError::IndexUnavailable`](crate::error::RagError::IndexUnavailable).
    pub async fn retrieve(&self, question: &str) -> Result<Vec<Chunk>> {
        let results = self.index.query(question, self.top_k).await?;
        debug!(top_k = self.top_k, result_count = results.len(), "retrieved chunks");
        Ok(results.into_iter().map(|r| r.chunk).collect())
    }
}
