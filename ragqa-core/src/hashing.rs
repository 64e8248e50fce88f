//! Deterministic feature-hashing embeddings.
//!
//! [`HashEmbeddingProvider`] maps each case-folded token to a signed bucket
//! chosen by its SHA-256 digest. Texts sharing words end up with similar
//! vectors, which is enough for offline use and reproducible tests without a
//! model or network. Text with no alphanumeric tokens maps to the zero vector.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::embedding::{EmbeddingProvider, l2_normalize};
use crate::error::Result;

/// Default vector width for [`HashEmbeddingProvider`].
pub const DEFAULT_HASH_DIMENSIONS: usize = 256;

/// A bag-of-words embedding provider using signed feature hashing.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    dimensions: usize,
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self { dimensions: DEFAULT_HASH_DIMENSIONS }
    }
}

impl HashEmbeddingProvider {
    /// Create a provider producing vectors of `dimensions` floats.
    ///
    /// A width of zero is bumped to one.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions: dimensions.max(1) }
    }

    fn hash_embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text.split_whitespace() {
            let token: String = token
                .chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect();
            if token.is_empty() {
                continue;
            }
            let digest = Sha256::digest(token.as_bytes());
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&digest[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimensions as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        l2_normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    fn name(&self) -> &str {
        "hash"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.hash_embed(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
