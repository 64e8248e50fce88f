//! Generation-independent confidence scoring for retrieved chunks.
//!
//! Scores are pure string/set arithmetic so they can be audited without
//! access to the embedding model that did the retrieval.

use std::collections::HashSet;

use crate::config::ScoringWeights;
use crate::document::{Chunk, ScoredSource};

/// Case-folded, whitespace-delimited token set.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Jaccard similarity of two token sets; 0 when both are empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Heuristic relevance/informativeness scorer.
///
/// For each chunk:
/// - `relevance_score` is the Jaccard similarity of question and chunk tokens
/// - `length_factor` is `min(chars / length_normalizer, 1.0)`
/// - `confidence` is the weighted sum of the two
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceScorer {
    weights: ScoringWeights,
}

impl ConfidenceScorer {
    /// Create a scorer with explicit weights.
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Score `chunks` against `question`.
    ///
    /// Output is sorted by descending confidence; equal confidences keep
    /// their retrieval order. Ranks are assigned 1-based after sorting.
    pub fn score(&self, chunks: &[Chunk], question: &str) -> Vec<ScoredSource> {
        let question_tokens = tokenize(question);

        let mut sources: Vec<ScoredSource> = chunks
            .iter()
            .enumerate()
            .map(|(retrieval_index, chunk)| {
                let relevance_score = jaccard(&question_tokens, &tokenize(&chunk.text));
                let length_factor = (chunk.text.chars().count() as f64
                    / self.weights.length_normalizer)
                    .min(1.0);
                let confidence = self.weights.relevance_weight * relevance_score
                    + self.weights.length_weight * length_factor;
                ScoredSource {
                    chunk: chunk.clone(),
                    relevance_score,
                    length_factor,
                    confidence,
                    rank: 0,
                    retrieval_index,
                }
            })
            .collect();

        // `sort_by` is stable, which preserves retrieval order on ties.
        sources.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        for (i, source) in sources.iter_mut().enumerate() {
            source.rank = i + 1;
        }
        sources
    }
}
