//! Configuration for chunking, retrieval, scoring, and conversation memory.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Separators tried in priority order: paragraph, line, sentence punctuation,
/// then `//` comment breaks.
pub const DEFAULT_SEPARATORS: [&str; 6] = ["\n\n", "\n", ".", "!", "?", "//"];

/// Weights and constants for the confidence heuristic.
///
/// `confidence = relevance_weight * relevance + length_weight * length_factor`
/// where `length_factor = min(chars / length_normalizer, 1.0)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoringWeights {
    /// Weight applied to the Jaccard relevance score.
    pub relevance_weight: f64,
    /// Weight applied to the length factor.
    pub length_weight: f64,
    /// Character count at which the length factor saturates at 1.0.
    pub length_normalizer: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self { relevance_weight: 0.7, length_weight: 0.3, length_normalizer: 500.0 }
    }
}

impl ScoringWeights {
    /// Check that the weights keep confidence inside `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a weight is negative or not finite,
    /// the weights do not sum to 1.0, or the normalizer is not positive.
    pub fn validate(&self) -> Result<()> {
        let weights = [self.relevance_weight, self.length_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(RagError::ConfigError(format!(
                "scoring weights must be finite and non-negative (relevance {}, length {})",
                self.relevance_weight, self.length_weight
            )));
        }
        if (self.relevance_weight + self.length_weight - 1.0).abs() > 1e-9 {
            return Err(RagError::ConfigError(format!(
                "scoring weights must sum to 1.0 (got {})",
                self.relevance_weight + self.length_weight
            )));
        }
        if !self.length_normalizer.is_finite() || self.length_normalizer <= 0.0 {
            return Err(RagError::ConfigError(format!(
                "length_normalizer must be positive (got {})",
                self.length_normalizer
            )));
        }
        Ok(())
    }
}

/// How much of the conversation history is handed to generation.
///
/// The durable record always keeps every turn; the window only limits what
/// [`ConversationMemory::as_context`](crate::memory::ConversationMemory::as_context)
/// returns.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MemoryWindow {
    /// Every prior turn is context.
    #[default]
    Unbounded,
    /// Only the most recent `n` turns are context.
    LastTurns(usize),
}

/// Configuration parameters for the question-answering pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Separators tried in priority order when splitting text.
    pub separators: Vec<String>,
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// Confidence heuristic weights.
    pub scoring: ScoringWeights,
    /// How many prior turns are supplied as generation context.
    pub memory_window: MemoryWindow,
    /// Rewrite follow-up questions into standalone queries before retrieval.
    pub condense_follow_ups: bool,
    /// Upper bound on a single retrieval call.
    pub retrieval_timeout: Duration,
    /// Upper bound on a single generation call.
    pub generation_timeout: Duration,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 128,
            chunk_overlap: 50,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
            top_k: 5,
            scoring: ScoringWeights::default(),
            memory_window: MemoryWindow::Unbounded,
            condense_follow_ups: false,
            retrieval_timeout: Duration::from_secs(30),
            generation_timeout: Duration::from_secs(120),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Replace the separator hierarchy.
    pub fn separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    /// Set the number of chunks retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the confidence heuristic weights.
    pub fn scoring(mut self, weights: ScoringWeights) -> Self {
        self.config.scoring = weights;
        self
    }

    /// Set the conversation context window.
    pub fn memory_window(mut self, window: MemoryWindow) -> Self {
        self.config.memory_window = window;
        self
    }

    /// Enable or disable follow-up condensing before retrieval.
    pub fn condense_follow_ups(mut self, enabled: bool) -> Self {
        self.config.condense_follow_ups = enabled;
        self
    }

    /// Set the retrieval timeout.
    pub fn retrieval_timeout(mut self, timeout: Duration) -> Self {
        self.config.retrieval_timeout = timeout;
        self
    }

    /// Set the generation timeout.
    pub fn generation_timeout(mut self, timeout: Duration) -> Self {
        self.config.generation_timeout = timeout;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ChunkingError`] if `chunk_overlap >= chunk_size`, and
    /// [`RagError::ConfigError`] if:
    /// - `top_k == 0`
    /// - no non-empty separator is configured
    /// - the scoring weights are invalid
    /// - a timeout is zero
    pub fn build(self) -> Result<RagConfig> {
        let mut config = self.config;
        if config.chunk_overlap >= config.chunk_size {
            return Err(RagError::ChunkingError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        if config.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        config.separators.retain(|s| !s.is_empty());
        if config.separators.is_empty() {
            return Err(RagError::ConfigError(
                "at least one non-empty separator is required".to_string(),
            ));
        }
        config.scoring.validate()?;
        if config.retrieval_timeout.is_zero() || config.generation_timeout.is_zero() {
            return Err(RagError::ConfigError("timeouts must be greater than zero".to_string()));
        }
        Ok(config)
    }
}
