//! Data types for documents, chunks, scored sources, and conversation turns.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A source document containing plain text and metadata.
///
/// The core has no knowledge of where the text came from; acquisition and
/// cleaning happen before a `Document` is constructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The text content of the document.
    pub text: String,
    /// Key-value metadata associated with the document.
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document with no metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), metadata: HashMap::new() }
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A bounded, retrievable slice of a [`Document`].
///
/// Chunks are produced only by a [`Chunker`](crate::chunking::Chunker) and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk (`{document_id}_{sequence_index}`).
    pub id: String,
    /// The text content of the chunk, including any leading overlap.
    pub text: String,
    /// Metadata inherited unmodified from the parent document.
    pub metadata: HashMap<String, String>,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// Zero-based position of this chunk within its document.
    pub sequence_index: usize,
    /// Number of leading characters shared with the previous chunk.
    #[serde(default)]
    pub overlap: usize,
}

impl Chunk {
    /// The chunk text with the leading overlap region removed.
    ///
    /// Concatenating the bodies of a document's chunks in `sequence_index`
    /// order reproduces the original text.
    pub fn body(&self) -> &str {
        match self.text.char_indices().nth(self.overlap) {
            Some((idx, _)) => &self.text[idx..],
            None if self.overlap == 0 => &self.text,
            None => "",
        }
    }
}

/// A retrieved [`Chunk`] paired with the index's own similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity in `[-1, 1]` (higher is more similar).
    pub score: f32,
}

/// A retrieved chunk with its generation-independent confidence metrics.
///
/// Recomputed for every question and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredSource {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Jaccard similarity between question and chunk tokens, in `[0, 1]`.
    pub relevance_score: f64,
    /// Saturating length proxy for informativeness, in `[0, 1]`.
    pub length_factor: f64,
    /// Weighted combination of relevance and length, in `[0, 1]`.
    pub confidence: f64,
    /// 1-based rank after sorting by descending confidence.
    pub rank: usize,
    /// Position of the chunk in the retriever's output (0-based).
    pub retrieval_index: usize,
}

impl ScoredSource {
    /// Default number of characters shown when previewing a source.
    pub const PREVIEW_CHARS: usize = 200;

    /// The chunk text truncated to `max_chars` characters, with `...` appended
    /// when truncation happened.
    pub fn preview(&self, max_chars: usize) -> String {
        let text = &self.chunk.text;
        match text.char_indices().nth(max_chars) {
            Some((idx, _)) => format!("{}...", &text[..idx]),
            None => text.clone(),
        }
    }
}

/// One question/answer/sources triple within a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    /// The question as asked (trimmed).
    pub question: String,
    /// The generated answer.
    pub answer: String,
    /// Sources ordered by descending confidence.
    pub sources: Vec<ScoredSource>,
    /// When the turn was answered.
    pub answered_at: DateTime<Utc>,
}

impl Turn {
    /// Create a turn stamped with the current time.
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        sources: Vec<ScoredSource>,
    ) -> Self {
        Self { question: question.into(), answer: answer.into(), sources, answered_at: Utc::now() }
    }

    /// Aggregate confidence statistics over this turn's sources.
    ///
    /// Returns `None` when the turn has no sources.
    pub fn confidence_summary(&self) -> Option<ConfidenceSummary> {
        let first = self.sources.first()?;
        let mut total = 0.0;
        let mut highest = first.confidence;
        let mut lowest = first.confidence;
        for source in &self.sources {
            total += source.confidence;
            highest = highest.max(source.confidence);
            lowest = lowest.min(source.confidence);
        }
        Some(ConfidenceSummary {
            average: total / self.sources.len() as f64,
            highest,
            lowest,
            source_count: self.sources.len(),
        })
    }
}

/// Aggregate confidence statistics for a [`Turn`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ConfidenceSummary {
    /// Mean confidence across all sources.
    pub average: f64,
    /// Highest source confidence.
    pub highest: f64,
    /// Lowest source confidence.
    pub lowest: f64,
    /// Number of sources the statistics were computed over.
    pub source_count: usize,
}
