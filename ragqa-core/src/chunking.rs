//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`RecursiveChunker`], which
//! splits text along a separator hierarchy, merges the pieces back up to
//! `chunk_size`, and prefixes each chunk with the tail of its predecessor.

use tracing::debug;

use crate::config::{DEFAULT_SEPARATORS, RagConfig};
use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into chunks.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks ordered by `sequence_index`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ChunkingError`] if the document text is empty or the
    /// chunker is misconfigured.
    fn chunk(&self, document: &Document) -> Result<Vec<Chunk>>;
}

/// Splits text hierarchically along an ordered list of separators.
///
/// The text is first split on the highest-priority separator. Any piece
/// longer than `chunk_size` is split again on the next separator, and so on.
/// A piece that is still too long when the separators run out is kept whole
/// rather than truncated.
///
/// Each chunk after the first starts with up to `chunk_overlap` trailing
/// characters of the previous chunk's text, then takes pieces greedily while
/// prefix and body together stay within `chunk_size`. The first chunk has no
/// prefix, so text no longer than `chunk_size` is a single chunk. When the
/// next piece is too long to sit beside a full prefix, the prefix is
/// shortened, down to none for an oversized piece.
///
/// Separators stay attached to the end of the piece they terminate, so the
/// chunk bodies (see [`Chunk::body`]) concatenate back to the original text.
///
/// # Example
///
/// ```rust,ignore
/// use ragqa_core::{Chunker, Document, RecursiveChunker};
///
/// let chunker = RecursiveChunker::new(128, 50);
/// let chunks = chunker.chunk(&Document::new("doc", text))?;
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker` using [`DEFAULT_SEPARATORS`].
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of characters per chunk
    /// * `chunk_overlap`: number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Create a chunker from the chunking fields of a [`RagConfig`].
    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
            .with_separators(config.separators.iter().cloned())
    }

    /// Replace the separator hierarchy. Empty separators are ignored.
    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators =
            separators.into_iter().map(Into::into).filter(|s: &String| !s.is_empty()).collect();
        self
    }

    fn validate(&self) -> Result<()> {
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::ChunkingError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// The last `n` characters of `text` (all of it if shorter).
fn tail_chars(text: &str, n: usize) -> &str {
    let len = char_len(text);
    if n >= len {
        return text;
    }
    match text.char_indices().nth(len - n) {
        Some((idx, _)) => &text[idx..],
        None => "",
    }
}

/// Split text at a separator while keeping the separator attached to the preceding segment.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Split `text` into pieces no longer than `max_chars` characters, descending
/// through `separators` only for pieces that are still too long.
fn split_recursive<'a>(
    text: &'a str,
    max_chars: usize,
    separators: &[String],
    out: &mut Vec<&'a str>,
) {
    if char_len(text) <= max_chars {
        out.push(text);
        return;
    }
    let Some((separator, remaining)) = separators.split_first() else {
        // Indivisible: emitted oversized rather than truncated.
        out.push(text);
        return;
    };
    for segment in split_keeping_separator(text, separator) {
        if char_len(segment) <= max_chars {
            out.push(segment);
        } else {
            split_recursive(segment, max_chars, remaining, out);
        }
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Result<Vec<Chunk>> {
        self.validate()?;
        if document.text.is_empty() {
            return Err(RagError::ChunkingError(format!(
                "document '{}' has empty text",
                document.id
            )));
        }

        let mut pieces = Vec::new();
        split_recursive(&document.text, self.chunk_size, &self.separators, &mut pieces);

        let mut chunks: Vec<Chunk> = Vec::new();
        let mut next = 0;
        while next < pieces.len() {
            let previous = chunks.last().map(|c| c.text.as_str());
            let first_len = char_len(pieces[next]);

            // The prefix shrinks so that at least the first piece fits beside it.
            let overlap = match previous {
                Some(prev) => self
                    .chunk_overlap
                    .min(char_len(prev))
                    .min(self.chunk_size.saturating_sub(first_len)),
                None => 0,
            };
            let window = self.chunk_size - overlap;

            let mut body = String::from(pieces[next]);
            let mut body_len = first_len;
            next += 1;
            while let Some(piece) = pieces.get(next) {
                let len = char_len(piece);
                if body_len + len > window {
                    break;
                }
                body.push_str(piece);
                body_len += len;
                next += 1;
            }

            let prefix = previous.map_or("", |prev| tail_chars(prev, overlap));
            let mut text = String::with_capacity(prefix.len() + body.len());
            text.push_str(prefix);
            text.push_str(&body);

            let sequence_index = chunks.len();
            chunks.push(Chunk {
                id: format!("{}_{sequence_index}", document.id),
                text,
                metadata: document.metadata.clone(),
                document_id: document.id.clone(),
                sequence_index,
                overlap,
            });
        }

        debug!(
            document.id = %document.id,
            chunk_count = chunks.len(),
            chunk_size = self.chunk_size,
            chunk_overlap = self.chunk_overlap,
            "chunked document"
        );

        Ok(chunks)
    }
}
