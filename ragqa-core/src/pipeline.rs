//! Question-answering orchestrator.
//!
//! The [`QaPipeline`] ties a [`Chunker`], an [`EmbeddingIndex`], a
//! [`ConfidenceScorer`], and a [`Generator`] together. Ingestion chunks a
//! document and builds the index; [`ask`](QaPipeline::ask) turns one question
//! into a [`Turn`] without touching conversation memory.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragqa_core::{
//!     ConversationMemory, HashEmbeddingProvider, InMemoryIndex, QaPipeline, RagConfig,
//! };
//!
//! let pipeline = QaPipeline::builder()
//!     .config(RagConfig::default())
//!     .index(Arc::new(InMemoryIndex::new(Arc::new(HashEmbeddingProvider::default()))))
//!     .generator(Arc::new(my_generator))
//!     .build()?;
//!
//! pipeline.ingest(&document).await?;
//! let mut memory = ConversationMemory::new();
//! let turn = pipeline.ask(&memory, "What is coriander?").await?;
//! memory.append(turn);
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::chunking::{Chunker, RecursiveChunker};
use crate::config::RagConfig;
use crate::document::{Chunk, Document, Turn};
use crate::error::{RagError, Result};
use crate::generation::Generator;
use crate::memory::ConversationMemory;
use crate::retriever::Retriever;
use crate::scoring::ConfidenceScorer;
use crate::vectorstore::EmbeddingIndex;

/// The question-answering pipeline.
///
/// `ask` is the error boundary for a turn: every failure from retrieval,
/// scoring, or generation comes back as a classified [`RagError`]. Construct
/// one via [`QaPipeline::builder()`].
pub struct QaPipeline {
    config: RagConfig,
    chunker: Arc<dyn Chunker>,
    retriever: Retriever,
    scorer: ConfidenceScorer,
    generator: Arc<dyn Generator>,
}

impl QaPipeline {
    /// Create a new [`QaPipelineBuilder`].
    pub fn builder() -> QaPipelineBuilder {
        QaPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the retriever.
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Chunk a document and build the index from its chunks.
    ///
    /// Returns the chunks that were indexed.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ChunkingError`] for empty input or bad chunk
    /// settings, and propagates index build failures.
    pub async fn ingest(&self, document: &Document) -> Result<Vec<Chunk>> {
        let chunks = self.chunker.chunk(document).inspect_err(|e| {
            error!(document.id = %document.id, error = %e, "chunking failed");
        })?;

        self.retriever.index().build(chunks.clone()).await.inspect_err(|e| {
            error!(document.id = %document.id, error = %e, "index build failed");
        })?;

        info!(document.id = %document.id, chunk_count = chunks.len(), "ingested document");
        Ok(chunks)
    }

    /// Answer one question.
    ///
    /// Steps: validate the question, optionally condense it against the
    /// conversation, retrieve the top-k chunks, score them, then generate an
    /// answer from the question, the memory context, and the chunks.
    ///
    /// Memory is read but never mutated; the caller commits the returned turn.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidQuestion`] for an empty or whitespace-only question,
    ///   before any retrieval or generation happens
    /// - [`RagError::IndexUnavailable`] if the index has not been built
    /// - [`RagError::RetrievalError`] for any other retrieval failure or timeout
    /// - [`RagError::GenerationError`] for any generation failure or timeout
    pub async fn ask(&self, memory: &ConversationMemory, question: &str) -> Result<Turn> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::InvalidQuestion("question must not be empty".to_string()));
        }

        let context = memory.as_context();
        let search_query = if self.config.condense_follow_ups && !context.is_empty() {
            self.generation_call(self.generator.condense(question, context)).await?
        } else {
            question.to_string()
        };

        let chunks = match tokio::time::timeout(
            self.config.retrieval_timeout,
            self.retriever.retrieve(&search_query),
        )
        .await
        {
            Ok(result) => result.map_err(classify_retrieval_error)?,
            Err(_) => {
                warn!(timeout = ?self.config.retrieval_timeout, "retrieval timed out");
                return Err(RagError::RetrievalError(format!(
                    "retrieval timed out after {}",
                    format_duration(self.config.retrieval_timeout)
                )));
            }
        };

        let sources = self.scorer.score(&chunks, question);
        let answer =
            self.generation_call(self.generator.generate(question, context, &chunks)).await?;

        info!(
            source_count = sources.len(),
            context_turns = context.len(),
            top_confidence = sources.first().map(|s| s.confidence),
            "question answered"
        );

        Ok(Turn::new(question, answer, sources))
    }

    /// Run a generator call under the configured timeout and classify failures.
    async fn generation_call<F>(&self, call: F) -> Result<String>
    where
        F: Future<Output = Result<String>>,
    {
        let provider = self.generator.name();
        match tokio::time::timeout(self.config.generation_timeout, call).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => {
                error!(provider, error = %e, "generation failed");
                Err(classify_generation_error(provider, e))
            }
            Err(_) => {
                error!(provider, timeout = ?self.config.generation_timeout, "generation timed out");
                Err(RagError::GenerationError {
                    provider: provider.to_string(),
                    message: format!(
                        "timed out after {}",
                        format_duration(self.config.generation_timeout)
                    ),
                })
            }
        }
    }
}

fn classify_retrieval_error(err: RagError) -> RagError {
    match err {
        RagError::IndexUnavailable(_) | RagError::RetrievalError(_) => err,
        other => RagError::RetrievalError(other.to_string()),
    }
}

fn classify_generation_error(provider: &str, err: RagError) -> RagError {
    match err {
        RagError::GenerationError { .. } => err,
        other => {
            RagError::GenerationError { provider: provider.to_string(), message: other.to_string() }
        }
    }
}

fn format_duration(duration: Duration) -> String {
    format!("{:.1}s", duration.as_secs_f64())
}

/// Builder for constructing a [`QaPipeline`].
///
/// `config`, `index`, and `generator` are required. The chunker defaults to a
/// [`RecursiveChunker`] built from the config and the scorer defaults to the
/// config's [`ScoringWeights`](crate::config::ScoringWeights).
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = QaPipeline::builder()
///     .config(RagConfig::default())
///     .index(Arc::new(index))
///     .generator(Arc::new(generator))
///     .chunker(Arc::new(chunker))  // optional
///     .build()?;
/// ```
#[derive(Default)]
pub struct QaPipelineBuilder {
    config: Option<RagConfig>,
    chunker: Option<Arc<dyn Chunker>>,
    index: Option<Arc<dyn EmbeddingIndex>>,
    scorer: Option<ConfidenceScorer>,
    generator: Option<Arc<dyn Generator>>,
}

impl QaPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding index.
    pub fn index(mut self, index: Arc<dyn EmbeddingIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Override the confidence scorer.
    pub fn scorer(mut self, scorer: ConfidenceScorer) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Set the generation capability.
    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Build the [`QaPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing.
    pub fn build(self) -> Result<QaPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        let index =
            self.index.ok_or_else(|| RagError::ConfigError("index is required".to_string()))?;
        let generator = self
            .generator
            .ok_or_else(|| RagError::ConfigError("generator is required".to_string()))?;
        let chunker =
            self.chunker.unwrap_or_else(|| Arc::new(RecursiveChunker::from_config(&config)));
        let scorer = self.scorer.unwrap_or_else(|| ConfidenceScorer::new(config.scoring));
        let retriever = Retriever::new(index, config.top_k);

        Ok(QaPipeline { config, chunker, retriever, scorer, generator })
    }
}
