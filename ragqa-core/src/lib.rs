//! # ragqa-core
//!
//! Retrieval-augmented question answering over a fixed text corpus, with
//! scored source attribution and multi-turn conversation memory.
//!
//! ## Overview
//!
//! - [`RecursiveChunker`] splits a [`Document`] into overlapping, size-bounded [`Chunk`]s
//! - [`EmbeddingIndex`] is the nearest-neighbour contract; [`InMemoryIndex`] implements it
//!   on top of any [`EmbeddingProvider`]
//! - [`Retriever`] runs a fixed top-k similarity query
//! - [`ConfidenceScorer`] rates each retrieved chunk without consulting the embedding model
//! - [`ConversationMemory`] records [`Turn`]s and supplies them as context
//! - [`QaPipeline`] ties these together with a [`Generator`] into one `ask` operation
//! - [`Conversation`] pairs a pipeline with memory and an explicit commit step
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragqa_core::{
//!     Conversation, Document, HashEmbeddingProvider, InMemoryIndex, QaPipeline, RagConfig,
//! };
//!
//! let pipeline = QaPipeline::builder()
//!     .config(RagConfig::default())
//!     .index(Arc::new(InMemoryIndex::new(Arc::new(HashEmbeddingProvider::default()))))
//!     .generator(Arc::new(my_generator))
//!     .build()?;
//! pipeline.ingest(&Document::new("coriander", text)).await?;
//!
//! let mut conversation = Conversation::new(Arc::new(pipeline));
//! let turn = conversation.ask("Which part of coriander is used as a spice?").await?;
//! for source in &turn.sources {
//!     println!("{} {:.2} {}", source.rank, source.confidence, source.preview(80));
//! }
//! conversation.commit(turn);
//! ```
//!
//! ## Features
//!
//! - `openai`: [`openai::OpenAIEmbeddingProvider`] and [`chat::ChatCompletionGenerator`]
//!   (OpenAI-compatible HTTP backends, DeepSeek by default for chat)

pub mod chunking;
pub mod config;
pub mod conversation;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod hashing;
pub mod inmemory;
pub mod memory;
pub mod pipeline;
pub mod prompt;
pub mod retriever;
pub mod scoring;
pub mod vectorstore;

#[cfg(feature = "openai")]
pub mod chat;
#[cfg(feature = "openai")]
pub mod openai;

pub use chunking::{Chunker, RecursiveChunker};
pub use config::{DEFAULT_SEPARATORS, MemoryWindow, RagConfig, RagConfigBuilder, ScoringWeights};
pub use conversation::Conversation;
pub use document::{Chunk, ConfidenceSummary, Document, ScoredSource, SearchResult, Turn};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use generation::Generator;
pub use hashing::HashEmbeddingProvider;
pub use inmemory::InMemoryIndex;
pub use memory::ConversationMemory;
pub use pipeline::{QaPipeline, QaPipelineBuilder};
pub use retriever::Retriever;
pub use scoring::ConfidenceScorer;
pub use vectorstore::{EmbeddingIndex, IndexEntry};

#[cfg(feature = "openai")]
pub use chat::ChatCompletionGenerator;
#[cfg(feature = "openai")]
pub use openai::OpenAIEmbeddingProvider;
