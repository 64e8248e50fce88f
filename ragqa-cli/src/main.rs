mod console;
mod render;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ragqa_core::{
    ChatCompletionGenerator, Document, EmbeddingProvider, HashEmbeddingProvider, InMemoryIndex,
    MemoryWindow, OpenAIEmbeddingProvider, QaPipeline, RagConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EmbeddingBackend {
    /// Deterministic local feature hashing (no network)
    Hash,
    /// OpenAI-compatible embeddings endpoint
    Openai,
}

/// Ask questions about a plain-text document and see which passages support each answer.
#[derive(Debug, Parser)]
#[command(name = "ragqa", version, about)]
struct Args {
    /// Plain-text document to index
    #[arg(short, long)]
    document: PathBuf,

    /// Maximum chunk size in characters
    #[arg(long, default_value_t = 128)]
    chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[arg(long, default_value_t = 50)]
    chunk_overlap: usize,

    /// Chunks retrieved per question
    #[arg(long, default_value_t = 5)]
    top_k: usize,

    /// Only pass the last N turns to the model (all turns when omitted)
    #[arg(long)]
    memory_window: Option<usize>,

    /// Rewrite follow-up questions into standalone queries before retrieval
    #[arg(long)]
    condense: bool,

    /// Chat model name
    #[arg(long, env = "RAGQA_MODEL", default_value = ragqa_core::chat::DEFAULT_CHAT_MODEL)]
    model: String,

    /// OpenAI-compatible chat API base URL
    #[arg(long, env = "RAGQA_BASE_URL", default_value = ragqa_core::chat::DEEPSEEK_API_BASE)]
    base_url: String,

    /// Chat API key
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Sampling temperature for answers
    #[arg(long, default_value_t = 0.0)]
    temperature: f32,

    /// Seconds to wait for an answer before giving up on a turn
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,

    /// Embedding backend used to build the index
    #[arg(long, value_enum, default_value_t = EmbeddingBackend::Hash)]
    embeddings: EmbeddingBackend,

    /// Embeddings API key (for `--embeddings openai`)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    embeddings_api_key: Option<String>,

    /// Embeddings API base URL (for `--embeddings openai`)
    #[arg(
        long,
        env = "RAGQA_EMBEDDINGS_BASE_URL",
        default_value = ragqa_core::openai::OPENAI_API_BASE
    )]
    embeddings_base_url: String,

    /// Embeddings model (for `--embeddings openai`)
    #[arg(long, default_value = "text-embedding-3-small")]
    embeddings_model: String,

    /// Print every source in full after each answer
    #[arg(long)]
    show_full_sources: bool,

    /// Log filter, e.g. `info` or `ragqa_core=debug` (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn embedder(args: &Args) -> Result<Arc<dyn EmbeddingProvider>> {
    Ok(match args.embeddings {
        EmbeddingBackend::Hash => Arc::new(HashEmbeddingProvider::default()),
        EmbeddingBackend::Openai => {
            let key = args
                .embeddings_api_key
                .clone()
                .context("--embeddings openai requires OPENAI_API_KEY or --embeddings-api-key")?;
            Arc::new(
                OpenAIEmbeddingProvider::new(key)?
                    .with_base_url(&args.embeddings_base_url)
                    .with_model(&args.embeddings_model),
            )
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    let timeout = Duration::from_secs(args.timeout_secs);
    let config = RagConfig::builder()
        .chunk_size(args.chunk_size)
        .chunk_overlap(args.chunk_overlap)
        .top_k(args.top_k)
        .memory_window(args.memory_window.map_or(MemoryWindow::Unbounded, MemoryWindow::LastTurns))
        .condense_follow_ups(args.condense)
        .generation_timeout(timeout)
        .build()?;

    let text = std::fs::read_to_string(&args.document)
        .with_context(|| format!("failed to read {}", args.document.display()))?;
    let document_id = args
        .document
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let document = Document::new(document_id, text)
        .with_metadata("source", args.document.display().to_string());

    let generator = ChatCompletionGenerator::new(args.api_key.clone())?
        .with_base_url(&args.base_url)
        .with_model(&args.model)
        .with_temperature(args.temperature)
        .with_request_timeout(timeout)?;

    let pipeline = QaPipeline::builder()
        .config(config)
        .index(Arc::new(InMemoryIndex::new(embedder(&args)?)))
        .generator(Arc::new(generator))
        .build()?;

    let chunks = pipeline.ingest(&document).await?;
    info!(chunk_count = chunks.len(), document = %args.document.display(), "index ready");
    println!(
        "Indexed {} chunks from {}, retrieving top {} per question",
        chunks.len(),
        args.document.display(),
        pipeline.retriever().top_k()
    );

    console::run(Arc::new(pipeline), args.show_full_sources).await
}
