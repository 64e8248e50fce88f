//! End-to-end tests for the question-answering pipeline and conversation
//! commit semantics, using deterministic embeddings and scripted generators.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use ragqa_core::{
    Chunk, Conversation, ConversationMemory, Document, EmbeddingIndex, Generator,
    HashEmbeddingProvider, InMemoryIndex, MemoryWindow, QaPipeline, RagConfig, RagError, Result,
    SearchResult, Turn,
};

const CORIANDER: &str = "Coriander is an annual herb in the family Apiaceae.\n\n\
All parts of the plant are edible, but the fresh leaves and the dried seeds are \
most commonly used in cooking.\n\n\
Coriander seeds are used as a spice in cooking and have a lemony citrus flavour when crushed.\n\n\
The leaves are called cilantro in North America.";

/// Answers with the question and records what it was given.
#[derive(Default)]
struct ScriptedGenerator {
    calls: AtomicUsize,
    last_context_len: AtomicUsize,
    last_chunk_count: AtomicUsize,
    condense_calls: AtomicUsize,
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, question: &str, context: &[Turn], chunks: &[Chunk]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_context_len.store(context.len(), Ordering::SeqCst);
        self.last_chunk_count.store(chunks.len(), Ordering::SeqCst);
        Ok(format!("answer to: {question}"))
    }

    async fn condense(&self, question: &str, context: &[Turn]) -> Result<String> {
        self.condense_calls.fetch_add(1, Ordering::SeqCst);
        let previous = context.last().map(|t| t.question.as_str()).unwrap_or_default();
        Ok(format!("{previous} {question}"))
    }
}

/// Fails every generation with the configured error.
struct FailingGenerator {
    kind: &'static str,
}

#[async_trait]
impl Generator for FailingGenerator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _: &str, _: &[Turn], _: &[Chunk]) -> Result<String> {
        match self.kind {
            "quota" => Err(RagError::GenerationError {
                provider: "failing".into(),
                message: "quota exceeded".into(),
            }),
            _ => Err(RagError::EmbeddingError {
                provider: "inner".into(),
                message: "transport closed".into(),
            }),
        }
    }
}

/// Never finishes within any reasonable timeout.
struct SlowGenerator;

#[async_trait]
impl Generator for SlowGenerator {
    fn name(&self) -> &str {
        "slow"
    }

    async fn generate(&self, _: &str, _: &[Turn], _: &[Chunk]) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("too late".into())
    }
}

/// Counts queries and optionally fails them.
struct CountingIndex {
    inner: InMemoryIndex,
    queries: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl EmbeddingIndex for CountingIndex {
    async fn build(&self, chunks: Vec<Chunk>) -> Result<usize> {
        self.inner.build(chunks).await
    }

    async fn query(&self, text: &str, k: usize) -> Result<Vec<SearchResult>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RagError::VectorStoreError {
                backend: "remote".into(),
                message: "connection refused".into(),
            });
        }
        self.inner.query(text, k).await
    }

    async fn is_built(&self) -> bool {
        self.inner.is_built().await
    }
}

/// Builds instantly but never answers a query in time.
struct SleepingIndex;

#[async_trait]
impl EmbeddingIndex for SleepingIndex {
    async fn build(&self, chunks: Vec<Chunk>) -> Result<usize> {
        Ok(chunks.len())
    }

    async fn query(&self, _: &str, _: usize) -> Result<Vec<SearchResult>> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }

    async fn is_built(&self) -> bool {
        true
    }
}

fn counting_index(fail: bool) -> Arc<CountingIndex> {
    Arc::new(CountingIndex {
        inner: InMemoryIndex::new(Arc::new(HashEmbeddingProvider::default())),
        queries: AtomicUsize::new(0),
        fail,
    })
}

fn config() -> RagConfig {
    RagConfig::builder().chunk_size(128).chunk_overlap(32).top_k(5).build().unwrap()
}

async fn pipeline_with(
    config: RagConfig,
    index: Arc<dyn EmbeddingIndex>,
    generator: Arc<dyn Generator>,
) -> QaPipeline {
    let pipeline =
        QaPipeline::builder().config(config).index(index).generator(generator).build().unwrap();
    pipeline.ingest(&Document::new("coriander", CORIANDER)).await.unwrap();
    pipeline
}

#[tokio::test]
async fn ask_returns_answer_and_ranked_sources() {
    let generator = Arc::new(ScriptedGenerator::default());
    let pipeline = pipeline_with(config(), counting_index(false), generator.clone()).await;

    let memory = ConversationMemory::new();
    let turn = pipeline.ask(&memory, "  what part of coriander is used as spice  ").await.unwrap();
    assert_eq!(pipeline.retriever().top_k(), 5);
    assert!(pipeline.retriever().index().is_built().await);

    assert_eq!(turn.question, "what part of coriander is used as spice");
    assert_eq!(turn.answer, "answer to: what part of coriander is used as spice");
    assert!(!turn.sources.is_empty());
    assert!(turn.sources.len() <= 5);
    assert_eq!(generator.last_chunk_count.load(Ordering::SeqCst), turn.sources.len());

    for (i, source) in turn.sources.iter().enumerate() {
        assert_eq!(source.rank, i + 1);
    }
    for pair in turn.sources.windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }
    assert!(memory.is_empty(), "ask must not mutate memory");
}

#[tokio::test]
async fn empty_question_is_rejected_before_retrieval_or_generation() {
    let index = counting_index(false);
    let generator = Arc::new(ScriptedGenerator::default());
    let pipeline = pipeline_with(config(), index.clone(), generator.clone()).await;

    for question in ["", "   ", "\n\t"] {
        let err = pipeline.ask(&ConversationMemory::new(), question).await.unwrap_err();
        assert!(matches!(err, RagError::InvalidQuestion(_)));
    }
    assert_eq!(index.queries.load(Ordering::SeqCst), 0);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unbuilt_index_is_reported_as_unavailable() {
    let pipeline = QaPipeline::builder()
        .config(config())
        .index(counting_index(false))
        .generator(Arc::new(ScriptedGenerator::default()))
        .build()
        .unwrap();

    let err = pipeline.ask(&ConversationMemory::new(), "coriander?").await.unwrap_err();
    assert!(matches!(err, RagError::IndexUnavailable(_)));
}

#[tokio::test]
async fn index_failures_are_classified_as_retrieval_errors() {
    let generator = Arc::new(ScriptedGenerator::default());
    let pipeline = pipeline_with(config(), counting_index(true), generator.clone()).await;

    let err = pipeline.ask(&ConversationMemory::new(), "coriander?").await.unwrap_err();
    assert!(matches!(err, RagError::RetrievalError(ref m) if m.contains("connection refused")));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn generation_failure_leaves_memory_untouched() {
    let pipeline = Arc::new(
        pipeline_with(config(), counting_index(false), Arc::new(FailingGenerator { kind: "quota" }))
            .await,
    );
    let mut conversation = Conversation::new(pipeline);

    let err = conversation.ask_and_commit("what is coriander").await.unwrap_err();
    assert!(matches!(
        err,
        RagError::GenerationError { ref message, .. } if message == "quota exceeded"
    ));
    assert_eq!(conversation.memory().len(), 0);
}

#[tokio::test]
async fn foreign_generator_errors_are_wrapped_as_generation_errors() {
    let pipeline =
        pipeline_with(config(), counting_index(false), Arc::new(FailingGenerator { kind: "other" }))
            .await;

    let err = pipeline.ask(&ConversationMemory::new(), "what is coriander").await.unwrap_err();
    match err {
        RagError::GenerationError { provider, message } => {
            assert_eq!(provider, "failing");
            assert!(message.contains("transport closed"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn slow_generation_times_out() {
    let config = RagConfig::builder()
        .chunk_size(128)
        .chunk_overlap(32)
        .generation_timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let pipeline = pipeline_with(config, counting_index(false), Arc::new(SlowGenerator)).await;

    let err = pipeline.ask(&ConversationMemory::new(), "what is coriander").await.unwrap_err();
    assert!(matches!(
        err,
        RagError::GenerationError { ref message, .. } if message.contains("timed out")
    ));
}

#[tokio::test(start_paused = true)]
async fn slow_retrieval_times_out_before_generation() {
    let config = RagConfig::builder()
        .chunk_size(128)
        .chunk_overlap(32)
        .retrieval_timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    let generator = Arc::new(ScriptedGenerator::default());
    let pipeline = pipeline_with(config, Arc::new(SleepingIndex), generator.clone()).await;

    let err = pipeline.ask(&ConversationMemory::new(), "what is coriander").await.unwrap_err();
    assert!(matches!(err, RagError::RetrievalError(ref m) if m.contains("timed out")));
    assert!(!err.is_fatal());
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn successful_ask_then_commit_grows_memory_by_one() {
    let generator = Arc::new(ScriptedGenerator::default());
    let pipeline =
        Arc::new(pipeline_with(config(), counting_index(false), generator.clone()).await);
    let mut conversation = Conversation::new(pipeline);

    let turn = conversation.ask("what is coriander").await.unwrap();
    assert_eq!(conversation.memory().len(), 0);
    conversation.commit(turn);
    assert_eq!(conversation.memory().len(), 1);

    conversation.ask_and_commit("what are its leaves called").await.unwrap();
    assert_eq!(conversation.memory().len(), 2);
    assert_eq!(generator.last_context_len.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn memory_window_limits_generation_context() {
    let config = RagConfig::builder()
        .chunk_size(128)
        .chunk_overlap(32)
        .memory_window(MemoryWindow::LastTurns(1))
        .build()
        .unwrap();
    let generator = Arc::new(ScriptedGenerator::default());
    let pipeline = Arc::new(pipeline_with(config, counting_index(false), generator.clone()).await);
    let mut conversation = Conversation::new(pipeline);

    for question in ["first question", "second question", "third question"] {
        conversation.ask_and_commit(question).await.unwrap();
    }
    assert_eq!(generator.last_context_len.load(Ordering::SeqCst), 1);
    assert_eq!(conversation.memory().turns().len(), 3);
}

#[tokio::test]
async fn follow_ups_are_condensed_only_when_enabled_and_history_exists() {
    let generator = Arc::new(ScriptedGenerator::default());
    let config = RagConfig::builder()
        .chunk_size(128)
        .chunk_overlap(32)
        .condense_follow_ups(true)
        .build()
        .unwrap();
    let pipeline = Arc::new(pipeline_with(config, counting_index(false), generator.clone()).await);
    let mut conversation = Conversation::new(pipeline);

    let first = conversation.ask_and_commit("what is coriander").await.unwrap();
    assert_eq!(generator.condense_calls.load(Ordering::SeqCst), 0);

    let second = conversation.ask_and_commit("and its seeds").await.unwrap();
    assert_eq!(generator.condense_calls.load(Ordering::SeqCst), 1);
    // Generation and scoring see the question as asked, not the rewrite.
    assert_eq!(second.question, "and its seeds");
    assert_eq!(second.answer, "answer to: and its seeds");
    assert_ne!(first.question, second.question);
}

#[tokio::test]
async fn builder_requires_index_and_generator() {
    let err = QaPipeline::builder().config(config()).build().err().unwrap();
    assert!(matches!(err, RagError::ConfigError(_)));

    let err = QaPipeline::builder()
        .config(config())
        .index(counting_index(false))
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, RagError::ConfigError(ref m) if m.contains("generator")));
}

#[tokio::test]
async fn empty_document_fails_ingest() {
    let pipeline = QaPipeline::builder()
        .config(config())
        .index(counting_index(false))
        .generator(Arc::new(ScriptedGenerator::default()))
        .build()
        .unwrap();
    let err = pipeline.ingest(&Document::new("empty", "")).await.unwrap_err();
    assert!(matches!(err, RagError::ChunkingError(_)));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn concurrent_conversations_share_one_index() {
    let generator = Arc::new(ScriptedGenerator::default());
    let pipeline = Arc::new(pipeline_with(config(), counting_index(false), generator).await);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let pipeline = pipeline.clone();
            tokio::spawn(async move {
                let mut conversation = Conversation::new(pipeline);
                conversation.ask_and_commit(&format!("coriander question {i}")).await.unwrap();
                conversation.memory().len()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), 1);
    }
}
