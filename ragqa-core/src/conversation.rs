//! A conversation session: pipeline plus the memory it reads from.

use std::sync::Arc;

use tracing::debug;

use crate::document::Turn;
use crate::error::Result;
use crate::memory::ConversationMemory;
use crate::pipeline::QaPipeline;

/// One conversation over a shared [`QaPipeline`].
///
/// Answering is a two-step contract: [`ask`](Conversation::ask) produces a
/// [`Turn`] without mutating memory, and [`commit`](Conversation::commit)
/// appends it. A failed `ask` therefore never reaches the committed history.
/// Taking `&mut self` to commit keeps turns strictly ordered within a session.
pub struct Conversation {
    pipeline: Arc<QaPipeline>,
    memory: ConversationMemory,
}

impl Conversation {
    /// Start a session using the pipeline's configured memory window.
    pub fn new(pipeline: Arc<QaPipeline>) -> Self {
        let memory = ConversationMemory::with_window(pipeline.config().memory_window);
        Self { pipeline, memory }
    }

    /// Answer a question against the current memory without recording it.
    pub async fn ask(&self, question: &str) -> Result<Turn> {
        self.pipeline.ask(&self.memory, question).await
    }

    /// Record a completed turn.
    pub fn commit(&mut self, turn: Turn) {
        debug!(turn = self.memory.len() + 1, "committing turn");
        self.memory.append(turn);
    }

    /// Ask and, on success, commit. Returns a copy of the committed turn.
    pub async fn ask_and_commit(&mut self, question: &str) -> Result<Turn> {
        let turn = self.ask(question).await?;
        self.commit(turn.clone());
        Ok(turn)
    }

    /// The session's memory.
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }
}
