//! Append-only conversation memory.

use serde::{Deserialize, Serialize};

use crate::config::MemoryWindow;
use crate::document::Turn;

/// The turns of one conversation session, oldest first.
///
/// Turns are only ever appended. The [`MemoryWindow`] limits how many of
/// them [`as_context`](ConversationMemory::as_context) hands to generation;
/// turns outside the window stay in [`turns`](ConversationMemory::turns).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConversationMemory {
    turns: Vec<Turn>,
    window: MemoryWindow,
}

impl ConversationMemory {
    /// Create empty, unbounded memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty memory with a context window.
    pub fn with_window(window: MemoryWindow) -> Self {
        Self { turns: Vec::new(), window }
    }

    /// Append a completed turn.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// The turns supplied as context to the next question, oldest first.
    pub fn as_context(&self) -> &[Turn] {
        match self.window {
            MemoryWindow::Unbounded => &self.turns,
            MemoryWindow::LastTurns(n) => &self.turns[self.turns.len().saturating_sub(n)..],
        }
    }

    /// Every turn ever appended, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The most recent turn.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Number of turns recorded.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether no turn has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(n: usize) -> Turn {
        Turn::new(format!("question {n}"), format!("answer {n}"), Vec::new())
    }

    #[test]
    fn starts_empty_and_grows_by_one() {
        let mut memory = ConversationMemory::new();
        assert!(memory.is_empty());
        assert!(memory.as_context().is_empty());

        memory.append(turn(1));
        assert!(!memory.is_empty());
        assert_eq!(memory.len(), 1);
        assert_eq!(memory.last().unwrap().question, "question 1");
    }

    #[test]
    fn context_is_chronological() {
        let mut memory = ConversationMemory::new();
        for n in 1..=3 {
            memory.append(turn(n));
        }
        let questions: Vec<&str> =
            memory.as_context().iter().map(|t| t.question.as_str()).collect();
        assert_eq!(questions, vec!["question 1", "question 2", "question 3"]);
    }

    #[test]
    fn window_excludes_old_turns_without_deleting_them() {
        let mut memory = ConversationMemory::with_window(MemoryWindow::LastTurns(2));
        for n in 1..=5 {
            memory.append(turn(n));
        }
        let context: Vec<&str> = memory.as_context().iter().map(|t| t.question.as_str()).collect();
        assert_eq!(context, vec!["question 4", "question 5"]);
        assert_eq!(memory.turns().len(), 5);
        assert_eq!(memory.turns()[0].question, "question 1");
    }

    #[test]
    fn zero_window_supplies_no_context() {
        let mut memory = ConversationMemory::with_window(MemoryWindow::LastTurns(0));
        memory.append(turn(1));
        assert!(memory.as_context().is_empty());
        assert_eq!(memory.len(), 1);
    }
}
