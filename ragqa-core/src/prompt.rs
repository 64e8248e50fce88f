//! Prompt templates for grounded answering and follow-up condensing.

use crate::document::{Chunk, Turn};

/// Render retrieved chunks as numbered context blocks.
pub fn build_context(chunks: &[Chunk]) -> String {
    let mut context = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        context.push_str(&format!("[{}] {}\n\n---\n\n", i + 1, chunk.text.trim()));
    }
    context
}

/// Render prior turns as a plain-text transcript.
pub fn build_history(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|t| format!("Human: {}\nAssistant: {}", t.question, t.answer))
        .collect::<Vec<_>>()
        .join("\n")
}

/// System instruction for grounded answers.
pub const ANSWER_SYSTEM_PROMPT: &str = "Use the following pieces of context to answer the \
user's question. If you don't know the answer, just say that you don't know, don't try to \
make up an answer.";

/// Build the user message for a grounded answer.
pub fn build_answer_prompt(question: &str, context: &[Turn], chunks: &[Chunk]) -> String {
    let mut prompt = String::new();
    if !context.is_empty() {
        prompt.push_str("Conversation so far:\n");
        prompt.push_str(&build_history(context));
        prompt.push_str("\n\n");
    }
    prompt.push_str("Context:\n");
    prompt.push_str(&build_context(chunks));
    prompt.push_str(&format!("Question: {question}\n\nAnswer:"));
    prompt
}

/// Build the prompt that turns a follow-up into a standalone question.
pub fn build_condense_prompt(question: &str, context: &[Turn]) -> String {
    format!(
        r#"Given the following conversation and a follow up question, rephrase the follow up question to be a standalone question, in its original language.

Chat History:
{history}
Follow Up Input: {question}
Standalone question:"#,
        history = build_history(context),
    )
}
