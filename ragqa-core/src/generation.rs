//! The text-generation capability the pipeline delegates answers to.

use async_trait::async_trait;

use crate::document::{Chunk, Turn};
use crate::error::Result;

/// A language-model backend that composes answers from retrieved chunks.
///
/// Implementations are expected to ground the answer in `chunks`; the
/// pipeline does not enforce grounding. Failures (transport, quota, timeout)
/// should be reported as
/// [`RagError::GenerationError`](crate::error::RagError::GenerationError).
///
/// # Example
///
/// ```rust,ignore
/// use ragqa_core::{Chunk, Generator, Turn};
///
/// struct Echo;
///
/// #[async_trait::async_trait]
/// impl Generator for Echo {
///     fn name(&self) -> &str { "echo" }
///
///     async fn generate(
///         &self,
///         question: &str,
///         _: &[Turn],
///         _: &[Chunk],
///     ) -> ragqa_core::Result<String> {
///         Ok(question.to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait Generator: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Answer `question` given prior `context` turns and retrieved `chunks`.
    async fn generate(&self, question: &str, context: &[Turn], chunks: &[Chunk])
    -> Result<String>;

    /// Rewrite a follow-up question into a standalone search query.
    ///
    /// The default implementation returns the question unchanged.
    async fn condense(&self, question: &str, _context: &[Turn]) -> Result<String> {
        Ok(question.to_string())
    }
}
