//! OpenAI-compatible chat-completions generator.
//!
//! Defaults target DeepSeek's `deepseek-chat` model; any server speaking the
//! `/chat/completions` protocol works via [`ChatCompletionGenerator::with_base_url`].
//!
//! This module is only available when the `openai` feature is enabled.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::document::{Chunk, Turn};
use crate::error::{RagError, Result};
use crate::generation::Generator;
use crate::openai::error_detail;
use crate::prompt::{ANSWER_SYSTEM_PROMPT, build_answer_prompt, build_condense_prompt};

/// DeepSeek's OpenAI-compatible API base URL.
pub const DEEPSEEK_API_BASE: &str = "https://api.deepseek.com/v1";

/// The default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "deepseek-chat";

/// A [`Generator`] that calls an OpenAI-compatible chat-completions endpoint.
///
/// # Example
///
/// ```rust,ignore
/// use ragqa_core::chat::ChatCompletionGenerator;
///
/// let generator = ChatCompletionGenerator::new(api_key)?.with_temperature(0.2);
/// ```
pub struct ChatCompletionGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl ChatCompletionGenerator {
    /// Create a generator for the DeepSeek API with the given key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::ConfigError("API key must not be empty".to_string()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEEPSEEK_API_BASE.to_string(),
            model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: 0.0,
        })
    }

    /// Point the generator at a different OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Apply a transport-level timeout to every request.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the HTTP client cannot be built.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RagError::ConfigError(format!("failed to build HTTP client: {e}")))?;
        Ok(self)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn generation_error(&self, message: String) -> RagError {
        RagError::GenerationError { provider: self.model.clone(), message }
    }

    async fn complete(&self, messages: Vec<ChatMessage<'_>>) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            stream: false,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(provider = %self.model, error = %e, "request failed");
                let kind = if e.is_timeout() { "request timed out" } else { "request failed" };
                self.generation_error(format!("{kind}: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(provider = %self.model, %status, "API error");
            let detail = error_detail(body);
            return Err(self.generation_error(format!("API returned {status}: {detail}")));
        }

        let completion: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = %self.model, error = %e, "failed to parse response");
            self.generation_error(format!("failed to parse response: {e}"))
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| self.generation_error("response contained no message content".into()))?;

        debug!(provider = %self.model, answer_len = content.len(), "completion received");
        Ok(content.trim().to_string())
    }
}

// ── API request/response types ─────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: std::borrow::Cow<'a, str>,
}

impl<'a> ChatMessage<'a> {
    fn system(content: &'a str) -> Self {
        Self { role: "system", content: content.into() }
    }

    fn user(content: String) -> Self {
        Self { role: "user", content: content.into() }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

// ── Generator implementation ───────────────────────────────────────

#[async_trait]
impl Generator for ChatCompletionGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, question: &str, context: &[Turn], chunks: &[Chunk]) -> Result<String> {
        debug!(
            provider = %self.model,
            chunk_count = chunks.len(),
            context_turns = context.len(),
            "generating answer"
        );
        self.complete(vec![
            ChatMessage::system(ANSWER_SYSTEM_PROMPT),
            ChatMessage::user(build_answer_prompt(question, context, chunks)),
        ])
        .await
    }

    async fn condense(&self, question: &str, context: &[Turn]) -> Result<String> {
        if context.is_empty() {
            return Ok(question.to_string());
        }
        let standalone =
            self.complete(vec![ChatMessage::user(build_condense_prompt(question, context))]).await?;
        if standalone.is_empty() { Ok(question.to_string()) } else { Ok(standalone) }
    }
}
