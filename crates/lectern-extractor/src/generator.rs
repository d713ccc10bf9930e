//! Study material generation pipeline
//!
//! ```text
//! document ─► extract_relevant ─► PromptBuilder ─► ResilientClient ─► recover ─► parser
//!                                                        │                         │
//!                                                   NoResponse               no records
//!                                                        └──────► fallback ◄───────┘
//! ```

use crate::error::ExtractorError;
use crate::fallback;
use crate::parser::{parse_chunks, parse_flashcards, parse_questions};
use crate::prompt::{chat_prompt, simplify_prompt, PromptBuilder};
use crate::recover::{recover, recover_object, recover_with_tier, Record};
use crate::select::extract_relevant;
use crate::types::{FlashcardDeck, LearningChunk, Material, Quiz};
use crate::ExtractorConfig;
use lectern_llm::{CancelToken, ResilientClient, TextGenerator};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Produces study material from documents through a resilient upstream client
pub struct MaterialGenerator<G> {
    client: ResilientClient<G>,
    config: ExtractorConfig,
}

impl<G> MaterialGenerator<G>
where
    G: TextGenerator,
{
    /// Create a new generator
    pub fn new(client: ResilientClient<G>, config: ExtractorConfig) -> Self {
        Self { client, config }
    }

    /// The underlying client
    pub fn client(&self) -> &ResilientClient<G> {
        &self.client
    }

    /// Extraction settings in use
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Learning chunks about `topic`, drawn from the relevant part of `document`
    pub async fn learning_chunks(
        &self,
        document: &str,
        topic: &str,
    ) -> Result<Material<Vec<LearningChunk>>, ExtractorError> {
        self.learning_chunks_with_cancel(document, topic, &CancelToken::never())
            .await
    }

    /// [`Self::learning_chunks`], abandoned once `cancel` fires
    pub async fn learning_chunks_with_cancel(
        &self,
        document: &str,
        topic: &str,
        cancel: &CancelToken,
    ) -> Result<Material<Vec<LearningChunk>>, ExtractorError> {
        let content = extract_relevant(document, topic, &self.config);
        info!(
            "Generating learning chunks for '{}' from {} of {} chars",
            topic.trim(),
            content.chars().count(),
            document.chars().count()
        );

        let prompt = PromptBuilder::new(topic, self.config.prompt_preview_chars)
            .learning_chunks(&content);

        let Some(text) = self.generate(&prompt, cancel).await? else {
            warn!("No response for learning chunks, using fallback");
            return Ok(Material::fallback(fallback::chunks(topic)));
        };

        let recovery = recover_with_tier(&text);
        debug!(
            "Recovered {} records ({})",
            recovery.records.len(),
            recovery.tier.as_str()
        );

        let chunks = parse_chunks(recovery.records);
        if chunks.is_empty() {
            warn!("No usable learning chunks in response, using fallback");
            return Ok(Material::fallback(fallback::chunks(topic)));
        }

        Ok(Material::generated(chunks))
    }

    /// Up to `question_count` quiz questions about `topic`
    pub async fn quiz(
        &self,
        content: &str,
        topic: &str,
        question_count: usize,
    ) -> Result<Material<Quiz>, ExtractorError> {
        self.quiz_with_cancel(content, topic, question_count, &CancelToken::never())
            .await
    }

    /// [`Self::quiz`], abandoned once `cancel` fires
    pub async fn quiz_with_cancel(
        &self,
        content: &str,
        topic: &str,
        question_count: usize,
        cancel: &CancelToken,
    ) -> Result<Material<Quiz>, ExtractorError> {
        let prompt = PromptBuilder::new(topic, self.config.prompt_preview_chars)
            .quiz(content, question_count);

        let questions = match self.generate(&prompt, cancel).await? {
            Some(text) => parse_questions(payload_records(&text, "questions")),
            None => Vec::new(),
        };

        if questions.is_empty() {
            warn!("No usable quiz questions, using fallback");
            return Ok(Material::fallback(fallback::quiz(topic, question_count)));
        }
        if questions.len() < question_count {
            warn!(
                "Generated {} questions, expected {}",
                questions.len(),
                question_count
            );
        }

        Ok(Material::generated(Quiz {
            questions: questions.into_iter().take(question_count).collect(),
        }))
    }

    /// Up to `card_count` flashcards about `topic`
    pub async fn flashcards(
        &self,
        content: &str,
        topic: &str,
        card_count: usize,
    ) -> Result<Material<FlashcardDeck>, ExtractorError> {
        self.flashcards_with_cancel(content, topic, card_count, &CancelToken::never())
            .await
    }

    /// [`Self::flashcards`], abandoned once `cancel` fires
    pub async fn flashcards_with_cancel(
        &self,
        content: &str,
        topic: &str,
        card_count: usize,
        cancel: &CancelToken,
    ) -> Result<Material<FlashcardDeck>, ExtractorError> {
        let prompt = PromptBuilder::new(topic, self.config.prompt_preview_chars)
            .flashcards(content, card_count);

        let cards = match self.generate(&prompt, cancel).await? {
            Some(text) => parse_flashcards(payload_records(&text, "flashcards")),
            None => Vec::new(),
        };

        if cards.is_empty() {
            warn!("No usable flashcards, using fallback");
            return Ok(Material::fallback(fallback::flashcards(topic, card_count)));
        }

        Ok(Material::generated(FlashcardDeck {
            cards: cards.into_iter().take(card_count).collect(),
        }))
    }

    /// An easier-to-read HTML rendition of `content`; `content` itself when nothing comes back
    pub async fn simplify(&self, content: &str) -> Result<String, ExtractorError> {
        self.simplify_with_cancel(content, &CancelToken::never()).await
    }

    /// [`Self::simplify`], abandoned once `cancel` fires
    pub async fn simplify_with_cancel(
        &self,
        content: &str,
        cancel: &CancelToken,
    ) -> Result<String, ExtractorError> {
        let simplified = self
            .generate(&simplify_prompt(content), cancel)
            .await?
            .map(|text| strip_code_fences(&text))
            .unwrap_or_default();

        if simplified.is_empty() {
            warn!("Simplification produced nothing, returning original content");
            return Ok(content.to_string());
        }
        Ok(simplified)
    }

    /// Tutor reply to `message` given the study `context`
    pub async fn chat(&self, message: &str, context: &str) -> Result<String, ExtractorError> {
        self.chat_with_cancel(message, context, &CancelToken::never())
            .await
    }

    /// [`Self::chat`], abandoned once `cancel` fires
    pub async fn chat_with_cancel(
        &self,
        message: &str,
        context: &str,
        cancel: &CancelToken,
    ) -> Result<String, ExtractorError> {
        let reply = self.generate(&chat_prompt(message, context), cancel).await?;
        Ok(reply
            .map(|text| text.trim().to_string())
            .unwrap_or_else(|| fallback::CHAT_UNAVAILABLE.to_string()))
    }

    /// Free-form summary for a caller-built `prompt`
    pub async fn summary(&self, prompt: &str) -> Result<String, ExtractorError> {
        self.summary_with_cancel(prompt, &CancelToken::never()).await
    }

    /// [`Self::summary`], abandoned once `cancel` fires
    pub async fn summary_with_cancel(
        &self,
        prompt: &str,
        cancel: &CancelToken,
    ) -> Result<String, ExtractorError> {
        let reply = self.generate(prompt, cancel).await?;
        Ok(reply
            .map(|text| text.trim().to_string())
            .unwrap_or_else(|| fallback::SUMMARY_UNAVAILABLE.to_string()))
    }

    async fn generate(
        &self,
        prompt: &str,
        cancel: &CancelToken,
    ) -> Result<Option<String>, ExtractorError> {
        let generation = self.client.invoke_with_cancel(prompt, cancel).await?;
        Ok(generation.into_text())
    }
}

/// Records under `key` of a `{key: [...]}` payload, salvaging the array when the object is broken
fn payload_records(text: &str, key: &str) -> Vec<Record> {
    if let Some(object) = recover_object(text) {
        if let Some(Value::Array(items)) = object.get(key) {
            return items
                .iter()
                .filter_map(|item| item.as_object().cloned())
                .collect();
        }
    }

    debug!("No '{}' object in response, salvaging records", key);
    recover(text)
}

/// Drop markdown fence lines and surrounding whitespace
fn strip_code_fences(text: &str) -> String {
    let kept: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !matches!(*line, "```" | "```html" | "```HTML"))
        .collect();

    let joined = kept.join("\n");
    let mut result = joined.trim();
    if let Some(rest) = result.strip_prefix("```") {
        result = rest.trim();
    }
    if let Some(rest) = result.strip_suffix("```") {
        result = rest.trim();
    }
    result.to_string()
}
