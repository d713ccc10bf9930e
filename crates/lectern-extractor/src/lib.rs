//! Lectern Extractor
//!
//! Turns long study documents into topic-focused study material.
//!
//! # Overview
//!
//! Documents are usually far larger than a single generation request may be,
//! and generated answers are frequently cut off or not quite valid JSON. The
//! extractor handles both ends of the exchange:
//!
//! - **Relevance extraction**: split a document into sections, score them
//!   against a topic and assemble the best ones within a character budget
//! - **Chapter extraction**: pull a named chapter or unit out of a document
//! - **Structured recovery**: read as many records as possible out of fenced,
//!   truncated or malformed responses
//! - **Material generation**: learning chunks, quizzes, flashcards and more,
//!   with static fallback material when generation yields nothing usable
//!
//! # Architecture
//!
//! ```text
//! Document → segment → score → select → prompt → ResilientClient → recover → typed material
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use lectern_extractor::{ExtractorConfig, MaterialGenerator};
//! use lectern_llm::{LlmConfig, MockProvider, ResilientClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm_config = LlmConfig::default();
//! let client = ResilientClient::new(
//!     MockProvider::new(r#"[{"id":1,"title":"Joins","content":"<p>rows</p>","estimated_time":"6min"}]"#),
//!     llm_config.governor(),
//!     llm_config.retry_policy(),
//! );
//! let generator = MaterialGenerator::new(client, ExtractorConfig::default());
//!
//! let chunks = generator
//!     .learning_chunks("JOINS\nAn INNER JOIN combines rows.", "joins")
//!     .await?;
//! println!("{} chunks ({:?})", chunks.value.len(), chunks.origin);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod chapter;
mod config;
mod error;
pub mod fallback;
mod generator;
mod parser;
mod prompt;
mod recover;
mod segment;
mod select;
mod types;


pub use chapter::{extract_chapter, CHAPTER_MARKERS};
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use generator::MaterialGenerator;
pub use parser::{parse_chunks, parse_flashcards, parse_questions};
pub use prompt::{chat_prompt, simplify_prompt, PromptBuilder};
pub use recover::{recover, recover_object, recover_with_tier, Record, Recovery, RecoveryTier};
pub use segment::{is_header, segment};
pub use select::{extract_relevant, select};
pub use types::{
    Answer, Flashcard, FlashcardDeck, LearningChunk, Material, MaterialOrigin, QuestionKind,
    Quiz, QuizQuestion,
};
