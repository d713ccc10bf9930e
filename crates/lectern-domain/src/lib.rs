//! Lectern Domain Layer
//!
//! Core vocabulary for turning long study documents into topic-focused
//! material. It has no external runtime dependencies and performs no I/O:
//! everything here is a pure value or a pure function over borrowed text.
//!
//! ## Key Concepts
//!
//! - **Keyword Set**: normalised tokens derived from a user topic
//! - **Section**: a header-delimited chunk of a document
//! - **Relevance**: keyword-frequency scoring with a header bonus
//!
//! ## Architecture
//!
//! Infrastructure (segmentation, the upstream text generator, the response
//! parser, study-material types, the CLI) lives in other crates and depends
//! on this one, never the reverse.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod keywords;
pub mod relevance;
pub mod section;

// Re-exports for convenience
pub use keywords::KeywordSet;
pub use relevance::{score, score_sections, HEADER_BONUS};
pub use section::{ScoredSection, Section};
