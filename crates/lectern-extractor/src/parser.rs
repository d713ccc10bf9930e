//! Convert recovered records into typed study material
//!
//! Records that do not fit the expected shape are skipped with a warning;
//! conversion never fails as a whole.

use crate::recover::Record;
use crate::types::{Flashcard, LearningChunk, QuizQuestion};
use serde_json::Value;
use tracing::warn;

/// Convert records into learning chunks
pub fn parse_chunks(records: Vec<Record>) -> Vec<LearningChunk> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(idx, record)| match parse_chunk(&record, idx + 1) {
            Ok(chunk) => Some(chunk),
            Err(e) => {
                warn!("Failed to parse chunk {}: {}", idx, e);
                None
            }
        })
        .collect()
}

/// Convert records into validated quiz questions
pub fn parse_questions(records: Vec<Record>) -> Vec<QuizQuestion> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(idx, record)| {
            let question: QuizQuestion = match serde_json::from_value(Value::Object(record)) {
                Ok(question) => question,
                Err(e) => {
                    warn!("Failed to parse question {}: {}", idx, e);
                    return None;
                }
            };
            if let Err(e) = question.validate() {
                warn!("Question {} failed validation: {}", idx, e);
                return None;
            }
            Some(question)
        })
        .collect()
}

/// Convert records into flashcards
pub fn parse_flashcards(records: Vec<Record>) -> Vec<Flashcard> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(idx, record)| {
            let front = non_empty_str(&record, "front");
            let back = non_empty_str(&record, "back");
            match (front, back) {
                (Some(front), Some(back)) => Some(Flashcard { front, back }),
                _ => {
                    warn!("Failed to parse flashcard {}: missing 'front' or 'back'", idx);
                    None
                }
            }
        })
        .collect()
}

/// Parse a single chunk; `position` (1-based) stands in for a missing id
fn parse_chunk(record: &Record, position: usize) -> Result<LearningChunk, String> {
    let title = non_empty_str(record, "title")
        .ok_or_else(|| "Missing or invalid 'title'".to_string())?;

    let content = non_empty_str(record, "content")
        .ok_or_else(|| "Missing or invalid 'content'".to_string())?;

    let id = match record.get("id") {
        None | Some(Value::Null) => u32::try_from(position).unwrap_or(u32::MAX),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| format!("Invalid 'id': {}", n))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("Invalid 'id': {:?}", s))?,
        Some(other) => return Err(format!("Invalid 'id': {}", other)),
    };

    let estimated_time = match record.get("estimated_time") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => format!("{}min", n),
        _ => "5min".to_string(),
    };

    let objectives = record
        .get("objectives")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(LearningChunk {
        id,
        title,
        content,
        estimated_time,
        objectives,
    })
}

fn non_empty_str(record: &Record, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
