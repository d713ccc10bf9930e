//! Study material types

use serde::{Deserialize, Serialize};

/// One section of generated learning material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningChunk {
    /// 1-based position in the lesson
    pub id: u32,

    /// Short title
    pub title: String,

    /// HTML body
    pub content: String,

    /// Reading time, e.g. `"6min"`
    pub estimated_time: String,

    /// Learning objectives, when the source provides them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objectives: Vec<String>,
}

/// Kind of quiz question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Pick one of several options
    MultipleChoice,
    /// Supply the missing term
    FillBlank,
    /// Judge a statement
    TrueFalse,
}

/// The correct answer to a quiz question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// Index into the question's options
    Choice(usize),
    /// True/false verdict
    Flag(bool),
    /// Expected text
    Text(String),
}

/// A single quiz question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Question kind
    #[serde(rename = "type")]
    pub kind: QuestionKind,

    /// Question text
    pub question: String,

    /// Options for multiple choice questions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    /// Correct answer
    #[serde(rename = "correct")]
    pub answer: Answer,

    /// Why the answer is correct
    #[serde(default)]
    pub explanation: String,
}

impl QuizQuestion {
    /// Check that the answer fits the question kind
    pub fn validate(&self) -> Result<(), String> {
        if self.question.trim().is_empty() {
            return Err("Question text is empty".to_string());
        }

        match (self.kind, &self.answer) {
            (QuestionKind::MultipleChoice, Answer::Choice(index)) => {
                if self.options.len() < 2 {
                    return Err(format!(
                        "Multiple choice question has {} options",
                        self.options.len()
                    ));
                }
                if *index >= self.options.len() {
                    return Err(format!(
                        "Answer index {} out of range for {} options",
                        index,
                        self.options.len()
                    ));
                }
                Ok(())
            }
            (QuestionKind::MultipleChoice, other) => {
                Err(format!("Multiple choice answer must be an index, got {:?}", other))
            }
            (QuestionKind::TrueFalse, Answer::Flag(_)) => Ok(()),
            (QuestionKind::TrueFalse, Answer::Text(text))
                if matches!(text.trim().to_lowercase().as_str(), "true" | "false") =>
            {
                Ok(())
            }
            (QuestionKind::TrueFalse, other) => {
                Err(format!("True/false answer must be true or false, got {:?}", other))
            }
            (QuestionKind::FillBlank, Answer::Text(text)) if !text.trim().is_empty() => Ok(()),
            (QuestionKind::FillBlank, other) => {
                Err(format!("Fill-in answer must be non-empty text, got {:?}", other))
            }
        }
    }
}

/// A set of quiz questions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    /// Questions in presentation order
    pub questions: Vec<QuizQuestion>,
}

/// A two-sided study card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    /// Prompt side
    pub front: String,

    /// Answer side
    pub back: String,
}

/// A set of flashcards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashcardDeck {
    /// Cards in presentation order
    #[serde(rename = "flashcards")]
    pub cards: Vec<Flashcard>,
}

/// Where a piece of material came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialOrigin {
    /// Produced by the text generator
    Generated,
    /// Static stand-in used when generation yielded nothing usable
    Fallback,
}

/// Study material tagged with its origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material<T> {
    /// The material itself
    pub value: T,

    /// Where it came from
    pub origin: MaterialOrigin,
}

impl<T> Material<T> {
    /// Wrap generated material
    pub fn generated(value: T) -> Self {
        Self {
            value,
            origin: MaterialOrigin::Generated,
        }
    }

    /// Wrap fallback material
    pub fn fallback(value: T) -> Self {
        Self {
            value,
            origin: MaterialOrigin::Fallback,
        }
    }

    /// Whether this is static fallback material
    pub fn is_fallback(&self) -> bool {
        self.origin == MaterialOrigin::Fallback
    }

    /// Discard the origin
    pub fn into_inner(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(kind: QuestionKind, options: &[&str], answer: Answer) -> QuizQuestion {
        QuizQuestion {
            kind,
            question: "Q?".to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            answer,
            explanation: String::new(),
        }
    }

    #[test]
    fn test_quiz_question_wire_format() {
        let value = json!({
            "type": "multiple_choice",
            "question": "Which command reads rows?",
            "options": ["SELECT", "DROP"],
            "correct": 0,
            "explanation": "SELECT reads."
        });
        let parsed: QuizQuestion = serde_json::from_value(value.clone()).unwrap();

        assert_eq!(parsed.kind, QuestionKind::MultipleChoice);
        assert_eq!(parsed.answer, Answer::Choice(0));
        assert_eq!(serde_json::to_value(&parsed).unwrap(), value);
    }

    #[test]
    fn test_answer_variants() {
        let flag: Answer = serde_json::from_value(json!(true)).unwrap();
        let text: Answer = serde_json::from_value(json!("resource")).unwrap();
        assert_eq!(flag, Answer::Flag(true));
        assert_eq!(text, Answer::Text("resource".into()));
    }

    #[test]
    fn test_validate_multiple_choice() {
        assert!(question(QuestionKind::MultipleChoice, &["a", "b"], Answer::Choice(1))
            .validate()
            .is_ok());
        assert!(question(QuestionKind::MultipleChoice, &["a", "b"], Answer::Choice(2))
            .validate()
            .is_err());
        assert!(question(QuestionKind::MultipleChoice, &["a"], Answer::Choice(0))
            .validate()
            .is_err());
        assert!(question(QuestionKind::MultipleChoice, &["a", "b"], Answer::Text("a".into()))
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_true_false_and_fill_blank() {
        assert!(question(QuestionKind::TrueFalse, &[], Answer::Text("True".into()))
            .validate()
            .is_ok());
        assert!(question(QuestionKind::TrueFalse, &[], Answer::Flag(false))
            .validate()
            .is_ok());
        assert!(question(QuestionKind::TrueFalse, &[], Answer::Text("maybe".into()))
            .validate()
            .is_err());
        assert!(question(QuestionKind::FillBlank, &[], Answer::Text(" ".into()))
            .validate()
            .is_err());
    }

    #[test]
    fn test_deck_uses_flashcards_key() {
        let deck = FlashcardDeck {
            cards: vec![Flashcard {
                front: "ACID".into(),
                back: "Atomicity, Consistency, Isolation, Durability".into(),
            }],
        };
        let value = serde_json::to_value(&deck).unwrap();
        assert!(value["flashcards"].is_array());
    }

    #[test]
    fn test_material_origin() {
        let material = Material::fallback(3);
        assert!(material.is_fallback());
        assert_eq!(material.into_inner(), 3);
        assert!(!Material::generated("x").is_fallback());
    }
}
