//! Static study material used when generation yields nothing usable

use crate::types::{Answer, Flashcard, FlashcardDeck, LearningChunk, QuestionKind, Quiz, QuizQuestion};

/// Reply to a chat message when the upstream never answered
pub const CHAT_UNAVAILABLE: &str =
    "I'm currently experiencing rate limits. Please wait a moment and try again.";

/// Reply to a summary request when the upstream never answered
pub const SUMMARY_UNAVAILABLE: &str =
    "Unable to generate summary at this time. Please try again later.";

/// A single introductory chunk
pub fn chunks(topic: &str) -> Vec<LearningChunk> {
    let topic = topic.trim();
    vec![LearningChunk {
        id: 1,
        title: format!("Introduction to {}", topic),
        content: format!(
            "<h3>Welcome to {}</h3><p>This is an introduction to your learning material.</p>",
            topic
        ),
        estimated_time: "5 minutes".to_string(),
        objectives: vec!["Get familiar with the topic".to_string()],
    }]
}

/// Up to five general questions about `topic`
pub fn quiz(topic: &str, question_count: usize) -> Quiz {
    let topic = topic.trim();
    let choice = |question: String, options: [&str; 4], explanation: String| QuizQuestion {
        kind: QuestionKind::MultipleChoice,
        question,
        options: options.iter().map(|o| o.to_string()).collect(),
        answer: Answer::Choice(0),
        explanation,
    };
    let open = |kind: QuestionKind, question: String, answer: &str, explanation: &str| QuizQuestion {
        kind,
        question,
        options: Vec::new(),
        answer: Answer::Text(answer.to_string()),
        explanation: explanation.to_string(),
    };

    let questions = vec![
        choice(
            format!("What is the primary purpose of {}?", topic),
            [
                "Data storage and management",
                "User interface design",
                "Network communication",
                "File compression",
            ],
            format!("{} is primarily used for managing and organizing data efficiently.", topic),
        ),
        open(
            QuestionKind::FillBlank,
            format!("_____ is a fundamental concept in {}.", topic),
            "Data structure",
            "Understanding data structures is essential for working effectively with this topic.",
        ),
        open(
            QuestionKind::TrueFalse,
            format!("{} requires understanding of basic programming concepts.", topic),
            "true",
            "Most technical topics build on fundamental programming knowledge.",
        ),
        choice(
            format!("Which of these is a key feature of {}?", topic),
            [
                "Scalability and performance",
                "Color schemes",
                "Audio processing",
                "Image rendering",
            ],
            "Scalability and performance are crucial considerations in most technical systems."
                .to_string(),
        ),
        open(
            QuestionKind::FillBlank,
            format!("Best practices in {} include proper _____ management.", topic),
            "resource",
            "Efficient resource management is a key best practice in technical implementations.",
        ),
    ];

    Quiz {
        questions: questions.into_iter().take(question_count).collect(),
    }
}

/// Up to ten general flashcards about `topic`
pub fn flashcards(topic: &str, card_count: usize) -> FlashcardDeck {
    let topic = topic.trim();
    let cards = [
        (
            format!("What is {}?", topic),
            format!("{} is a system/concept used for organizing, managing, and processing data or information efficiently.", topic),
        ),
        (
            "Core components".to_string(),
            format!("The main components of {} include data structures, algorithms, and implementation patterns that work together.", topic),
        ),
        (
            "Primary use cases".to_string(),
            format!("{} is commonly used in applications requiring data management, processing, and retrieval operations.", topic),
        ),
        (
            "Key advantages".to_string(),
            "Benefits include improved efficiency, better organization, scalability, and easier maintenance of systems.".to_string(),
        ),
        (
            "Common operations".to_string(),
            "Typical operations include creating, reading, updating, and deleting data (CRUD operations).".to_string(),
        ),
        (
            "Best practices".to_string(),
            "Follow established patterns, maintain clean code, optimize for performance, and document your implementation.".to_string(),
        ),
        (
            "Performance considerations".to_string(),
            "Consider factors like time complexity, space complexity, scalability, and resource utilization.".to_string(),
        ),
        (
            "Common challenges".to_string(),
            "Challenges include handling large datasets, maintaining data integrity, ensuring security, and optimizing queries.".to_string(),
        ),
        (
            "Integration patterns".to_string(),
            format!("{} can be integrated with other systems through APIs, libraries, and standard protocols.", topic),
        ),
        (
            "Learning path".to_string(),
            "Start with fundamentals, practice with examples, build projects, and gradually tackle advanced concepts.".to_string(),
        ),
    ];

    FlashcardDeck {
        cards: cards
            .into_iter()
            .take(card_count)
            .map(|(front, back)| Flashcard { front, back })
            .collect(),
    }
}
