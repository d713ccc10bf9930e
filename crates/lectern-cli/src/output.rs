//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use lectern_extractor::{Answer, FlashcardDeck, LearningChunk, Material, Quiz};
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Longest cell shown in table output
const CELL_WIDTH: usize = 60;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format learning chunks.
    pub fn format_chunks(&self, chunks: &Material<Vec<LearningChunk>>) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(chunks);
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Title", "Time", "Content"]);
        for chunk in &chunks.value {
            builder.push_record([
                chunk.id.to_string(),
                chunk.title.clone(),
                chunk.estimated_time.clone(),
                clip(&chunk.content),
            ]);
        }
        Ok(self.table(builder))
    }

    /// Format a quiz.
    pub fn format_quiz(&self, quiz: &Material<Quiz>) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(quiz);
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Question", "Options", "Answer"]);
        for (idx, question) in quiz.value.questions.iter().enumerate() {
            let answer = match &question.answer {
                Answer::Choice(index) => question
                    .options
                    .get(*index)
                    .cloned()
                    .unwrap_or_else(|| index.to_string()),
                Answer::Flag(flag) => flag.to_string(),
                Answer::Text(text) => text.clone(),
            };
            builder.push_record([
                (idx + 1).to_string(),
                clip(&question.question),
                question.options.join(" | "),
                answer,
            ]);
        }
        Ok(self.table(builder))
    }

    /// Format a flashcard deck.
    pub fn format_flashcards(&self, deck: &Material<FlashcardDeck>) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(deck);
        }

        let mut builder = Builder::default();
        builder.push_record(["Front", "Back"]);
        for card in &deck.value.cards {
            builder.push_record([clip(&card.front), clip(&card.back)]);
        }
        Ok(self.table(builder))
    }

    /// Pretty-printed JSON.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Shorten long cell text to `CELL_WIDTH` characters.
fn clip(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= CELL_WIDTH {
        return flat;
    }
    let mut clipped: String = flat.chars().take(CELL_WIDTH - 1).collect();
    clipped.push('…');
    clipped
}
