//! Material generation commands (chunks, quiz, flashcards).

use crate::cli::GenerateArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use lectern_extractor::{extract_relevant, MaterialGenerator};
use lectern_llm::{CancelToken, GeminiProvider, ResilientClient, TextGenerator};
use std::fs;
use tracing::debug;

/// Which kind of study material to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    /// Learning chunks
    Chunks,
    /// Quiz questions
    Quiz,
    /// Flashcards
    Flashcards,
}

/// Formatted material and whether it came from the static fallback set.
struct Rendered {
    output: String,
    fallback: bool,
}

/// Execute a generation command.
///
/// Ctrl-C abandons any pending throttle or back-off wait.
pub async fn execute_generate(
    kind: MaterialKind,
    args: GenerateArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let document = fs::read_to_string(&args.file)?;

    let provider = GeminiProvider::from_config(args.api_key.clone(), &config.llm)?;
    let client = ResilientClient::new(provider, config.llm.governor(), config.llm.retry_policy());
    let generator = MaterialGenerator::new(client, config.extractor.clone());

    let (handle, cancel) = CancelToken::pair();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    let result = render(kind, &generator, &document, &args, config, formatter, &cancel).await;
    interrupt.abort();
    let rendered = result?;

    if rendered.fallback {
        eprintln!(
            "{}",
            formatter.warning("Generation yielded nothing usable, showing fallback material")
        );
    }
    println!("{}", rendered.output);

    Ok(())
}

async fn render<G: TextGenerator>(
    kind: MaterialKind,
    generator: &MaterialGenerator<G>,
    document: &str,
    args: &GenerateArgs,
    config: &Config,
    formatter: &Formatter,
    cancel: &CancelToken,
) -> Result<Rendered> {
    match kind {
        MaterialKind::Chunks => {
            let chunks = generator
                .learning_chunks_with_cancel(document, &args.topic, cancel)
                .await?;
            Ok(Rendered {
                output: formatter.format_chunks(&chunks)?,
                fallback: chunks.is_fallback(),
            })
        }
        MaterialKind::Quiz => {
            let count = count(args.count, config.settings.question_count)?;
            let content = extract_relevant(document, &args.topic, generator.config());
            debug!("Quiz content: {} chars", content.chars().count());

            let quiz = generator
                .quiz_with_cancel(&content, &args.topic, count, cancel)
                .await?;
            Ok(Rendered {
                output: formatter.format_quiz(&quiz)?,
                fallback: quiz.is_fallback(),
            })
        }
        MaterialKind::Flashcards => {
            let count = count(args.count, config.settings.card_count)?;
            let content = extract_relevant(document, &args.topic, generator.config());
            debug!("Flashcard content: {} chars", content.chars().count());

            let deck = generator
                .flashcards_with_cancel(&content, &args.topic, count, cancel)
                .await?;
            Ok(Rendered {
                output: formatter.format_flashcards(&deck)?,
                fallback: deck.is_fallback(),
            })
        }
    }
}

fn count(requested: Option<usize>, configured: usize) -> Result<usize> {
    match requested.unwrap_or(configured) {
        0 => Err(CliError::InvalidInput(
            "Count must be greater than 0".to_string(),
        )),
        n => Ok(n),
    }
}
