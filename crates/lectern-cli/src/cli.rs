//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lectern - Turn long study documents into topic-focused study material.
#[derive(Debug, Parser)]
#[command(name = "lectern")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format for generated material
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.lectern/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the part of a document most relevant to a topic
    Extract(ExtractArgs),

    /// Print a named chapter or unit of a document
    Chapter(ChapterArgs),

    /// Recover records from a saved model response
    Recover(RecoverArgs),

    /// Generate learning chunks for a topic
    Chunks(GenerateArgs),

    /// Generate a quiz for a topic
    Quiz(GenerateArgs),

    /// Generate flashcards for a topic
    Flashcards(GenerateArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Document to read
    pub file: PathBuf,

    /// Topic to extract content for
    #[arg(short, long)]
    pub topic: String,

    /// Character budget (overrides the configured budget)
    #[arg(short, long)]
    pub budget: Option<usize>,
}

/// Arguments for the chapter command.
#[derive(Debug, Parser)]
pub struct ChapterArgs {
    /// Document to read
    pub file: PathBuf,

    /// Keyword identifying the chapter (repeatable)
    #[arg(short, long = "keyword", required = true)]
    pub keywords: Vec<String>,
}

/// Arguments for the recover command.
#[derive(Debug, Parser)]
pub struct RecoverArgs {
    /// File holding a raw model response
    pub file: PathBuf,
}

/// Arguments shared by the generation commands.
#[derive(Debug, Parser)]
pub struct GenerateArgs {
    /// Document to read
    pub file: PathBuf,

    /// Topic to generate material for
    #[arg(short, long)]
    pub topic: String,

    /// Number of quiz questions or flashcards (overrides the configured count)
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: String,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}
