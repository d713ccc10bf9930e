//! Lectern CLI - Turn long study documents into topic-focused study material.

use clap::Parser;
use lectern_cli::commands::{self, MaterialKind};
use lectern_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> lectern_cli::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Extract(args) => commands::execute_extract(args, &config, &formatter)?,
        Command::Chapter(args) => commands::execute_chapter(args, &config, &formatter)?,
        Command::Recover(args) => commands::execute_recover(args, &formatter)?,
        Command::Chunks(args) => {
            commands::execute_generate(MaterialKind::Chunks, args, &config, &formatter).await?
        }
        Command::Quiz(args) => {
            commands::execute_generate(MaterialKind::Quiz, args, &config, &formatter).await?
        }
        Command::Flashcards(args) => {
            commands::execute_generate(MaterialKind::Flashcards, args, &config, &formatter)
                .await?
        }
    }

    Ok(())
}
