//! Extract and chapter command implementations.

use crate::cli::{ChapterArgs, ExtractArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use lectern_extractor::{extract_chapter, extract_relevant};
use std::fs;

/// Execute the extract command.
pub fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let document = fs::read_to_string(&args.file)?;
    let extracted = relevant_text(&document, &args, config)?;

    eprintln!(
        "{}",
        formatter.info(&format!(
            "{} of {} characters selected for '{}'",
            extracted.chars().count(),
            document.chars().count(),
            args.topic.trim()
        ))
    );
    println!("{}", extracted);

    Ok(())
}

/// Execute the chapter command.
pub fn execute_chapter(args: ChapterArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let document = fs::read_to_string(&args.file)?;
    let keywords: Vec<&str> = args.keywords.iter().map(String::as_str).collect();
    let chapter = extract_chapter(&document, &keywords, &config.extractor);

    eprintln!(
        "{}",
        formatter.info(&format!("{} characters extracted", chapter.chars().count()))
    );
    println!("{}", chapter);

    Ok(())
}

fn relevant_text(document: &str, args: &ExtractArgs, config: &Config) -> Result<String> {
    let extractor = match args.budget {
        Some(0) => {
            return Err(CliError::InvalidInput(
                "Budget must be greater than 0".to_string(),
            ))
        }
        Some(budget) => config.extractor.clone().with_budget(budget),
        None => config.extractor.clone(),
    };

    Ok(extract_relevant(document, &args.topic, &extractor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const NOTES: &str = "JOINS\nAn INNER JOIN combines rows from two tables.\n\nINDEXES\nA B-tree index speeds up lookups.";

    fn args(budget: Option<usize>) -> ExtractArgs {
        ExtractArgs {
            file: PathBuf::from("notes.md"),
            topic: "joins".to_string(),
            budget,
        }
    }

    #[test]
    fn test_budget_override_applies() {
        let text = relevant_text(NOTES, &args(Some(20)), &Config::default()).unwrap();
        assert!(text.chars().count() <= 20);
    }

    #[test]
    fn test_zero_budget_rejected() {
        let result = relevant_text(NOTES, &args(Some(0)), &Config::default());
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_short_document_returned_whole() {
        let text = relevant_text(NOTES, &args(None), &Config::default()).unwrap();
        assert!(text.starts_with("JOINS"));
    }
}
