//! Recover command implementation.

use crate::cli::RecoverArgs;
use crate::error::Result;
use crate::output::Formatter;
use lectern_extractor::recover_with_tier;
use std::fs;

/// Execute the recover command.
///
/// Records go to stdout as JSON; the recovery tier is reported on stderr.
pub fn execute_recover(args: RecoverArgs, formatter: &Formatter) -> Result<()> {
    let text = fs::read_to_string(&args.file)?;
    let recovery = recover_with_tier(&text);

    let message = format!(
        "{} records recovered ({})",
        recovery.records.len(),
        recovery.tier.as_str()
    );
    if recovery.records.is_empty() {
        eprintln!("{}", formatter.warning(&message));
    } else {
        eprintln!("{}", formatter.success(&message));
    }

    println!("{}", formatter.json(&recovery.records)?);
    Ok(())
}
