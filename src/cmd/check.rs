//! Check command module

use std::process::ExitCode;

use log::{error, info, warn};
use note_import::{ImportConfig, ImportError};

pub fn run(config: &ImportConfig, json: bool) -> Result<ExitCode, ImportError> {
    let summary = note_import::check_notes(config)?;

    if json {
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => warn!("failed to serialize summary: {}", e),
        }
    } else {
        for note in &summary.skipped {
            warn!("[{}] {}", note.source, note.reason);
        }
        for note in &summary.invalid {
            error!("[{}] frontmatter validation failed: {}", note.source, note.issues.join(", "));
        }
        info!(
            "checked {} note(s): {} valid, {} skipped, {} invalid",
            summary.found,
            summary.valid.len(),
            summary.skipped.len(),
            summary.invalid.len()
        );
    }

    Ok(if summary.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
