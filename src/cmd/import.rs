//! Import command module

use std::process::ExitCode;

use log::{info, warn};
use note_import::{ImportConfig, ImportError, ImportOptions, LogReporter, util};

pub fn run(config: &ImportConfig, dry_run: bool, json: bool) -> Result<ExitCode, ImportError> {
    info!(
        "importing {} → {}",
        util::display_path(&config.source_markdown_dir),
        util::display_path(&config.target_dir)
    );

    let summary = note_import::run_import(config, ImportOptions { dry_run }, &LogReporter)?;

    if summary.found == 0 {
        warn!(
            "no markdown files found in {}",
            util::display_path(&config.source_markdown_dir)
        );
    }

    if dry_run {
        for note in &summary.imported {
            info!(
                "would import: '{}' → '{}' ({} image(s))",
                note.source,
                util::display_path(&note.destination),
                note.assets
            );
        }
    }

    if json {
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => warn!("failed to serialize summary: {}", e),
        }
    } else {
        info!(
            "done: {} imported, {} skipped",
            summary.imported.len(),
            summary.skipped.len()
        );
    }

    Ok(ExitCode::SUCCESS)
}
