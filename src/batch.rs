//! Batch import over a directory of notes
//!
//! Notes are processed one at a time in file name order. A skipped note is
//! recorded and the run continues; any other error ends the run and is
//! returned to the caller. Notes written before the failure stay on disk.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::note::{self, Note, NoteTransformer};
use crate::report::Reporter;
use crate::util;

/// Options for [`run_import`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Transform every note but write nothing
    pub dry_run: bool,
}

/// A note that was (or, in a dry run, would be) written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedNote {
    pub source: String,
    pub folder: String,
    pub destination: PathBuf,
    pub assets: usize,
}

/// A note left out of the import
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedNote {
    pub source: String,
    pub reason: String,
}

/// Outcome of a completed batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Markdown files found in the source directory
    pub found: usize,
    pub dry_run: bool,
    pub imported: Vec<ImportedNote>,
    pub skipped: Vec<SkippedNote>,
}

/// Source notes to import, sorted by file name
pub fn collect_notes(source_dir: &Path) -> Result<Vec<PathBuf>, ImportError> {
    if !source_dir.is_dir() {
        return Err(ImportError::SourceDirMissing(source_dir.to_path_buf()));
    }
    util::list_markdown_files(source_dir).map_err(|source| ImportError::Unexpected {
        note: util::display_path(source_dir),
        source,
    })
}

/// Import every note in the configured source directory
pub fn run_import(
    config: &ImportConfig,
    options: ImportOptions,
    reporter: &dyn Reporter,
) -> Result<ImportSummary, ImportError> {
    let files = collect_notes(&config.source_markdown_dir)?;
    let transformer = NoteTransformer::new(config);
    let mut summary = ImportSummary {
        found: files.len(),
        dry_run: options.dry_run,
        ..Default::default()
    };

    for path in &files {
        let output = match transformer.transform_file(path) {
            Ok(output) => output,
            Err(err @ ImportError::Skip { .. }) => {
                reporter.note_skipped(&err.to_string());
                if let ImportError::Skip { note, reason } = err {
                    summary.skipped.push(SkippedNote {
                        source: note,
                        reason: reason.to_string(),
                    });
                }
                continue;
            }
            Err(err) => return Err(err),
        };

        if !options.dry_run {
            output.write(reporter).map_err(|source| ImportError::Unexpected {
                note: output.note.clone(),
                source,
            })?;
        }

        summary.imported.push(ImportedNote {
            destination: output.output_path(),
            assets: output.copies.len(),
            source: output.note,
            folder: output.folder,
        });
    }

    Ok(summary)
}

/// A note whose front matter failed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidNote {
    pub source: String,
    pub issues: Vec<String>,
}

/// Outcome of [`check_notes`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub found: usize,
    pub valid: Vec<String>,
    pub skipped: Vec<SkippedNote>,
    pub invalid: Vec<InvalidNote>,
}

impl CheckSummary {
    pub fn is_ok(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// Decode, skip-check and validate every note without touching assets or
/// the target tree. Unlike [`run_import`] this does not stop at the first
/// invalid note.
pub fn check_notes(config: &ImportConfig) -> Result<CheckSummary, ImportError> {
    let files = collect_notes(&config.source_markdown_dir)?;
    let mut summary = CheckSummary {
        found: files.len(),
        ..Default::default()
    };

    for path in &files {
        let parsed = Note::read(path).map_err(|source| ImportError::Unexpected {
            note: util::file_name(path),
            source,
        })?;

        match note::check_note(&parsed) {
            Ok(_) => summary.valid.push(parsed.name),
            Err(ImportError::Skip { note, reason }) => summary.skipped.push(SkippedNote {
                source: note,
                reason: reason.to_string(),
            }),
            Err(ImportError::Invalid { note, issues }) => summary.invalid.push(InvalidNote {
                source: note,
                issues: issues.iter().map(|i| i.to_string()).collect(),
            }),
            Err(err) => return Err(err),
        }
    }

    Ok(summary)
}
