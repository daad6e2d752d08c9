//! Error kinds surfaced by the importer
//!
//! Only [`ImportError::Skip`] is recovered per note; every other kind stops
//! the batch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::validate::{FieldIssue, SkipReason};

/// Errors produced while importing notes
#[derive(Debug, Error)]
pub enum ImportError {
    /// The note asked to be left out
    #[error("[{note}] {reason}")]
    Skip { note: String, reason: SkipReason },

    /// Front matter failed validation
    #[error("[{note}] frontmatter validation failed: {}", join_issues(.issues))]
    Invalid { note: String, issues: Vec<FieldIssue> },

    /// A local image reference could not be found
    #[error("[{note}] image not found: {reference} (searched in: {})", .search_root.display())]
    AssetNotFound {
        note: String,
        reference: String,
        search_root: PathBuf,
    },

    /// Required configuration keys are absent
    #[error("missing required environment variables: {}", .0.join(", "))]
    ConfigMissing(Vec<&'static str>),

    /// The note source directory does not exist
    #[error("source directory does not exist: {}", .0.display())]
    SourceDirMissing(PathBuf),

    /// Anything else, typically I/O
    #[error("unexpected error processing {note}: {source}")]
    Unexpected {
        note: String,
        #[source]
        source: io::Error,
    },
}

impl ImportError {
    /// Whether this error must stop the batch
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ImportError::Skip { .. })
    }

    /// The note file the error belongs to, if any
    pub fn note(&self) -> Option<&str> {
        match self {
            ImportError::Skip { note, .. }
            | ImportError::Invalid { note, .. }
            | ImportError::AssetNotFound { note, .. }
            | ImportError::Unexpected { note, .. } => Some(note),
            ImportError::ConfigMissing(_) | ImportError::SourceDirMissing(_) => None,
        }
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
