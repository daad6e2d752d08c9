//! Progress reporting
//!
//! The transformation core does not log on its own; callers hand it a
//! [`Reporter`] and decide where events go.

use log::{info, warn};

/// Receives progress events from the importer
pub trait Reporter {
    /// An image was physically copied into a note's assets folder
    fn asset_copied(&self, display_name: &str, dest_name: &str);

    /// A note was written to `<folder>/index.md`
    fn note_imported(&self, note: &str, folder: &str) {
        let _ = (note, folder);
    }

    /// A note was left out
    fn note_skipped(&self, message: &str) {
        let _ = message;
    }
}

/// Reporter backed by the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn asset_copied(&self, display_name: &str, dest_name: &str) {
        info!("copied image: {} → assets/{}", display_name, dest_name);
    }

    fn note_imported(&self, note: &str, folder: &str) {
        info!("imported: '{}' → '{}/index.md'", note, folder);
    }

    fn note_skipped(&self, message: &str) {
        warn!("{}", message);
    }
}

/// Reporter that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn asset_copied(&self, _display_name: &str, _dest_name: &str) {}
}
