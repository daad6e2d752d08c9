use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::ConfigOverrides;
use crate::constants as C;

/// note-import - Convert an Obsidian vault into page bundles for a static site
///
/// Every `.md` file directly inside the source directory becomes
/// `<target>/<note name>/index.md`. Images it references (`![[x.png]]`,
/// `![alt](x.png)` and a `banner:` front matter field) are copied into
/// `<target>/<note name>/assets/` and the links rewritten to match.
///
/// ## Usage
///
/// ```bash
/// note-import                          # Import using .env / environment
/// note-import import --dry-run         # Show what would be written
/// note-import check                    # Validate every note, list failures
/// note-import --json import            # Print the summary as JSON
/// note-import --env-file vault.env     # Read settings from another file
/// ```
///
/// ## Required settings
///
/// Each can be given as a flag, an environment variable, or a line in the
/// env file (in that order of precedence):
///
/// - `SOURCE_MARKDOWN_DIR` / `--source-markdown-dir`: notes to import
/// - `SOURCE_ATTACHMENT_DIR` / `--source-attachment-dir`: where images live
/// - `TARGET_DIR` / `--target-dir`: output root
///
/// ## Notes that are left out
///
/// - `can_skip: true` or `is_draft: true` in front matter: skipped, run continues
/// - missing `description` or `date`, or a missing image: run stops
///
/// Set `RUST_LOG=debug` for more detail.
#[derive(Parser, Debug)]
#[command(name = "note-import")]
#[command(version)]
#[command(about = "Convert an Obsidian vault into page bundles for a static site")]
pub struct Cli {
    /// Directory holding the source notes
    #[arg(long, global = true, value_name = "PATH")]
    pub source_markdown_dir: Option<PathBuf>,

    /// Directory searched for referenced images
    #[arg(long, global = true, value_name = "PATH")]
    pub source_attachment_dir: Option<PathBuf>,

    /// Output root; one folder per note is created under it
    #[arg(long, global = true, value_name = "PATH")]
    pub target_dir: Option<PathBuf>,

    /// Environment file to load settings from
    #[arg(long, global = true, value_name = "PATH", default_value = C::DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// Output the summary in JSON format (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Directory flags given on the command line
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            source_markdown_dir: self.source_markdown_dir.clone(),
            source_attachment_dir: self.source_attachment_dir.clone(),
            target_dir: self.target_dir.clone(),
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Import every note (default)
    Import {
        /// Transform every note and report, without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate front matter of every note without importing
    Check,
}

impl Default for Command {
    fn default() -> Self {
        Command::Import { dry_run: false }
    }
}
