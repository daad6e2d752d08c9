pub mod assets;
pub mod batch;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod frontmatter;
pub mod note;
pub mod report;
pub mod rewrite;
pub mod util;
pub mod validate;

pub use assets::{AssetError, AssetMaterializer, PlannedCopy, ResolvedAsset, resolve_asset};
pub use batch::{CheckSummary, ImportOptions, ImportSummary, check_notes, run_import};
pub use cli::{Cli, Command};
pub use config::{ConfigOverrides, ImportConfig};
pub use error::ImportError;
pub use frontmatter::{Frontmatter, Value};
pub use note::{Note, NoteOutput, NoteTransformer};
pub use report::{LogReporter, Reporter, SilentReporter};
pub use validate::{FieldIssue, SkipReason};
