//! Import configuration
//!
//! Each location is taken from, in order: a command-line override, the
//! process environment, a dotenv file. The dotenv file is loaded into the
//! environment first without replacing variables that are already set.

use std::env;
use std::path::{Path, PathBuf};

use log::debug;

use crate::constants as C;
use crate::error::ImportError;

/// The three directories an import run works with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// Directory holding the source `.md` notes
    pub source_markdown_dir: PathBuf,
    /// Directory searched for referenced images
    pub source_attachment_dir: PathBuf,
    /// Root under which one folder per note is created
    pub target_dir: PathBuf,
}

/// Values given on the command line; they take precedence over the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub source_markdown_dir: Option<PathBuf>,
    pub source_attachment_dir: Option<PathBuf>,
    pub target_dir: Option<PathBuf>,
}

impl ImportConfig {
    /// Load `env_file` (if present) and resolve against the process environment
    pub fn load(overrides: &ConfigOverrides, env_file: &Path) -> Result<Self, ImportError> {
        match dotenvy::from_path(env_file) {
            Ok(()) => debug!("loaded environment from {}", env_file.display()),
            Err(e) => debug!("no environment file loaded from {}: {}", env_file.display(), e),
        }
        Self::resolve(overrides, |key| env::var(key).ok())
    }

    /// Resolve every location, reporting all missing keys at once.
    ///
    /// `lookup` stands in for the environment. Empty values count as missing.
    pub fn resolve<F>(overrides: &ConfigOverrides, lookup: F) -> Result<Self, ImportError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut pick = |flag: &Option<PathBuf>, key: &'static str| {
            let value = flag
                .clone()
                .filter(|p| !p.as_os_str().is_empty())
                .or_else(|| {
                    lookup(key)
                        .filter(|v| !v.trim().is_empty())
                        .map(|v| PathBuf::from(v.trim()))
                });
            if value.is_none() {
                missing.push(key);
            }
            value.unwrap_or_default()
        };

        let source_markdown_dir =
            pick(&overrides.source_markdown_dir, C::ENV_SOURCE_MARKDOWN_DIR);
        let source_attachment_dir =
            pick(&overrides.source_attachment_dir, C::ENV_SOURCE_ATTACHMENT_DIR);
        let target_dir = pick(&overrides.target_dir, C::ENV_TARGET_DIR);

        if !missing.is_empty() {
            return Err(ImportError::ConfigMissing(missing));
        }

        Ok(Self {
            source_markdown_dir: canonical(source_markdown_dir),
            source_attachment_dir: canonical(source_attachment_dir),
            target_dir: canonical(target_dir),
        })
    }
}

/// Canonicalize paths that exist, leaving others as given
fn canonical(path: PathBuf) -> PathBuf {
    dunce::canonicalize(&path).unwrap_or(path)
}
