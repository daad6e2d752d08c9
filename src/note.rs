//! Single-note conversion
//!
//! [`NoteTransformer::transform`] turns one source note into a
//! [`NoteOutput`] without touching the target tree; [`NoteOutput::write`]
//! then copies the images and writes `index.md`. A note that fails at any
//! step therefore leaves nothing behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::assets::{self, AssetError, AssetMaterializer, PlannedCopy};
use crate::config::ImportConfig;
use crate::constants as C;
use crate::error::ImportError;
use crate::frontmatter::{self, Frontmatter, Value};
use crate::report::Reporter;
use crate::rewrite;
use crate::util;
use crate::validate;

/// A source note: file name, front matter and body
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    /// File name including extension, used in diagnostics
    pub name: String,
    pub frontmatter: Frontmatter,
    pub body: String,
}

impl Note {
    /// Decode a note from its file name and content
    pub fn parse(name: impl Into<String>, content: &str) -> Self {
        let (frontmatter, body) = frontmatter::decode(content);
        Self {
            name: name.into(),
            frontmatter,
            body: body.to_string(),
        }
    }

    /// Read and decode a note file
    pub fn read(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(util::file_name(path), &content))
    }

    /// File name without extension
    pub fn stem(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.name)
    }
}

/// A converted note, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NoteOutput {
    /// Source file name
    pub note: String,
    /// Destination folder name under the target root
    pub folder: String,
    pub dest_dir: PathBuf,
    /// Final `index.md` content
    pub text: String,
    /// Images to copy into `assets/`
    pub copies: Vec<PlannedCopy>,
}

impl NoteOutput {
    /// Path of the rendered note
    pub fn output_path(&self) -> PathBuf {
        self.dest_dir.join(C::OUTPUT_FILENAME)
    }

    /// Copy images and write `index.md`
    pub fn write(&self, reporter: &dyn Reporter) -> io::Result<()> {
        fs::create_dir_all(&self.dest_dir)?;
        assets::commit_copies(&self.copies, &self.dest_dir.join(C::ASSETS_SUBDIR), reporter)?;
        fs::write(self.output_path(), &self.text)?;
        reporter.note_imported(&self.note, &self.folder);
        Ok(())
    }
}

/// Converts notes for one import run
#[derive(Debug, Clone, Copy)]
pub struct NoteTransformer<'a> {
    config: &'a ImportConfig,
}

impl<'a> NoteTransformer<'a> {
    pub fn new(config: &'a ImportConfig) -> Self {
        Self { config }
    }

    /// Read a note file and transform it
    pub fn transform_file(&self, path: &Path) -> Result<NoteOutput, ImportError> {
        let note = Note::read(path).map_err(|source| ImportError::Unexpected {
            note: util::file_name(path),
            source,
        })?;
        self.transform(note)
    }

    /// Convert one note.
    ///
    /// Order: skip check, validation, front matter normalisation, banner,
    /// body images, date canonicalisation, rendering.
    pub fn transform(&self, note: Note) -> Result<NoteOutput, ImportError> {
        let mut fm = check_note(&note)?;
        let stem = note.stem().to_string();

        normalize_frontmatter(&mut fm, &stem);

        let search_root = self.config.source_attachment_dir.as_path();
        let mut materializer = AssetMaterializer::new(search_root);
        rewrite::rewrite_banner(&mut fm, &mut materializer)
            .map_err(|e| asset_error(&note.name, search_root, e))?;
        let body = rewrite::rewrite_body(&note.body, &mut materializer)
            .map_err(|e| asset_error(&note.name, search_root, e))?;

        canonicalize_dates(&mut fm);

        let folder = util::safe_folder_name(&stem);
        Ok(NoteOutput {
            dest_dir: self.config.target_dir.join(&folder),
            folder,
            text: render(&fm, &body),
            copies: materializer.into_copies(),
            note: note.name,
        })
    }
}

/// Run the skip check and validation, returning the front matter to work on
pub fn check_note(note: &Note) -> Result<Frontmatter, ImportError> {
    if let Some(reason) = validate::check_skip(&note.frontmatter) {
        return Err(ImportError::Skip {
            note: note.name.clone(),
            reason,
        });
    }

    let issues = validate::validate(&note.frontmatter);
    if !issues.is_empty() {
        return Err(ImportError::Invalid {
            note: note.name.clone(),
            issues,
        });
    }

    Ok(note.frontmatter.clone())
}

fn asset_error(note: &str, attachment_root: &Path, err: AssetError) -> ImportError {
    match err {
        AssetError::NotFound {
            reference,
            search_root,
        } => ImportError::AssetNotFound {
            note: note.to_string(),
            reference,
            search_root,
        },
        AssetError::EmptyReference => ImportError::AssetNotFound {
            note: note.to_string(),
            reference: String::new(),
            search_root: attachment_root.to_path_buf(),
        },
        AssetError::Io(source) => ImportError::Unexpected {
            note: note.to_string(),
            source,
        },
    }
}

/// Fill in the title and clean up tags
pub fn normalize_frontmatter(fm: &mut Frontmatter, fallback_title: &str) {
    let has_title = matches!(
        fm.get(C::FIELD_TITLE),
        Some(Value::String(title)) if !title.trim().is_empty()
    );
    if !has_title {
        fm.insert(
            C::FIELD_TITLE.to_string(),
            Value::String(fallback_title.to_string()),
        );
    }

    let tags = normalize_tags(fm.get(C::FIELD_TAGS));
    fm.insert(C::FIELD_TAGS.to_string(), Value::List(tags));
}

/// Tags as a list with one leading `#` removed from each string tag
fn normalize_tags(value: Option<&Value>) -> Vec<Value> {
    let tags = match value {
        Some(Value::List(items)) => items.clone(),
        Some(Value::String(s)) if !s.is_empty() => vec![Value::String(s.clone())],
        _ => Vec::new(),
    };

    tags.into_iter()
        .map(|tag| match tag {
            Value::String(s) => match s.strip_prefix(C::TAG_MARKER) {
                Some(stripped) => Value::String(stripped.to_string()),
                None => Value::String(s),
            },
            other => other,
        })
        .collect()
}

/// Rewrite parseable date fields as `YYYY-MM-DD`
pub fn canonicalize_dates(fm: &mut Frontmatter) {
    for field in C::DATE_FIELDS {
        if let Some(value) = fm.get_mut(*field) {
            if let Some(date) = validate::format_date(value) {
                *value = Value::String(date);
            }
        }
    }
}

/// Final note text: front matter block, blank line, body
pub fn render(fm: &Frontmatter, body: &str) -> String {
    format!("{}\n\n{}", frontmatter::encode(fm), body)
}
