//! Image discovery and copying
//!
//! [`resolve_asset`] maps a reference as written in a note to a real file
//! under the attachment directory. [`AssetMaterializer`] wraps it with a
//! per-note copy plan so a reference is resolved once no matter how often it
//! appears, and performs the copies when the note is written.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::report::Reporter;

/// Errors from asset resolution and copying
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("empty image reference")]
    EmptyReference,

    #[error("image not found: {reference} (searched in: {})", .search_root.display())]
    NotFound {
        reference: String,
        search_root: PathBuf,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A reference resolved to a file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// Existing source file
    pub source: PathBuf,
    /// The reference form that located the file (full path or basename)
    pub display_name: String,
}

/// Resolve `reference` against `search_root`.
///
/// The reference is trimmed, percent-decoded when possible, and stripped of
/// leading `./` segments. Candidates are tried in order: the cleaned relative
/// path, then its final segment alone. A relative path that starts with `..`
/// or climbs out of the root is not tried, leaving only the basename candidate.
pub fn resolve_asset(search_root: &Path, reference: &str) -> Result<ResolvedAsset, AssetError> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return Err(AssetError::EmptyReference);
    }

    let decoded = urlencoding::decode(trimmed).unwrap_or(Cow::Borrowed(trimmed));
    let cleaned = clean_reference(&decoded);

    let mut tries: Vec<(PathBuf, &str)> = Vec::with_capacity(2);
    if !cleaned.starts_with("..") {
        if let Some(relative) = contained_relative(cleaned) {
            tries.push((search_root.join(relative), cleaned));
        }
    }

    let base = Path::new(cleaned)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    if !base.is_empty() && base != cleaned {
        tries.push((search_root.join(base), base));
    }

    for (path, display) in tries {
        if path.is_file() {
            return Ok(ResolvedAsset {
                source: path,
                display_name: display.to_string(),
            });
        }
    }

    Err(AssetError::NotFound {
        reference: reference.to_string(),
        search_root: search_root.to_path_buf(),
    })
}

/// Drop leading `./` segments and a leading `/` (root-relative form)
fn clean_reference(reference: &str) -> &str {
    let mut rest = reference;
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped;
    }
    rest.trim_start_matches('/')
}

/// Lexically normalize `reference`, returning `None` if it escapes the root
fn contained_relative(reference: &str) -> Option<PathBuf> {
    let normalized = reference.replace('\\', "/");
    let mut parts: Vec<&str> = Vec::new();

    for component in Path::new(&normalized).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if parts.is_empty() {
        return None;
    }
    Some(parts.iter().collect())
}

/// Normalize an image file name: stem and extension lower-cased, spaces in
/// the stem become hyphens.
pub fn normalize_image_name(file_name: &str) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let normalized = stem.to_lowercase().replace(' ', "-");

    match path.extension() {
        Some(ext) => format!("{}.{}", normalized, ext.to_string_lossy().to_lowercase()),
        None => normalized,
    }
}

/// A copy the materializer has committed to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCopy {
    pub source: PathBuf,
    pub display_name: String,
    pub dest_name: String,
}

/// Per-note copy plan: raw reference → destination file name
#[derive(Debug)]
pub struct AssetMaterializer<'a> {
    search_root: &'a Path,
    plan: HashMap<String, String>,
    copies: Vec<PlannedCopy>,
}

impl<'a> AssetMaterializer<'a> {
    /// Start an empty plan for one note
    pub fn new(search_root: &'a Path) -> Self {
        Self {
            search_root,
            plan: HashMap::new(),
            copies: Vec::new(),
        }
    }

    /// Return the destination name for `reference`, scheduling a copy the
    /// first time the reference is seen.
    ///
    /// Repeated references hit the plan and touch nothing on disk.
    pub fn ensure_copied(&mut self, reference: &str) -> Result<String, AssetError> {
        if let Some(dest_name) = self.plan.get(reference) {
            return Ok(dest_name.clone());
        }

        let resolved = resolve_asset(self.search_root, reference)?;
        let file_name = Path::new(&resolved.display_name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| resolved.display_name.clone());
        let dest_name = normalize_image_name(&file_name);

        self.copies.push(PlannedCopy {
            source: resolved.source,
            display_name: resolved.display_name,
            dest_name: dest_name.clone(),
        });
        self.plan.insert(reference.to_string(), dest_name.clone());
        Ok(dest_name)
    }

    /// Copies scheduled so far, in first-seen order
    pub fn planned(&self) -> &[PlannedCopy] {
        &self.copies
    }

    /// Hand over the scheduled copies
    pub fn into_copies(self) -> Vec<PlannedCopy> {
        self.copies
    }
}

/// Copy every planned file into `assets_dir`, overwriting existing files.
///
/// Bytes, permissions and modification time are carried over. Returns the
/// number of files copied.
pub fn commit_copies(
    copies: &[PlannedCopy],
    assets_dir: &Path,
    reporter: &dyn Reporter,
) -> io::Result<usize> {
    if copies.is_empty() {
        return Ok(0);
    }
    fs::create_dir_all(assets_dir)?;

    for copy in copies {
        let dest = assets_dir.join(&copy.dest_name);
        fs::copy(&copy.source, &dest)?;
        preserve_mtime(&copy.source, &dest)?;
        reporter.asset_copied(&copy.display_name, &copy.dest_name);
    }

    Ok(copies.len())
}

fn preserve_mtime(source: &Path, dest: &Path) -> io::Result<()> {
    let modified = fs::metadata(source)?.modified()?;
    let file = fs::OpenOptions::new().write(true).open(dest)?;
    file.set_modified(modified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        copied: RefCell<Vec<(String, String)>>,
    }

    impl Reporter for Recorder {
        fn asset_copied(&self, display_name: &str, dest_name: &str) {
            self.copied
                .borrow_mut()
                .push((display_name.to_string(), dest_name.to_string()));
        }
    }

    fn attachments() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("img")).unwrap();
        fs::write(temp.path().join("img/Photo One.PNG"), b"png").unwrap();
        fs::write(temp.path().join("flat.jpg"), b"jpg").unwrap();
        temp
    }

    #[test]
    fn test_resolve_relative_path() {
        let temp = attachments();
        let found = resolve_asset(temp.path(), "img/Photo One.PNG").unwrap();
        assert_eq!(found.source, temp.path().join("img/Photo One.PNG"));
        assert_eq!(found.display_name, "img/Photo One.PNG");
    }

    #[test]
    fn test_resolve_percent_encoded_and_dot_prefixed() {
        let temp = attachments();
        let found = resolve_asset(temp.path(), "././img/Photo%20One.PNG").unwrap();
        assert_eq!(found.display_name, "img/Photo One.PNG");
    }

    #[test]
    fn test_resolve_falls_back_to_basename() {
        let temp = attachments();
        let found = resolve_asset(temp.path(), "some/other/dir/flat.jpg").unwrap();
        assert_eq!(found.source, temp.path().join("flat.jpg"));
        assert_eq!(found.display_name, "flat.jpg");
    }

    #[test]
    fn test_resolve_root_relative() {
        let temp = attachments();
        let found = resolve_asset(temp.path(), "/img/Photo One.PNG").unwrap();
        assert_eq!(found.display_name, "img/Photo One.PNG");
    }

    #[test]
    fn test_resolve_traversal_only_tries_basename() {
        let outer = TempDir::new().unwrap();
        let root = outer.path().join("attachments");
        fs::create_dir_all(&root).unwrap();
        fs::write(outer.path().join("secret.png"), b"outside").unwrap();

        // The escaping path exists but must not be used.
        let err = resolve_asset(&root, "../secret.png").unwrap_err();
        assert!(matches!(err, AssetError::NotFound { .. }));

        fs::write(root.join("secret.png"), b"inside").unwrap();
        let found = resolve_asset(&root, "../secret.png").unwrap();
        assert_eq!(found.source, root.join("secret.png"));
        assert_eq!(found.display_name, "secret.png");
    }

    #[test]
    fn test_resolve_rejects_nested_escape() {
        let outer = TempDir::new().unwrap();
        let root = outer.path().join("attachments");
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(outer.path().join("x.png"), b"outside").unwrap();

        assert!(contained_relative("a/../../x.png").is_none());
        assert!(resolve_asset(&root, "a/../../x.png").is_err());
        assert_eq!(contained_relative("a/../x.png"), Some(PathBuf::from("x.png")));
    }

    #[test]
    fn test_resolve_dot_dot_prefix_skips_primary() {
        let temp = attachments();
        fs::write(temp.path().join("..cover.png"), b"odd").unwrap();

        let err = resolve_asset(temp.path(), "..cover.png").unwrap_err();
        assert!(matches!(err, AssetError::NotFound { .. }));

        fs::create_dir_all(temp.path().join("..hidden")).unwrap();
        fs::write(temp.path().join("..hidden/pic.png"), b"pic").unwrap();
        fs::write(temp.path().join("pic.png"), b"flat").unwrap();
        let found = resolve_asset(temp.path(), "..hidden/pic.png").unwrap();
        assert_eq!(found.source, temp.path().join("pic.png"));
    }

    #[test]
    fn test_resolve_missing_and_empty() {
        let temp = attachments();
        match resolve_asset(temp.path(), "nope.png") {
            Err(AssetError::NotFound { reference, search_root }) => {
                assert_eq!(reference, "nope.png");
                assert_eq!(search_root, temp.path());
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(
            resolve_asset(temp.path(), "   "),
            Err(AssetError::EmptyReference)
        ));
    }

    #[test]
    fn test_resolve_ignores_directories() {
        let temp = attachments();
        assert!(resolve_asset(temp.path(), "img").is_err());
    }

    #[test]
    fn test_normalize_image_name() {
        assert_eq!(normalize_image_name("Photo One.PNG"), "photo-one.png");
        assert_eq!(normalize_image_name("cover.PNG"), "cover.png");
        assert_eq!(normalize_image_name("My Diagram.v2.svg"), "my-diagram.v2.svg");
        assert_eq!(normalize_image_name("README"), "readme");
    }

    #[test]
    fn test_materializer_dedupes_references() {
        let temp = attachments();
        let mut materializer = AssetMaterializer::new(temp.path());

        let first = materializer.ensure_copied("img/Photo One.PNG").unwrap();
        let second = materializer.ensure_copied("img/Photo One.PNG").unwrap();
        assert_eq!(first, "photo-one.png");
        assert_eq!(first, second);
        assert_eq!(materializer.planned().len(), 1);
    }

    #[test]
    fn test_materializer_propagates_not_found() {
        let temp = attachments();
        let mut materializer = AssetMaterializer::new(temp.path());
        assert!(materializer.ensure_copied("ghost.png").is_err());
        assert!(materializer.planned().is_empty());
    }

    #[test]
    fn test_commit_copies() {
        let temp = attachments();
        let out = TempDir::new().unwrap();
        let assets_dir = out.path().join("note/assets");

        let mut materializer = AssetMaterializer::new(temp.path());
        materializer.ensure_copied("img/Photo One.PNG").unwrap();
        materializer.ensure_copied("flat.jpg").unwrap();
        materializer.ensure_copied("flat.jpg").unwrap();

        let recorder = Recorder::default();
        let copied = commit_copies(&materializer.into_copies(), &assets_dir, &recorder).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(fs::read(assets_dir.join("photo-one.png")).unwrap(), b"png");
        assert_eq!(fs::read(assets_dir.join("flat.jpg")).unwrap(), b"jpg");
        assert_eq!(recorder.copied.borrow().len(), 2);

        let src_mtime = fs::metadata(temp.path().join("flat.jpg")).unwrap().modified().unwrap();
        let dst_mtime = fs::metadata(assets_dir.join("flat.jpg")).unwrap().modified().unwrap();
        assert_eq!(src_mtime, dst_mtime);
    }

    #[test]
    fn test_commit_nothing_creates_no_directory() {
        let out = TempDir::new().unwrap();
        let assets_dir = out.path().join("assets");
        let copied = commit_copies(&[], &assets_dir, &crate::report::SilentReporter).unwrap();
        assert_eq!(copied, 0);
        assert!(!assets_dir.exists());
    }
}
