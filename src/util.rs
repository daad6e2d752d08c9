//! Path and file name helpers

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::constants as C;

/// Characters that cannot appear in a folder name on common filesystems
const UNSAFE_FOLDER_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Turn a note's file stem into a folder name usable on any platform.
///
/// Reserved characters and control characters become `-`; surrounding
/// whitespace is trimmed.
pub fn safe_folder_name(stem: &str) -> String {
    let replaced: String = stem
        .chars()
        .map(|c| {
            if UNSAFE_FOLDER_CHARS.contains(&c) || c.is_control() {
                '-'
            } else {
                c
            }
        })
        .collect();
    replaced.trim().to_string()
}

/// Regular file with a `.md` extension (case-insensitive)
pub fn is_markdown_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(C::MARKDOWN_EXTENSION))
}

/// Markdown files directly inside `dir`, sorted by path
pub fn list_markdown_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if is_markdown_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Final path component as text
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| display_path(path))
}

/// Display a path with forward slashes (cross-platform standard)
pub fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
