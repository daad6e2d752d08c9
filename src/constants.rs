//! Constants for note-import
//!
//! File names, field names, format strings and environment keys used across
//! the importer.

// === File and Directory Names ===

/// Extension of note files picked up from the source directory (without dot)
pub const MARKDOWN_EXTENSION: &str = "md";

/// Name of the rendered note inside its destination folder
pub const OUTPUT_FILENAME: &str = "index.md";

/// Subdirectory of a destination folder holding copied images
pub const ASSETS_SUBDIR: &str = "assets";

/// Relative prefix written into rewritten image links
pub const ASSETS_LINK_PREFIX: &str = "./assets/";

/// Default dotenv file read at startup
pub const DEFAULT_ENV_FILE: &str = ".env";

// === Front Matter ===

/// Opening and closing line of a front matter block
pub const FRONTMATTER_DELIMITER: &str = "---";

/// Indentation used for list items when encoding
pub const LIST_ITEM_INDENT: &str = "  ";

/// Field names the importer reads or writes
pub const FIELD_TITLE: &str = "title";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_DATE: &str = "date";
pub const FIELD_TAGS: &str = "tags";
pub const FIELD_BANNER: &str = "banner";
pub const FIELD_IMAGE: &str = "image";
pub const FIELD_CAN_SKIP: &str = "can_skip";
pub const FIELD_IS_DRAFT: &str = "is_draft";

/// Fields rewritten to the canonical date-only form on output
pub const DATE_FIELDS: &[&str] = &[FIELD_DATE, "updated"];

/// Marker stripped from the front of each tag
pub const TAG_MARKER: char = '#';

// === Date and Time Format Strings ===

/// Date-only pattern: %Y-%m-%d
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date and time patterns accepted alongside the date-only form
pub const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

// === References ===

/// Scheme prefixes that mark a reference as remote (compared lower-cased)
pub const REMOTE_PREFIXES: &[&str] = &["http://", "https://", "data:", "mailto:"];

// === Environment ===

pub const ENV_SOURCE_MARKDOWN_DIR: &str = "SOURCE_MARKDOWN_DIR";
pub const ENV_SOURCE_ATTACHMENT_DIR: &str = "SOURCE_ATTACHMENT_DIR";
pub const ENV_TARGET_DIR: &str = "TARGET_DIR";
