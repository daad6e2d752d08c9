//! Image reference scanning and rewriting
//!
//! Two inline syntaxes are recognised:
//!
//! - embeds: `![[reference]]`
//! - links: `![alt](target "optional title")`, target optionally in `<...>`
//!
//! Every local reference is handed to the [`AssetMaterializer`] and the
//! matched text is replaced by a link into `./assets/`. Remote references
//! (`http://`, `https://`, `data:`, `mailto:`) are left alone.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::assets::{AssetError, AssetMaterializer};
use crate::constants as C;
use crate::frontmatter::{Frontmatter, Value};

static EMBED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[\[([^\]]+)\]\]").unwrap());
static EMBED_FULL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*!\[\[([^\]]+)\]\]\s*$").unwrap());
static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());
static LINK_FULL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*!\[([^\]]*)\]\(([^)]+)\)\s*$").unwrap());
static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\s+(?:"(.*?)"|'(.*?)')\s*$"#).unwrap());

/// Which syntax a reference was written in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceSyntax {
    /// `![[target]]`
    Embed,
    /// `![alt](target "title")`; `raw_title` keeps its quotes
    Link {
        alt: String,
        raw_title: Option<String>,
    },
}

/// An image reference found in note text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    /// Matched text, replaced verbatim on rewrite
    pub span: String,
    /// Reference passed to the resolver
    pub target: String,
    pub syntax: ReferenceSyntax,
}

impl AssetReference {
    /// Whether rewriting must leave this reference untouched
    pub fn is_skipped(&self) -> bool {
        self.target.is_empty() || is_remote(&self.target)
    }

    /// Replacement text pointing at `dest_name` in the assets folder
    pub fn render(&self, dest_name: &str) -> String {
        match &self.syntax {
            ReferenceSyntax::Embed => {
                let alt = Path::new(dest_name)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("![{}]({}{})", alt, C::ASSETS_LINK_PREFIX, dest_name)
            }
            ReferenceSyntax::Link { alt, raw_title } => {
                let title = raw_title
                    .as_ref()
                    .map(|t| format!(" {}", t))
                    .unwrap_or_default();
                format!("![{}]({}{}{})", alt, C::ASSETS_LINK_PREFIX, dest_name, title)
            }
        }
    }
}

/// Target and optional title of a link's parenthesized part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub url: String,
    pub title: Option<String>,
    /// Title including its quotes, as written
    pub raw_title: Option<String>,
}

/// Check whether a reference points somewhere other than a local file
pub fn is_remote(url: &str) -> bool {
    let lower = url.trim().to_lowercase();
    C::REMOTE_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Split `(url "title")` content into url and title
pub fn parse_link_target(content: &str) -> LinkTarget {
    let trimmed = content.trim();
    let raw = match trimmed.strip_prefix('<').and_then(|inner| inner.split_once('>')) {
        Some((inside, rest)) if rest.trim().is_empty() => inside.trim().to_string(),
        Some((inside, rest)) => format!("{} {}", inside.trim(), rest.trim()),
        None => trimmed.to_string(),
    };

    if let Some(caps) = TITLE_RE.captures(&raw) {
        if let Some(whole) = caps.get(0) {
            let title = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str().to_string());
            return LinkTarget {
                url: raw[..whole.start()].trim().to_string(),
                title,
                raw_title: Some(whole.as_str().trim().to_string()),
            };
        }
    }

    LinkTarget {
        url: raw.trim().to_string(),
        title: None,
        raw_title: None,
    }
}

/// Find every embed and link image reference in `content`.
///
/// Embeds come first, then links, each in text order.
pub fn scan_references(content: &str) -> Vec<AssetReference> {
    let embeds = EMBED_RE.captures_iter(content).map(|caps| AssetReference {
        span: caps[0].to_string(),
        target: caps[1].trim().to_string(),
        syntax: ReferenceSyntax::Embed,
    });

    let links = LINK_RE.captures_iter(content).map(|caps| {
        let target = parse_link_target(&caps[2]);
        AssetReference {
            span: caps[0].to_string(),
            target: target.url.trim().to_string(),
            syntax: ReferenceSyntax::Link {
                alt: caps[1].to_string(),
                raw_title: target.raw_title,
            },
        }
    });

    embeds.chain(links).collect()
}

/// Parse a value that consists of exactly one embed or one link
pub fn parse_single_reference(value: &str) -> Option<AssetReference> {
    if let Some(caps) = EMBED_FULL_RE.captures(value) {
        return Some(AssetReference {
            span: value.to_string(),
            target: caps[1].trim().to_string(),
            syntax: ReferenceSyntax::Embed,
        });
    }

    let caps = LINK_FULL_RE.captures(value)?;
    let target = parse_link_target(&caps[2]);
    Some(AssetReference {
        span: value.to_string(),
        target: target.url.trim().to_string(),
        syntax: ReferenceSyntax::Link {
            alt: caps[1].to_string(),
            raw_title: target.raw_title,
        },
    })
}

/// Rewrite every local image reference in `content`.
///
/// Each occurrence of a matched span is replaced, so a reference written
/// twice is rewritten twice but resolved once.
pub fn rewrite_body(
    content: &str,
    materializer: &mut AssetMaterializer<'_>,
) -> Result<String, AssetError> {
    let mut updated = content.to_string();

    for reference in scan_references(content) {
        if reference.is_skipped() {
            continue;
        }
        let dest_name = materializer.ensure_copied(&reference.target)?;
        updated = updated.replace(&reference.span, &reference.render(&dest_name));
    }

    Ok(updated)
}

/// Move a `banner` image reference into an `image` field.
///
/// Returns `true` when the front matter changed. Values that are not a single
/// embed or link, or that point at a remote URL, are kept as they are.
pub fn rewrite_banner(
    frontmatter: &mut Frontmatter,
    materializer: &mut AssetMaterializer<'_>,
) -> Result<bool, AssetError> {
    let Some(Value::String(raw)) = frontmatter.get(C::FIELD_BANNER) else {
        return Ok(false);
    };
    let Some(reference) = parse_single_reference(raw) else {
        return Ok(false);
    };
    if reference.is_skipped() {
        return Ok(false);
    }

    let dest_name = materializer.ensure_copied(&reference.target)?;
    frontmatter.insert(
        C::FIELD_IMAGE.to_string(),
        Value::String(format!("{}{}", C::ASSETS_LINK_PREFIX, dest_name)),
    );
    frontmatter.shift_remove(C::FIELD_BANNER);
    Ok(true)
}
