//! Front matter codec
//!
//! Reads and writes the flat `key: value` / `key:` + `- item` subset of YAML
//! that Obsidian writes into note headers. This is not a YAML parser: nested
//! mappings, anchors, flow collections and multi-line scalars are not
//! understood. Lines are processed by a small state machine that tracks the
//! most recent bare key and the list items collected under it.

use std::fmt;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants as C;

/// A single front matter value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
}

impl Value {
    /// Borrow the string payload, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the value counts as "present": non-empty string or list,
    /// non-zero number, `true`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Plain decimal text for a float, always with a `.` so it decodes as a float
fn format_float(x: f64) -> String {
    let text = x.to_string();
    if x.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

/// Ordered front matter mapping; keys are unique and keep first-insert order
pub type Frontmatter = IndexMap<String, Value>;

static BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\A---\s*\n(?:(.*?)\n)?---\s*\n(.*)\z").unwrap());

/// Split `content` into its front matter block and the body that follows.
///
/// Returns `None` when the content does not start with a delimited block
/// terminated by a closing `---` line.
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let caps = BLOCK_RE.captures(content)?;
    let block = caps.get(1).map_or("", |m| m.as_str());
    let body = caps.get(2)?.as_str();
    Some((block, body))
}

/// Decode the leading front matter of `content`.
///
/// Returns the parsed mapping and the remaining body. Content without a
/// well-formed block yields an empty mapping and the content unchanged.
pub fn decode(content: &str) -> (Frontmatter, &str) {
    match split_frontmatter(content) {
        Some((block, body)) => (parse_block(block), body),
        None => (Frontmatter::new(), content),
    }
}

/// Parse the lines between the delimiters
pub fn parse_block(block: &str) -> Frontmatter {
    let mut result = Frontmatter::new();
    let mut pending: Option<(String, Vec<Value>)> = None;

    for line in block.trim().lines() {
        let trimmed = line.trim();

        if let Some(item) = trimmed.strip_prefix("- ") {
            // Items without a bare key above them have nowhere to go.
            if let Some((_, items)) = pending.as_mut() {
                items.push(parse_scalar(item));
            }
            continue;
        }

        if trimmed.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        flush_pending(&mut result, pending.take());

        let key = key.trim().to_string();
        let value = value.trim();
        if value.is_empty() {
            pending = Some((key, Vec::new()));
        } else {
            result.insert(key, parse_scalar(value));
        }
    }

    flush_pending(&mut result, pending);
    result
}

/// Store a bare key: its list if items followed, null otherwise
fn flush_pending(result: &mut Frontmatter, pending: Option<(String, Vec<Value>)>) {
    if let Some((key, items)) = pending {
        let value = if items.is_empty() {
            Value::Null
        } else {
            Value::List(items)
        };
        result.insert(key, value);
    }
}

/// Type a scalar token: boolean, null, integer, float, quoted string, string
pub fn parse_scalar(token: &str) -> Value {
    let value = token.trim();
    let lower = value.to_lowercase();

    match lower.as_str() {
        "true" | "yes" | "on" => return Value::Bool(true),
        "false" | "no" | "off" => return Value::Bool(false),
        "null" | "none" | "~" | "" => return Value::Null,
        _ => {}
    }

    if value.contains('.') {
        if let Ok(f) = value.parse::<f64>() {
            return Value::Float(f);
        }
    } else if let Ok(i) = value.parse::<i64>() {
        return Value::Int(i);
    }

    if let Some(inner) = strip_quotes(value) {
        return Value::String(inner.to_string());
    }

    Value::String(value.to_string())
}

/// Remove one layer of matching single or double quotes
fn strip_quotes(value: &str) -> Option<&str> {
    if value.len() < 2 {
        return None;
    }
    ['"', '\'']
        .into_iter()
        .find_map(|q| value.strip_prefix(q).and_then(|v| v.strip_suffix(q)))
}

/// Encode a mapping as a delimited front matter block (without trailing newline)
pub fn encode(frontmatter: &Frontmatter) -> String {
    let mut lines = vec![C::FRONTMATTER_DELIMITER.to_string()];

    for (key, value) in frontmatter {
        match value {
            Value::List(items) => {
                lines.push(format!("{}:", key));
                for item in items {
                    lines.push(format!("{}- {}", C::LIST_ITEM_INDENT, encode_scalar(item)));
                }
            }
            Value::Null => lines.push(format!("{}:", key)),
            other => lines.push(format!("{}: {}", key, encode_scalar(other))),
        }
    }

    lines.push(C::FRONTMATTER_DELIMITER.to_string());
    lines.join("\n")
}

fn encode_scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) if needs_quotes(s) => format!("\"{}\"", s),
        other => other.to_string(),
    }
}

/// Strings that would be mangled or re-typed when written bare
fn needs_quotes(s: &str) -> bool {
    s.contains(':')
        || s.contains('#')
        || s.starts_with('-')
        || s.trim() != s
        || !matches!(parse_scalar(s), Value::String(ref parsed) if parsed == s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_scalars() {
        let content = "---\ntitle: Hello\ncount: 3\nratio: 0.5\ndraft: yes\nempty: ~\n---\nBody\n";
        let (fm, body) = decode(content);
        assert_eq!(fm["title"], Value::String("Hello".into()));
        assert_eq!(fm["count"], Value::Int(3));
        assert_eq!(fm["ratio"], Value::Float(0.5));
        assert_eq!(fm["draft"], Value::Bool(true));
        assert_eq!(fm["empty"], Value::Null);
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn test_decode_list() {
        let content = "---\ntags:\n  - rust\n  - \"#cli\"\ntitle: x\n---\n";
        let (fm, _) = decode(content);
        assert_eq!(
            fm["tags"],
            Value::List(vec![Value::String("rust".into()), Value::String("#cli".into())])
        );
        assert_eq!(fm["title"], Value::String("x".into()));
    }

    #[test]
    fn test_decode_list_at_end_of_block() {
        let (fm, _) = decode("---\naliases:\n  - one\n---\n");
        assert_eq!(fm["aliases"], Value::List(vec![Value::String("one".into())]));
    }

    #[test]
    fn test_decode_no_block() {
        let content = "# Just a heading\n\ntext";
        let (fm, body) = decode(content);
        assert!(fm.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_decode_unterminated_block() {
        let content = "---\ntitle: x\nno closing line";
        let (fm, body) = decode(content);
        assert!(fm.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_decode_value_keeps_text_after_first_colon() {
        let (fm, _) = decode("---\nsource: https://example.com/a\n---\n");
        assert_eq!(fm["source"], Value::String("https://example.com/a".into()));
    }

    #[test]
    fn test_decode_ignores_comments_and_orphan_items() {
        let (fm, _) = decode("---\n# comment: here\n- stray\ntitle: x\n---\n");
        assert_eq!(fm.len(), 1);
        assert_eq!(fm["title"], Value::String("x".into()));
    }

    #[test]
    fn test_decode_last_write_wins() {
        let (fm, _) = decode("---\ntags: one\ntags:\n  - two\n---\n");
        assert_eq!(fm["tags"], Value::List(vec![Value::String("two".into())]));

        let (fm, _) = decode("---\ntags:\n  - two\ntags: one\n---\n");
        assert_eq!(fm["tags"], Value::String("one".into()));
    }

    #[test]
    fn test_parse_scalar_precedence() {
        assert_eq!(parse_scalar("ON"), Value::Bool(true));
        assert_eq!(parse_scalar("Off"), Value::Bool(false));
        assert_eq!(parse_scalar("None"), Value::Null);
        assert_eq!(parse_scalar("-12"), Value::Int(-12));
        assert_eq!(parse_scalar("2.50"), Value::Float(2.5));
        assert_eq!(parse_scalar("'quoted'"), Value::String("quoted".into()));
        assert_eq!(parse_scalar("\"true\""), Value::String("true".into()));
        assert_eq!(parse_scalar("2024-01-05"), Value::String("2024-01-05".into()));
        assert_eq!(parse_scalar("1.2.3"), Value::String("1.2.3".into()));
        assert_eq!(parse_scalar("\""), Value::String("\"".into()));
    }

    #[test]
    fn test_encode_quoting() {
        let mut fm = Frontmatter::new();
        fm.insert("title".into(), Value::String("Rust: a primer".into()));
        fm.insert("topic".into(), Value::String("#rust".into()));
        fm.insert("lead".into(), Value::String("-dash".into()));
        fm.insert("plain".into(), Value::String("hello world".into()));
        fm.insert("literal".into(), Value::String("yes".into()));
        fm.insert("draft".into(), Value::Bool(false));
        fm.insert("cover".into(), Value::Null);
        fm.insert("tags".into(), Value::List(vec![Value::String("a".into()), Value::Int(2)]));

        let text = encode(&fm);
        assert_eq!(
            text,
            "---\ntitle: \"Rust: a primer\"\ntopic: \"#rust\"\nlead: \"-dash\"\nplain: hello world\n\
             literal: \"yes\"\ndraft: false\ncover:\ntags:\n  - a\n  - 2\n---"
        );
    }

    #[test]
    fn test_encode_float_keeps_fraction() {
        let mut fm = Frontmatter::new();
        fm.insert("weight".into(), Value::Float(1.0));
        assert_eq!(encode(&fm), "---\nweight: 1.0\n---");
    }

    #[test]
    fn test_encode_float_never_uses_exponent() {
        let (first, _) = decode("---\ntiny: 0.00001\nhuge: 12345678901234567.0\n---\n");
        assert_eq!(first["tiny"], Value::Float(0.00001));

        let text = encode(&first);
        assert_eq!(text, "---\ntiny: 0.00001\nhuge: 12345678901234568.0\n---");

        let (second, _) = decode(&format!("{}\n", text));
        assert_eq!(first, second);
    }

    #[test]
    fn test_round_trip() {
        let content = "---\ntitle: \"Part 1: intro\"\ndate: 2024-03-01\nweight: 1.5\npublished: true\n\
                       cover:\ntags:\n  - one\n  - \"two\"\n  - 3\n---\nbody";
        let (first, _) = decode(content);
        let reencoded = format!("{}\n", encode(&first));
        let (second, _) = decode(&reencoded);
        assert_eq!(first, second);
    }

    #[test]
    fn test_encoded_block_is_valid_yaml() {
        let mut fm = Frontmatter::new();
        fm.insert("title".into(), Value::String("A: B".into()));
        fm.insert("count".into(), Value::Int(4));
        fm.insert("tags".into(), Value::List(vec![Value::String("x".into())]));

        let text = encode(&fm);
        let inner = text
            .trim_start_matches("---\n")
            .trim_end_matches("\n---");
        let yaml: serde_yaml::Value = serde_yaml::from_str(inner).unwrap();
        assert_eq!(yaml["title"].as_str(), Some("A: B"));
        assert_eq!(yaml["count"].as_i64(), Some(4));
        assert_eq!(yaml["tags"][0].as_str(), Some("x"));
    }

    mod prop {
        use super::super::*;
        use proptest::prelude::*;

        fn scalar_token() -> impl Strategy<Value = String> {
            prop_oneof![
                "[a-z][a-z ]{0,12}[a-z]",
                "-?[0-9]{1,9}",
                "[0-9]{1,4}\\.[0-9]{1,3}",
                "0\\.0000[0-9]{1,4}",
                "[1-9][0-9]{15,20}\\.[0-9]",
                Just("true".to_string()),
                Just("off".to_string()),
                Just("~".to_string()),
                "\"[a-z:# ]{0,10}\"",
                "'[a-z]{1,8}'",
            ]
        }

        fn block_line() -> impl Strategy<Value = String> {
            prop_oneof![
                ("[a-z_]{1,8}", scalar_token()).prop_map(|(k, v)| format!("{}: {}", k, v)),
                "[a-z_]{1,8}".prop_map(|k| format!("{}:", k)),
                scalar_token().prop_map(|v| format!("  - {}", v)),
            ]
        }

        proptest! {
            #[test]
            fn decode_encode_decode_is_stable(lines in prop::collection::vec(block_line(), 0..12)) {
                let content = format!("---\n{}\n---\nbody", lines.join("\n"));
                let (first, _) = decode(&content);
                let reencoded = format!("{}\nbody", encode(&first));
                let (second, body) = decode(&reencoded);
                prop_assert_eq!(first, second);
                prop_assert_eq!(body, "body");
            }
        }
    }
}
