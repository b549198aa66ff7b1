//! Frontmatter extraction and tag normalization.
//!
//! Splits a note into its `---`-delimited YAML metadata block and body text,
//! tolerating absent or malformed blocks, and coerces the `tags` field into a
//! canonical list of strings.
//!
//! # Failure policy
//!
//! Nothing in this module aborts a run. A malformed block or unreadable file
//! degrades to an empty map (and, for hard failures, an empty body) with a
//! diagnostic, so a single broken note never blocks its siblings.

use serde_yaml::{Mapping, Value};
use std::path::Path;
use tokio::fs;
use tracing::{error, info, warn};

/// Shape of a frontmatter `tags` value before normalization.
#[derive(Debug)]
enum TagsShape {
    Scalar(String),
    List(Vec<Value>),
    Invalid,
}

/// Normalize exotic Unicode line separators to `\n`.
///
/// Obsidian paste artifacts occasionally carry U+2028/U+2029/U+0085, which
/// would make the delimiter split disagree across rendering engines.
fn normalize_line_separators(text: &str) -> String {
    text.replace(['\u{2028}', '\u{2029}', '\u{0085}'], "\n")
}

/// Split a document into its frontmatter map and body.
///
/// If the text starts with `---` and a second delimiter follows, the block
/// between the delimiters is parsed as YAML and everything after the second
/// delimiter (trimmed) becomes the body. A document without a block is
/// returned whole as the body with an empty map. A block that fails to parse
/// yields an empty map and an empty body, which the assembler treats as a
/// skippable document.
pub fn split_frontmatter(text: &str) -> (Mapping, String) {
    let text = normalize_line_separators(text);
    if text.starts_with("---") {
        let parts: Vec<&str> = text.splitn(3, "---").collect();
        if parts.len() >= 3 {
            match serde_yaml::from_str::<Option<Mapping>>(parts[1]) {
                Ok(metadata) => {
                    return (metadata.unwrap_or_default(), parts[2].trim().to_string());
                }
                Err(e) => {
                    warn!(error = %e, "Frontmatter block failed to parse; skipping document body");
                    return (Mapping::new(), String::new());
                }
            }
        }
    }
    (Mapping::new(), text)
}

/// Read a note from disk and split it into frontmatter and body.
///
/// I/O failures are logged and reported as an empty map and empty body;
/// processing continues with the next document.
pub async fn read_document(path: &Path) -> (Mapping, String) {
    match fs::read_to_string(path).await {
        Ok(content) => split_frontmatter(&content),
        Err(e) => {
            error!(path = %path.display(), error = %e, "Error reading document");
            (Mapping::new(), String::new())
        }
    }
}

/// Stringify a scalar YAML value the way it reads in the source.
pub(crate) fn stringify_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn classify_tags(value: Value) -> TagsShape {
    match value {
        Value::String(s) => TagsShape::Scalar(s),
        Value::Sequence(items) => TagsShape::List(items),
        _ => TagsShape::Invalid,
    }
}

/// Ensure a `tags` field, when present, is a list of strings.
///
/// A bare string is wrapped into a one-element list; list elements are
/// stringified individually; any other shape (map, number, boolean, null)
/// removes the key entirely with a warning. Total: never fails.
pub fn normalize_tags(metadata: &mut Mapping) {
    let key = Value::String("tags".to_string());
    let Some(value) = metadata.get(&key).cloned() else {
        return;
    };

    match classify_tags(value) {
        TagsShape::Scalar(tag) => {
            info!(%tag, "Converted bare tags string to a list");
            metadata.insert(key, Value::Sequence(vec![Value::String(tag)]));
        }
        TagsShape::List(items) => {
            let tags = items
                .iter()
                .map(|item| Value::String(stringify_scalar(item)))
                .collect();
            metadata.insert(key, Value::Sequence(tags));
        }
        TagsShape::Invalid => {
            warn!("Invalid tags shape; removing the field");
            metadata.remove(&key);
        }
    }
}
