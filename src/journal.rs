//! Journal classification and aggregation.
//!
//! Dated `Notes YYMMDD` files tagged `notes` are journal entries. Instead of
//! becoming individual chapters they are sorted by resolved date and merged
//! into one composite document, each entry under a date banner derived from
//! its filename.

use crate::dates::banner_for;
use crate::models::{IdentityMap, VaultDocument};
use crate::rewrite::assets::{rewrite_asset_paths, AssetContext};
use crate::rewrite::links::rewrite_doc_links;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeSet;
use std::fmt::Write;
use tracing::info;

/// Output filename of the aggregated journal document.
pub const JOURNAL_OUTPUT: &str = "journal.qmd";

/// Journal filename: `Notes ` + six digits + optional trailing token.
static JOURNAL_FILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Notes \d{6}(?:\s.+)?\.md$").unwrap());

/// Classify a document as a journal entry.
///
/// Requires both the filename pattern and a literal `notes` tag. A bare
/// string `tags: notes` is tolerated for callers that have not normalized
/// the metadata yet.
pub fn is_journal_entry(filename: &str, metadata: &Mapping) -> bool {
    if !JOURNAL_FILE_RE.is_match(filename) {
        return false;
    }
    match metadata.get("tags") {
        Some(Value::String(s)) => s == "notes",
        Some(Value::Sequence(items)) => items
            .iter()
            .any(|v| matches!(v, Value::String(s) if s == "notes")),
        _ => false,
    }
}

/// Merge journal entries into one composite document.
///
/// Entries are sorted ascending by resolved date (stable, so undated entries
/// keep discovery order among themselves), each body is passed through the
/// asset and link rewriters, and a date banner heads every entry.
pub fn aggregate_journal(
    mut entries: Vec<VaultDocument>,
    identity: &IdentityMap,
    assets: &mut BTreeSet<String>,
) -> String {
    entries.sort_by_key(|doc| doc.date);

    let mut merged = String::from("# Journal\n");
    for doc in &entries {
        let body = rewrite_asset_paths(&doc.body, AssetContext::Chapter, assets, &doc.label());
        let body = rewrite_doc_links(&body, identity);
        let banner = banner_for(doc.file_name());
        write!(merged, "\n## {banner}\n\n{body}\n").unwrap();
    }
    info!(entries = entries.len(), "Aggregated journal entries");
    merged
}
