//! Date resolution for vault documents.
//!
//! Every document gets exactly one calendar date, derived from frontmatter
//! fields (`date` first, then `created`), falling back to date-like tokens in
//! the filename, falling back to a sentinel minimum so undated documents sort
//! first. Resolution is total: nothing here ever fails.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Mapping;
use std::path::Path;
use tracing::warn;

use crate::frontmatter::stringify_scalar;

/// Frontmatter fields tried in priority order.
const DATE_FIELDS: [&str; 2] = ["date", "created"];

/// Filename token formats: ISO-like and compact year-month-day.
const FILENAME_FORMATS: [&str; 2] = ["%Y-%m-%d", "%y%m%d"];

static EMBEDDED_ISO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());

/// Journal-style filename stem: `Notes 250104` or `Notes 250104 Misc`.
static NOTES_STEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Notes (\d{6})(?:\s.*)?$").unwrap());

/// Leniently parse a date out of loosely formatted text.
///
/// Tries exact date formats, then datetime formats (time-of-day discarded),
/// then RFC 3339, then an embedded `YYYY-MM-DD` scan for dates buried in
/// prose like `created on 2025-01-04 at home`.
fn parse_lenient(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%d %B %Y", "%B %d, %Y", "%b %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Some(m) = EMBEDDED_ISO_RE.find(text) {
        if let Ok(date) = NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d") {
            return Some(date);
        }
    }
    None
}

/// Resolve the canonical date for a document.
///
/// Frontmatter fields win over the filename; all parse failures degrade to
/// the next fallback tier; `NaiveDate::MIN` is the final sentinel so undated
/// documents sort before everything else.
pub fn resolve_date(metadata: &Mapping, filename: &str) -> NaiveDate {
    for field in DATE_FIELDS {
        let Some(value) = metadata.get(field) else {
            continue;
        };
        let text = stringify_scalar(value);
        if text.is_empty() {
            continue;
        }
        match parse_lenient(&text) {
            Some(date) => return date,
            None => warn!(field, %filename, value = %text, "Unparseable frontmatter date"),
        }
    }

    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    for token in stem.split_whitespace() {
        for fmt in FILENAME_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(token, fmt) {
                return date;
            }
        }
    }

    warn!(%filename, "No valid date found; using minimum sentinel date");
    NaiveDate::MIN
}

/// Format the date banner for a journal entry.
///
/// A `Notes YYMMDD` stem becomes a full weekday/month/day banner like
/// `Saturday, January 4, 2025`; anything else falls back to the bare stem.
pub fn banner_for(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    if let Some(caps) = NOTES_STEM_RE.captures(stem) {
        if let Ok(date) = NaiveDate::parse_from_str(&caps[1], "%y%m%d") {
            return date.format("%A, %B %-d, %Y").to_string();
        }
    }
    stem.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::split_frontmatter;

    fn metadata(yaml: &str) -> Mapping {
        let (metadata, _) = split_frontmatter(&format!("---\n{yaml}\n---\nx"));
        metadata
    }

    #[test]
    fn test_resolve_from_date_field() {
        let m = metadata("date: 2025-03-09");
        assert_eq!(
            resolve_date(&m, "whatever.md"),
            NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
        );
    }

    #[test]
    fn test_resolve_prefers_date_over_created() {
        let m = metadata("date: 2025-03-09\ncreated: 2024-01-01");
        assert_eq!(
            resolve_date(&m, "x.md"),
            NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
        );
    }

    #[test]
    fn test_resolve_strips_time_of_day() {
        let m = metadata("created: 2025-01-04 10:22:33");
        assert_eq!(
            resolve_date(&m, "x.md"),
            NaiveDate::from_ymd_opt(2025, 1, 4).unwrap()
        );
    }

    #[test]
    fn test_resolve_embedded_date_in_prose() {
        let m = metadata("date: written on 2025-06-15 at home");
        assert_eq!(
            resolve_date(&m, "x.md"),
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
        );
    }

    #[test]
    fn test_resolve_falls_back_to_filename() {
        assert_eq!(
            resolve_date(&Mapping::new(), "Notes 250104 Misc.md"),
            NaiveDate::from_ymd_opt(2025, 1, 4).unwrap()
        );
    }

    #[test]
    fn test_resolve_filename_iso_token() {
        assert_eq!(
            resolve_date(&Mapping::new(), "Notes 2025-01-04.md"),
            NaiveDate::from_ymd_opt(2025, 1, 4).unwrap()
        );
    }

    #[test]
    fn test_resolve_bad_field_falls_through_to_filename() {
        let m = metadata("date: not a date");
        assert_eq!(
            resolve_date(&m, "Notes 250301.md"),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_resolve_sentinel_minimum() {
        let m = metadata("date: not a date");
        assert_eq!(resolve_date(&m, "random.md"), NaiveDate::MIN);
    }

    #[test]
    fn test_banner_for_journal_stem() {
        assert_eq!(banner_for("Notes 250104.md"), "Saturday, January 4, 2025");
        assert_eq!(
            banner_for("Notes 250104 Misc.md"),
            "Saturday, January 4, 2025"
        );
    }

    #[test]
    fn test_banner_falls_back_to_stem() {
        assert_eq!(banner_for("random note.md"), "random note");
    }
}
