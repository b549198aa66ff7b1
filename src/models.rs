//! Data models for vault documents and the generated Quarto project.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`VaultDocument`]: a source note with extracted metadata, body, and date
//! - [`Chapter`]: a (date, output file) pair used for global ordering
//! - [`IdentityMap`]: source path to output filename, built before rewriting
//! - [`QuartoConfig`] and its sections: the `_quarto.yml` build manifest
//!
//! The manifest structs use serde renames (`type`, `output-dir`) to match the
//! key names Quarto expects.

use chrono::NaiveDate;
use serde::Serialize;
use serde_yaml::Mapping;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Mapping from source path (relative to the vault root) to output filename.
///
/// Built once, before any link rewriting, so forward references between
/// documents resolve regardless of processing order. A `BTreeMap` keeps
/// iteration deterministic, which fixes which entry wins when two source
/// files share a basename.
pub type IdentityMap = BTreeMap<PathBuf, String>;

/// A single source note after metadata extraction.
///
/// Constructed once per source file at pipeline start; metadata, body, and
/// date are derived during the first pass and never mutated after the
/// assembler consumes the document.
#[derive(Debug)]
pub struct VaultDocument {
    /// Path relative to the vault root.
    pub source_path: PathBuf,
    /// Parsed frontmatter map (empty when absent or malformed).
    pub metadata: Mapping,
    /// Body text with the frontmatter block stripped.
    pub body: String,
    /// Resolved calendar date; `NaiveDate::MIN` for undated documents.
    pub date: NaiveDate,
    /// Flattened output filename, e.g. `My Note.qmd`.
    pub output_name: String,
}

impl VaultDocument {
    /// Base filename of the source document.
    pub fn file_name(&self) -> &str {
        self.source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Human-readable label for diagnostics.
    pub fn label(&self) -> String {
        self.source_path.display().to_string()
    }
}

/// A (date, output file) pair in the global chapter ordering.
#[derive(Debug, Clone)]
pub struct Chapter {
    /// Resolved document date used as the sort key.
    pub date: NaiveDate,
    /// Path of the chapter file relative to the project root.
    pub file: String,
}

/// The `_quarto.yml` build manifest.
///
/// Fully regenerated on every run; there is no incremental merge with a
/// prior manifest.
#[derive(Debug, Serialize)]
pub struct QuartoConfig {
    pub project: ProjectSection,
    pub book: BookSection,
    pub format: FormatSection,
}

/// The `project:` section of the manifest.
#[derive(Debug, Serialize)]
pub struct ProjectSection {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "output-dir")]
    pub output_dir: String,
}

/// The `book:` section: title, author, generation date, and chapter order.
#[derive(Debug, Serialize)]
pub struct BookSection {
    pub title: String,
    pub author: String,
    pub date: String,
    pub chapters: Vec<String>,
}

/// Recognized output formats.
#[derive(Debug, Serialize)]
pub struct FormatSection {
    pub html: HtmlFormat,
    pub docx: DocxFormat,
    pub pdf: PdfFormat,
    pub epub: EpubFormat,
}

#[derive(Debug, Serialize)]
pub struct HtmlFormat {
    pub theme: String,
}

#[derive(Debug, Serialize)]
pub struct DocxFormat {}

#[derive(Debug, Serialize)]
pub struct PdfFormat {
    pub documentclass: String,
}

#[derive(Debug, Serialize)]
pub struct EpubFormat {}

impl QuartoConfig {
    /// Build the manifest for a book project rooted at the output directory.
    ///
    /// `chapters` must already be in final order, starting with the landing
    /// page.
    pub fn new(title: &str, author: &str, date: String, chapters: Vec<String>) -> Self {
        QuartoConfig {
            project: ProjectSection {
                kind: "book".to_string(),
                output_dir: "_book".to_string(),
            },
            book: BookSection {
                title: title.to_string(),
                author: author.to_string(),
                date,
                chapters,
            },
            format: FormatSection {
                html: HtmlFormat {
                    theme: "cosmo".to_string(),
                },
                docx: DocxFormat {},
                pdf: PdfFormat {
                    documentclass: "scrbook".to_string(),
                },
                epub: EpubFormat {},
            },
        }
    }
}
