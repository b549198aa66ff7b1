//! The project assembler.
//!
//! Orchestrates the full pipeline over the vault: document discovery, the
//! metadata/date first pass, identity-map construction, the rewrite passes,
//! chapter and journal output, the landing page, the build manifest, and the
//! selective asset copy.
//!
//! # Failure policy
//!
//! An empty vault is fatal and produces no output. Everything else is
//! per-document: a note that fails to read or write is logged and skipped,
//! never blocking its siblings.

use crate::cli::Settings;
use crate::frontmatter;
use crate::journal::{self, JOURNAL_OUTPUT};
use crate::models::{Chapter, IdentityMap, VaultDocument};
use crate::rewrite::assets::{rewrite_asset_paths, AssetContext};
use crate::rewrite::links::rewrite_doc_links;
use crate::{dates, outputs::manifest};
use itertools::Itertools;
use serde_yaml::Mapping;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, instrument, warn};
use walkdir::WalkDir;

/// Discover processable documents, as paths relative to the vault root.
///
/// Walks the vault for `.md` files, skipping the `_resources` folder and
/// documents sitting directly in the vault root (only notes inside
/// subfolders are part of the book). Results are sorted for deterministic
/// processing order.
pub fn discover_documents(input_dir: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for entry in WalkDir::new(input_dir).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(input_dir) else {
            continue;
        };
        if rel.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        if rel
            .components()
            .next()
            .is_some_and(|c| c.as_os_str() == "_resources")
        {
            continue;
        }
        if rel.parent().is_none_or(|p| p.as_os_str().is_empty()) {
            debug!(path = %rel.display(), "Skipping root-level document");
            continue;
        }
        found.push(rel.to_path_buf());
    }
    found.sort();
    found
}

fn output_name_for(rel: &Path) -> String {
    let stem = rel
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");
    format!("{stem}.qmd")
}

/// Re-serialize a document: frontmatter block (when non-empty) plus body.
fn render_document(metadata: &Mapping, body: &str) -> String {
    if metadata.is_empty() {
        return body.to_string();
    }
    let yaml = serde_yaml::to_string(metadata).unwrap_or_default();
    format!("---\n{yaml}---\n\n{body}")
}

/// Copy the assets named in the reference set from the vault's `_resources`
/// into the project's `_resources`. Copying is driven solely by the set;
/// assets nobody references are never copied.
///
/// Embeds are flattened to basenames, so a referenced asset may live in a
/// subfolder of `_resources`; the folder is indexed by basename first. On
/// duplicate basenames the lexicographically first path wins, matching link
/// resolution.
async fn copy_referenced_assets(
    settings: &Settings,
    assets: &BTreeSet<String>,
) -> Result<usize, Box<dyn Error>> {
    if assets.is_empty() {
        return Ok(0);
    }
    let src_dir = settings.resources_dir();
    if fs::metadata(&src_dir).await.is_err() {
        warn!(path = %src_dir.display(), "Vault has no _resources folder; skipping asset copy");
        return Ok(0);
    }

    let mut index: BTreeMap<String, PathBuf> = BTreeMap::new();
    for entry in WalkDir::new(&src_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            index
                .entry(name.to_string())
                .or_insert_with(|| entry.path().to_path_buf());
        }
    }

    let dst_dir = settings.output_resources_dir();
    fs::create_dir_all(&dst_dir).await?;

    let mut copied = 0;
    for name in assets {
        let Some(src) = index.get(name) else {
            warn!(asset = %name, "Referenced asset missing from _resources");
            continue;
        };
        match fs::copy(src, dst_dir.join(name)).await {
            Ok(_) => copied += 1,
            Err(e) => warn!(asset = %name, error = %e, "Failed copying referenced asset"),
        }
    }
    info!(copied, referenced = assets.len(), "Copied referenced assets");
    Ok(copied)
}

/// Run the whole pipeline over the vault.
///
/// Builds the identity map before any rewriting so forward references
/// resolve regardless of processing order, writes one chapter per standalone
/// document, the aggregated journal (forced first in the chapter order), the
/// landing page, and the manifest, then copies referenced assets.
#[instrument(level = "info", skip_all, fields(input = %settings.input_dir.display(), output = %settings.output_dir.display()))]
pub async fn assemble(settings: &Settings) -> Result<(), Box<dyn Error>> {
    let relative_paths = discover_documents(&settings.input_dir);
    if relative_paths.is_empty() {
        error!(
            input = %settings.input_dir.display(),
            "No markdown documents found in the vault or its subfolders"
        );
        return Err("no markdown documents found in the vault".into());
    }
    info!(count = relative_paths.len(), "Discovered vault documents");

    // First pass: metadata, dates, classification. No rewriting yet.
    let mut standalone: Vec<VaultDocument> = Vec::new();
    let mut journal_entries: Vec<VaultDocument> = Vec::new();
    for rel in relative_paths {
        let path = settings.input_dir.join(&rel);
        let (mut metadata, body) = frontmatter::read_document(&path).await;
        if body.is_empty() {
            warn!(path = %rel.display(), "Skipping document with empty or unreadable body");
            continue;
        }
        frontmatter::normalize_tags(&mut metadata);

        let file_name = rel
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let date = dates::resolve_date(&metadata, &file_name);
        let doc = VaultDocument {
            output_name: output_name_for(&rel),
            source_path: rel,
            metadata,
            body,
            date,
        };
        if journal::is_journal_entry(&file_name, &doc.metadata) {
            journal_entries.push(doc);
        } else {
            standalone.push(doc);
        }
    }

    // Identity map before any rewriting; journal entries all resolve to the
    // composite document.
    let mut identity = IdentityMap::new();
    for doc in &standalone {
        identity.insert(doc.source_path.clone(), doc.output_name.clone());
    }
    for doc in &journal_entries {
        identity.insert(doc.source_path.clone(), JOURNAL_OUTPUT.to_string());
    }

    fs::create_dir_all(settings.chapters_dir()).await?;

    let mut assets: BTreeSet<String> = BTreeSet::new();
    let mut chapters: Vec<Chapter> = Vec::new();

    for doc in &standalone {
        let label = doc.label();
        let body = rewrite_asset_paths(&doc.body, AssetContext::Chapter, &mut assets, &label);
        let body = rewrite_doc_links(&body, &identity);
        let out_path = settings.chapters_dir().join(&doc.output_name);
        if let Err(e) = fs::write(&out_path, render_document(&doc.metadata, &body)).await {
            error!(path = %out_path.display(), error = %e, "Failed writing chapter; skipping document");
            continue;
        }
        debug!(source = %label, output = %out_path.display(), "Processed document");
        chapters.push(Chapter {
            date: doc.date,
            file: format!("chapters/{}", doc.output_name),
        });
    }

    // Journal composite is forced first among the chapters.
    let mut chapter_files: Vec<String> = Vec::new();
    if !journal_entries.is_empty() {
        let entry_count = journal_entries.len();
        let merged = journal::aggregate_journal(journal_entries, &identity, &mut assets);
        let journal_path = settings.chapters_dir().join(JOURNAL_OUTPUT);
        match fs::write(&journal_path, merged).await {
            Ok(()) => {
                info!(entries = entry_count, path = %journal_path.display(), "Wrote aggregated journal");
                chapter_files.push(format!("chapters/{JOURNAL_OUTPUT}"));
            }
            Err(e) => {
                error!(path = %journal_path.display(), error = %e, "Failed writing journal; continuing without it");
            }
        }
    }
    chapter_files.extend(
        chapters
            .into_iter()
            .sorted_by_key(|c| c.date)
            .map(|c| c.file),
    );

    // Landing page runs through the asset rewriter like everything else.
    let landing = format!(
        "# Welcome to {}\n\nThis is a collection of processed notes.\n",
        settings.title
    );
    let landing = rewrite_asset_paths(&landing, AssetContext::OutputRoot, &mut assets, "index.qmd");
    fs::write(settings.output_dir.join("index.qmd"), landing).await?;

    manifest::write_manifest(settings, chapter_files).await?;
    copy_referenced_assets(settings, &assets).await?;

    info!("Quarto project assembled");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;

    fn write_note(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        stdfs::create_dir_all(path.parent().unwrap()).unwrap();
        stdfs::write(path, content).unwrap();
    }

    #[test]
    fn test_discover_skips_root_level_and_resources() {
        let dir = tempfile::tempdir().unwrap();
        write_note(dir.path(), "root.md", "x");
        write_note(dir.path(), "notes/a.md", "x");
        write_note(dir.path(), "_resources/stray.md", "x");
        write_note(dir.path(), "notes/image.png", "x");

        let found = discover_documents(dir.path());
        assert_eq!(found, vec![PathBuf::from("notes/a.md")]);
    }

    #[test]
    fn test_render_document_with_and_without_frontmatter() {
        let (metadata, _) = crate::frontmatter::split_frontmatter("---\ntitle: T\n---\nx");
        let rendered = render_document(&metadata, "Body");
        assert!(rendered.starts_with("---\n"));
        assert!(rendered.contains("title: T"));
        assert!(rendered.ends_with("---\n\nBody"));

        assert_eq!(render_document(&Mapping::new(), "Body"), "Body");
    }

    #[tokio::test]
    async fn test_assemble_orders_chapters_by_date() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("vault");
        let output = dir.path().join("book");
        write_note(&input, "notes/later.md", "---\ndate: 2025-01-10\n---\n\nLater note.\n");
        write_note(&input, "notes/earlier.md", "---\ndate: 2025-01-02\n---\n\nEarlier note.\n");

        let settings = Settings::for_test(&input, &output);
        assemble(&settings).await.unwrap();

        let yaml = stdfs::read_to_string(output.join("_quarto.yml")).unwrap();
        let earlier = yaml.find("chapters/earlier.qmd").unwrap();
        let later = yaml.find("chapters/later.qmd").unwrap();
        assert!(earlier < later);
        assert!(output.join("chapters/later.qmd").exists());
        assert!(output.join("index.qmd").exists());
    }

    #[tokio::test]
    async fn test_assemble_empty_vault_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("vault");
        let output = dir.path().join("book");
        stdfs::create_dir_all(&input).unwrap();

        let settings = Settings::for_test(&input, &output);
        assert!(assemble(&settings).await.is_err());
        assert!(!output.join("_quarto.yml").exists());
        assert!(!output.join("chapters").exists());
    }

    #[tokio::test]
    async fn test_assemble_journal_forced_first() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("vault");
        let output = dir.path().join("book");
        write_note(
            &input,
            "daily/Notes 250104.md",
            "---\ntags: [notes]\n---\n\nJournal day.\n",
        );
        write_note(&input, "notes/old.md", "---\ndate: 2020-01-01\n---\n\nOld note.\n");

        let settings = Settings::for_test(&input, &output);
        assemble(&settings).await.unwrap();

        let yaml = stdfs::read_to_string(output.join("_quarto.yml")).unwrap();
        let journal_pos = yaml.find("chapters/journal.qmd").unwrap();
        let old_pos = yaml.find("chapters/old.qmd").unwrap();
        assert!(journal_pos < old_pos);

        let merged = stdfs::read_to_string(output.join("chapters/journal.qmd")).unwrap();
        assert!(merged.contains("# Journal"));
        assert!(merged.contains("Saturday, January 4, 2025"));
        assert!(!output.join("chapters/Notes 250104.qmd").exists());
    }

    #[tokio::test]
    async fn test_assemble_copies_only_referenced_assets() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("vault");
        let output = dir.path().join("book");
        write_note(
            &input,
            "notes/pics.md",
            "---\ndate: 2025-01-02\n---\n\n![p](../../_resources/used.png)\n",
        );
        stdfs::create_dir_all(input.join("_resources")).unwrap();
        stdfs::write(input.join("_resources/used.png"), b"png").unwrap();
        stdfs::write(input.join("_resources/unused.png"), b"png").unwrap();

        let settings = Settings::for_test(&input, &output);
        assemble(&settings).await.unwrap();

        assert!(output.join("_resources/used.png").exists());
        assert!(!output.join("_resources/unused.png").exists());

        let chapter = stdfs::read_to_string(output.join("chapters/pics.qmd")).unwrap();
        assert!(chapter.contains("![p](../_resources/used.png)"));
    }

    #[tokio::test]
    async fn test_assemble_copies_assets_nested_under_resources() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("vault");
        let output = dir.path().join("book");
        write_note(
            &input,
            "notes/pics.md",
            "---\ndate: 2025-01-02\n---\n\n![p](../../_resources/2025/deep.png)\n",
        );
        stdfs::create_dir_all(input.join("_resources/2025")).unwrap();
        stdfs::write(input.join("_resources/2025/deep.png"), b"png").unwrap();

        let settings = Settings::for_test(&input, &output);
        assemble(&settings).await.unwrap();

        // The flattened link and the copied asset must agree.
        let chapter = stdfs::read_to_string(output.join("chapters/pics.qmd")).unwrap();
        assert!(chapter.contains("![p](../_resources/deep.png)"));
        assert!(output.join("_resources/deep.png").exists());
    }

    #[tokio::test]
    async fn test_assemble_survives_failed_journal_write() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("vault");
        let output = dir.path().join("book");
        write_note(
            &input,
            "daily/Notes 250104.md",
            "---\ntags: [notes]\n---\n\nJournal day.\n",
        );
        write_note(&input, "notes/old.md", "---\ndate: 2020-01-01\n---\n\nOld note.\n");
        // Occupy the journal output path with a directory so the write fails.
        stdfs::create_dir_all(output.join("chapters/journal.qmd")).unwrap();

        let settings = Settings::for_test(&input, &output);
        assemble(&settings).await.unwrap();

        let yaml = stdfs::read_to_string(output.join("_quarto.yml")).unwrap();
        assert!(!yaml.contains("chapters/journal.qmd"));
        assert!(yaml.contains("chapters/old.qmd"));
        assert!(output.join("chapters/old.qmd").exists());
    }

    #[tokio::test]
    async fn test_assemble_resolves_cross_links() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("vault");
        let output = dir.path().join("book");
        write_note(&input, "notes/a.md", "---\ndate: 2025-01-02\n---\n\nSee [b](b.md).\n");
        write_note(&input, "notes/b.md", "---\ndate: 2025-01-03\n---\n\nSee [a](a.md).\n");

        let settings = Settings::for_test(&input, &output);
        assemble(&settings).await.unwrap();

        let a = stdfs::read_to_string(output.join("chapters/a.qmd")).unwrap();
        let b = stdfs::read_to_string(output.join("chapters/b.qmd")).unwrap();
        assert!(a.contains("[b](b.qmd)"));
        assert!(b.contains("[a](a.qmd)"));
    }
}
