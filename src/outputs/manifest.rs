//! Build-manifest serialization.
//!
//! Writes `_quarto.yml` describing the book: title, author, generation date,
//! output formats, and the ordered chapter list. The manifest is regenerated
//! wholesale on every run.

use crate::cli::Settings;
use crate::models::QuartoConfig;
use chrono::Local;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

/// Write the `_quarto.yml` manifest.
///
/// `chapter_files` is the final chapter order relative to the project root;
/// the landing page is prepended here.
#[instrument(level = "info", skip_all, fields(output_dir = %settings.output_dir.display()))]
pub async fn write_manifest(
    settings: &Settings,
    chapter_files: Vec<String>,
) -> Result<(), Box<dyn Error>> {
    let mut chapters = vec!["index.qmd".to_string()];
    chapters.extend(chapter_files);

    let config = QuartoConfig::new(
        &settings.title,
        &settings.author,
        Local::now().format("%Y-%m-%d").to_string(),
        chapters,
    );

    let yaml = serde_yaml::to_string(&config)?;
    let path = settings.output_dir.join("_quarto.yml");
    fs::write(&path, yaml).await?;
    info!(path = %path.display(), "Wrote build manifest");
    Ok(())
}
