//! External render-toolchain boundary.
//!
//! Invokes `quarto render` against the assembled project and, only after a
//! successful render, copies the project's `_resources` folder into the
//! rendered book directory. A non-zero exit halts the run before any
//! post-render copying; everything written by earlier stages stays on disk.

use crate::cli::Settings;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tokio::process::Command;
use tracing::{error, info, instrument};

/// Render the assembled project with Quarto.
///
/// Blocks until the subprocess exits. Success gates the post-render resource
/// copy into `_book/_resources`.
#[instrument(level = "info", skip_all, fields(dir = %settings.output_dir.display()))]
pub async fn render_book(settings: &Settings) -> Result<(), Box<dyn Error>> {
    info!("Invoking quarto render");
    let status = Command::new("quarto")
        .arg("render")
        .arg(&settings.output_dir)
        .status()
        .await?;

    if !status.success() {
        error!(code = ?status.code(), "quarto render failed; skipping post-render resource copy");
        return Err(format!("quarto render exited with status {status}").into());
    }

    let copied = copy_dir_flat(
        &settings.output_resources_dir(),
        &settings.rendered_book_dir().join("_resources"),
    )
    .await?;
    info!(copied, "Render complete; resources copied into the rendered book");
    Ok(())
}

/// Copy the regular files of one directory into another (no recursion; the
/// project resource folder is flat by construction).
async fn copy_dir_flat(src: &Path, dst: &Path) -> Result<usize, Box<dyn Error>> {
    if fs::metadata(src).await.is_err() {
        return Ok(0);
    }
    fs::create_dir_all(dst).await?;

    let mut copied = 0;
    let mut entries = fs::read_dir(src).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            fs::copy(entry.path(), dst.join(entry.file_name())).await?;
            copied += 1;
        }
    }
    Ok(copied)
}
