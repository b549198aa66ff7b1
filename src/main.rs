//! # Vault Press
//!
//! A pipeline that converts an Obsidian-style vault of Markdown notes into a
//! Quarto book project: frontmatter is normalized, image and cross-note
//! references are rewritten against the flattened output layout, dated
//! journal notes are merged into one chronological document, and a build
//! manifest describing chapter order and output formats is emitted.
//!
//! ## Usage
//!
//! ```sh
//! vault_press -i ./vault -o ./book
//! vault_press -i ./vault -o ./book --render
//! ```
//!
//! ## Architecture
//!
//! The application follows a sequential pipeline:
//! 1. **Discovery**: Walk the vault for `.md` notes in subfolders
//! 2. **Extraction**: Split frontmatter, normalize tags, resolve dates
//! 3. **Rewriting**: Fix asset embeds and cross-document links
//! 4. **Assembly**: Write chapters, the aggregated journal, the landing
//!    page, and the `_quarto.yml` manifest; copy referenced assets
//! 5. **Render** (optional): Invoke `quarto render` and copy resources into
//!    the rendered book

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod dates;
mod frontmatter;
mod journal;
mod models;
mod outputs;
mod render;
mod rewrite;
mod utils;

use cli::Cli;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("vault_press starting up");

    let args = Cli::parse();
    debug!(?args.input_dir, ?args.output_dir, "Parsed CLI arguments");
    let settings = args.into_settings();

    // Early check: ensure the output dir is writable
    if let Err(e) = ensure_writable_dir(&settings.output_dir).await {
        error!(
            path = %settings.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    outputs::project::assemble(&settings).await?;

    if settings.render {
        render::render_book(&settings).await?;
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
