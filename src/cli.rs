//! Command-line interface definitions for Vault Press.
//!
//! This module defines the CLI arguments and options using the `clap` crate,
//! plus the [`Settings`] structure that the rest of the pipeline consumes.
//! Paths are threaded explicitly through the pipeline via `Settings` rather
//! than ambient constants.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Vault Press application.
///
/// This struct defines all configuration options that can be passed to the
/// application at runtime: the vault and output directories, book metadata,
/// and the optional render step.
///
/// # Examples
///
/// ```sh
/// # Basic usage with required arguments
/// vault_press -i ./vault -o ./book
///
/// # Render the assembled project with Quarto afterwards
/// vault_press -i ./vault -o ./book --render
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Vault directory containing the source Markdown notes
    #[arg(short, long, env = "VAULT_INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Output directory for the generated Quarto project
    #[arg(short, long, env = "VAULT_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Book title written into the build manifest
    #[arg(long, default_value = "Notes 2025")]
    pub title: String,

    /// Book author written into the build manifest
    #[arg(long, default_value = "Sprague")]
    pub author: String,

    /// Invoke `quarto render` on the assembled project
    #[arg(long)]
    pub render: bool,
}

impl Cli {
    /// Convert parsed arguments into the pipeline [`Settings`].
    pub fn into_settings(self) -> Settings {
        Settings {
            input_dir: self.input_dir,
            output_dir: self.output_dir,
            title: self.title,
            author: self.author,
            render: self.render,
        }
    }
}

/// Resolved pipeline configuration.
///
/// All path derivations hang off this struct so every stage receives its
/// locations explicitly.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root of the source vault.
    pub input_dir: PathBuf,
    /// Root of the generated Quarto project.
    pub output_dir: PathBuf,
    /// Book title for the manifest and landing page.
    pub title: String,
    /// Book author for the manifest.
    pub author: String,
    /// Whether to invoke the external render toolchain after assembly.
    pub render: bool,
}

impl Settings {
    /// Directory holding per-document chapter files.
    pub fn chapters_dir(&self) -> PathBuf {
        self.output_dir.join("chapters")
    }

    /// Shared binary-asset folder inside the vault.
    pub fn resources_dir(&self) -> PathBuf {
        self.input_dir.join("_resources")
    }

    /// Asset folder inside the generated project.
    pub fn output_resources_dir(&self) -> PathBuf {
        self.output_dir.join("_resources")
    }

    /// Directory Quarto renders the book into.
    pub fn rendered_book_dir(&self) -> PathBuf {
        self.output_dir.join("_book")
    }

    #[cfg(test)]
    pub fn for_test(input_dir: &std::path::Path, output_dir: &std::path::Path) -> Self {
        Settings {
            input_dir: input_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            title: "Notes 2025".to_string(),
            author: "Test".to_string(),
            render: false,
        }
    }
}
