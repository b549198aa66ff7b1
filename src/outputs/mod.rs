//! Output generation for the Quarto project tree.
//!
//! # Submodules
//!
//! - [`project`]: the assembler — discovers documents, drives the rewrite
//!   pipeline, and writes chapters, the journal, and the landing page
//! - [`manifest`]: serializes the `_quarto.yml` build manifest
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── _quarto.yml            # Build manifest
//! ├── index.qmd              # Generated landing page
//! ├── _resources/            # Referenced assets, selectively copied
//! └── chapters/
//!     ├── journal.qmd        # Aggregated journal (when entries exist)
//!     └── <note>.qmd         # One file per standalone document
//! ```

pub mod manifest;
pub mod project;
