//! Targeted pattern rewrites over document bodies.
//!
//! This module contains the two rewriting passes applied to every document
//! body before it is written to the output tree:
//!
//! # Submodules
//!
//! - [`assets`]: rewrites image embeds pointing at the shared `_resources`
//!   folder to the flattened output layout and collects referenced assets
//! - [`links`]: rewrites cross-document Markdown links to their output
//!   counterparts via the identity map
//!
//! Both passes are pure functions over `(text, context) -> text` aside from
//! diagnostic logging and, for assets, the shared reference set. Neither
//! builds a Markdown AST; they are deliberately targeted regex rewrites.

pub mod assets;
pub mod links;
