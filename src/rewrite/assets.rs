//! Image-embed rewriting against the flattened output layout.
//!
//! Source notes reference the shared `_resources` folder through varying
//! numbers of `../` segments depending on how deep the note sits in the
//! vault. Flattening the output tree collapses those depths, so every embed
//! is rewritten to a single canonical prefix and the referenced asset
//! filename is recorded for selective copying.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeSet;
use tracing::warn;

/// Image embed whose target traverses into `_resources`, with any number of
/// leading parent-directory segments. Group 1 is the alt text, group 2 the
/// traversal prefix, group 3 the path inside `_resources`.
static ASSET_EMBED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!\[([^\]]*)\]\(\s*((?:\.\./)*)_resources/([^)]+?)\s*\)").unwrap()
});

/// Where the document being rewritten lives in the output tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetContext {
    /// Document written at the project root (the landing page).
    OutputRoot,
    /// Document written under `chapters/`.
    Chapter,
}

impl AssetContext {
    fn prefix(self) -> &'static str {
        match self {
            AssetContext::OutputRoot => "_resources/",
            AssetContext::Chapter => "../_resources/",
        }
    }
}

fn has_image_extension(name: &str) -> bool {
    let Some((_, ext)) = name.rsplit_once('.') else {
        return false;
    };
    matches!(
        ext.to_ascii_lowercase().as_str(),
        "jpg" | "jpeg" | "png" | "gif"
    )
}

/// Rewrite `_resources` image embeds to the canonical output path.
///
/// Valid image targets are flattened to their base filename under the
/// context-appropriate prefix and recorded in `assets`; non-image or
/// malformed targets are left untouched with a warning. Alt text is
/// preserved verbatim. Idempotent on already-canonical paths, and repeated
/// calls never duplicate entries in the reference set.
pub fn rewrite_asset_paths(
    body: &str,
    ctx: AssetContext,
    assets: &mut BTreeSet<String>,
    doc_label: &str,
) -> String {
    ASSET_EMBED_RE
        .replace_all(body, |caps: &Captures| {
            let alt = &caps[1];
            let target = &caps[3];
            let base = target.rsplit('/').next().unwrap_or(target);
            if !has_image_extension(base) {
                warn!(doc = doc_label, target, "Non-image asset reference left untouched");
                return caps[0].to_string();
            }
            assets.insert(base.to_string());
            format!("![{alt}]({}{base})", ctx.prefix())
        })
        .into_owned()
}
