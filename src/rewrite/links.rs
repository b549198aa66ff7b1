//! Cross-document link resolution via the identity map.
//!
//! Markdown links whose target ends in `.md` are rewritten to point at the
//! corresponding output document. Matching is by basename only, so two
//! source files sharing a name in different folders are ambiguous; the first
//! identity-map entry in deterministic order wins. That ambiguity matches
//! the vault's flattened output layout and is a documented limitation, not a
//! bug to fix here.

use crate::models::IdentityMap;
use crate::utils::truncate_for_log;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::warn;

/// Markdown link whose target ends in the source extension.
static DOC_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]+\.md)\)").unwrap());

/// Rewrite `.md` links to their output counterparts.
///
/// Percent-encoded spaces in the target are decoded before matching.
/// Unresolved links are left untouched and flagged with a context snippet.
pub fn rewrite_doc_links(body: &str, identity: &IdentityMap) -> String {
    DOC_LINK_RE
        .replace_all(body, |caps: &Captures| {
            let text = &caps[1];
            let raw_target = &caps[2];
            let decoded = urlencoding::decode(raw_target)
                .map(|c| c.into_owned())
                .unwrap_or_else(|_| raw_target.to_string());
            let wanted = decoded.rsplit('/').next().unwrap_or(&decoded);

            for (source, output) in identity {
                if source.file_name().and_then(|n| n.to_str()) == Some(wanted) {
                    return format!("[{text}]({output})");
                }
            }

            warn!(
                target = %decoded,
                context = %truncate_for_log(&caps[0], 120),
                "Unresolved cross-document link left untouched"
            );
            caps[0].to_string()
        })
        .into_owned()
}
