//! Plain-text recovery from raw HTML.
//!
//! Strips scripting and styling blocks, removes remaining tags, decodes a
//! small fixed entity set, and normalizes whitespace. This is deliberately
//! not a parser: the output only needs to be good enough to ground a
//! summarization prompt, not to reconstruct document structure.

use crate::patterns::{ANY_TAG, SCRIPT_BLOCK, STYLE_BLOCK, WHITESPACE_NORMALIZE};

/// Maximum length of extracted text, in characters.
pub const MAX_TEXT_LEN: usize = 8000;

/// The fixed entity set decoded during extraction, in replacement order.
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
];

/// Decode the fixed entity set in a string.
///
/// Also used on attribute values during harvesting, where `&amp;` inside
/// query strings is the common case.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    let mut decoded = text.to_string();
    for (entity, replacement) in ENTITIES {
        decoded = decoded.replace(entity, replacement);
    }
    decoded
}

/// Extract readable text from an HTML document.
///
/// Removes `<script>` and `<style>` blocks with their content, strips all
/// remaining tags, decodes the fixed entity set, collapses whitespace runs
/// to single spaces, trims, and truncates to [`MAX_TEXT_LEN`] characters.
///
/// Never fails: empty input yields an empty string, and already-plain text
/// passes through unchanged (the operation is idempotent).
#[must_use]
pub fn extract(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let without_scripts = SCRIPT_BLOCK.replace_all(html, " ");
    let without_styles = STYLE_BLOCK.replace_all(&without_scripts, " ");
    let without_tags = ANY_TAG.replace_all(&without_styles, " ");

    let text = decode_entities(&without_tags);

    let collapsed = WHITESPACE_NORMALIZE.replace_all(&text, " ");
    let trimmed = collapsed.trim();

    if trimmed.chars().count() > MAX_TEXT_LEN {
        trimmed.chars().take(MAX_TEXT_LEN).collect()
    } else {
        trimmed.to_string()
    }
}

/// Truncate a string to at most `limit` characters on a char boundary.
#[must_use]
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
