//! Compiled regex patterns for markup scanning.
//!
//! All patterns are compiled once at startup using `LazyLock` for efficiency.
//! The harvester recovers structural hints from variable, possibly malformed
//! markup, so every pattern tolerates sloppy quoting and casing rather than
//! assuming well-formed HTML.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Text Extraction Patterns
// =============================================================================

/// Matches `<script>` blocks including their content, across newlines.
pub static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script>").expect("SCRIPT_BLOCK regex")
});

/// Matches `<style>` blocks including their content, across newlines.
pub static STYLE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<style\b[^>]*>.*?</style>").expect("STYLE_BLOCK regex")
});

/// Matches any remaining markup tag.
pub static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("ANY_TAG regex"));

/// Matches multiple whitespace characters for normalization.
pub static WHITESPACE_NORMALIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE_NORMALIZE regex"));

// =============================================================================
// Image Harvesting Patterns
// =============================================================================

/// Matches a complete `<img>` tag.
pub static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("IMG_TAG regex"));

/// Matches a `<picture>` block including nested sources and the fallback img.
pub static PICTURE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<picture\b[^>]*>.*?</picture>").expect("PICTURE_BLOCK regex")
});

/// Matches a `<source>` variant declaration inside a picture block.
pub static SOURCE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<source\b[^>]*/?>").expect("SOURCE_TAG regex"));

/// Matches a style attribute carrying a background declaration.
///
/// Captures the attribute value so `CSS_URL` can pull the image URLs out of it.
pub static BACKGROUND_STYLE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)style\s*=\s*(?:"([^"]*background[^"]*)"|'([^']*background[^']*)')"#)
        .expect("BACKGROUND_STYLE_ATTR regex")
});

/// Matches `url(...)` values inside a CSS declaration.
pub static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*['"]?([^'")]+)['"]?\s*\)"#).expect("CSS_URL regex")
});

/// Matches any tag carrying a `data-bg` lazy-load attribute.
pub static DATA_BG_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<[a-z][a-z0-9]*\b[^>]*\bdata-bg\s*=[^>]*>").expect("DATA_BG_TAG regex")
});

/// Matches one `name="value"` attribute pair inside a tag, tolerating
/// single-quoted and unquoted values.
pub static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([a-zA-Z][a-zA-Z0-9_:.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("ATTRIBUTE regex")
});

/// Matches one srcset entry's trailing width or density descriptor.
pub static SRCSET_DESCRIPTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([0-9]+(?:\.[0-9]+)?)(w|x)$").expect("SRCSET_DESCRIPTOR regex")
});

// =============================================================================
// Candidate Filtering Markers
// =============================================================================

/// Filename fragments that mark icon-scale or tracking images.
///
/// Checked against the last path segment only, so a page named
/// `/icons-of-jazz/hero.jpg` is not penalized for its directory name.
pub const ICON_FILENAME_MARKERS: &[&str] = &[
    "favicon", "sprite", "icon", "1x1", "pixel", "spacer", "blank", "tracker", "tracking",
];

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn script_block_matches_across_newlines() {
        let html = "<script type=\"text/javascript\">\nvar x = 1;\n</script>";
        assert!(SCRIPT_BLOCK.is_match(html));
    }

    #[test]
    fn img_tag_matches_case_insensitively() {
        assert!(IMG_TAG.is_match("<IMG SRC=\"a.jpg\">"));
        assert!(IMG_TAG.is_match("<img\n  src='b.png' />"));
    }

    #[test]
    fn attribute_handles_all_quote_styles() {
        let tag = r#"<img src="a.jpg" alt='photo' width=300>"#;
        let pairs: Vec<(String, String)> = ATTRIBUTE
            .captures_iter(tag)
            .map(|c| {
                let value = c
                    .get(2)
                    .or_else(|| c.get(3))
                    .or_else(|| c.get(4))
                    .map_or(String::new(), |m| m.as_str().to_string());
                (c[1].to_lowercase(), value)
            })
            .collect();
        assert!(pairs.contains(&("src".to_string(), "a.jpg".to_string())));
        assert!(pairs.contains(&("alt".to_string(), "photo".to_string())));
        assert!(pairs.contains(&("width".to_string(), "300".to_string())));
    }

    #[test]
    fn css_url_extracts_unquoted_and_quoted_values() {
        let style = "background-image: url('a.jpg'), url(b.png)";
        let urls: Vec<&str> = CSS_URL
            .captures_iter(style)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();
        assert_eq!(urls, vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn srcset_descriptor_parses_width_and_density() {
        let caps = SRCSET_DESCRIPTOR.captures("800w").unwrap();
        assert_eq!(&caps[1], "800");
        assert_eq!(&caps[2], "w");
        assert!(SRCSET_DESCRIPTOR.is_match("2x"));
        assert!(!SRCSET_DESCRIPTOR.is_match("800"));
    }
}
