//! Image candidate harvesting from raw markup.
//!
//! Four independent extraction passes run over the same HTML and merge into
//! one URL-deduplicated candidate list: inline `<img>` tags, `<picture>`
//! variant groups, inline CSS background declarations, and `data-bg`
//! lazy-load attributes. Each pass tags its candidates with a source kind so
//! downstream consumers can tell where a URL came from.
//!
//! Malformed attributes skip that one image; a broken tag never aborts the
//! scan.

use std::collections::HashSet;

use url::Url;

use crate::patterns::{
    ATTRIBUTE, BACKGROUND_STYLE_ATTR, CSS_URL, DATA_BG_TAG, ICON_FILENAME_MARKERS, IMG_TAG,
    PICTURE_BLOCK, SOURCE_TAG, SRCSET_DESCRIPTOR,
};
use crate::text::decode_entities;
use crate::url_utils::{create_absolute_url, filename_of};

/// Data URIs shorter than this are treated as inline icons and skipped.
const MIN_DATA_URI_LEN: usize = 1000;

/// Where in the markup an image candidate was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// An inline `<img>` tag.
    Img,
    /// A `<picture>` group with `<source>` variants.
    Picture,
    /// An inline `style` attribute with a CSS background.
    CssBackground,
    /// A `data-bg` lazy-load attribute.
    DataBg,
}

/// An image discovered by harvesting, eligible for filtering and scoring.
///
/// Dimensions come only from markup attributes, never from decoded pixels.
/// `size_bytes` is filled in later when the scorer fetches the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    /// Absolute image URL (or a data URI).
    pub url: String,
    /// Width from markup, if declared.
    pub width: Option<u32>,
    /// Height from markup, if declared.
    pub height: Option<u32>,
    /// Alt text from markup, if present and non-empty.
    pub alt: Option<String>,
    /// Byte size, attached once the image has been fetched.
    pub size_bytes: Option<u64>,
    /// Which extraction pass found this candidate.
    pub source: SourceKind,
}

impl ImageCandidate {
    /// Pixel area when both dimensions are known.
    #[must_use]
    pub fn area(&self) -> Option<u64> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(u64::from(w) * u64::from(h)),
            _ => None,
        }
    }
}

/// Harvest image candidates from an HTML document.
///
/// Runs the four extraction passes and merges the results, keeping the
/// first occurrence of each URL. Returns an empty list for empty input or
/// when nothing harvestable is found.
#[must_use]
pub fn harvest(html: &str, base_url: &str) -> Vec<ImageCandidate> {
    if html.is_empty() {
        return Vec::new();
    }

    let base = Url::parse(base_url).ok();
    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates = Vec::new();

    let mut push = |candidate: ImageCandidate, out: &mut Vec<ImageCandidate>| {
        if seen.insert(candidate.url.clone()) {
            out.push(candidate);
        }
    };

    for candidate in harvest_img_tags(html, base.as_ref()) {
        push(candidate, &mut candidates);
    }
    for candidate in harvest_picture_blocks(html, base.as_ref()) {
        push(candidate, &mut candidates);
    }
    for candidate in harvest_css_backgrounds(html, base.as_ref()) {
        push(candidate, &mut candidates);
    }
    for candidate in harvest_data_bg(html, base.as_ref()) {
        push(candidate, &mut candidates);
    }

    candidates
}

/// Parse all attribute pairs in a tag, lowercasing names.
fn attrs(tag: &str) -> Vec<(String, String)> {
    ATTRIBUTE
        .captures_iter(tag)
        .map(|caps| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or(String::new(), |m| m.as_str().to_string());
            (caps[1].to_lowercase(), value)
        })
        .collect()
}

/// Look up one attribute value inside a tag.
fn attr(tag: &str, name: &str) -> Option<String> {
    attrs(tag)
        .into_iter()
        .find(|(attr_name, _)| attr_name == name)
        .map(|(_, value)| value)
}

/// Whether a URL should be skipped as an icon, sprite, or tracking pixel.
fn is_icon_url(url: &str) -> bool {
    if url.starts_with("data:") {
        return url.len() < MIN_DATA_URI_LEN;
    }
    let filename = filename_of(url);
    ICON_FILENAME_MARKERS
        .iter()
        .any(|marker| filename.contains(marker))
}

fn parse_dimension(value: &str) -> Option<u32> {
    value.trim().trim_end_matches("px").parse().ok()
}

fn resolve(raw: &str, base: Option<&Url>) -> String {
    let decoded = decode_entities(raw.trim());
    match base {
        Some(base) => create_absolute_url(&decoded, base),
        None => decoded,
    }
}

/// One parsed srcset entry: URL plus descriptor weight.
///
/// Width descriptors carry their pixel value; density descriptors are
/// weighted x100 so `2x` outranks `1x` but any `w` entry, compared within
/// its own class, still decides first.
struct SrcsetEntry {
    url: String,
    weight: f64,
    is_width: bool,
}

fn parse_srcset(srcset: &str) -> Vec<SrcsetEntry> {
    srcset
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split_whitespace();
            let url = parts.next()?.to_string();
            let descriptor = parts.next().unwrap_or("");
            let (weight, is_width) = match SRCSET_DESCRIPTOR.captures(descriptor) {
                Some(caps) => {
                    let value: f64 = caps[1].parse().ok()?;
                    let is_width = caps[2].eq_ignore_ascii_case("w");
                    (if is_width { value } else { value * 100.0 }, is_width)
                }
                None => (0.0, false),
            };
            Some(SrcsetEntry {
                url,
                weight,
                is_width,
            })
        })
        .collect()
}

/// Pick the best srcset entry: largest `w` descriptor, or the largest
/// density descriptor when no `w` descriptors exist.
fn best_srcset_url(srcset: &str) -> Option<String> {
    let entries = parse_srcset(srcset);
    let any_width = entries.iter().any(|entry| entry.is_width);
    entries
        .into_iter()
        .filter(|entry| !any_width || entry.is_width)
        .filter(|entry| entry.weight > 0.0)
        .max_by(|a, b| a.weight.total_cmp(&b.weight))
        .map(|entry| entry.url)
}

/// Largest `w`-descriptor URL across one or more srcset values, ignoring
/// density-only entries. Used for `<picture>` variant declarations.
fn largest_width_url(srcsets: &[String]) -> Option<String> {
    srcsets
        .iter()
        .flat_map(|srcset| parse_srcset(srcset))
        .filter(|entry| entry.is_width && entry.weight > 0.0)
        .max_by(|a, b| a.weight.total_cmp(&b.weight))
        .map(|entry| entry.url)
}

/// Pass 1: inline `<img>` tags.
fn harvest_img_tags(html: &str, base: Option<&Url>) -> Vec<ImageCandidate> {
    IMG_TAG
        .find_iter(html)
        .filter_map(|tag_match| candidate_from_img(tag_match.as_str(), base, SourceKind::Img))
        .collect()
}

/// Build a candidate from one `<img>` tag, or None when it should be skipped.
fn candidate_from_img(tag: &str, base: Option<&Url>, source: SourceKind) -> Option<ImageCandidate> {
    let raw_src = attr(tag, "src")
        .filter(|value| !value.trim().is_empty())
        .or_else(|| attr(tag, "data-src"))
        .or_else(|| attr(tag, "data-lazy-src"))
        .or_else(|| attr(tag, "data-original"))
        .filter(|value| !value.trim().is_empty())?;

    let decoded = decode_entities(raw_src.trim());
    if is_icon_url(&decoded) {
        return None;
    }

    let mut url = resolve(&raw_src, base);

    // A srcset variant with a larger rendition replaces the plain src.
    if let Some(srcset) = attr(tag, "srcset") {
        if let Some(best) = best_srcset_url(&srcset) {
            url = resolve(&best, base);
        }
    }

    Some(ImageCandidate {
        url,
        width: attr(tag, "width").and_then(|value| parse_dimension(&value)),
        height: attr(tag, "height").and_then(|value| parse_dimension(&value)),
        alt: attr(tag, "alt").filter(|value| !value.trim().is_empty()),
        size_bytes: None,
        source,
    })
}

/// Pass 2: `<picture>` groups.
///
/// The nested `<img>` supplies the base URL and metadata; the sibling
/// `<source>` declarations are scanned for the largest `w`-descriptor
/// variant, which is preferred over the fallback URL when present.
fn harvest_picture_blocks(html: &str, base: Option<&Url>) -> Vec<ImageCandidate> {
    PICTURE_BLOCK
        .find_iter(html)
        .filter_map(|block_match| {
            let block = block_match.as_str();
            let img_tag = IMG_TAG.find(block)?;
            let mut candidate = candidate_from_img(img_tag.as_str(), base, SourceKind::Picture)?;

            let source_srcsets: Vec<String> = SOURCE_TAG
                .find_iter(block)
                .filter_map(|source_match| attr(source_match.as_str(), "srcset"))
                .collect();
            if let Some(best) = largest_width_url(&source_srcsets) {
                candidate.url = resolve(&best, base);
            }

            Some(candidate)
        })
        .collect()
}

/// Pass 3: inline CSS backgrounds.
///
/// Every `url()` value in a background declaration is a candidate, except
/// gradients and small data URIs. No dimensions or alt text are available
/// from this source.
fn harvest_css_backgrounds(html: &str, base: Option<&Url>) -> Vec<ImageCandidate> {
    BACKGROUND_STYLE_ATTR
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .flat_map(|style| {
            CSS_URL
                .captures_iter(style.as_str())
                .filter_map(|url_caps| url_caps.get(1).map(|m| m.as_str().to_string()))
                .collect::<Vec<_>>()
        })
        .filter_map(|raw| {
            let value = decode_entities(raw.trim());
            if value.is_empty() || value.to_lowercase().contains("gradient") {
                return None;
            }
            if value.starts_with("data:") && value.len() < MIN_DATA_URI_LEN {
                return None;
            }
            Some(ImageCandidate {
                url: resolve(&value, base),
                width: None,
                height: None,
                alt: None,
                size_bytes: None,
                source: SourceKind::CssBackground,
            })
        })
        .collect()
}

/// Pass 4: `data-bg` lazy-load attributes, same skip rules as pass 1.
fn harvest_data_bg(html: &str, base: Option<&Url>) -> Vec<ImageCandidate> {
    DATA_BG_TAG
        .find_iter(html)
        .filter_map(|tag_match| {
            let tag = tag_match.as_str();
            let raw = attr(tag, "data-bg").filter(|value| !value.trim().is_empty())?;
            let decoded = decode_entities(raw.trim());
            if is_icon_url(&decoded) {
                return None;
            }
            Some(ImageCandidate {
                url: resolve(&raw, base),
                width: None,
                height: None,
                alt: None,
                size_bytes: None,
                source: SourceKind::DataBg,
            })
        })
        .collect()
}
