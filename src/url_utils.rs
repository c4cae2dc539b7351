//! URL utilities for resolving harvested image references.
//!
//! Image URLs in markup are frequently relative, protocol-relative, or
//! data URIs; these helpers normalize them against the page's base URL.

use url::Url;

/// Check if a string is a valid absolute http(s) URL.
///
/// # Returns
/// * `(is_absolute, parsed_url)` - whether the URL is absolute and the parsed URL if valid
#[must_use]
pub fn is_absolute_url(s: &str) -> (bool, Option<Url>) {
    let s = s.trim();

    if s.is_empty() {
        return (false, None);
    }

    if !s.starts_with("http://") && !s.starts_with("https://") {
        return (false, None);
    }

    match Url::parse(s) {
        Ok(url) => {
            if url.host().is_some() {
                (true, Some(url))
            } else {
                (false, None)
            }
        }
        Err(_) => (false, None),
    }
}

/// Convert a relative or absolute URL to absolute form.
///
/// Data URIs pass through unchanged; they carry their payload inline and
/// have no base to resolve against.
///
/// # Returns
/// * The absolute URL string, or the original if resolution fails
#[must_use]
pub fn create_absolute_url(url_str: &str, base: &Url) -> String {
    let url_str = url_str.trim();

    if url_str.is_empty() {
        return String::new();
    }

    if url_str.starts_with("data:") || url_str.starts_with("javascript:") {
        return url_str.to_string();
    }

    let (is_abs, _) = is_absolute_url(url_str);
    if is_abs {
        return url_str.to_string();
    }

    match base.join(url_str) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => url_str.to_string(),
    }
}

/// Extract the last path segment of a URL, without query params or fragments.
///
/// Used for icon-convention filename checks; returns an empty string for
/// URLs with no path.
#[must_use]
pub fn filename_of(url_str: &str) -> String {
    let without_query = url_str
        .split(['?', '#'])
        .next()
        .unwrap_or(url_str);
    without_query
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_lowercase()
}

/// Extract the hostname from a URL, or an empty string if invalid.
#[must_use]
pub fn get_domain_url(url_str: &str) -> String {
    let (is_abs, parsed) = is_absolute_url(url_str);

    if !is_abs {
        return String::new();
    }

    parsed
        .and_then(|url| url.host_str().map(std::string::ToString::to_string))
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn create_absolute_url_resolves_relative_paths() {
        let base = Url::parse("https://example.com/articles/post.html").unwrap();
        assert_eq!(
            create_absolute_url("/img/hero.jpg", &base),
            "https://example.com/img/hero.jpg"
        );
        assert_eq!(
            create_absolute_url("thumb.png", &base),
            "https://example.com/articles/thumb.png"
        );
    }

    #[test]
    fn create_absolute_url_preserves_absolute_and_data_urls() {
        let base = Url::parse("https://example.com/").unwrap();
        assert_eq!(
            create_absolute_url("https://cdn.example.com/a.jpg", &base),
            "https://cdn.example.com/a.jpg"
        );
        assert!(create_absolute_url("data:image/png;base64,AAAA", &base).starts_with("data:"));
    }

    #[test]
    fn filename_of_strips_query_and_directories() {
        assert_eq!(filename_of("https://x.test/a/b/Hero.JPG?v=2"), "hero.jpg");
        assert_eq!(filename_of("https://x.test/"), "");
    }

    #[test]
    fn get_domain_url_extracts_hostname() {
        assert_eq!(get_domain_url("https://news.example.com/a"), "news.example.com");
        assert_eq!(get_domain_url("not a url"), "");
    }
}
