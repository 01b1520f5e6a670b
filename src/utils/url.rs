// src/utils/url.rs

//! URL manipulation utilities.

use regex::Regex;
use url::Url;

/// Resolve a potentially relative URL against a base URL.
///
/// # Examples
/// ```
/// use notifier::utils::resolve_url;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/path/").unwrap();
/// assert_eq!(resolve_url(&base, "page.html"), "https://example.com/path/page.html");
/// ```
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Extract the article id from an href using `pattern`'s first capture group.
///
/// Boards that open articles through a javascript call
/// (`javascript:jf_viewArtcl('kor', '111776')`) only expose the id this way.
pub fn extract_article_id(href: &str, pattern: &Regex) -> Option<String> {
    pattern
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Whether the href is a navigable link rather than a script call or anchor.
pub fn is_navigable(href: &str) -> bool {
    let href = href.trim();
    !href.is_empty() && !href.starts_with('#') && !href.to_lowercase().starts_with("javascript:")
}
