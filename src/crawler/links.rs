//! Link extraction
//!
//! Parses one HTML document and returns the canonical, in-scope absolute URLs
//! found in the `href` of its anchor elements. Parsing is lenient: malformed
//! markup yields whatever anchors the HTML5 parser recovers, possibly none.
//! Extraction never fails.

use crate::url::{canonicalize_url, Scope};
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Extracts in-scope links from an HTML page
///
/// # Link Extraction Rules
///
/// - Every `<a href="...">` is considered
/// - Relative hrefs resolve against `base`, the URL the page was served from
/// - Fragments are stripped, so `page#a` and `page#b` collapse to `page`
/// - Only URLs passing `scope` are kept; non-http(s) schemes never do
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base` - The page's own URL, used to resolve relative links
/// * `scope` - The crawl scope
///
/// # Returns
///
/// The set of canonical in-scope URLs. Order is irrelevant; duplicates collapse.
///
/// # Example
///
/// ```
/// use trawl::crawler::extract_links;
/// use trawl::url::Scope;
/// use url::Url;
///
/// let base = Url::parse("http://ex.test/a/").unwrap();
/// let scope = Scope::from_start(&base);
/// let html = r#"<a href="b#top">B</a><a href="http://other.test/">Away</a>"#;
/// let links = extract_links(html, &base, &scope);
/// assert_eq!(links.len(), 1);
/// assert!(links.contains(&Url::parse("http://ex.test/a/b").unwrap()));
/// ```
pub fn extract_links(html: &str, base: &Url, scope: &Scope) -> BTreeSet<Url> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return BTreeSet::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base))
        .filter(|url| scope.contains(url))
        .collect()
}

/// Resolves an href against the page URL into canonical form
///
/// Returns None for empty hrefs and anything that does not resolve to an
/// absolute http(s) URL with a host.
fn resolve_link(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let absolute = base.join(href).ok()?;
    canonicalize_url(absolute).ok()
}
