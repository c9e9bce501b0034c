use crate::UrlError;
use url::Url;

/// Parses a URL into its canonical form
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Accept only `http` and `https` schemes
/// 3. Require a host
/// 4. Remove the fragment (everything after `#`)
///
/// Two URLs that differ only by fragment canonicalize to the same value.
/// Host lowercasing and default-port elision are done by the `url` parser.
///
/// # Examples
///
/// ```
/// use trawl::url::canonicalize;
///
/// let url = canonicalize("http://EX.test/a/b#intro").unwrap();
/// assert_eq!(url.as_str(), "http://ex.test/a/b");
/// ```
pub fn canonicalize(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize_url(url)
}

/// Canonicalizes an already parsed URL
pub fn canonicalize_url(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url)
}
