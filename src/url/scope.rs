use url::Url;

/// The set of URLs a crawl may visit
///
/// A URL is in scope when its scheme, host, and port all equal the start
/// URL's, and its path starts with the start URL's path. Scope is fixed for
/// the whole crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    scheme: String,
    host: String,
    port: Option<u16>,
    path_prefix: String,
}

impl Scope {
    /// Derives the scope from a crawl's start URL
    ///
    /// # Examples
    ///
    /// ```
    /// use trawl::url::Scope;
    /// use url::Url;
    ///
    /// let scope = Scope::from_start(&Url::parse("http://ex.test/a").unwrap());
    /// assert!(scope.contains(&Url::parse("http://ex.test/a/b").unwrap()));
    /// assert!(!scope.contains(&Url::parse("http://other.test/a/b").unwrap()));
    /// ```
    pub fn from_start(start: &Url) -> Self {
        Self {
            scheme: start.scheme().to_string(),
            host: start.host_str().unwrap_or_default().to_lowercase(),
            port: start.port_or_known_default(),
            path_prefix: start.path().to_string(),
        }
    }

    /// Returns true if `url` shares the start URL's authority and path prefix
    pub fn contains(&self, url: &Url) -> bool {
        url.scheme() == self.scheme
            && url
                .host_str()
                .is_some_and(|host| host.eq_ignore_ascii_case(&self.host))
            && url.port_or_known_default() == self.port
            && url.path().starts_with(&self.path_prefix)
    }

    /// The path every in-scope URL starts with
    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }
}
