use std::fmt;
use url::Url;

/// A canonical absolute URL that the crawler can visit
///
/// Targets are only built by [`canonicalize`](super::canonicalize) and
/// [`parse_seed`](super::parse_seed), so every value has a host, a lowercased
/// hostname and no fragment. Equality and hashing use the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CrawlTarget(Url);

impl CrawlTarget {
    /// Wraps an already resolved URL, dropping its fragment
    pub(crate) fn from_resolved(mut url: Url) -> Self {
        url.set_fragment(None);
        Self(url)
    }

    /// The canonical string form
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The underlying parsed URL
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for CrawlTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl AsRef<str> for CrawlTarget {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
