use crate::url::CrawlTarget;
use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves a link reference against a base URL into a canonical target
///
/// # Normalization Steps
///
/// 1. Resolve `reference` against `base` (dot segments, scheme-relative
///    `//host/path`, absolute references)
/// 2. Lowercase the host (done by the parser for http/https)
/// 3. Remove the fragment
/// 4. Keep the query string as written
///
/// Fails with [`UrlError::InvalidUrl`] when the reference cannot be resolved
/// or the result has no host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use url_grabby::url::canonicalize;
///
/// let base = Url::parse("https://example.com/docs/intro").unwrap();
/// let target = canonicalize(&base, "../about?x=1#team").unwrap();
/// assert_eq!(target.as_str(), "https://example.com/about?x=1");
/// ```
pub fn canonicalize(base: &Url, reference: &str) -> UrlResult<CrawlTarget> {
    let resolved = base.join(reference).map_err(|e| UrlError::InvalidUrl {
        url: reference.to_string(),
        reason: e.to_string(),
    })?;

    into_target(resolved, reference)
}

/// Parses an absolute seed URL into a canonical target
pub fn parse_seed(seed: &str) -> UrlResult<CrawlTarget> {
    let parsed = Url::parse(seed.trim()).map_err(|e| UrlError::InvalidUrl {
        url: seed.to_string(),
        reason: e.to_string(),
    })?;

    into_target(parsed, seed)
}

/// Prefixes `https://` when the input has no http(s) scheme
///
/// # Examples
///
/// ```
/// use url_grabby::url::with_default_scheme;
///
/// assert_eq!(with_default_scheme(" example.com "), "https://example.com");
/// assert_eq!(with_default_scheme("http://example.com"), "http://example.com");
/// ```
pub fn with_default_scheme(input: &str) -> String {
    let trimmed = input.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

fn into_target(url: Url, original: &str) -> UrlResult<CrawlTarget> {
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(CrawlTarget::from_resolved(url)),
        _ => Err(UrlError::InvalidUrl {
            url: original.to_string(),
            reason: "resolved URL has no host".to_string(),
        }),
    }
}
