use crate::url::CrawlTarget;
use url::Url;

/// Extracts the origin of a URL as `scheme://host[:port]`
///
/// Default ports are elided, so `https://example.com:443/` yields
/// `https://example.com`. Returns an empty string when the input cannot be
/// parsed or has no host; an empty result marks an invalid seed.
///
/// # Examples
///
/// ```
/// use url_grabby::url::domain_of;
///
/// assert_eq!(domain_of("https://Example.com/path"), "https://example.com");
/// assert_eq!(domain_of("http://localhost:8080/"), "http://localhost:8080");
/// assert_eq!(domain_of("example.com"), "");
/// ```
pub fn domain_of(url: &str) -> String {
    match Url::parse(url.trim()) {
        Ok(parsed) => origin_of(&parsed).unwrap_or_default(),
        Err(_) => String::new(),
    }
}

/// Returns true when the target belongs to the session's locked origin
///
/// Scheme and port are part of the identity: `http://a.com` and
/// `https://a.com` are different origins.
pub fn is_in_scope(target: &CrawlTarget, session_domain: &str) -> bool {
    !session_domain.is_empty() && origin_of(target.as_url()).as_deref() == Some(session_domain)
}

pub(crate) fn origin_of(url: &Url) -> Option<String> {
    let host = url.host_str().filter(|h| !h.is_empty())?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}
