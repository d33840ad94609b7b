//! HTML parser for extracting page metadata and links
//!
//! This module handles parsing HTML content to extract:
//! - The page title and first main heading
//! - Same-origin links to follow (from `<a href>` tags)

use crate::url::{canonicalize, is_in_scope, CrawlTarget};
use crate::UrlError;
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Link prefixes that never lead to a crawlable page
const SKIPPED_PREFIXES: &[&str] = &["#", "mailto:", "tel:", "javascript:"];

/// Metadata collected from one successfully fetched HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// The page URL
    pub url: CrawlTarget,
    /// Trimmed text of the first `<title>`, empty when absent
    pub title: String,
    /// Trimmed text of the first `<h1>`, empty when absent
    pub heading: String,
}

/// Links found on a page
#[derive(Debug, Clone, Default)]
pub struct ExtractedLinks {
    /// Canonical, in-scope targets
    pub links: HashSet<CrawlTarget>,
    /// Hrefs that could not be canonicalized
    pub invalid: Vec<UrlError>,
}

/// Everything the crawl loop needs from one page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    pub record: PageRecord,
    pub links: ExtractedLinks,
}

/// Parses a page once and extracts both its record and its links
///
/// # Example
///
/// ```
/// use url_grabby::crawler::parse_page;
/// use url_grabby::url::parse_seed;
///
/// let html = r#"<html><head><title>Home</title></head>
///     <body><h1>Welcome</h1><a href="/about">About</a></body></html>"#;
/// let page_url = parse_seed("https://example.com/").unwrap();
/// let parsed = parse_page(&page_url, html, "https://example.com");
/// assert_eq!(parsed.record.title, "Home");
/// assert_eq!(parsed.links.links.len(), 1);
/// ```
pub fn parse_page(url: &CrawlTarget, html: &str, scope: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        record: record_from_document(url, &document),
        links: links_from_document(url, &document, scope),
    }
}

/// Extracts the title and first heading of a page
///
/// Malformed HTML never fails; missing elements give empty strings.
pub fn extract_record(url: &CrawlTarget, html: &str) -> PageRecord {
    record_from_document(url, &Html::parse_document(html))
}

/// Extracts the in-scope links of a page
///
/// # Link Extraction Rules
///
/// - every `<a href>` is considered
/// - `#`, `mailto:`, `tel:` and `javascript:` hrefs are skipped
///   (case-insensitive)
/// - the rest are resolved against `base`; failures land in
///   [`ExtractedLinks::invalid`]
/// - only targets whose origin equals `scope` are kept
pub fn extract_links(base: &CrawlTarget, html: &str, scope: &str) -> ExtractedLinks {
    links_from_document(base, &Html::parse_document(html), scope)
}

fn record_from_document(url: &CrawlTarget, document: &Html) -> PageRecord {
    PageRecord {
        url: url.clone(),
        title: first_text(document, "title"),
        heading: first_text(document, "h1"),
    }
}

fn first_text(document: &Html, selector: &str) -> String {
    let Ok(selector) = Selector::parse(selector) else {
        return String::new();
    };

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn links_from_document(base: &CrawlTarget, document: &Html, scope: &str) -> ExtractedLinks {
    let mut extracted = ExtractedLinks::default();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return extracted;
    };

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();

        if href.is_empty() || is_skipped(href) {
            continue;
        }

        match canonicalize(base.as_url(), href) {
            Ok(target) => {
                if is_in_scope(&target, scope) {
                    extracted.links.insert(target);
                }
            }
            Err(e) => extracted.invalid.push(e),
        }
    }

    extracted
}

fn is_skipped(href: &str) -> bool {
    SKIPPED_PREFIXES.iter().any(|prefix| {
        href.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}
