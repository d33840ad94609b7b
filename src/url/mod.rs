//! URL handling module for URL Grabby
//!
//! This module provides the canonical crawl target type, link resolution and
//! origin scoping.

mod domain;
mod normalize;
mod target;

// Re-export main functions
pub use domain::{domain_of, is_in_scope};
pub use normalize::{canonicalize, parse_seed, with_default_scheme};
pub use target::CrawlTarget;
