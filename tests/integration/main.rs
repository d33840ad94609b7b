//! Integration tests for the crawl engine
//!
//! These tests use wiremock to create mock HTTP servers and run full crawls
//! end-to-end through the public API.

mod lifecycle_tests;
