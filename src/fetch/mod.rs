//! Page and stylesheet fetching
//!
//! The pipeline only depends on the [`Fetcher`] trait; [`HttpFetcher`] is the
//! reqwest-backed implementation used by the binaries.

pub mod http;

pub use http::HttpFetcher;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A fetched HTML document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchedPage {
    pub html: String,

    /// URL after redirects
    pub final_url: String,

    pub status_code: u16,

    /// Body size in bytes
    pub content_length: usize,
}

/// Retrieves pages and stylesheets. Failures are typed and never retried here.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch an HTML page
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;

    /// Fetch a text resource (stylesheet) without content-type checks
    async fn fetch_text(&self, url: &str) -> Result<String>;
}
