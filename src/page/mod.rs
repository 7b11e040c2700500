//! Rendered-page abstraction
//!
//! The discovery stages only need a handful of capabilities from the browser:
//! selector queries, attribute reads and a best-effort "network is quiet"
//! signal. They are expressed as traits so extraction logic can run against
//! a live Chromium tab (`chromium::ChromiumPage`) or an in-memory fake.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A DOM element returned from a selector query
#[async_trait]
pub trait ElementHandle: Send + Sync {
    /// Read an attribute; `Ok(None)` when the attribute is absent
    async fn attribute(&self, name: &str) -> Result<Option<String>>;

    /// Upper-case tag name (`IMG`, `SELECT`, ...)
    async fn tag_name(&self) -> Result<String>;

    /// Rendered text content
    async fn inner_text(&self) -> Result<Option<String>>;

    /// Query descendants of this element
    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn ElementHandle>>>;
}

/// A rendered page
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// All elements matching a CSS selector, in document order
    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn ElementHandle>>>;

    /// Wait until in-flight requests have quiesced, or fail after `timeout`
    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<()>;
}

/// A completed HTTP response seen by the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedResponse {
    pub url: String,
    /// `Content-Type` header value, empty when absent
    pub content_type: String,
    pub status: u16,
}
