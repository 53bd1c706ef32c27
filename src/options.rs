//! Per-request configuration overrides

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Per-request override layer applied on top of the pipeline defaults.
///
/// Headers merge per key: a caller-supplied header replaces the default
/// of the same name (`Accept`, `User-Agent`); any other name is added
/// alongside them. The remaining fields replace their default wholesale
/// rather than merging.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Headers layered over the defaults, key by key
    pub headers: HeaderMap,

    /// Request deadline; `None` leaves the request without one
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Empty override layer: the pipeline defaults apply unchanged
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header override
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set the request deadline
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
