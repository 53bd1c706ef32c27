//! Response envelope and out-of-band metadata
//!
//! A successful call returns the decoded JSON body wrapped in a
//! [`ResponseEnvelope`]. Serializing the envelope reproduces the body
//! exactly; response metadata (status line, headers, `Server-Timing`,
//! `X-Cache`) travels alongside and is reachable only through the
//! exported marker tokens or the named accessors, so it can never
//! collide with a server-provided body field and never leaks back out
//! on re-serialization.

use std::ops::Deref;

use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Version};
use serde::{Serialize, Serializer};
use serde_json::Value;
use url::Url;

/// Status line of a response, captured after redirects
#[derive(Debug, Clone)]
pub struct ResponseParts {
    /// HTTP status code
    pub status: StatusCode,
    /// Final request URL
    pub url: Url,
    /// Negotiated HTTP version
    pub version: Version,
}

/// Out-of-band metadata captured from a response
#[derive(Debug)]
pub struct ResponseMeta {
    pub(crate) parts: ResponseParts,
    pub(crate) headers: HeaderMap,
    pub(crate) server_timing: Option<String>,
    pub(crate) cache_status: Option<String>,
}

/// Marker token reading the response status line ([`ResponseParts`])
#[derive(Debug, Clone, Copy)]
pub struct RawResponse;

/// Marker token reading the raw response headers
#[derive(Debug, Clone, Copy)]
pub struct RawHeaders;

/// Marker token reading the `Server-Timing` header value
#[derive(Debug, Clone, Copy)]
pub struct ServerTiming;

/// Marker token reading the `X-Cache` header value
#[derive(Debug, Clone, Copy)]
pub struct CacheStatus;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::RawResponse {}
    impl Sealed for super::RawHeaders {}
    impl Sealed for super::ServerTiming {}
    impl Sealed for super::CacheStatus {}
}

/// Typed key into an envelope's out-of-band metadata.
///
/// Implemented only by the four exported marker tokens; the trait is
/// sealed, so no other key can ever read the metadata.
pub trait MetaKey: sealed::Sealed {
    /// Value the marker reads
    type Value<'a>;

    #[doc(hidden)]
    fn read(meta: &ResponseMeta) -> Self::Value<'_>;
}

impl MetaKey for RawResponse {
    type Value<'a> = &'a ResponseParts;

    fn read(meta: &ResponseMeta) -> Self::Value<'_> {
        &meta.parts
    }
}

impl MetaKey for RawHeaders {
    type Value<'a> = &'a HeaderMap;

    fn read(meta: &ResponseMeta) -> Self::Value<'_> {
        &meta.headers
    }
}

impl MetaKey for ServerTiming {
    type Value<'a> = Option<&'a str>;

    fn read(meta: &ResponseMeta) -> Self::Value<'_> {
        meta.server_timing.as_deref()
    }
}

impl MetaKey for CacheStatus {
    type Value<'a> = Option<&'a str>;

    fn read(meta: &ResponseMeta) -> Self::Value<'_> {
        meta.cache_status.as_deref()
    }
}

/// Decoded JSON body plus out-of-band response metadata
#[derive(Debug)]
pub struct ResponseEnvelope {
    body: Value,
    meta: ResponseMeta,
}

impl ResponseEnvelope {
    pub(crate) fn new(body: Value, meta: ResponseMeta) -> Self {
        Self { body, meta }
    }

    /// Decoded response body
    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Consume the envelope, keeping only the body
    #[must_use]
    pub fn into_body(self) -> Value {
        self.body
    }

    /// Read a metadata value by marker token
    pub fn meta<K: MetaKey>(&self, _marker: K) -> K::Value<'_> {
        K::read(&self.meta)
    }

    /// `X-Cache` header value, if the server sent one
    #[must_use]
    pub fn cache_status(&self) -> Option<&str> {
        self.meta.cache_status.as_deref()
    }

    /// `Server-Timing` header value, if the server sent one
    #[must_use]
    pub fn server_timing(&self) -> Option<&str> {
        self.meta.server_timing.as_deref()
    }
}

impl Deref for ResponseEnvelope {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.body
    }
}

/// Serializes as the body alone; metadata never reaches the wire.
impl Serialize for ResponseEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.body.serialize(serializer)
    }
}
