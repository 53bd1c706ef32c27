//! Thin async client for HAFAS REST APIs
//!
//! Client for [v6.db.transport.rest](https://v6.db.transport.rest)-style
//! public-transit REST endpoints. The crate does exactly one thing:
//! build a GET request from a path plus query parameters, decode the
//! JSON response, and hand it back with response metadata attached out
//! of band. No retries, no caching, no response schema — bodies stay
//! [`serde_json::Value`].
//!
//! # Example
//!
//! ```rust,ignore
//! use hafas_rest_client::{
//!     CacheStatus, ClientConfig, HafasApi, HafasRestClient, RequestOptions,
//! };
//!
//! let client = HafasRestClient::new(&ClientConfig::default())?;
//! let stop = client.stop("900000003201", &RequestOptions::new()).await?;
//! println!("{}", stop["name"]);
//! println!("served from cache: {:?}", stop.meta(CacheStatus));
//! ```
//!
//! # Query encoding
//!
//! Nested parameter objects flatten to dotted key paths
//! (`from.latitude=52.52`), the only dialect these endpoints read.
//! Parameters already embedded in a request path stay ahead of the
//! explicit ones and are never deduplicated.
//!
//! # Response metadata
//!
//! Successful calls return a [`ResponseEnvelope`]: serializing it
//! reproduces the server's JSON exactly, while the response status line,
//! headers, `Server-Timing`, and `X-Cache` values are read through the
//! exported marker tokens ([`RawResponse`], [`RawHeaders`],
//! [`ServerTiming`], [`CacheStatus`]).

mod client;
mod config;
mod error;
mod options;
mod query;
mod response;

pub use client::{HafasApi, HafasRestClient};
pub use config::{ClientConfig, DEFAULT_USER_AGENT};
pub use error::Error;
pub use options::RequestOptions;
pub use query::Query;
pub use response::{
    CacheStatus, MetaKey, RawHeaders, RawResponse, ResponseEnvelope, ResponseMeta, ResponseParts,
    ServerTiming,
};
