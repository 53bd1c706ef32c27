//! HAFAS REST client
//!
//! Thin asynchronous client for
//! [v6.db.transport.rest](https://v6.db.transport.rest)-style HAFAS REST
//! endpoints. Every public operation funnels into one `request`
//! primitive that resolves the path against the endpoint, merges query
//! parameters, issues a GET, and wraps the decoded body in a
//! [`ResponseEnvelope`].

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{self, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::Error;
use crate::options::RequestOptions;
use crate::query::{Query, merge_into_url};
use crate::response::{ResponseEnvelope, ResponseMeta, ResponseParts};

/// Trait for HAFAS REST API clients
#[async_trait]
pub trait HafasApi: Send + Sync {
    /// Search stops, addresses, and POIs by name
    async fn locations(&self, query: &str, opt: &RequestOptions)
    -> Result<ResponseEnvelope, Error>;

    /// Find stops around a location object
    /// (`{"latitude": .., "longitude": ..}`, fields sent as top-level
    /// query parameters)
    async fn nearby(
        &self,
        location: &Value,
        opt: &RequestOptions,
    ) -> Result<ResponseEnvelope, Error>;

    /// Search stations by name
    async fn stations(&self, query: &str, opt: &RequestOptions)
    -> Result<ResponseEnvelope, Error>;

    /// Find stops reachable from an address within travel-time bands
    async fn reachable_from(
        &self,
        address: &Value,
        opt: &RequestOptions,
    ) -> Result<ResponseEnvelope, Error>;

    /// Fetch a single stop by id
    async fn stop(&self, id: &str, opt: &RequestOptions) -> Result<ResponseEnvelope, Error>;

    /// Departures board for a stop, given as an id string or an object
    /// carrying an `id` field
    async fn departures(&self, stop: &Value, opt: &RequestOptions)
    -> Result<ResponseEnvelope, Error>;

    /// Arrivals board for a stop.
    ///
    /// Compatibility note: this queries `/stops/{id}/departures`, the
    /// same path as [`HafasApi::departures`]. Deployed servers of this
    /// endpoint family answer station boards on the departures path, and
    /// targeting a separate arrivals path would change the wire contract.
    async fn arrivals(&self, stop: &Value, opt: &RequestOptions)
    -> Result<ResponseEnvelope, Error>;

    /// Plan journeys between two places (stop id strings or location
    /// objects, sent as `from`/`to` query parameters)
    async fn journeys(
        &self,
        from: &Value,
        to: &Value,
        opt: &RequestOptions,
    ) -> Result<ResponseEnvelope, Error>;

    /// Refetch a journey from a refresh token
    async fn refresh_journey(
        &self,
        refresh_token: &str,
        opt: &RequestOptions,
    ) -> Result<ResponseEnvelope, Error>;

    /// Fetch a trip by id; `line_name` disambiguates the line
    async fn trip(
        &self,
        id: &str,
        line_name: &str,
        opt: &RequestOptions,
    ) -> Result<ResponseEnvelope, Error>;

    /// Vehicle movements within a bounding box
    /// (`{"north": .., "west": .., "south": .., "east": ..}`)
    async fn radar(&self, bbox: &Value, opt: &RequestOptions) -> Result<ResponseEnvelope, Error>;
}

/// HTTP client for a HAFAS REST endpoint
///
/// Immutable and cheap to clone; concurrent calls on one client are
/// independent.
#[derive(Debug, Clone)]
pub struct HafasRestClient {
    http: Client,
    endpoint: Url,
    user_agent: HeaderValue,
}

impl HafasRestClient {
    /// Create a client for the endpoint in `config`.
    ///
    /// # Errors
    ///
    /// Fails fast if the endpoint is not an absolute base URL, the user
    /// agent is not a valid header value, or the HTTP client cannot be
    /// initialized.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| Error::InvalidEndpoint(format!("{}: {e}", config.endpoint)))?;
        if endpoint.cannot_be_a_base() {
            return Err(Error::InvalidEndpoint(format!(
                "{}: not a base URL",
                config.endpoint
            )));
        }

        let user_agent = HeaderValue::from_str(&config.user_agent).map_err(|_| {
            Error::InvalidArgument("user_agent is not a valid header value".to_string())
        })?;

        // Redirects follow reqwest's default policy; no client-level
        // timeout, callers set one per request via RequestOptions.
        let http = Client::builder()
            .build()
            .map_err(|e| Error::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            user_agent,
        })
    }

    /// Issue a GET against `path`, resolved relative to the endpoint.
    ///
    /// A query string already embedded in `path` is preserved; `query`
    /// entries are appended behind it in iteration order, nested objects
    /// flattened to dotted key paths. `opt` overrides the `Accept` and
    /// `User-Agent` defaults per key and the (absent) deadline wholesale.
    ///
    /// This is the single primitive every [`HafasApi`] operation funnels
    /// through.
    #[instrument(skip(self, query, opt), fields(endpoint = %self.endpoint))]
    pub async fn request(
        &self,
        path: &str,
        query: &Query,
        opt: &RequestOptions,
    ) -> Result<ResponseEnvelope, Error> {
        let mut url = self
            .endpoint
            .join(path)
            .map_err(|e| Error::InvalidArgument(format!("bad request path {path}: {e}")))?;
        merge_into_url(&mut url, query);

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(header::USER_AGENT, self.user_agent.clone());
        for (name, value) in &opt.headers {
            headers.insert(name, value.clone());
        }

        debug!(%url, "issuing request");

        let mut request = self.http.get(url).headers(headers);
        if let Some(timeout) = opt.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout
            } else {
                Error::ConnectionFailed(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(http_error(response).await);
        }

        let parts = ResponseParts {
            status: response.status(),
            url: response.url().clone(),
            version: response.version(),
        };
        let headers = response.headers().clone();
        let server_timing = header_string(&headers, "server-timing");
        let cache_status = header_string(&headers, "x-cache");

        let text = response
            .text()
            .await
            .map_err(|e| Error::ConnectionFailed(e.to_string()))?;
        let body: Value =
            serde_json::from_str(&text).map_err(|e| Error::ParseError(e.to_string()))?;

        debug!(status = %parts.status, "request succeeded");

        Ok(ResponseEnvelope::new(
            body,
            ResponseMeta {
                parts,
                headers,
                server_timing,
                cache_status,
            },
        ))
    }

    /// Shared station-board request; both boards query the departures
    /// path (see [`HafasApi::arrivals`]).
    async fn station_board(
        &self,
        stop: &Value,
        opt: &RequestOptions,
    ) -> Result<ResponseEnvelope, Error> {
        let id = stop_id(stop)?;
        self.request(&path_for(&["stops", id, "departures"]), &Query::new(), opt)
            .await
    }
}

#[async_trait]
impl HafasApi for HafasRestClient {
    #[instrument(skip(self, opt))]
    async fn locations(
        &self,
        query: &str,
        opt: &RequestOptions,
    ) -> Result<ResponseEnvelope, Error> {
        let mut params = Query::new();
        params.insert("query".to_owned(), Value::String(query.to_owned()));
        self.request("/locations", &params, opt).await
    }

    #[instrument(skip(self, opt))]
    async fn nearby(
        &self,
        location: &Value,
        opt: &RequestOptions,
    ) -> Result<ResponseEnvelope, Error> {
        let params = spread(location, "location")?;
        self.request("/stops/nearby", &params, opt).await
    }

    #[instrument(skip(self, opt))]
    async fn stations(
        &self,
        query: &str,
        opt: &RequestOptions,
    ) -> Result<ResponseEnvelope, Error> {
        let mut params = Query::new();
        params.insert("query".to_owned(), Value::String(query.to_owned()));
        self.request("/stations", &params, opt).await
    }

    #[instrument(skip(self, opt))]
    async fn reachable_from(
        &self,
        address: &Value,
        opt: &RequestOptions,
    ) -> Result<ResponseEnvelope, Error> {
        let params = spread(address, "address")?;
        self.request("/stops/reachable-from", &params, opt).await
    }

    #[instrument(skip(self, opt))]
    async fn stop(&self, id: &str, opt: &RequestOptions) -> Result<ResponseEnvelope, Error> {
        let id = require_id(id, "stop id")?;
        self.request(&path_for(&["stops", id]), &Query::new(), opt)
            .await
    }

    #[instrument(skip(self, opt))]
    async fn departures(
        &self,
        stop: &Value,
        opt: &RequestOptions,
    ) -> Result<ResponseEnvelope, Error> {
        self.station_board(stop, opt).await
    }

    #[instrument(skip(self, opt))]
    async fn arrivals(
        &self,
        stop: &Value,
        opt: &RequestOptions,
    ) -> Result<ResponseEnvelope, Error> {
        self.station_board(stop, opt).await
    }

    #[instrument(skip(self, opt))]
    async fn journeys(
        &self,
        from: &Value,
        to: &Value,
        opt: &RequestOptions,
    ) -> Result<ResponseEnvelope, Error> {
        let mut params = Query::new();
        params.insert("from".to_owned(), from.clone());
        params.insert("to".to_owned(), to.clone());
        self.request("/journeys", &params, opt).await
    }

    #[instrument(skip(self, opt))]
    async fn refresh_journey(
        &self,
        refresh_token: &str,
        opt: &RequestOptions,
    ) -> Result<ResponseEnvelope, Error> {
        let token = require_id(refresh_token, "refresh token")?;
        self.request(&path_for(&["journeys", token]), &Query::new(), opt)
            .await
    }

    #[instrument(skip(self, opt))]
    async fn trip(
        &self,
        id: &str,
        line_name: &str,
        opt: &RequestOptions,
    ) -> Result<ResponseEnvelope, Error> {
        let id = require_id(id, "trip id")?;
        let mut params = Query::new();
        params.insert("lineName".to_owned(), Value::String(line_name.to_owned()));
        self.request(&path_for(&["trips", id]), &params, opt)
            .await
    }

    #[instrument(skip(self, opt))]
    async fn radar(&self, bbox: &Value, opt: &RequestOptions) -> Result<ResponseEnvelope, Error> {
        let params = spread(bbox, "bounding box")?;
        self.request("/radar", &params, opt).await
    }
}

/// Characters escaped in path segments: everything outside the
/// unreserved set. HAFAS identifiers routinely carry `|`, `/`, and `#`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encoded absolute request path for `segments`.
fn path_for(segments: &[&str]) -> String {
    let mut path = String::new();
    for segment in segments {
        path.push('/');
        path.extend(utf8_percent_encode(segment, PATH_SEGMENT));
    }
    path
}

/// Build the error for a non-2xx response.
///
/// Best-effort enrichment: when the response declares
/// `application/json`, the body is parsed and attached, and a string
/// `msg` field extends the display message. Enrichment failures are
/// skipped, never surfaced.
async fn http_error(response: Response) -> Error {
    let status = response.status();
    let mut message = format!("HTTP {status}");
    let mut body = None;

    if is_json(response.headers().get(CONTENT_TYPE)) {
        match response.text().await {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(parsed) => {
                    if let Some(msg) = parsed.get("msg").and_then(Value::as_str) {
                        message.push_str(&format!(" – {msg}"));
                    }
                    body = Some(parsed);
                }
                Err(e) => warn!(%status, error = %e, "skipping error-body enrichment"),
            },
            Err(e) => warn!(%status, error = %e, "skipping error-body enrichment"),
        }
    }

    Error::HttpError {
        status,
        message,
        body,
    }
}

/// True when the content type's MIME type is exactly `application/json`,
/// ignoring parameters such as `charset`.
fn is_json(content_type: Option<&HeaderValue>) -> bool {
    content_type
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(';').next().unwrap_or(value).trim())
        .is_some_and(|mime| mime.eq_ignore_ascii_case("application/json"))
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// Extract a non-empty stop id from an id string or an object carrying
/// an `id` field.
fn stop_id(stop: &Value) -> Result<&str, Error> {
    let id = match stop {
        Value::String(s) => s.as_str(),
        Value::Object(fields) => fields.get("id").and_then(Value::as_str).unwrap_or(""),
        _ => "",
    };
    if id.is_empty() {
        return Err(Error::InvalidArgument(
            "stop must be an id string or an object with an id field".to_string(),
        ));
    }
    Ok(id)
}

fn require_id<'a>(id: &'a str, what: &str) -> Result<&'a str, Error> {
    if id.is_empty() {
        return Err(Error::InvalidArgument(format!("{what} must not be empty")));
    }
    Ok(id)
}

/// Spread an object's fields as top-level query parameters.
fn spread(value: &Value, what: &str) -> Result<Query, Error> {
    match value {
        Value::Object(fields) => Ok(fields.clone()),
        _ => Err(Error::InvalidArgument(format!(
            "{what} must be a JSON object"
        ))),
    }
}
