//! Transport primitives for platform and token-endpoint calls.
//!
//! The module exposes [`ApiHttpClient`], the crate's only dependency on an HTTP stack,
//! together with the plain [`HttpRequest`]/[`HttpResponse`] values that travel across it.
//! Implementations only move bytes: authentication, throttling, and status handling live in
//! [`crate::transport`] and [`crate::auth`], so custom clients (or test fakes) inherit the
//! full retry and caching behavior for free.

// std
use std::time::Duration as StdDuration;
// crates.io
use time::{PrimitiveDateTime, format_description::well_known::Rfc2822, macros};
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

/// Header carrying the server's backoff hint on 429 responses.
pub const RETRY_AFTER: &str = "retry-after";

/// Boxed future returned by [`ApiHttpClient::execute`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports able to execute a fully-built request.
///
/// Implementations must be `Send + Sync + 'static` so a single instance can be shared by the
/// token provider and the throttled transport behind an `Arc`. Non-success statuses are
/// *not* errors at this layer; only failures to obtain a response are.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and buffers the complete response body.
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_>;
}

/// HTTP verbs used by the platform API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical upper-case verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Method {
	type Err = UnsupportedMethod;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"GET" => Ok(Method::Get),
			"POST" => Ok(Method::Post),
			"PUT" => Ok(Method::Put),
			"PATCH" => Ok(Method::Patch),
			"DELETE" => Ok(Method::Delete),
			_ => Err(UnsupportedMethod(s.to_owned())),
		}
	}
}

/// Error returned when parsing an HTTP verb the platform does not use.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unsupported HTTP method `{0}`.")]
pub struct UnsupportedMethod(pub String);

/// Fully-resolved request handed to an [`ApiHttpClient`].
#[derive(Clone, Debug)]
pub struct HttpRequest {
	/// HTTP verb.
	pub method: Method,
	/// Absolute URL including any query string.
	pub url: Url,
	/// Header name/value pairs; names are lower-case.
	pub headers: Vec<(&'static str, String)>,
	/// Optional request body.
	pub body: Option<Vec<u8>>,
	/// Per-request timeout overriding the client default.
	pub timeout: Option<StdDuration>,
}
impl HttpRequest {
	/// Creates a request without headers or body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: Vec::new(), body: None, timeout: None }
	}

	/// Appends a header.
	pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
		self.headers.push((name, value.into()));

		self
	}

	/// Sets the request body.
	pub fn with_body(mut self, body: Vec<u8>) -> Self {
		self.body = Some(body);

		self
	}

	/// Sets a per-request timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Returns the first header value matching `name` (case-insensitive).
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Buffered response returned by an [`ApiHttpClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Header name/value pairs; names are lower-case.
	pub headers: Vec<(String, String)>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Creates a response with the given status and body.
	pub fn new(status: u16, body: Vec<u8>) -> Self {
		Self { status, headers: Vec::new(), body }
	}

	/// Appends a header, normalizing the name to lower-case.
	pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
		self.headers.push((name.to_ascii_lowercase(), value.into()));

		self
	}

	/// Returns the first header value matching `name` (case-insensitive).
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Resolves a `Retry-After` header value into an absolute instant.
///
/// Accepts delay-seconds or an HTTP-date (IMF-fixdate or RFC 2822). Missing, negative, or
/// unparsable values resolve to `now` so a malformed hint never stalls the client.
pub fn parse_retry_after(raw: Option<&str>, now: OffsetDateTime) -> OffsetDateTime {
	let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
		return now;
	};

	if let Ok(secs) = raw.parse::<u32>() {
		return now + Duration::seconds(i64::from(secs));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		return moment;
	}
	if let Ok(moment) = PrimitiveDateTime::parse(
		raw,
		macros::format_description!(
			"[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
		),
	) {
		return moment.assume_utc();
	}

	now
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	async fn send(
		client: ReqwestClient,
		request: HttpRequest,
	) -> Result<HttpResponse, TransportError> {
		let url = request.url.clone();
		let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
			.map_err(|e| TransportError::network(&url, e))?;
		let mut builder = client.request(method, request.url);

		for (name, value) in request.headers {
			builder = builder.header(name, value);
		}
		if let Some(body) = request.body {
			builder = builder.body(body);
		}
		if let Some(timeout) = request.timeout {
			builder = builder.timeout(timeout);
		}

		let response = builder.send().await.map_err(|e| map_reqwest_error(&url, e))?;
		let status = response.status().as_u16();
		let headers = response
			.headers()
			.iter()
			.filter_map(|(name, value)| {
				value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
			})
			.collect();
		let body = response.bytes().await.map_err(|e| {
			if e.is_timeout() {
				TransportError::Timeout { url: url.to_string() }
			} else {
				TransportError::Body { url: url.to_string(), source: Box::new(e) }
			}
		})?;

		Ok(HttpResponse { status, headers, body: body.to_vec() })
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
		let client = self.0.clone();

		Box::pin(Self::send(client, request))
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(url: &Url, err: ReqwestError) -> TransportError {
	if err.is_timeout() {
		return TransportError::Timeout { url: url.to_string() };
	}

	TransportError::network(url, err)
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	const NOW: OffsetDateTime = datetime!(2025-11-10 12:00 UTC);

	#[test]
	fn retry_after_seconds_are_relative_to_now() {
		assert_eq!(parse_retry_after(Some("2"), NOW), NOW + Duration::seconds(2));
		assert_eq!(parse_retry_after(Some(" 120 "), NOW), NOW + Duration::minutes(2));
	}

	#[test]
	fn retry_after_http_date_is_taken_verbatim() {
		let expected = datetime!(2025-11-10 12:00:30 UTC);

		assert_eq!(parse_retry_after(Some("Mon, 10 Nov 2025 12:00:30 GMT"), NOW), expected);
		assert_eq!(parse_retry_after(Some("Mon, 10 Nov 2025 12:00:30 +0000"), NOW), expected);
	}

	#[test]
	fn retry_after_past_dates_are_kept() {
		let past = datetime!(2025-11-10 11:59 UTC);

		assert_eq!(parse_retry_after(Some("Mon, 10 Nov 2025 11:59:00 GMT"), NOW), past);
	}

	#[test]
	fn retry_after_garbage_means_retry_now() {
		assert_eq!(parse_retry_after(None, NOW), NOW);
		assert_eq!(parse_retry_after(Some(""), NOW), NOW);
		assert_eq!(parse_retry_after(Some("-5"), NOW), NOW);
		assert_eq!(parse_retry_after(Some("soon"), NOW), NOW);
	}

	#[test]
	fn method_round_trips_through_strings() {
		for method in [Method::Get, Method::Post, Method::Put, Method::Patch, Method::Delete] {
			assert_eq!(method.as_str().parse::<Method>(), Ok(method));
		}

		assert_eq!("patch".parse::<Method>(), Ok(Method::Patch));
		assert!("TRACE".parse::<Method>().is_err());
	}

	#[test]
	fn response_headers_are_case_insensitive() {
		let response = HttpResponse::new(429, Vec::new()).with_header("Retry-After", "3");

		assert_eq!(response.header(RETRY_AFTER), Some("3"));
		assert_eq!(response.header("RETRY-AFTER"), Some("3"));
		assert!(!response.is_success());
	}
}
