//! Client-level error types shared across the transport, token provider, caches, and
//! resource operations.

// self
use crate::{_prelude::*, resource::ResourceKind};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The platform answered with a non-success status other than 429.
	#[error(transparent)]
	Http(#[from] HttpError),
	/// Response body did not match the expected shape.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Request payload could not be serialized.
	#[error("Request body could not be encoded.")]
	Encode(#[from] serde_json::Error),
	/// Resource name is malformed for its kind.
	#[error(transparent)]
	InvalidName(#[from] crate::resource::ResourceNameError),

	/// The OIDC token endpoint rejected the assertion.
	#[error("Token endpoint returned HTTP {status}: {body}.")]
	TokenEndpoint {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// The OIDC token endpoint returned a token that cannot be used.
	#[error("Token endpoint returned an unusable token: {reason}.")]
	InvalidToken {
		/// Why the token was rejected.
		reason: &'static str,
	},
	/// The platform kept answering 429 until the retry budget ran out.
	#[error("Rate limit persisted after {attempts} attempts.")]
	RateLimitExhausted {
		/// Number of attempts performed, including the first one.
		attempts: u32,
		/// Backoff requested by the last 429 response.
		retry_after: Duration,
	},
	/// The requested entity is absent even after refreshing the cache from upstream.
	#[error("{kind} `{name}` was not found.")]
	NotFound {
		/// Kind of the missing entity.
		kind: ResourceKind,
		/// Resource name that was requested.
		name: String,
	},
	/// A list call kept returning page tokens past the configured ceiling.
	#[error("Listing stopped after {max_pages} pages without reaching the last page.")]
	PaginationLimit {
		/// Configured page ceiling.
		max_pages: u32,
	},
	/// A membership carries a role count the platform contract does not allow.
	#[error("Membership `{name}` carries {count} roles, exactly one is supported.")]
	UnexpectedRoles {
		/// Membership resource name.
		name: String,
		/// Number of roles attached.
		count: usize,
	},
	/// The caller cancelled the operation while it was waiting or in flight.
	#[error("Request was cancelled by the caller.")]
	Cancelled,
}
impl Error {
	/// HTTP status carried by the error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Http(err) => Some(err.status),
			Self::TokenEndpoint { status, .. } => Some(*status),
			Self::RateLimitExhausted { .. } => Some(429),
			_ => None,
		}
	}

	/// Returns `true` when the platform reported the resource as gone (HTTP 404) or the
	/// cache could not resolve it.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound { .. }) || self.status() == Some(404)
	}
}

/// Non-success HTTP response returned by the platform.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("HTTP error {status}: {body}.")]
pub struct HttpError {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body, verbatim.
	pub body: String,
}
impl HttpError {
	/// Builds an error from a status code and raw body bytes.
	pub fn new(status: u16, body: &[u8]) -> Self {
		Self { status, body: String::from_utf8_lossy(body).into_owned() }
	}
}

/// Response decoding failure annotated with the JSON path that failed.
#[derive(Debug, ThisError)]
#[error("Response body does not match the expected shape at `{path}`.")]
pub struct DecodeError {
	path: String,
	#[source]
	source: serde_path_to_error::Error<serde_json::Error>,
}
impl DecodeError {
	/// JSON path where decoding failed.
	pub fn path(&self) -> &str {
		&self.path
	}
}
impl From<serde_path_to_error::Error<serde_json::Error>> for DecodeError {
	fn from(source: serde_path_to_error::Error<serde_json::Error>) -> Self {
		Self { path: source.path().to_string(), source }
	}
}

/// Decodes a JSON body, recording the failing path on error.
pub fn decode_json<T>(body: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut de).map_err(|e| DecodeError::from(e).into())
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A required setting was not provided.
	#[error("Missing required setting `{field}`.")]
	MissingField {
		/// Setting name.
		field: &'static str,
	},
	/// A URL setting cannot be parsed.
	#[error("Setting `{field}` is not a valid URL.")]
	InvalidUrl {
		/// Setting name.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A URL setting uses a scheme other than HTTP(S).
	#[error("Setting `{field}` must use http or https: {url}.")]
	UnsupportedScheme {
		/// Setting name.
		field: &'static str,
		/// Offending URL.
		url: String,
	},
	/// A numeric limit is outside its accepted range.
	#[error("Setting `{field}` must be at least 1.")]
	ZeroLimit {
		/// Setting name.
		field: &'static str,
	},
	/// The JWT assertion could not be signed.
	#[error("Token assertion could not be signed.")]
	Signing {
		/// Underlying signing failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Target URL.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request exceeded its timeout.
	#[error("Request to {url} timed out.")]
	Timeout {
		/// Target URL.
		url: String,
	},
	/// Response body could not be read.
	#[error("Response body from {url} could not be read.")]
	Body {
		/// Target URL.
		url: String,
		/// Transport-specific read error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(url: &Url, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { url: url.to_string(), source: Box::new(src) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	struct Shape {
		#[allow(dead_code)]
		items: Vec<Item>,
	}

	#[derive(Debug, Deserialize)]
	struct Item {
		#[allow(dead_code)]
		count: u32,
	}

	#[test]
	fn decode_errors_report_the_failing_path() {
		let err = decode_json::<Shape>(br#"{"items":[{"count":1},{"count":"two"}]}"#)
			.expect_err("Mismatched field type should fail to decode.");

		match err {
			Error::Decode(decode) => assert_eq!(decode.path(), "items[1].count"),
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn http_errors_keep_status_and_body_verbatim() {
		let err = Error::from(HttpError::new(409, br#"{"error":"conflict"}"#));

		assert_eq!(err.status(), Some(409));
		assert!(err.to_string().contains(r#"{"error":"conflict"}"#));
		assert!(!err.is_not_found());
		assert!(Error::from(HttpError::new(404, b"")).is_not_found());
	}

	#[test]
	fn not_found_names_kind_and_resource() {
		let err = Error::NotFound { kind: ResourceKind::Project, name: "projects/abc".into() };

		assert_eq!(err.to_string(), "Project `projects/abc` was not found.");
		assert!(err.is_not_found());
	}
}
