//! Resilient REST client for the DT IoT platform: cached OIDC assertion tokens, Retry-After
//! aware throttling, and read-through entity caches for infrastructure tooling.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod obs;
pub mod resource;
pub mod transport;
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for unit and integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::ClientConfig,
		error::TransportError,
		http::{ApiHttpClient, HttpFuture, HttpRequest, HttpResponse},
	};
	#[cfg(feature = "reqwest")] use crate::{client::ReqwestDtClient, http::ReqwestHttpClient};

	/// Key identifier used by test configurations.
	pub const TEST_KEY_ID: &str = "test-key-id";
	/// Shared secret used by test configurations.
	pub const TEST_KEY_SECRET: &str = "test-key-secret";
	/// Service account email used by test configurations.
	pub const TEST_EMAIL: &str = "robot@test-org.serviceaccount.example.com";
	/// Token endpoint path served by mock servers.
	pub const TEST_TOKEN_PATH: &str = "/oauth2/token";

	/// Builds a configuration whose API, emulator, and token endpoints all live under
	/// `base_url`.
	pub fn test_config(base_url: &str) -> ClientConfig {
		let base = base_url.trim_end_matches('/');

		ClientConfig::builder()
			.api_url(base)
			.token_endpoint(format!("{base}{TEST_TOKEN_PATH}"))
			.key_id(TEST_KEY_ID)
			.key_secret(TEST_KEY_SECRET)
			.email(TEST_EMAIL)
			.build()
			.expect("Test configuration should be valid.")
	}

	/// JSON body returned by a healthy token endpoint.
	pub fn token_response_body(access_token: &str, expires_in: i64) -> String {
		format!(
			"{{\"access_token\":\"{access_token}\",\"token_type\":\"Bearer\",\"expires_in\":{expires_in}}}"
		)
	}

	/// Constructs a reqwest-backed client pointed at `base_url`.
	#[cfg(feature = "reqwest")]
	pub fn build_reqwest_test_client(base_url: &str) -> ReqwestDtClient {
		ReqwestDtClient::with_http_client(test_config(base_url), ReqwestHttpClient::default())
	}

	type Responder =
		Box<dyn Fn(usize, &HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync>;

	/// A request observed by [`ScriptedHttpClient`] together with the (tokio) instant it
	/// was dispatched.
	#[derive(Clone, Debug)]
	pub struct RecordedCall {
		/// The request as handed to the transport.
		pub request: HttpRequest,
		/// Tokio clock reading at dispatch time; honours paused test time.
		pub at: tokio::time::Instant,
	}

	/// In-process [`ApiHttpClient`] that answers with a caller-supplied script.
	///
	/// The responder receives the zero-based index of the call among all calls sharing the
	/// same URL path, so sequences (429 then 200) are easy to express.
	pub struct ScriptedHttpClient {
		responder: Responder,
		per_path: Mutex<HashMap<String, usize>>,
		calls: Mutex<Vec<RecordedCall>>,
	}
	impl ScriptedHttpClient {
		/// Wraps a responder closure.
		pub fn new(
			responder: impl Fn(usize, &HttpRequest) -> Result<HttpResponse, TransportError>
			+ 'static
			+ Send
			+ Sync,
		) -> Self {
			Self {
				responder: Box::new(responder),
				per_path: Default::default(),
				calls: Default::default(),
			}
		}

		/// Returns every recorded call.
		pub fn calls(&self) -> Vec<RecordedCall> {
			self.calls.lock().clone()
		}

		/// Returns recorded calls whose URL path equals `path`.
		pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
			self.calls
				.lock()
				.iter()
				.filter(|call| call.request.url.path() == path)
				.cloned()
				.collect()
		}
	}
	impl ApiHttpClient for ScriptedHttpClient {
		fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
			let index = {
				let mut per_path = self.per_path.lock();
				let slot = per_path.entry(request.url.path().to_owned()).or_insert(0);
				let index = *slot;

				*slot += 1;

				index
			};
			let outcome = (self.responder)(index, &request);

			self.calls.lock().push(RecordedCall { request, at: tokio::time::Instant::now() });

			Box::pin(async move { outcome })
		}
	}
	impl Debug for ScriptedHttpClient {
		fn fmt(&self, f: &mut Formatter) -> FmtResult {
			f.debug_struct("ScriptedHttpClient").field("calls", &self.calls.lock().len()).finish()
		}
	}

	/// Builds a JSON [`HttpResponse`] with the given status.
	pub fn json_response(status: u16, body: impl Into<String>) -> HttpResponse {
		HttpResponse::new(status, body.into().into_bytes())
			.with_header("content-type", "application/json")
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use tokio_util::sync::CancellationToken;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
