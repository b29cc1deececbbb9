//! Access-token acquisition with a read-mostly cache and a singleflight refresh guard.
//!
//! [`TokenProvider::token`] returns the cached token while it is still valid. Once it
//! expires, the first caller to take the refresh guard signs a fresh assertion and exchanges
//! it at the token endpoint; callers queued behind the guard re-check the cache and reuse the
//! new token instead of issuing their own exchange. Every exchange is bounded by the
//! provider's own timeout whatever the HTTP client does. Failed exchanges leave the cache
//! empty so the next call tries again.

mod metrics;

pub use metrics::ExchangeMetrics;

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AssertionSigner},
	error::{TransportError, decode_json},
	http::{ApiHttpClient, HttpRequest, Method},
	obs::{self, Operation},
};

/// Timeout applied to every token exchange unless overridden.
pub const DEFAULT_TOKEN_TIMEOUT: StdDuration = StdDuration::from_secs(3);
/// Grant type for RFC 7523 assertion exchanges.
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Deserialize)]
struct TokenResponse {
	access_token: String,
	#[serde(default)]
	token_type: Option<String>,
	expires_in: i64,
}

/// Exchanges signed assertions for bearer tokens and caches the result until expiry.
pub struct TokenProvider<C>
where
	C: ?Sized + ApiHttpClient,
{
	http_client: Arc<C>,
	token_endpoint: Url,
	signer: AssertionSigner,
	timeout: StdDuration,
	cached: RwLock<Option<AccessToken>>,
	refresh_guard: AsyncMutex<()>,
	metrics: ExchangeMetrics,
}
impl<C> TokenProvider<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a provider with an empty cache.
	pub fn new(http_client: Arc<C>, token_endpoint: Url, signer: AssertionSigner) -> Self {
		Self {
			http_client,
			token_endpoint,
			signer,
			timeout: DEFAULT_TOKEN_TIMEOUT,
			cached: RwLock::new(None),
			refresh_guard: AsyncMutex::new(()),
			metrics: ExchangeMetrics::default(),
		}
	}

	/// Overrides the exchange timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Seeds the cache, e.g. with a token persisted by a previous process.
	pub fn with_cached_token(self, token: AccessToken) -> Self {
		*self.cached.write() = Some(token);

		self
	}

	/// Returns the cached token, valid or not.
	pub fn cached(&self) -> Option<AccessToken> {
		self.cached.read().clone()
	}

	/// Exchange counters.
	pub fn metrics(&self) -> &ExchangeMetrics {
		&self.metrics
	}

	/// Drops the cached token so the next [`Self::token`] call re-authenticates.
	pub fn invalidate(&self) {
		*self.cached.write() = None;
	}

	/// Returns a token that is valid right now, exchanging a new assertion when needed.
	pub async fn token(&self) -> Result<AccessToken> {
		if let Some(token) = self.valid_cached(OffsetDateTime::now_utc()) {
			self.metrics.record_cache_hit();

			return Ok(token);
		}

		let _singleflight = self.refresh_guard.lock().await;

		if let Some(token) = self.valid_cached(OffsetDateTime::now_utc()) {
			self.metrics.record_cache_hit();

			return Ok(token);
		}

		self.metrics.record_attempt();

		let result = obs::observe("token", Operation::TokenExchange, self.exchange()).await;

		match result {
			Ok(token) => {
				self.metrics.record_success();
				obs::debug!(expires_at = %token.expires_at, "access token refreshed");

				*self.cached.write() = Some(token.clone());

				Ok(token)
			},
			Err(e) => {
				self.metrics.record_failure();

				Err(e)
			},
		}
	}

	fn valid_cached(&self, now: OffsetDateTime) -> Option<AccessToken> {
		self.cached.read().as_ref().filter(|token| !token.is_expired_at(now)).cloned()
	}

	async fn exchange(&self) -> Result<AccessToken> {
		let now = OffsetDateTime::now_utc();
		let assertion = self.signer.sign_at(now)?;
		let form = url::form_urlencoded::Serializer::new(String::new())
			.append_pair("grant_type", JWT_BEARER_GRANT)
			.append_pair("assertion", &assertion)
			.finish();
		let request = HttpRequest::new(Method::Post, self.token_endpoint.clone())
			.with_header("content-type", FORM_CONTENT_TYPE)
			.with_body(form.into_bytes())
			.with_timeout(self.timeout);
		let response = tokio::time::timeout(self.timeout, self.http_client.execute(request))
			.await
			.map_err(|_| TransportError::Timeout { url: self.token_endpoint.to_string() })??;

		if response.status != 200 {
			return Err(Error::TokenEndpoint {
				status: response.status,
				body: String::from_utf8_lossy(&response.body).into_owned(),
			});
		}

		let payload = decode_json::<TokenResponse>(&response.body)?;

		if payload.access_token.is_empty() {
			return Err(Error::InvalidToken { reason: "access_token is empty" });
		}
		if payload.expires_in <= 0 {
			return Err(Error::InvalidToken { reason: "expires_in is not positive" });
		}

		let mut token =
			AccessToken::bearer(payload.access_token, now + Duration::seconds(payload.expires_in));

		if let Some(kind) = payload.token_type.filter(|kind| !kind.is_empty()) {
			token.kind = kind;
		}

		Ok(token)
	}
}
impl<C> Debug for TokenProvider<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenProvider")
			.field("token_endpoint", &self.token_endpoint.as_str())
			.field("signer", &self.signer)
			.field("timeout", &self.timeout)
			.field("cached", &self.cached.read().is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::{
			ScriptedHttpClient, TEST_EMAIL, TEST_KEY_ID, TEST_KEY_SECRET, TEST_TOKEN_PATH,
			json_response, token_response_body,
		},
		auth::TokenSecret,
		http::HttpFuture,
	};

	fn endpoint() -> Url {
		Url::parse(&format!("https://identity.example.com{TEST_TOKEN_PATH}"))
			.expect("Token endpoint fixture should parse.")
	}

	fn provider(client: Arc<ScriptedHttpClient>) -> TokenProvider<ScriptedHttpClient> {
		let endpoint = endpoint();
		let signer = AssertionSigner::new(
			TEST_KEY_ID,
			&TokenSecret::new(TEST_KEY_SECRET),
			TEST_EMAIL,
			&endpoint,
		);

		TokenProvider::new(client, endpoint, signer)
	}

	fn form_pairs(request: &HttpRequest) -> HashMap<String, String> {
		let body = request.body.as_deref().expect("Token request should carry a body.");

		url::form_urlencoded::parse(body).into_owned().collect()
	}

	#[tokio::test]
	async fn valid_cached_token_skips_the_exchange() {
		let client = Arc::new(ScriptedHttpClient::new(|_, _| {
			Ok(json_response(200, token_response_body("fresh", 3_600)))
		}));
		let cached =
			AccessToken::bearer("cached", OffsetDateTime::now_utc() + Duration::minutes(10));
		let provider = provider(client.clone()).with_cached_token(cached);
		let token = provider.token().await.expect("Cached token should be returned.");

		assert_eq!(token.value.expose(), "cached");
		assert!(client.calls().is_empty());
		assert_eq!(provider.metrics().cache_hits(), 1);
		assert_eq!(provider.metrics().attempts(), 0);
	}

	#[tokio::test]
	async fn expired_token_triggers_exactly_one_exchange() {
		let client = Arc::new(ScriptedHttpClient::new(|_, _| {
			Ok(json_response(200, token_response_body("fresh", 3_600)))
		}));
		let expired =
			AccessToken::bearer("stale", OffsetDateTime::now_utc() - Duration::seconds(1));
		let provider = provider(client.clone()).with_cached_token(expired);
		let before = OffsetDateTime::now_utc();
		let token = provider.token().await.expect("Exchange should succeed.");

		assert_eq!(token.value.expose(), "fresh");
		assert!(token.expires_at >= before + Duration::seconds(3_600));
		assert_eq!(client.calls().len(), 1);
		assert_eq!(
			provider.cached().map(|token| token.value.expose().to_owned()).as_deref(),
			Some("fresh")
		);

		provider.token().await.expect("Second call should hit the cache.");

		assert_eq!(client.calls().len(), 1);
	}

	#[tokio::test]
	async fn exchange_posts_a_form_encoded_jwt_bearer_grant() {
		let client = Arc::new(ScriptedHttpClient::new(|_, _| {
			Ok(json_response(200, token_response_body("fresh", 60)))
		}));
		let provider = provider(client.clone());

		provider.token().await.expect("Exchange should succeed.");

		let calls = client.calls_to(TEST_TOKEN_PATH);
		let request = &calls[0].request;
		let pairs = form_pairs(request);

		assert_eq!(request.method, Method::Post);
		assert_eq!(request.header("Content-Type"), Some(FORM_CONTENT_TYPE));
		assert_eq!(request.timeout, Some(DEFAULT_TOKEN_TIMEOUT));
		assert_eq!(pairs.get("grant_type").map(String::as_str), Some(JWT_BEARER_GRANT));
		assert_eq!(
			pairs.get("assertion").map(|jwt| jwt.split('.').count()),
			Some(3),
			"Assertion should be a compact JWS."
		);
	}

	#[tokio::test]
	async fn endpoint_rejection_is_surfaced_and_not_cached() {
		let client = Arc::new(ScriptedHttpClient::new(|index, _| {
			Ok(if index == 0 {
				json_response(401, r#"{"error":"invalid_grant"}"#)
			} else {
				json_response(200, token_response_body("fresh", 60))
			})
		}));
		let provider = provider(client.clone());
		let err = provider.token().await.expect_err("Rejected exchange should fail.");

		match err {
			Error::TokenEndpoint { status, body } => {
				assert_eq!(status, 401);
				assert!(body.contains("invalid_grant"));
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}

		assert!(provider.cached().is_none());
		assert_eq!(provider.metrics().failures(), 1);

		provider.token().await.expect("Next call should retry the exchange.");

		assert_eq!(client.calls().len(), 2);
	}

	#[tokio::test]
	async fn non_positive_lifetimes_are_rejected() {
		let client = Arc::new(ScriptedHttpClient::new(|_, _| {
			Ok(json_response(200, token_response_body("fresh", 0)))
		}));
		let err = provider(client).token().await.expect_err("Zero lifetime should fail.");

		assert!(matches!(err, Error::InvalidToken { .. }));
	}

	#[tokio::test]
	async fn malformed_body_is_a_decode_error() {
		let client =
			Arc::new(ScriptedHttpClient::new(|_, _| Ok(json_response(200, r#"{"token":1}"#))));
		let err = provider(client).token().await.expect_err("Malformed body should fail.");

		assert!(matches!(err, Error::Decode(_)));
	}

	#[tokio::test]
	async fn transport_failures_are_propagated() {
		let client = Arc::new(ScriptedHttpClient::new(|_, request| {
			Err(TransportError::Timeout { url: request.url.to_string() })
		}));
		let err = provider(client).token().await.expect_err("Timeout should fail.");

		assert!(matches!(err, Error::Transport(TransportError::Timeout { .. })));
	}

	#[tokio::test]
	async fn concurrent_callers_share_one_exchange() {
		let client = Arc::new(ScriptedHttpClient::new(|_, _| {
			Ok(json_response(200, token_response_body("shared", 3_600)))
		}));
		let provider = Arc::new(provider(client.clone()));
		let handles = (0..8)
			.map(|_| {
				let provider = provider.clone();

				tokio::spawn(async move { provider.token().await })
			})
			.collect::<Vec<_>>();

		for handle in handles {
			let token = handle
				.await
				.expect("Task should not panic.")
				.expect("Every caller should receive a token.");

			assert_eq!(token.value.expose(), "shared");
		}

		assert_eq!(client.calls().len(), 1);
	}

	#[tokio::test]
	async fn invalidate_forces_a_new_exchange() {
		let client = Arc::new(ScriptedHttpClient::new(|index, _| {
			Ok(json_response(200, token_response_body(&format!("token-{index}"), 3_600)))
		}));
		let provider = provider(client.clone());

		provider.token().await.expect("First exchange should succeed.");
		provider.invalidate();

		let token = provider.token().await.expect("Second exchange should succeed.");

		assert_eq!(token.value.expose(), "token-1");
		assert_eq!(client.calls().len(), 2);
	}

	struct StalledHttpClient;
	impl ApiHttpClient for StalledHttpClient {
		fn execute(&self, _: HttpRequest) -> HttpFuture<'_> {
			Box::pin(std::future::pending())
		}
	}

	#[tokio::test(start_paused = true)]
	async fn stalled_endpoint_times_out_after_the_exchange_timeout() {
		let endpoint = endpoint();
		let signer = AssertionSigner::new(
			TEST_KEY_ID,
			&TokenSecret::new(TEST_KEY_SECRET),
			TEST_EMAIL,
			&endpoint,
		);
		let provider = TokenProvider::new(Arc::new(StalledHttpClient), endpoint, signer);
		let started = tokio::time::Instant::now();
		let err = tokio::time::timeout(StdDuration::from_secs(60), provider.token())
			.await
			.expect("Exchange should give up before the outer deadline.")
			.expect_err("Stalled exchange should fail.");

		assert!(matches!(err, Error::Transport(TransportError::Timeout { .. })));
		assert!(started.elapsed() >= DEFAULT_TOKEN_TIMEOUT);
		assert!(started.elapsed() < StdDuration::from_secs(4));
		assert!(provider.cached().is_none());
		assert_eq!(provider.metrics().failures(), 1);
	}
}
