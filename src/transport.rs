//! Authenticated, rate-limit aware request execution.
//!
//! [`ThrottledTransport`] owns the per-client retry deadline learned from 429 responses.
//! Every attempt first waits for that deadline (racing the caller's cancellation token),
//! then attaches a bearer token from the [`TokenProvider`] and sends the request. A 429
//! moves the deadline and retries the same request, bounded by [`RetryPolicy`].

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::time::Instant;
// self
use crate::{
	_prelude::*,
	auth::TokenProvider,
	error::{ConfigError, HttpError},
	http::{ApiHttpClient, HttpRequest, Method, RETRY_AFTER, parse_retry_after},
	obs,
};

/// Attempts performed for one request before giving up on a persistent 429.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Per-call context carrying the caller's cancellation signal.
#[derive(Clone, Debug, Default)]
pub struct CallContext {
	cancellation: CancellationToken,
}
impl CallContext {
	/// Creates a context that is never cancelled unless [`Self::cancellation`] is triggered.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a context bound to an existing cancellation token.
	pub fn with_cancellation(cancellation: CancellationToken) -> Self {
		Self { cancellation }
	}

	/// Token observed by waits and in-flight requests.
	pub fn cancellation(&self) -> &CancellationToken {
		&self.cancellation
	}

	/// Returns `true` once the caller has cancelled.
	pub fn is_cancelled(&self) -> bool {
		self.cancellation.is_cancelled()
	}
}

/// Bounds the 429 retry loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Total attempts, including the first one.
	pub max_attempts: u32,
}
impl RetryPolicy {
	/// Creates a policy with the given attempt budget.
	pub fn new(max_attempts: u32) -> Self {
		Self { max_attempts }
	}

	/// Rejects a zero attempt budget.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.max_attempts == 0 {
			return Err(ConfigError::ZeroLimit { field: "max_attempts" });
		}

		Ok(())
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self { max_attempts: DEFAULT_MAX_ATTEMPTS }
	}
}

/// Instant before which no request may be sent.
///
/// Each 429 replaces the deadline outright, so a later, shorter `Retry-After` lowers it.
#[derive(Debug)]
pub struct RetryDeadline(RwLock<Instant>);
impl RetryDeadline {
	/// Creates a deadline that is already in the past.
	pub fn new() -> Self {
		Self(RwLock::new(Instant::now()))
	}

	/// Current deadline.
	pub fn get(&self) -> Instant {
		*self.0.read()
	}

	/// Replaces the deadline.
	pub fn set(&self, instant: Instant) {
		*self.0.write() = instant;
	}

	/// Replaces the deadline with `now + delay`; negative delays mean "now".
	pub fn set_after(&self, delay: Duration) {
		let delay = StdDuration::try_from(delay).unwrap_or(StdDuration::ZERO);

		self.set(Instant::now() + delay);
	}

	/// Time left until the deadline, zero if it has passed.
	pub fn remaining(&self) -> StdDuration {
		self.get().saturating_duration_since(Instant::now())
	}
}
impl Default for RetryDeadline {
	fn default() -> Self {
		Self::new()
	}
}

/// Request description handed to [`ThrottledTransport::send`].
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP verb.
	pub method: Method,
	/// Target URL without the extra query pairs.
	pub url: Url,
	/// Query pairs appended to [`Self::url`].
	pub query: Vec<(String, String)>,
	/// Optional JSON body.
	pub body: Option<Vec<u8>>,
}
impl ApiRequest {
	/// Creates a request without query or body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, query: Vec::new(), body: None }
	}

	/// `GET url`
	pub fn get(url: Url) -> Self {
		Self::new(Method::Get, url)
	}

	/// `POST url`
	pub fn post(url: Url) -> Self {
		Self::new(Method::Post, url)
	}

	/// `PUT url`
	pub fn put(url: Url) -> Self {
		Self::new(Method::Put, url)
	}

	/// `PATCH url`
	pub fn patch(url: Url) -> Self {
		Self::new(Method::Patch, url)
	}

	/// `DELETE url`
	pub fn delete(url: Url) -> Self {
		Self::new(Method::Delete, url)
	}

	/// Appends a query pair.
	pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((name.into(), value.into()));

		self
	}

	/// Sets a raw body.
	pub fn with_body(mut self, body: Vec<u8>) -> Self {
		self.body = Some(body);

		self
	}

	/// Serializes `payload` as the JSON body.
	pub fn with_json<T>(self, payload: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		Ok(self.with_body(serde_json::to_vec(payload)?))
	}

	/// URL with the query pairs applied.
	pub fn resolved_url(&self) -> Url {
		let mut url = self.url.clone();

		if !self.query.is_empty() {
			url.query_pairs_mut().extend_pairs(self.query.iter());
		}

		url
	}
}

/// Sends authenticated requests while honoring the server's rate-limit hints.
pub struct ThrottledTransport<C>
where
	C: ?Sized + ApiHttpClient,
{
	http_client: Arc<C>,
	tokens: Arc<TokenProvider<C>>,
	deadline: RetryDeadline,
	retry: RetryPolicy,
	user_agent: String,
}
impl<C> ThrottledTransport<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a transport sharing `http_client` with the token provider.
	pub fn new(
		http_client: Arc<C>,
		tokens: Arc<TokenProvider<C>>,
		user_agent: impl Into<String>,
	) -> Self {
		Self {
			http_client,
			tokens,
			deadline: RetryDeadline::new(),
			retry: RetryPolicy::default(),
			user_agent: user_agent.into(),
		}
	}

	/// Overrides the retry budget.
	pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;

		self
	}

	/// Token provider used for every request.
	pub fn tokens(&self) -> &Arc<TokenProvider<C>> {
		&self.tokens
	}

	/// Shared retry deadline.
	pub fn retry_deadline(&self) -> &RetryDeadline {
		&self.deadline
	}

	/// Active retry budget.
	pub fn retry_policy(&self) -> RetryPolicy {
		self.retry
	}

	/// Sends `request` and returns the raw body of the first 2xx response.
	///
	/// A 401 drops the cached token before the error is returned so the next call
	/// re-authenticates. Other non-2xx statuses are returned as [`Error::Http`] verbatim.
	#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
	pub async fn send(&self, ctx: &CallContext, request: ApiRequest) -> Result<Vec<u8>> {
		let url = request.resolved_url();
		let mut retry_after = Duration::ZERO;

		for attempt in 1..=self.retry.max_attempts {
			self.wait_for_deadline(ctx).await?;

			let token = self.tokens.token().await?;
			let mut http_request = HttpRequest::new(request.method, url.clone())
				.with_header("authorization", token.authorization_header())
				.with_header("content-type", JSON_CONTENT_TYPE)
				.with_header("user-agent", self.user_agent.clone());

			if let Some(body) = &request.body {
				http_request = http_request.with_body(body.clone());
			}

			obs::debug!(method = %request.method, url = %url, attempt, "sending request");

			let response = tokio::select! {
				biased;
				_ = ctx.cancellation().cancelled() => return Err(Error::Cancelled),
				response = self.http_client.execute(http_request) => response?,
			};

			if response.is_success() {
				return Ok(response.body);
			}

			match response.status {
				429 => {
					let now = OffsetDateTime::now_utc();
					let target = parse_retry_after(response.header(RETRY_AFTER), now);

					retry_after = target - now;
					self.deadline.set_after(retry_after);
					obs::record_throttled();
					obs::debug!(
						url = %url,
						attempt,
						retry_after_ms = retry_after.whole_milliseconds() as i64,
						"rate limited"
					);
				},
				401 => {
					self.tokens.invalidate();

					return Err(HttpError::new(response.status, &response.body).into());
				},
				status => return Err(HttpError::new(status, &response.body).into()),
			}
		}

		Err(Error::RateLimitExhausted { attempts: self.retry.max_attempts, retry_after })
	}

	async fn wait_for_deadline(&self, ctx: &CallContext) -> Result<()> {
		if ctx.is_cancelled() {
			return Err(Error::Cancelled);
		}

		let deadline = self.deadline.get();

		if deadline <= Instant::now() {
			return Ok(());
		}

		tokio::select! {
			biased;
			_ = ctx.cancellation().cancelled() => Err(Error::Cancelled),
			_ = tokio::time::sleep_until(deadline) => Ok(()),
		}
	}
}
impl<C> Debug for ThrottledTransport<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ThrottledTransport")
			.field("tokens", &self.tokens)
			.field("deadline", &self.deadline)
			.field("retry", &self.retry)
			.field("user_agent", &self.user_agent)
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
			json_response,
		},
		auth::{AccessToken, AssertionSigner, TokenSecret},
		error::TransportError,
		http::HttpResponse,
	};

	const API_PATH: &str = "/v2/projects";

	fn transport(
		client: Arc<ScriptedHttpClient>,
		seed_token: bool,
	) -> ThrottledTransport<ScriptedHttpClient> {
		let endpoint = Url::parse(&format!("https://api.example.com{TEST_TOKEN_PATH}"))
			.expect("Token endpoint fixture should parse.");
		let signer = AssertionSigner::new(
			TEST_KEY_ID,
			&TokenSecret::new(TEST_KEY_SECRET),
			TEST_EMAIL,
			&endpoint,
		);
		let mut tokens = TokenProvider::new(client.clone(), endpoint, signer);

		if seed_token {
			tokens = tokens.with_cached_token(AccessToken::bearer(
				"seeded",
				OffsetDateTime::now_utc() + Duration::hours(1),
			));
		}

		ThrottledTransport::new(client, Arc::new(tokens), "dt-api-client/test")
	}

	fn api_url() -> Url {
		Url::parse(&format!("https://api.example.com{API_PATH}"))
			.expect("API URL fixture should parse.")
	}

	fn throttled(retry_after: &str) -> HttpResponse {
		json_response(429, r#"{"error":"too many requests"}"#).with_header(RETRY_AFTER, retry_after)
	}

	#[tokio::test]
	async fn requests_carry_auth_content_type_and_user_agent() {
		let client =
			Arc::new(ScriptedHttpClient::new(|_, _| Ok(json_response(200, r#"{"ok":true}"#))));
		let transport = transport(client.clone(), true);
		let request = ApiRequest::post(api_url())
			.with_query("pageSize", "100")
			.with_json(&serde_json::json!({ "displayName": "demo" }))
			.expect("Payload should serialize.");
		let body =
			transport.send(&CallContext::new(), request).await.expect("Request should succeed.");
		let calls = client.calls_to(API_PATH);
		let sent = &calls[0].request;

		assert_eq!(body, br#"{"ok":true}"#);
		assert_eq!(sent.method, Method::Post);
		assert_eq!(sent.url.query(), Some("pageSize=100"));
		assert_eq!(sent.header("Authorization"), Some("Bearer seeded"));
		assert_eq!(sent.header("Content-Type"), Some(JSON_CONTENT_TYPE));
		assert_eq!(sent.header("User-Agent"), Some("dt-api-client/test"));
		assert_eq!(sent.body.as_deref(), Some(br#"{"displayName":"demo"}"#.as_slice()));
	}

	#[tokio::test(start_paused = true)]
	async fn retry_after_seconds_delays_the_next_attempt() {
		let client = Arc::new(ScriptedHttpClient::new(|index, _| {
			Ok(if index == 0 { throttled("2") } else { json_response(200, "{}") })
		}));
		let transport = transport(client.clone(), true);

		transport
			.send(&CallContext::new(), ApiRequest::get(api_url()))
			.await
			.expect("Request should succeed after the backoff.");

		let calls = client.calls_to(API_PATH);

		assert_eq!(calls.len(), 2);
		assert!(calls[1].at - calls[0].at >= StdDuration::from_secs(2));
	}

	#[tokio::test(start_paused = true)]
	async fn deadline_is_shared_by_later_requests() {
		let client = Arc::new(ScriptedHttpClient::new(|index, request| {
			Ok(if request.url.path() == API_PATH && index == 0 {
				throttled("5")
			} else {
				json_response(200, "{}")
			})
		}));
		let transport = Arc::new(transport(client.clone(), true));
		let start = Instant::now();
		let first = {
			let transport = transport.clone();

			tokio::spawn(async move {
				transport.send(&CallContext::new(), ApiRequest::get(api_url())).await
			})
		};

		tokio::task::yield_now().await;

		let other = Url::parse("https://api.example.com/v2/other")
			.expect("Second URL fixture should parse.");

		transport
			.send(&CallContext::new(), ApiRequest::get(other))
			.await
			.expect("Second request should succeed.");
		first.await.expect("Task should not panic.").expect("First request should succeed.");

		let later = client.calls_to("/v2/other");

		assert!(later[0].at - start >= StdDuration::from_secs(5));
	}

	#[tokio::test(start_paused = true)]
	async fn persistent_throttling_exhausts_the_budget() {
		let client = Arc::new(ScriptedHttpClient::new(|_, _| Ok(throttled("1"))));
		let transport = transport(client.clone(), true).with_retry_policy(RetryPolicy::new(3));
		let err = transport
			.send(&CallContext::new(), ApiRequest::get(api_url()))
			.await
			.expect_err("Persistent 429 should fail.");

		match err {
			Error::RateLimitExhausted { attempts, retry_after } => {
				assert_eq!(attempts, 3);
				assert_eq!(retry_after, Duration::seconds(1));
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}

		assert_eq!(client.calls_to(API_PATH).len(), 3);
	}

	#[tokio::test(start_paused = true)]
	async fn missing_retry_after_retries_immediately() {
		let client = Arc::new(ScriptedHttpClient::new(|index, _| {
			Ok(if index == 0 { json_response(429, "") } else { json_response(200, "{}") })
		}));
		let transport = transport(client.clone(), true);

		transport
			.send(&CallContext::new(), ApiRequest::get(api_url()))
			.await
			.expect("Request should succeed on retry.");

		let calls = client.calls_to(API_PATH);

		assert_eq!(calls.len(), 2);
		assert!(calls[1].at - calls[0].at < StdDuration::from_millis(1));
	}

	#[tokio::test(start_paused = true)]
	async fn cancellation_interrupts_the_throttle_wait() {
		let client = Arc::new(ScriptedHttpClient::new(|_, _| Ok(throttled("3600"))));
		let transport = transport(client.clone(), true);
		let cancellation = CancellationToken::new();
		let ctx = CallContext::with_cancellation(cancellation.clone());

		tokio::spawn(async move {
			tokio::time::sleep(StdDuration::from_secs(1)).await;
			cancellation.cancel();
		});

		let started = Instant::now();
		let err = transport
			.send(&ctx, ApiRequest::get(api_url()))
			.await
			.expect_err("Cancelled request should fail.");

		assert!(matches!(err, Error::Cancelled));
		assert!(started.elapsed() < StdDuration::from_secs(3600));
		assert_eq!(client.calls_to(API_PATH).len(), 1);
	}

	#[tokio::test]
	async fn client_errors_are_returned_verbatim_without_retry() {
		let client = Arc::new(ScriptedHttpClient::new(|_, _| {
			Ok(json_response(404, r#"{"error":"not found"}"#))
		}));
		let transport = transport(client.clone(), true);
		let err = transport
			.send(&CallContext::new(), ApiRequest::get(api_url()))
			.await
			.expect_err("404 should fail.");

		assert_eq!(err.status(), Some(404));
		assert!(err.to_string().contains(r#"{"error":"not found"}"#));
		assert_eq!(client.calls_to(API_PATH).len(), 1);
	}

	#[tokio::test]
	async fn unauthorized_responses_drop_the_cached_token() {
		let client =
			Arc::new(ScriptedHttpClient::new(|_, _| Ok(json_response(401, "unauthorized"))));
		let transport = transport(client, true);
		let err = transport
			.send(&CallContext::new(), ApiRequest::get(api_url()))
			.await
			.expect_err("401 should fail.");

		assert_eq!(err.status(), Some(401));
		assert!(transport.tokens().cached().is_none());
	}

	#[tokio::test]
	async fn token_failure_short_circuits_the_request() {
		let client = Arc::new(ScriptedHttpClient::new(|_, request| {
			Ok(if request.url.path() == TEST_TOKEN_PATH {
				json_response(400, r#"{"error":"invalid_client"}"#)
			} else {
				json_response(200, "{}")
			})
		}));
		let transport = transport(client.clone(), false);
		let err = transport
			.send(&CallContext::new(), ApiRequest::get(api_url()))
			.await
			.expect_err("Token failure should fail the request.");

		assert!(matches!(err, Error::TokenEndpoint { status: 400, .. }));
		assert!(client.calls_to(API_PATH).is_empty());
	}

	#[tokio::test]
	async fn transport_errors_are_not_retried() {
		let client = Arc::new(ScriptedHttpClient::new(|_, request| {
			Err(TransportError::Timeout { url: request.url.to_string() })
		}));
		let transport = transport(client.clone(), true);
		let err = transport
			.send(&CallContext::new(), ApiRequest::get(api_url()))
			.await
			.expect_err("Timeout should fail.");

		assert!(matches!(err, Error::Transport(_)));
		assert_eq!(client.calls().len(), 1);
	}

	#[tokio::test]
	async fn already_cancelled_context_sends_nothing() {
		let client = Arc::new(ScriptedHttpClient::new(|_, _| Ok(json_response(200, "{}"))));
		let transport = transport(client.clone(), true);
		let ctx = CallContext::new();

		ctx.cancellation().cancel();

		let err = transport
			.send(&ctx, ApiRequest::get(api_url()))
			.await
			.expect_err("Cancelled context should fail.");

		assert!(matches!(err, Error::Cancelled));
		assert!(client.calls().is_empty());
	}

	#[test]
	fn later_shorter_hints_lower_the_deadline() {
		let deadline = RetryDeadline::new();

		deadline.set_after(Duration::seconds(30));

		let long = deadline.get();

		deadline.set_after(Duration::seconds(1));

		assert!(deadline.get() < long);

		deadline.set_after(Duration::seconds(-5));

		assert_eq!(deadline.remaining(), StdDuration::ZERO);
	}

	#[test]
	fn zero_attempt_budget_is_rejected() {
		assert!(RetryPolicy::new(0).validate().is_err());
		assert!(RetryPolicy::default().validate().is_ok());
	}
}
