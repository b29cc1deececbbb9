#![cfg(feature = "reqwest")]

// std
use std::time::{Duration, Instant};
// crates.io
use httpmock::prelude::*;
// self
use dt_api_client::{
	_preludet::*,
	client::ReqwestDtClient,
	error::Error,
	http::ReqwestHttpClient,
	transport::{CallContext, RetryPolicy},
};

fn throttled_client(base_url: &str, max_attempts: u32) -> ReqwestDtClient {
	let mut config = test_config(base_url);

	config.retry = RetryPolicy::new(max_attempts);

	ReqwestDtClient::with_http_client(config, ReqwestHttpClient::default())
}

#[tokio::test]
async fn persistent_throttling_exhausts_the_budget() {
	let server = MockServer::start_async().await;
	let _token = server
		.mock_async(|when, then| {
			when.method(POST).path(TEST_TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(token_response_body("access-throttled", 3_600));
		})
		.await;
	let list = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/projects");
			then.status(429).header("retry-after", "0").body("slow down");
		})
		.await;
	let client = throttled_client(&server.base_url(), 2);
	let err = client
		.list_projects(&CallContext::new())
		.await
		.expect_err("Persistent 429 should exhaust the retry budget.");

	match err {
		Error::RateLimitExhausted { attempts, .. } => assert_eq!(attempts, 2),
		other => panic!("Unexpected error variant: {other:?}."),
	}

	list.assert_calls_async(2).await;
}

#[tokio::test]
async fn retry_after_delays_the_next_attempt() {
	let server = MockServer::start_async().await;
	let _token = server
		.mock_async(|when, then| {
			when.method(POST).path(TEST_TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(token_response_body("access-throttled", 3_600));
		})
		.await;
	let list = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/projects");
			then.status(429).header("retry-after", "1").body("slow down");
		})
		.await;
	let client = throttled_client(&server.base_url(), 2);
	let started = Instant::now();
	let err = client
		.list_projects(&CallContext::new())
		.await
		.expect_err("Persistent 429 should exhaust the retry budget.");

	assert!(matches!(err, Error::RateLimitExhausted { .. }));
	assert!(started.elapsed() >= Duration::from_millis(900));
	assert!(client.transport().retry_deadline().remaining() > Duration::ZERO);

	list.assert_calls_async(2).await;
}

#[tokio::test]
async fn cancellation_interrupts_a_throttled_wait() {
	let server = MockServer::start_async().await;
	let _token = server
		.mock_async(|when, then| {
			when.method(POST).path(TEST_TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(token_response_body("access-throttled", 3_600));
		})
		.await;
	let list = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/projects");
			then.status(429).header("retry-after", "30").body("slow down");
		})
		.await;
	let client = throttled_client(&server.base_url(), 5);
	let ctx = CallContext::new();
	let cancel = ctx.cancellation().clone();
	let canceller = tokio::spawn(async move {
		tokio::time::sleep(Duration::from_millis(200)).await;
		cancel.cancel();
	});
	let started = Instant::now();
	let err = client.list_projects(&ctx).await.expect_err("Cancelled call should fail.");

	canceller.await.expect("Canceller task should finish.");

	assert!(matches!(err, Error::Cancelled));
	assert!(started.elapsed() < Duration::from_secs(10));

	list.assert_calls_async(1).await;
}
