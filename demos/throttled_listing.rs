//! Demonstrates the shared Retry-After deadline: a throttled platform answers 429 until the
//! retry budget runs out, and a cancellation token cuts a long backoff short.

// std
use std::time::{Duration, Instant};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use dt_api_client::{
	client::ReqwestDtClient,
	config::ClientConfig,
	error::Error,
	transport::{CallContext, RetryPolicy},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let quick_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/projects/p1/devices/d1");
			then.status(429).header("retry-after", "1").body("slow down");
		})
		.await;
	let slow_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/projects/p1/devices/d2");
			then.status(429).header("retry-after", "60").body("slow down");
		})
		.await;
	let config = ClientConfig::builder()
		.api_url(server.base_url())
		.token_endpoint(server.url("/oauth2/token"))
		.key_id("demo-key")
		.key_secret("demo-secret")
		.email("demo@example.serviceaccount.com")
		.retry(RetryPolicy::new(3))
		.build()?;
	let client = ReqwestDtClient::new(config);
	let started = Instant::now();

	match client.get_device(&CallContext::new(), "projects/p1/devices/d1").await {
		Err(Error::RateLimitExhausted { attempts, retry_after }) => println!(
			"Gave up after {attempts} attempts in {:?}, last hint {retry_after}.",
			started.elapsed()
		),
		other => println!("Unexpected outcome: {other:?}."),
	}

	let ctx = CallContext::new();
	let cancel = ctx.cancellation().clone();

	tokio::spawn(async move {
		tokio::time::sleep(Duration::from_millis(500)).await;
		cancel.cancel();
	});

	let started = Instant::now();
	let outcome = client.get_device(&ctx, "projects/p1/devices/d2").await;

	println!("Cancelled wait returned {outcome:?} after {:?}.", started.elapsed());

	quick_mock.assert_calls_async(3).await;
	slow_mock.assert_calls_async(1).await;

	Ok(())
}
