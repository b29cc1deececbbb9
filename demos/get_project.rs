//! Demonstrates resolving projects by name through the read-through cache: the first lookup
//! lists the collection once, later lookups are served locally.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use dt_api_client::{client::ReqwestDtClient, config::ClientConfig, transport::CallContext};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let list_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/projects");
			then.status(200).header("content-type", "application/json").body(
				"{\"projects\":[\
					{\"name\":\"projects/greenhouse\",\"displayName\":\"Greenhouse\"},\
					{\"name\":\"projects/cold-storage\",\"displayName\":\"Cold storage\"}\
				],\"nextPageToken\":\"\"}",
			);
		})
		.await;
	let config = ClientConfig::builder()
		.api_url(server.base_url())
		.token_endpoint(server.url("/oauth2/token"))
		.key_id("demo-key")
		.key_secret("demo-secret")
		.email("demo@example.serviceaccount.com")
		.build()?;
	let client = ReqwestDtClient::new(config);
	let ctx = CallContext::new();

	for name in ["projects/greenhouse", "projects/cold-storage", "projects/greenhouse"] {
		let project = client.get_project(&ctx, name).await?;

		println!("{name} is called {}.", project.display_name);
	}

	match client.get_project(&ctx, "projects/unknown").await {
		Err(err) if err.is_not_found() => println!("{err}"),
		other => println!("Unexpected outcome: {other:?}."),
	}

	token_mock.assert_async().await;
	list_mock.assert_calls_async(2).await;

	Ok(())
}
