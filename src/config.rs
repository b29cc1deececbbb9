//! Client configuration: endpoints, credentials, and the limits applied by the transport.

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::{DEFAULT_TOKEN_TIMEOUT, TokenSecret},
	error::ConfigError,
	resource::ListOptions,
	transport::RetryPolicy,
};

/// Environment variable holding the platform API URL.
pub const ENV_API_URL: &str = "DT_API_URL";
/// Environment variable holding the emulator API URL.
pub const ENV_EMULATOR_URL: &str = "DT_EMULATOR_URL";
/// Environment variable holding the service-account key id.
pub const ENV_KEY_ID: &str = "DT_API_KEY_ID";
/// Environment variable holding the service-account key secret.
pub const ENV_KEY_SECRET: &str = "DT_API_KEY_SECRET";
/// Environment variable holding the OIDC token endpoint.
pub const ENV_TOKEN_ENDPOINT: &str = "DT_OIDC_TOKEN_ENDPOINT";
/// Environment variable holding the service-account email.
pub const ENV_EMAIL: &str = "DT_OIDC_EMAIL";

/// Default `User-Agent` header value.
pub const DEFAULT_USER_AGENT: &str = concat!("dt-api-client/", env!("CARGO_PKG_VERSION"));

/// Validated client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Platform REST API base URL.
	pub api_url: Url,
	/// Emulator REST API base URL; defaults to [`Self::api_url`].
	pub emulator_url: Url,
	/// OIDC token endpoint; also the assertion audience.
	pub token_endpoint: Url,
	/// Service-account key id, sent as the assertion `kid`.
	pub key_id: String,
	/// Service-account key secret used to sign assertions.
	pub key_secret: TokenSecret,
	/// Service-account email, sent as the assertion issuer.
	pub email: String,
	/// `User-Agent` header value.
	pub user_agent: String,
	/// Timeout applied to token exchanges.
	pub token_timeout: StdDuration,
	/// 429 retry budget.
	pub retry: RetryPolicy,
	/// Pagination knobs for list calls.
	pub list: ListOptions,
}
impl ClientConfig {
	/// Starts an empty builder.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}

	/// Builds a configuration from the `DT_*` process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		ClientConfigBuilder::default().env_overrides(|key| std::env::var(key).ok()).build()
	}

	/// API base URL without a trailing slash.
	pub fn api_base(&self) -> &str {
		self.api_url.as_str().trim_end_matches('/')
	}

	/// Emulator base URL without a trailing slash.
	pub fn emulator_base(&self) -> &str {
		self.emulator_url.as_str().trim_end_matches('/')
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Clone, Debug, Default)]
pub struct ClientConfigBuilder {
	/// Platform REST API base URL.
	pub api_url: Option<String>,
	/// Optional emulator base URL.
	pub emulator_url: Option<String>,
	/// OIDC token endpoint.
	pub token_endpoint: Option<String>,
	/// Service-account key id.
	pub key_id: Option<String>,
	/// Service-account key secret.
	pub key_secret: Option<TokenSecret>,
	/// Service-account email.
	pub email: Option<String>,
	/// Optional `User-Agent` override.
	pub user_agent: Option<String>,
	/// Optional token exchange timeout override.
	pub token_timeout: Option<StdDuration>,
	/// 429 retry budget.
	pub retry: RetryPolicy,
	/// Pagination knobs.
	pub list: ListOptions,
}
impl ClientConfigBuilder {
	/// Sets the platform API URL.
	pub fn api_url(mut self, url: impl Into<String>) -> Self {
		self.api_url = Some(url.into());

		self
	}

	/// Sets the emulator API URL.
	pub fn emulator_url(mut self, url: impl Into<String>) -> Self {
		self.emulator_url = Some(url.into());

		self
	}

	/// Sets the OIDC token endpoint.
	pub fn token_endpoint(mut self, url: impl Into<String>) -> Self {
		self.token_endpoint = Some(url.into());

		self
	}

	/// Sets the key id.
	pub fn key_id(mut self, key_id: impl Into<String>) -> Self {
		self.key_id = Some(key_id.into());

		self
	}

	/// Sets the key secret.
	pub fn key_secret(mut self, secret: impl Into<String>) -> Self {
		self.key_secret = Some(TokenSecret::new(secret));

		self
	}

	/// Sets the service-account email.
	pub fn email(mut self, email: impl Into<String>) -> Self {
		self.email = Some(email.into());

		self
	}

	/// Overrides the `User-Agent` header.
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());

		self
	}

	/// Overrides the token exchange timeout.
	pub fn token_timeout(mut self, timeout: StdDuration) -> Self {
		self.token_timeout = Some(timeout);

		self
	}

	/// Overrides the 429 retry budget.
	pub fn retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;

		self
	}

	/// Overrides the pagination knobs.
	pub fn list(mut self, list: ListOptions) -> Self {
		self.list = list;

		self
	}

	/// Applies every non-empty `DT_*` variable returned by `lookup`, replacing builder values.
	pub fn env_overrides<F>(mut self, lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

		if let Some(value) = read(ENV_API_URL) {
			self.api_url = Some(value);
		}
		if let Some(value) = read(ENV_EMULATOR_URL) {
			self.emulator_url = Some(value);
		}
		if let Some(value) = read(ENV_KEY_ID) {
			self.key_id = Some(value);
		}
		if let Some(value) = read(ENV_KEY_SECRET) {
			self.key_secret = Some(TokenSecret::new(value));
		}
		if let Some(value) = read(ENV_TOKEN_ENDPOINT) {
			self.token_endpoint = Some(value);
		}
		if let Some(value) = read(ENV_EMAIL) {
			self.email = Some(value);
		}

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let api_url = parse_url("api_url", required("api_url", self.api_url)?)?;
		let emulator_url = match self.emulator_url {
			Some(raw) => parse_url("emulator_url", raw)?,
			None => api_url.clone(),
		};
		let token_endpoint =
			parse_url("token_endpoint", required("token_endpoint", self.token_endpoint)?)?;
		let key_id = required("key_id", self.key_id)?;
		let key_secret = self
			.key_secret
			.filter(|secret| !secret.is_empty())
			.ok_or(ConfigError::MissingField { field: "key_secret" })?;
		let email = required("email", self.email)?;

		self.retry.validate()?;
		self.list.validate()?;

		Ok(ClientConfig {
			api_url,
			emulator_url,
			token_endpoint,
			key_id,
			key_secret,
			email,
			user_agent: self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
			token_timeout: self.token_timeout.unwrap_or(DEFAULT_TOKEN_TIMEOUT),
			retry: self.retry,
			list: self.list,
		})
	}
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ConfigError> {
	value
		.map(|value| value.trim().to_owned())
		.filter(|value| !value.is_empty())
		.ok_or(ConfigError::MissingField { field })
}

fn parse_url(field: &'static str, raw: String) -> Result<Url, ConfigError> {
	let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { field, source })?;

	match url.scheme() {
		"http" | "https" => Ok(url),
		_ => Err(ConfigError::UnsupportedScheme { field, url: url.to_string() }),
	}
}
