//! Resource client composing the throttled transport with read-through entity caches.
//!
//! [`Client`] is cheap to clone; every clone shares the token cache, the retry deadline, and
//! the entity caches. Cached kinds (projects, notification rules, memberships) resolve
//! get-by-name through their collection's list endpoint, so one list call amortizes many
//! lookups. Mutations keep the caches honest: creates and updates store the returned entity,
//! deletes invalidate the name.

mod data_connector;
mod device;
mod emulator;
mod membership;
mod notification_rule;
mod project;

// self
use crate::{
	_prelude::*,
	auth::{AssertionSigner, TokenProvider},
	cache::{CacheInvalidation, Cached, EntityCache},
	config::ClientConfig,
	error::{ConfigError, decode_json},
	http::{ApiHttpClient, Method},
	model::{Membership, NotificationRule, Project},
	obs::{self, Operation},
	resource::{ListPage, ResourceKind, ResourceName, paginate},
	transport::{ApiRequest, CallContext, ThrottledTransport},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestDtClient = Client<ReqwestHttpClient>;

/// Platform API client shared by every resource operation.
pub struct Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	config: Arc<ClientConfig>,
	transport: Arc<ThrottledTransport<C>>,
	projects: EntityCache<Project>,
	notification_rules: EntityCache<NotificationRule>,
	memberships: EntityCache<Membership>,
}
impl<C> Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a client that sends every request through `http_client`.
	pub fn with_http_client(config: ClientConfig, http_client: impl Into<Arc<C>>) -> Self {
		let http_client = http_client.into();
		let signer = AssertionSigner::new(
			config.key_id.clone(),
			&config.key_secret,
			config.email.clone(),
			&config.token_endpoint,
		);
		let tokens =
			TokenProvider::new(http_client.clone(), config.token_endpoint.clone(), signer)
				.with_timeout(config.token_timeout);
		let transport =
			ThrottledTransport::new(http_client, Arc::new(tokens), config.user_agent.clone())
				.with_retry_policy(config.retry);

		Self {
			config: Arc::new(config),
			transport: Arc::new(transport),
			projects: EntityCache::new(),
			notification_rules: EntityCache::new(),
			memberships: EntityCache::new(),
		}
	}

	/// Active configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Transport shared by every clone of this client.
	pub fn transport(&self) -> &ThrottledTransport<C> {
		&self.transport
	}

	/// Token provider backing the transport.
	pub fn tokens(&self) -> &TokenProvider<C> {
		self.transport.tokens()
	}

	/// Project cache.
	pub fn project_cache(&self) -> &EntityCache<Project> {
		&self.projects
	}

	/// Notification rule cache.
	pub fn notification_rule_cache(&self) -> &EntityCache<NotificationRule> {
		&self.notification_rules
	}

	/// Membership cache.
	pub fn membership_cache(&self) -> &EntityCache<Membership> {
		&self.memberships
	}

	/// Sends a raw request and returns the body of the 2xx response.
	///
	/// This is the contract resource-schema layers build on: authentication, throttling,
	/// and status mapping are applied exactly as for the typed operations.
	pub async fn do_request(
		&self,
		ctx: &CallContext,
		method: Method,
		url: Url,
		body: Option<Vec<u8>>,
	) -> Result<Vec<u8>> {
		let mut request = ApiRequest::new(method, url);

		if let Some(body) = body {
			request = request.with_body(body);
		}

		obs::observe("raw", Operation::Request, self.transport.send(ctx, request)).await
	}

	pub(crate) fn api_endpoint(&self, segments: &[&str]) -> Result<Url> {
		endpoint(&self.config.api_url, "api_url", segments)
	}

	pub(crate) fn emulator_endpoint(&self, segments: &[&str]) -> Result<Url> {
		endpoint(&self.config.emulator_url, "emulator_url", segments)
	}

	pub(crate) async fn send_json<T>(&self, ctx: &CallContext, request: ApiRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let body = self.transport.send(ctx, request).await?;

		decode_json(&body)
	}

	pub(crate) async fn send_empty(&self, ctx: &CallContext, request: ApiRequest) -> Result<()> {
		self.transport.send(ctx, request).await.map(|_| ())
	}

	pub(crate) async fn list_all<P>(
		&self,
		ctx: &CallContext,
		url: Url,
		filters: &[(&str, &str)],
	) -> Result<Vec<P::Item>>
	where
		P: ListPage,
	{
		paginate::<P, _, _>(self.config.list, |page| {
			let mut request = ApiRequest::get(url.clone());

			for (name, value) in filters {
				request = request.with_query(*name, *value);
			}
			for (name, value) in page.pairs() {
				request = request.with_query(name, value);
			}

			self.send_json::<P>(ctx, request)
		})
		.await
	}

	/// Resolves `name` from `cache`, repopulating it through `populate` on a miss.
	pub(crate) async fn read_through<V, F, Fut>(
		&self,
		cache: &EntityCache<V>,
		kind: ResourceKind,
		name: &str,
		populate: F,
	) -> Result<V>
	where
		V: Cached + Clone,
		F: FnOnce(ResourceName) -> Fut,
		Fut: Future<Output = Result<Vec<V>>>,
	{
		let parsed = ResourceName::parse(kind, name)?;

		if let Some(hit) = cache.get(name) {
			obs::debug!(resource = kind.as_str(), name, "cache hit");

			return Ok(hit);
		}

		obs::debug!(resource = kind.as_str(), name, "cache miss, listing collection");

		let entities = populate(parsed).await?;

		cache.extend(entities);
		cache.get(name).ok_or_else(|| Error::NotFound { kind, name: name.to_owned() })
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestHttpClient> {
	/// Creates a client backed by a default reqwest transport.
	pub fn new(config: ClientConfig) -> Self {
		Self::with_http_client(config, ReqwestHttpClient::default())
	}

	/// Creates a client backed by a caller-configured reqwest client.
	pub fn with_reqwest_client(config: ClientConfig, client: ReqwestClient) -> Self {
		Self::with_http_client(config, ReqwestHttpClient::with_client(client))
	}
}
impl<C> Clone for Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			config: self.config.clone(),
			transport: self.transport.clone(),
			projects: self.projects.clone(),
			notification_rules: self.notification_rules.clone(),
			memberships: self.memberships.clone(),
		}
	}
}
impl<C> Debug for Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("api_url", &self.config.api_url.as_str())
			.field("emulator_url", &self.config.emulator_url.as_str())
			.field("cached_projects", &self.projects.len())
			.field("cached_notification_rules", &self.notification_rules.len())
			.field("cached_memberships", &self.memberships.len())
			.finish()
	}
}

fn endpoint(base: &Url, field: &'static str, segments: &[&str]) -> Result<Url> {
	let mut url = base.clone();

	url.path_segments_mut()
		.map_err(|_| ConfigError::UnsupportedScheme { field, url: base.to_string() })?
		.pop_if_empty()
		.extend(segments);

	Ok(url)
}

/// Drops `name` from `cache` after a successful mutation.
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
pub(crate) fn evict(cache: &dyn CacheInvalidation, kind: ResourceKind, name: &str) {
	if cache.invalidate(name) {
		obs::debug!(resource = kind.as_str(), name, "cache entry invalidated");
	}
}

/// Validates a bare project id by building its resource name.
pub(crate) fn project_name(project_id: &str) -> Result<ResourceName> {
	Ok(ResourceName::project(project_id)?)
}
