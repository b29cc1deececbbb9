// self
use crate::{
	_prelude::*,
	client::Client,
	http::ApiHttpClient,
	model::Device,
	obs::{self, Operation},
	resource::{ResourceKind, ResourceName},
	transport::{ApiRequest, CallContext},
};

impl<C> Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Fetches the device named `projects/{project}/devices/{device}`.
	pub async fn get_device(&self, ctx: &CallContext, name: &str) -> Result<Device> {
		obs::observe(ResourceKind::Device.as_str(), Operation::Get, async {
			let parsed = ResourceName::parse(ResourceKind::Device, name)?;
			let url =
				self.api_endpoint(&["v2", "projects", parsed.project_id(), "devices", parsed.id()])?;

			self.send_json(ctx, ApiRequest::get(url)).await
		})
		.await
	}
}
