// self
use crate::{
	_prelude::*,
	client::{Client, project_name},
	http::ApiHttpClient,
	model::Emulator,
	obs::{self, Operation},
	resource::{Resource, ResourceKind, ResourceName},
	transport::{ApiRequest, CallContext},
};

const RESOURCE: &str = ResourceKind::Emulator.as_str();

impl<C> Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Fetches the emulated device named `projects/{project}/devices/{device}`.
	pub async fn get_emulator(&self, ctx: &CallContext, name: &str) -> Result<Emulator> {
		obs::observe(RESOURCE, Operation::Get, async {
			let parsed = ResourceName::parse(ResourceKind::Emulator, name)?;

			self.send_json(ctx, ApiRequest::get(self.emulated_device_endpoint(&parsed)?)).await
		})
		.await
	}

	/// Creates an emulated device in `project_id`.
	pub async fn create_emulator(
		&self,
		ctx: &CallContext,
		project_id: &str,
		emulator: &Emulator,
	) -> Result<Emulator> {
		obs::observe(RESOURCE, Operation::Create, async {
			project_name(project_id)?;

			let url = self.emulator_endpoint(&["v2", "projects", project_id, "devices"])?;

			self.send_json(ctx, ApiRequest::post(url).with_json(emulator)?).await
		})
		.await
	}

	/// Replaces the emulated device named by `emulator.name`.
	pub async fn update_emulator(&self, ctx: &CallContext, emulator: &Emulator) -> Result<Emulator> {
		obs::observe(RESOURCE, Operation::Update, async {
			let name = emulator.resource_name()?;
			let url = self.emulated_device_endpoint(&name)?;
			let request = ApiRequest::put(url).with_json(emulator)?;

			self.send_json(ctx, request).await
		})
		.await
	}

	/// Deletes the emulated device named `projects/{project}/devices/{device}`.
	pub async fn delete_emulator(&self, ctx: &CallContext, name: &str) -> Result<()> {
		obs::observe(RESOURCE, Operation::Delete, async {
			let parsed = ResourceName::parse(ResourceKind::Emulator, name)?;

			self.send_empty(ctx, ApiRequest::delete(self.emulated_device_endpoint(&parsed)?)).await
		})
		.await
	}

	fn emulated_device_endpoint(&self, name: &ResourceName) -> Result<Url> {
		self.emulator_endpoint(&["v2", "projects", name.project_id(), "devices", name.id()])
	}
}
