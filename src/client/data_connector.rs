// self
use crate::{
	_prelude::*,
	client::{Client, project_name},
	http::ApiHttpClient,
	model::{CreateDataConnectorRequest, DataConnector},
	obs::{self, Operation},
	resource::{Resource, ResourceKind, ResourceName},
	transport::{ApiRequest, CallContext},
};

const RESOURCE: &str = ResourceKind::DataConnector.as_str();

impl<C> Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Fetches the connector named `projects/{project}/dataconnectors/{connector}`.
	pub async fn get_data_connector(&self, ctx: &CallContext, name: &str) -> Result<DataConnector> {
		obs::observe(RESOURCE, Operation::Get, async {
			let parsed = ResourceName::parse(ResourceKind::DataConnector, name)?;

			self.send_json(ctx, ApiRequest::get(self.data_connector_endpoint(&parsed)?)).await
		})
		.await
	}

	/// Creates a connector in `project_id`; the platform assigns its name.
	pub async fn create_data_connector(
		&self,
		ctx: &CallContext,
		project_id: &str,
		connector: &DataConnector,
	) -> Result<DataConnector> {
		obs::observe(RESOURCE, Operation::Create, async {
			project_name(project_id)?;

			let url = self.api_endpoint(&["v2", "projects", project_id, "dataconnectors"])?;
			let request =
				ApiRequest::post(url).with_json(&CreateDataConnectorRequest::from(connector))?;

			self.send_json(ctx, request).await
		})
		.await
	}

	/// Patches the connector named by `connector.name`.
	pub async fn update_data_connector(
		&self,
		ctx: &CallContext,
		connector: &DataConnector,
	) -> Result<DataConnector> {
		obs::observe(RESOURCE, Operation::Update, async {
			let name = connector.resource_name()?;
			let request =
				ApiRequest::patch(self.data_connector_endpoint(&name)?).with_json(connector)?;

			self.send_json(ctx, request).await
		})
		.await
	}

	/// Deletes the connector named `projects/{project}/dataconnectors/{connector}`.
	pub async fn delete_data_connector(&self, ctx: &CallContext, name: &str) -> Result<()> {
		obs::observe(RESOURCE, Operation::Delete, async {
			let parsed = ResourceName::parse(ResourceKind::DataConnector, name)?;

			self.send_empty(ctx, ApiRequest::delete(self.data_connector_endpoint(&parsed)?)).await
		})
		.await
	}

	fn data_connector_endpoint(&self, name: &ResourceName) -> Result<Url> {
		self.api_endpoint(&["v2", "projects", name.project_id(), "dataconnectors", name.id()])
	}
}
