// self
use crate::{
	_prelude::*,
	client::{Client, evict},
	http::ApiHttpClient,
	model::{CreateProjectRequest, ListProjectsResponse, Project},
	obs::{self, Operation},
	resource::{Resource, ResourceKind, ResourceName},
	transport::{ApiRequest, CallContext},
};

const RESOURCE: &str = ResourceKind::Project.as_str();

impl<C> Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Returns the project named `projects/{project}`, listing all projects on a cache miss.
	pub async fn get_project(&self, ctx: &CallContext, name: &str) -> Result<Project> {
		obs::observe(RESOURCE, Operation::Get, async {
			self.read_through(&self.projects, ResourceKind::Project, name, |_| {
				self.fetch_projects(ctx)
			})
			.await
		})
		.await
	}

	/// Lists every project visible to the service account and refreshes the cache with them.
	pub async fn list_projects(&self, ctx: &CallContext) -> Result<Vec<Project>> {
		obs::observe(RESOURCE, Operation::List, async {
			let projects = self.fetch_projects(ctx).await?;

			self.projects.extend(projects.iter().cloned());

			Ok(projects)
		})
		.await
	}

	/// Creates a project from its display name, organization, and location.
	pub async fn create_project(&self, ctx: &CallContext, project: &Project) -> Result<Project> {
		obs::observe(RESOURCE, Operation::Create, async {
			let url = self.api_endpoint(&["v2", "projects"])?;
			let request = ApiRequest::post(url).with_json(&CreateProjectRequest::from(project))?;
			let created = self.send_json::<Project>(ctx, request).await?;

			self.projects.insert(created.clone());

			Ok(created)
		})
		.await
	}

	/// Patches the project named by `project.name`.
	pub async fn update_project(&self, ctx: &CallContext, project: &Project) -> Result<Project> {
		obs::observe(RESOURCE, Operation::Update, async {
			let name = project.resource_name()?;
			let url = self.api_endpoint(&["v2", "projects", name.project_id()])?;
			let request = ApiRequest::patch(url).with_json(project)?;
			let updated = self.send_json::<Project>(ctx, request).await?;

			self.projects.insert(updated.clone());

			Ok(updated)
		})
		.await
	}

	/// Deletes the project named `projects/{project}`.
	pub async fn delete_project(&self, ctx: &CallContext, name: &str) -> Result<()> {
		obs::observe(RESOURCE, Operation::Delete, async {
			let parsed = ResourceName::parse(ResourceKind::Project, name)?;
			let url = self.api_endpoint(&["v2", "projects", parsed.project_id()])?;

			self.send_empty(ctx, ApiRequest::delete(url)).await?;
			evict(&self.projects, ResourceKind::Project, name);

			Ok(())
		})
		.await
	}

	async fn fetch_projects(&self, ctx: &CallContext) -> Result<Vec<Project>> {
		let url = self.api_endpoint(&["v2", "projects"])?;

		self.list_all::<ListProjectsResponse>(ctx, url, &[]).await
	}
}
