//! Projects and their locations.

// self
use crate::{
	_prelude::*,
	cache::Cached,
	resource::{ListPage, Resource, ResourceKind},
};

/// A project inside an organization.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
	/// `projects/{project}`
	pub name: String,
	/// Human-readable name.
	pub display_name: String,
	/// `true` for the organization's inventory project.
	pub inventory: bool,
	/// `organizations/{organization}`
	pub organization: String,
	/// Display name of the owning organization.
	pub organization_display_name: String,
	/// Number of sensors in the project.
	pub sensor_count: i64,
	/// Number of cloud connectors in the project.
	pub cloud_connector_count: i64,
	/// Physical location.
	pub location: Location,
}
impl Resource for Project {
	const KIND: ResourceKind = ResourceKind::Project;

	fn name(&self) -> &str {
		&self.name
	}
}
impl Cached for Project {
	fn cache_key(&self) -> &str {
		&self.name
	}
}

/// Geographic location and time zone of a project.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Location {
	/// Latitude in degrees.
	pub latitude: f64,
	/// Longitude in degrees.
	pub longitude: f64,
	/// IANA time zone name.
	pub time_location: String,
}

/// Body of a project creation call; the platform assigns the name.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
	/// Human-readable name.
	pub display_name: String,
	/// `organizations/{organization}`
	pub organization: String,
	/// Physical location.
	pub location: Location,
}
impl From<&Project> for CreateProjectRequest {
	fn from(project: &Project) -> Self {
		Self {
			display_name: project.display_name.clone(),
			organization: project.organization.clone(),
			location: project.location.clone(),
		}
	}
}

/// One page of `GET /v2/projects`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListProjectsResponse {
	/// Projects on this page.
	pub projects: Vec<Project>,
	/// Continuation token; empty on the last page.
	pub next_page_token: Option<String>,
}
impl ListPage for ListProjectsResponse {
	type Item = Project;

	fn into_parts(self) -> (Vec<Project>, Option<String>) {
		(self.projects, self.next_page_token)
	}
}
