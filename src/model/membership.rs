//! Project memberships and their batch request envelopes.

// self
use crate::{
	_prelude::*,
	cache::Cached,
	resource::{ListPage, Resource, ResourceKind},
};

/// A member's access to one project.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Membership {
	/// `projects/{project}/members/{member}`
	pub name: String,
	/// Human-readable member name.
	pub display_name: String,
	/// Role names, e.g. `roles/project.user`; the platform allows exactly one.
	pub roles: Vec<String>,
	/// Member email.
	pub email: String,
	/// `USER` or `SERVICE_ACCOUNT`.
	pub account_type: String,
}
impl Membership {
	/// Returns the single role when exactly one is attached.
	pub fn role(&self) -> Option<&str> {
		match self.roles.as_slice() {
			[role] => Some(role.as_str()),
			_ => None,
		}
	}
}
impl Resource for Membership {
	const KIND: ResourceKind = ResourceKind::Membership;

	fn name(&self) -> &str {
		&self.name
	}
}
impl Cached for Membership {
	fn cache_key(&self) -> &str {
		&self.name
	}
}

/// A membership to create in a batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMembership {
	/// `projects/{project}`
	pub project: String,
	/// Member email.
	pub email: String,
	/// Roles to grant.
	pub roles: Vec<String>,
}

/// Body of `members:batchCreate`; one call sends one invitation email per member.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchCreateMembershipsRequest {
	/// Memberships to create.
	pub members: Vec<NewMembership>,
}

/// Response of `members:batchCreate`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct BatchCreateMembershipsResponse {
	/// Created memberships.
	pub members: Vec<Membership>,
}

/// Body of `members:batchDelete`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchDeleteMembershipsRequest {
	/// Membership names to delete.
	pub names: Vec<String>,
}

/// One page of a members listing.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListMembershipsResponse {
	/// Memberships on this page.
	pub members: Vec<Membership>,
	/// Continuation token; empty on the last page.
	pub next_page_token: Option<String>,
}
impl ListPage for ListMembershipsResponse {
	type Item = Membership;

	fn into_parts(self) -> (Vec<Membership>, Option<String>) {
		(self.members, self.next_page_token)
	}
}
