// self
use crate::{
	_prelude::*,
	client::{Client, evict, project_name},
	http::ApiHttpClient,
	model::{
		BatchCreateMembershipsRequest, BatchCreateMembershipsResponse,
		BatchDeleteMembershipsRequest, ListMembershipsResponse, Membership,
	},
	obs::{self, Operation},
	resource::{Resource, ResourceKind, ResourceName},
	transport::{ApiRequest, CallContext},
};

const RESOURCE: &str = ResourceKind::Membership.as_str();
// Project wildcard accepted by the members collection.
const ANY_PROJECT: &str = "-";

impl<C> Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Returns the membership named `projects/{project}/members/{member}`, listing the
	/// project's members on a cache miss.
	pub async fn get_membership(&self, ctx: &CallContext, name: &str) -> Result<Membership> {
		obs::observe(RESOURCE, Operation::Get, async {
			self.read_through(
				&self.memberships,
				ResourceKind::Membership,
				name,
				|parsed| async move {
					self.fetch_project_memberships(ctx, parsed.project_id()).await
				},
			)
			.await
		})
		.await
	}

	/// Lists the members of one project and refreshes the cache with them.
	pub async fn list_project_memberships(
		&self,
		ctx: &CallContext,
		project_id: &str,
	) -> Result<Vec<Membership>> {
		obs::observe(RESOURCE, Operation::List, async {
			project_name(project_id)?;

			let memberships = self.fetch_project_memberships(ctx, project_id).await?;

			self.memberships.extend(memberships.iter().cloned());

			Ok(memberships)
		})
		.await
	}

	/// Lists `member_id`'s memberships across every project of `organization` and keeps
	/// those granting `role`.
	///
	/// Fails with [`Error::UnexpectedRoles`] if any membership carries a role count other than
	/// one.
	pub async fn list_memberships_by_member(
		&self,
		ctx: &CallContext,
		organization: &str,
		role: &str,
		member_id: &str,
	) -> Result<Vec<Membership>> {
		obs::observe(RESOURCE, Operation::List, async {
			let url = self.api_endpoint(&["v2", "projects", ANY_PROJECT, "members"])?;
			let memberships = self
				.list_all::<ListMembershipsResponse>(ctx, url, &[
					("memberId", member_id),
					("organization", organization),
				])
				.await?;

			obs::debug!(count = memberships.len(), member_id, organization, "memberships listed");

			let mut matching = Vec::with_capacity(memberships.len());

			for membership in memberships {
				let count = membership.roles.len();

				if count != 1 {
					return Err(Error::UnexpectedRoles { name: membership.name, count });
				}
				if membership.role() == Some(role) {
					matching.push(membership);
				}
			}

			Ok(matching)
		})
		.await
	}

	/// Creates several memberships in one call so each member receives a single invitation.
	pub async fn batch_create_memberships(
		&self,
		ctx: &CallContext,
		request: &BatchCreateMembershipsRequest,
	) -> Result<Vec<Membership>> {
		obs::observe(RESOURCE, Operation::Create, async {
			for member in &request.members {
				ResourceName::parse(ResourceKind::Project, &member.project)?;
			}

			let url = self.api_endpoint(&["v2", "projects", ANY_PROJECT, "members:batchCreate"])?;
			let response = self
				.send_json::<BatchCreateMembershipsResponse>(
					ctx,
					ApiRequest::post(url).with_json(request)?,
				)
				.await?;

			self.memberships.extend(response.members.iter().cloned());

			Ok(response.members)
		})
		.await
	}

	/// Sets `role` as the only role of each membership, one PATCH per membership.
	pub async fn update_memberships(
		&self,
		ctx: &CallContext,
		memberships: &[Membership],
		role: &str,
	) -> Result<Vec<Membership>> {
		obs::observe(RESOURCE, Operation::Update, async {
			let names =
				memberships.iter().map(Resource::resource_name).collect::<Result<Vec<_>, _>>()?;
			let mut updated = Vec::with_capacity(memberships.len());

			for (membership, name) in memberships.iter().zip(&names) {
				let mut patch = membership.clone();

				patch.roles = vec![role.to_owned()];

				let url = self.api_endpoint(&[
					"v2",
					"projects",
					name.project_id(),
					"members",
					name.id(),
				])?;
				let member = self
					.send_json::<Membership>(ctx, ApiRequest::patch(url).with_json(&patch)?)
					.await?;

				self.memberships.insert(member.clone());
				updated.push(member);
			}

			Ok(updated)
		})
		.await
	}

	/// Deletes several memberships in one call.
	pub async fn batch_delete_memberships(
		&self,
		ctx: &CallContext,
		request: &BatchDeleteMembershipsRequest,
	) -> Result<()> {
		obs::observe(RESOURCE, Operation::Delete, async {
			for name in &request.names {
				ResourceName::parse(ResourceKind::Membership, name)?;
			}

			let url = self.api_endpoint(&["v2", "projects", ANY_PROJECT, "members:batchDelete"])?;

			self.send_empty(ctx, ApiRequest::post(url).with_json(request)?).await?;

			for name in &request.names {
				evict(&self.memberships, ResourceKind::Membership, name);
			}

			Ok(())
		})
		.await
	}

	async fn fetch_project_memberships(
		&self,
		ctx: &CallContext,
		project_id: &str,
	) -> Result<Vec<Membership>> {
		let url = self.api_endpoint(&["v2", "projects", project_id, "members"])?;

		self.list_all::<ListMembershipsResponse>(ctx, url, &[]).await
	}
}
