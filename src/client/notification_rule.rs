// self
use crate::{
	_prelude::*,
	client::{Client, evict, project_name},
	http::ApiHttpClient,
	model::{ListNotificationRulesResponse, NotificationRule},
	obs::{self, Operation},
	resource::{Resource, ResourceKind, ResourceName},
	transport::{ApiRequest, CallContext},
};

const RESOURCE: &str = ResourceKind::NotificationRule.as_str();
const API_VERSION: &str = "v2alpha";

impl<C> Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Returns the rule named `projects/{project}/rules/{rule}`, listing the project's rules on
	/// a cache miss.
	pub async fn get_notification_rule(
		&self,
		ctx: &CallContext,
		name: &str,
	) -> Result<NotificationRule> {
		obs::observe(RESOURCE, Operation::Get, async {
			self.read_through(
				&self.notification_rules,
				ResourceKind::NotificationRule,
				name,
				|parsed| async move {
					self.fetch_notification_rules(ctx, parsed.project_id()).await
				},
			)
			.await
		})
		.await
	}

	/// Lists the rules of one project and refreshes the cache with them.
	pub async fn list_notification_rules(
		&self,
		ctx: &CallContext,
		project_id: &str,
	) -> Result<Vec<NotificationRule>> {
		obs::observe(RESOURCE, Operation::List, async {
			project_name(project_id)?;

			let rules = self.fetch_notification_rules(ctx, project_id).await?;

			self.notification_rules.extend(rules.iter().cloned());

			Ok(rules)
		})
		.await
	}

	/// Creates a rule in `project_id`.
	pub async fn create_notification_rule(
		&self,
		ctx: &CallContext,
		project_id: &str,
		rule: &NotificationRule,
	) -> Result<NotificationRule> {
		obs::observe(RESOURCE, Operation::Create, async {
			project_name(project_id)?;

			let url = self.api_endpoint(&[API_VERSION, "projects", project_id, "rules"])?;
			let request = ApiRequest::post(url).with_json(rule)?;
			let created = self.send_json::<NotificationRule>(ctx, request).await?;

			self.notification_rules.insert(created.clone());

			Ok(created)
		})
		.await
	}

	/// Replaces the rule named by `rule.name`.
	pub async fn update_notification_rule(
		&self,
		ctx: &CallContext,
		rule: &NotificationRule,
	) -> Result<NotificationRule> {
		obs::observe(RESOURCE, Operation::Update, async {
			let name = rule.resource_name()?;
			let url = self.rule_endpoint(&name)?;
			let request = ApiRequest::put(url).with_json(rule)?;
			let updated = self.send_json::<NotificationRule>(ctx, request).await?;

			self.notification_rules.insert(updated.clone());

			Ok(updated)
		})
		.await
	}

	/// Deletes the rule named `projects/{project}/rules/{rule}`.
	pub async fn delete_notification_rule(&self, ctx: &CallContext, name: &str) -> Result<()> {
		obs::observe(RESOURCE, Operation::Delete, async {
			let parsed = ResourceName::parse(ResourceKind::NotificationRule, name)?;

			self.send_empty(ctx, ApiRequest::delete(self.rule_endpoint(&parsed)?)).await?;
			evict(&self.notification_rules, ResourceKind::NotificationRule, name);

			Ok(())
		})
		.await
	}

	fn rule_endpoint(&self, name: &ResourceName) -> Result<Url> {
		self.api_endpoint(&[API_VERSION, "projects", name.project_id(), "rules", name.id()])
	}

	async fn fetch_notification_rules(
		&self,
		ctx: &CallContext,
		project_id: &str,
	) -> Result<Vec<NotificationRule>> {
		let url = self.api_endpoint(&[API_VERSION, "projects", project_id, "rules"])?;

		self.list_all::<ListNotificationRulesResponse>(ctx, url, &[]).await
	}
}
