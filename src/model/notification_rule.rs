//! Notification rules with their escalation actions and schedules.

// self
use crate::{
	_prelude::*,
	cache::Cached,
	resource::{ListPage, Resource, ResourceKind},
};

/// Alerting rule evaluated against device events.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationRule {
	/// `projects/{project}/rules/{rule}`
	#[serde(skip_serializing_if = "String::is_empty")]
	pub name: String,
	/// Whether the rule is evaluated.
	pub enabled: bool,
	/// Human-readable name.
	pub display_name: String,
	/// Device names the rule applies to.
	pub devices: Vec<String>,
	/// Label selector the rule applies to.
	pub device_labels: BTreeMap<String, String>,
	/// Condition that fires the rule.
	pub trigger: Trigger,
	/// Ordered escalation levels.
	pub escalation_levels: Vec<EscalationLevel>,
	/// Active hours; `None` means always.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub schedule: Option<Schedule>,
	/// How long the condition must hold before firing, e.g. `"300s"`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub trigger_delay: Option<String>,
	/// Send reminders while the alert stays open.
	#[serde(rename = "reminderNotifications")]
	pub reminder_notification: bool,
	/// Notify when the condition clears.
	#[serde(rename = "resolvedNotifications")]
	pub resolved_notification: bool,
	/// Delay before an acknowledged alert reopens.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub unacknowledges_after: Option<String>,
	/// Legacy flat action list; superseded by escalation levels.
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub actions: Vec<NotificationAction>,
}
impl Resource for NotificationRule {
	const KIND: ResourceKind = ResourceKind::NotificationRule;

	fn name(&self) -> &str {
		&self.name
	}
}
impl Cached for NotificationRule {
	fn cache_key(&self) -> &str {
		&self.name
	}
}

/// One escalation step.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EscalationLevel {
	/// Human-readable name.
	pub display_name: String,
	/// Actions executed at this level.
	pub actions: Vec<NotificationAction>,
	/// Delay before escalating to the next level.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub escalate_after: Option<String>,
}

/// Action executed when a rule fires, tagged by `type`.
///
/// Some channels are only enabled for selected organizations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationAction {
	/// Text message.
	Sms {
		/// Channel settings.
		sms: SmsConfig,
	},
	/// Email.
	Email {
		/// Channel settings.
		email: EmailConfig,
	},
	/// Corrigo work order.
	Corrigo {
		/// Channel settings.
		corrigo: CorrigoConfig,
	},
	/// ServiceChannel work order.
	ServiceChannel {
		/// Channel settings.
		#[serde(rename = "serviceChannel")]
		service_channel: ServiceChannelConfig,
	},
	/// Signed HTTP callback.
	Webhook {
		/// Channel settings.
		webhook: WebhookConfig,
	},
	/// Voice call.
	PhoneCall {
		/// Channel settings.
		#[serde(rename = "phoneCall")]
		phone_call: PhoneCallConfig,
	},
	/// Signal tower attached to a cloud connector.
	SignalTower {
		/// Channel settings.
		#[serde(rename = "signalTower")]
		signal_tower: SignalTowerConfig,
	},
}
impl NotificationAction {
	/// Wire value of the `type` tag.
	pub const fn kind(&self) -> &'static str {
		match self {
			NotificationAction::Sms { .. } => "SMS",
			NotificationAction::Email { .. } => "EMAIL",
			NotificationAction::Corrigo { .. } => "CORRIGO",
			NotificationAction::ServiceChannel { .. } => "SERVICE_CHANNEL",
			NotificationAction::Webhook { .. } => "WEBHOOK",
			NotificationAction::PhoneCall { .. } => "PHONE_CALL",
			NotificationAction::SignalTower { .. } => "SIGNAL_TOWER",
		}
	}
}

/// SMS channel settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SmsConfig {
	/// Phone numbers.
	pub recipients: Vec<String>,
	/// Message template.
	pub body: String,
}

/// Email channel settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmailConfig {
	/// Email addresses.
	pub recipients: Vec<String>,
	/// Subject template.
	pub subject: String,
	/// Body template.
	pub body: String,
}

/// Corrigo channel settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CorrigoConfig {
	/// Asset id.
	pub asset_id: String,
	/// Task id.
	pub task_id: String,
	/// Customer id.
	pub customer_id: String,
	/// OAuth client id.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: String,
	/// Company name.
	pub company_name: String,
	/// Work order sub-type id.
	pub sub_type_id: String,
	/// Contact name.
	pub contact_name: String,
	/// Contact address.
	pub contact_address: String,
	/// Work order description template.
	pub work_order_description: String,
	/// Dashboard link embedded in the work order.
	#[serde(rename = "studioDashboardUrl")]
	pub studio_dashboard_url: String,
}

/// ServiceChannel channel settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceChannelConfig {
	/// Store id.
	pub store_id: String,
	/// Asset tag id.
	pub asset_tag_id: String,
	/// Trade.
	pub trade: String,
	/// Description template.
	pub description: String,
}

/// Webhook channel settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebhookConfig {
	/// Callback URL.
	pub url: String,
	/// HMAC secret used to sign deliveries.
	pub signature_secret: String,
	/// Extra headers sent with each delivery.
	pub headers: BTreeMap<String, String>,
}

/// Phone call channel settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhoneCallConfig {
	/// Phone numbers.
	pub recipients: Vec<String>,
	/// Spoken introduction.
	pub introduction: String,
	/// Spoken message template.
	pub message: String,
}

/// Signal tower channel settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignalTowerConfig {
	/// `projects/{project}/devices/{cloud connector}`
	pub cloud_connector_name: String,
}

/// Condition evaluated per event.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Trigger {
	/// Event field the trigger watches, e.g. `temperature`.
	pub field: String,
	/// Numeric range condition.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub range: Option<Range>,
	/// Presence state, e.g. `PRESENT`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub presence: Option<String>,
	/// Motion state.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub motion: Option<String>,
	/// Occupancy state.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub occupancy: Option<String>,
	/// Connection state.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub connection: Option<String>,
	/// Contact state.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub contact: Option<String>,
	/// Events needed before firing.
	pub trigger_count: i32,
}

/// Numeric bounds; an absent bound is open.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Range {
	/// Lower bound.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub lower: Option<f64>,
	/// Upper bound.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub upper: Option<f64>,
	/// `INSIDE` or `OUTSIDE`.
	#[serde(rename = "type")]
	pub kind: String,
}

/// Weekly schedule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Schedule {
	/// IANA time zone.
	pub timezone: String,
	/// Active slots.
	pub slots: Vec<Slot>,
	/// Invert the slots.
	pub inverse: bool,
}

/// Days plus time ranges.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Slot {
	/// Day names, e.g. `MONDAY`.
	#[serde(rename = "days")]
	pub days_of_week: Vec<String>,
	/// Time ranges within each day.
	#[serde(rename = "times")]
	pub time_ranges: Vec<TimeRange>,
}

/// Half-open range of wall-clock times.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeRange {
	/// Start time.
	pub start: TimeOfDay,
	/// End time.
	pub end: TimeOfDay,
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeOfDay {
	/// Hour, 0-23.
	pub hour: i32,
	/// Minute, 0-59.
	pub minute: i32,
}

/// One page of `GET /v2alpha/projects/{project}/rules`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListNotificationRulesResponse {
	/// Rules on this page.
	pub rules: Vec<NotificationRule>,
	/// Continuation token; empty on the last page.
	pub next_page_token: Option<String>,
}
impl ListPage for ListNotificationRulesResponse {
	type Item = NotificationRule;

	fn into_parts(self) -> (Vec<NotificationRule>, Option<String>) {
		(self.rules, self.next_page_token)
	}
}
