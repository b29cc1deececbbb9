//! Resource identity and collection helpers shared by every entity kind.

pub mod list;
pub mod name;

pub use list::*;
pub use name::*;

// self
use crate::_prelude::*;

/// Entity kinds exposed by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
	/// `projects/{project}`
	Project,
	/// `projects/{project}/rules/{rule}`
	NotificationRule,
	/// `projects/{project}/members/{member}`
	Membership,
	/// `projects/{project}/dataconnectors/{connector}`
	DataConnector,
	/// `projects/{project}/devices/{device}`
	Device,
	/// `projects/{project}/devices/{device}` served by the emulator API.
	Emulator,
}
impl ResourceKind {
	/// Human-readable label used in error messages.
	pub const fn label(self) -> &'static str {
		match self {
			ResourceKind::Project => "Project",
			ResourceKind::NotificationRule => "Notification rule",
			ResourceKind::Membership => "Membership",
			ResourceKind::DataConnector => "Data connector",
			ResourceKind::Device => "Device",
			ResourceKind::Emulator => "Emulated device",
		}
	}

	/// Stable snake_case label for span and metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ResourceKind::Project => "project",
			ResourceKind::NotificationRule => "notification_rule",
			ResourceKind::Membership => "membership",
			ResourceKind::DataConnector => "data_connector",
			ResourceKind::Device => "device",
			ResourceKind::Emulator => "emulator",
		}
	}

	/// Sub-collection keyword following the project segment, if any.
	pub const fn collection(self) -> Option<&'static str> {
		match self {
			ResourceKind::Project => None,
			ResourceKind::NotificationRule => Some("rules"),
			ResourceKind::Membership => Some("members"),
			ResourceKind::DataConnector => Some("dataconnectors"),
			ResourceKind::Device | ResourceKind::Emulator => Some("devices"),
		}
	}

	/// Expected name shape, for diagnostics.
	pub const fn pattern(self) -> &'static str {
		match self {
			ResourceKind::Project => "projects/{project}",
			ResourceKind::NotificationRule => "projects/{project}/rules/{rule}",
			ResourceKind::Membership => "projects/{project}/members/{member}",
			ResourceKind::DataConnector => "projects/{project}/dataconnectors/{connector}",
			ResourceKind::Device | ResourceKind::Emulator => "projects/{project}/devices/{device}",
		}
	}
}
impl Display for ResourceKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.label())
	}
}

/// Entities addressed by a resource name.
pub trait Resource {
	/// Kind used to parse [`Resource::name`].
	const KIND: ResourceKind;

	/// Fully-qualified resource name; empty before the platform assigns one.
	fn name(&self) -> &str;

	/// Parses [`Resource::name`] for this entity's kind.
	fn resource_name(&self) -> Result<ResourceName, ResourceNameError> {
		ResourceName::parse(Self::KIND, self.name())
	}
}
