//! Emulated devices served by the emulator API.

// self
use crate::{
	_prelude::*,
	resource::{Resource, ResourceKind},
};

/// Emulated device managed through the emulator API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Emulator {
	/// `projects/{project}/devices/{device}`; empty on creation.
	#[serde(skip_serializing_if = "String::is_empty")]
	pub name: String,
	/// Emulated device type.
	#[serde(rename = "type")]
	pub kind: String,
	/// User-assigned labels.
	pub labels: BTreeMap<String, String>,
}
impl Resource for Emulator {
	const KIND: ResourceKind = ResourceKind::Emulator;

	fn name(&self) -> &str {
		&self.name
	}
}
