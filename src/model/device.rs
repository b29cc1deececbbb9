//! Physical devices as reported by the platform.

// self
use crate::{
	_prelude::*,
	resource::{Resource, ResourceKind},
};

/// Physical sensor or cloud connector.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Device {
	/// `projects/{project}/devices/{device}`
	pub name: String,
	/// Device type, e.g. `temperature`.
	#[serde(rename = "type")]
	pub kind: String,
	/// User-assigned labels.
	pub labels: BTreeMap<String, String>,
	/// Hardware product number.
	pub product_number: String,
}
impl Resource for Device {
	const KIND: ResourceKind = ResourceKind::Device;

	fn name(&self) -> &str {
		&self.name
	}
}
