//! Structural parsing of `collection/id[/subcollection/subid]` resource names.

// self
use crate::{_prelude::*, resource::ResourceKind};

const PROJECTS: &str = "projects";

/// Error raised when a resource name does not match the shape of its kind.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Resource name `{name}` is not a valid {kind} name, expected `{pattern}`.")]
pub struct ResourceNameError {
	/// Kind the name was parsed as.
	pub kind: ResourceKind,
	/// Offending input.
	pub name: String,
	/// Expected shape.
	pub pattern: &'static str,
}

/// Validated resource name.
///
/// Parsing splits on `/`, checks the arity and the collection keywords for the kind, and
/// rejects empty segments. Nothing else about the ids is validated.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceName {
	kind: ResourceKind,
	raw: String,
	project_id: String,
	child_id: Option<String>,
}
impl ResourceName {
	/// Parses `raw` as a name of `kind`.
	pub fn parse(kind: ResourceKind, raw: &str) -> Result<Self, ResourceNameError> {
		let invalid =
			|| ResourceNameError { kind, name: raw.to_owned(), pattern: kind.pattern() };
		let segments = raw.split('/').collect::<Vec<_>>();

		if segments.iter().any(|segment| segment.is_empty()) {
			return Err(invalid());
		}

		match (kind.collection(), segments.as_slice()) {
			(None, [PROJECTS, project]) => Ok(Self {
				kind,
				raw: raw.to_owned(),
				project_id: (*project).to_owned(),
				child_id: None,
			}),
			(Some(collection), [PROJECTS, project, keyword, child]) if *keyword == collection =>
				Ok(Self {
					kind,
					raw: raw.to_owned(),
					project_id: (*project).to_owned(),
					child_id: Some((*child).to_owned()),
				}),
			_ => Err(invalid()),
		}
	}

	/// Builds the name of a project.
	pub fn project(project_id: &str) -> Result<Self, ResourceNameError> {
		Self::parse(ResourceKind::Project, &format!("{PROJECTS}/{project_id}"))
	}

	/// Kind this name was parsed as.
	pub fn kind(&self) -> ResourceKind {
		self.kind
	}

	/// Id of the owning project.
	pub fn project_id(&self) -> &str {
		&self.project_id
	}

	/// Id of the entity itself; for projects this equals [`Self::project_id`].
	pub fn id(&self) -> &str {
		self.child_id.as_deref().unwrap_or(&self.project_id)
	}

	/// Full name as supplied.
	pub fn as_str(&self) -> &str {
		&self.raw
	}
}
impl Display for ResourceName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.raw)
	}
}
impl AsRef<str> for ResourceName {
	fn as_ref(&self) -> &str {
		&self.raw
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn project_names_have_two_segments() {
		let name = ResourceName::parse(ResourceKind::Project, "projects/abc")
			.expect("Project name should parse.");

		assert_eq!(name.project_id(), "abc");
		assert_eq!(name.id(), "abc");
		assert_eq!(name.to_string(), "projects/abc");
	}

	#[test]
	fn child_names_expose_project_and_child_ids() {
		let cases = [
			(ResourceKind::NotificationRule, "projects/p1/rules/r1"),
			(ResourceKind::Membership, "projects/p1/members/r1"),
			(ResourceKind::DataConnector, "projects/p1/dataconnectors/r1"),
			(ResourceKind::Device, "projects/p1/devices/r1"),
			(ResourceKind::Emulator, "projects/p1/devices/r1"),
		];

		for (kind, raw) in cases {
			let name = ResourceName::parse(kind, raw).expect("Child name should parse.");

			assert_eq!(name.kind(), kind);
			assert_eq!(name.project_id(), "p1");
			assert_eq!(name.id(), "r1");
		}
	}

	#[test]
	fn malformed_names_are_rejected() {
		let cases = [
			(ResourceKind::Project, "abc"),
			(ResourceKind::Project, "projects/"),
			(ResourceKind::Project, "projects/a/rules/b"),
			(ResourceKind::Project, "organizations/abc"),
			(ResourceKind::NotificationRule, "projects/p1/rules"),
			(ResourceKind::NotificationRule, "projects/p1/members/r1"),
			(ResourceKind::NotificationRule, "projects//rules/r1"),
			(ResourceKind::Membership, "projects/p1/members/m1/extra"),
			(ResourceKind::DataConnector, ""),
			(ResourceKind::Device, "/projects/p1/devices/d1"),
		];

		for (kind, raw) in cases {
			let err = ResourceName::parse(kind, raw).expect_err("Malformed name should fail.");

			assert_eq!(err.kind, kind);
			assert_eq!(err.name, raw);
			assert_eq!(err.pattern, kind.pattern());
		}
	}

	#[test]
	fn error_message_names_the_expected_shape() {
		let err = ResourceName::parse(ResourceKind::NotificationRule, "rules/r1")
			.expect_err("Malformed name should fail.");

		assert_eq!(
			err.to_string(),
			"Resource name `rules/r1` is not a valid Notification rule name, expected \
			 `projects/{project}/rules/{rule}`."
		);
	}
}
