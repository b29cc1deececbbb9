//! Optional observability helpers for client operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `dt_api.operation` with the `resource`
//!   and `operation` fields, plus debug events for cache hits, token refreshes, and
//!   throttling.
//! - Enable `metrics` to increment the `dt_api_operation_total` counter for every
//!   attempt/success/failure, labeled by `resource` + `operation` + `outcome`, and the
//!   `dt_api_throttled_total` counter for every 429 response.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

pub(crate) use tracing::debug;

// self
use crate::_prelude::*;

/// Operation kinds observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Cached get-by-name or direct fetch.
	Get,
	/// Collection listing.
	List,
	/// Resource creation.
	Create,
	/// Resource update.
	Update,
	/// Resource deletion.
	Delete,
	/// Raw request issued through the collaborator contract.
	Request,
	/// OIDC assertion exchange.
	TokenExchange,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::Get => "get",
			Operation::List => "list",
			Operation::Create => "create",
			Operation::Update => "update",
			Operation::Delete => "delete",
			Operation::Request => "request",
			Operation::TokenExchange => "token_exchange",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to a client operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an operation span and records attempt plus final outcome.
pub(crate) async fn observe<T, Fut>(
	resource: &'static str,
	operation: Operation,
	fut: Fut,
) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = OperationSpan::new(resource, operation);

	record_outcome(resource, operation, Outcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_outcome(resource, operation, Outcome::Success),
		Err(_) => record_outcome(resource, operation, Outcome::Failure),
	}

	result
}
