// self
use crate::obs::{Operation, Outcome};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_outcome(resource: &'static str, operation: Operation, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"dt_api_operation_total",
			"resource" => resource,
			"operation" => operation.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (resource, operation, outcome);
	}
}

/// Records a 429 response via the global metrics recorder (when enabled).
pub fn record_throttled() {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("dt_api_throttled_total").increment(1);
	}
}
