// self
use crate::obs::{FlowKind, FlowOutcome};

/// Records a lifecycle outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_deezer_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recording_without_a_recorder_is_harmless() {
		record_flow_outcome(FlowKind::Profile, FlowOutcome::Attempt);
		record_flow_outcome(FlowKind::Profile, FlowOutcome::Failure);
	}
}
