use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::model::ResearchResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
	pub step: String,
	pub message: String,
}
impl ProgressEvent {
	pub fn new(step: impl Into<String>, message: impl Into<String>) -> Self {
		Self { step: step.into(), message: message.into() }
	}
}

/// Everything a spawned run reports, in order. Exactly one `Completed` or `Failed` ends the
/// sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
	Progress(ProgressEvent),
	Completed(ResearchResult),
	Failed { error_code: String, message: String },
}
impl RunEvent {
	pub fn is_terminal(&self) -> bool {
		!matches!(self, Self::Progress(_))
	}
}

/// Best-effort progress channel. Delivery failures never affect the run; a closed receiver is
/// read as a cancellation request between stages.
#[derive(Debug, Clone, Default)]
pub struct ProgressSink {
	tx: Option<UnboundedSender<RunEvent>>,
}
impl ProgressSink {
	pub fn new(tx: UnboundedSender<RunEvent>) -> Self {
		Self { tx: Some(tx) }
	}

	pub fn disabled() -> Self {
		Self { tx: None }
	}

	pub fn emit(&self, step: &str, message: impl Into<String>) {
		let event = ProgressEvent::new(step, message);

		tracing::debug!(step = %event.step, message = %event.message, "Progress event.");

		self.send(RunEvent::Progress(event));
	}

	pub fn is_cancelled(&self) -> bool {
		self.tx.as_ref().map(|tx| tx.is_closed()).unwrap_or(false)
	}

	pub(crate) fn send(&self, event: RunEvent) {
		if let Some(tx) = self.tx.as_ref() {
			let _ = tx.send(event);
		}
	}
}
