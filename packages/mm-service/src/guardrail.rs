use mm_providers::llm::ChatMessage;

use crate::{
	ResearchService, Result,
	model::{Draft, GuardrailReport, GuardrailStatus},
	state::RunState,
};

/// Appended to the verdict issues when the revision budget runs out.
pub const MAX_RETRIES_MARKER: &str = "max-retries-exceeded";

pub fn review_text(draft: &Draft) -> String {
	format!("{}\n{}", draft.executive_summary, draft.key_findings.join("\n"))
}

pub fn reviewer_messages(draft: &Draft) -> Vec<ChatMessage> {
	vec![
		ChatMessage::system(
			"You are a compliance and quality reviewer for marketing research. Check the brief \
			 for unsupported claims, unsafe or discriminatory content, and missing structure. \
			 Reply with OK if it is ready, REJECT followed by the reason if it must not be \
			 published, or a list of issues to fix otherwise.",
		),
		ChatMessage::user(review_text(draft)),
	]
}

/// Maps the reviewer reply to a verdict. Anything that is neither `OK` nor `REJECT` asks for a
/// revision.
pub fn classify(raw: &str) -> GuardrailReport {
	let reply = raw.trim();

	if reply.is_empty() {
		return GuardrailReport {
			status: GuardrailStatus::NeedsRevision,
			issues: vec!["Reviewer returned an empty response.".to_string()],
		};
	}

	let upper = reply.to_uppercase();

	if upper.starts_with("OK") {
		GuardrailReport::approved()
	} else if upper.starts_with("REJECT") {
		GuardrailReport { status: GuardrailStatus::Rejected, issues: vec![reply.to_string()] }
	} else {
		GuardrailReport { status: GuardrailStatus::NeedsRevision, issues: vec![reply.to_string()] }
	}
}

impl ResearchService {
	pub(crate) async fn review(&self, state: &mut RunState) -> Result<GuardrailStatus> {
		let Some(draft) = state.draft.as_ref() else {
			return Err(crate::Error::InvalidState {
				message: "Review requires a draft.".to_string(),
			});
		};
		let messages = reviewer_messages(draft);
		let raw = self.generate("guardrail", &messages).await?;
		let report = classify(&raw);
		let status = report.status;

		tracing::info!(topic = %state.topic, ?status, issues = report.issues.len(), "Draft reviewed.");

		state.verdict = Some(report);

		Ok(status)
	}
}
