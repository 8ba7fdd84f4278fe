use mm_providers::llm::ChatMessage;

use crate::{
	ResearchService, Result,
	model::{Depth, Draft},
	state::RunState,
};

pub fn depth_instructions(depth: Depth) -> &'static str {
	match depth {
		Depth::Quick => "Keep it tight: a short summary and 3-4 key findings.",
		Depth::Detailed =>
			"Go deep: a thorough summary and 5-7 or more key findings covering different angles.",
	}
}

pub fn writer_messages(state: &RunState) -> Vec<ChatMessage> {
	let context = state
		.memory_context
		.iter()
		.map(|statement| format!("- {statement}"))
		.collect::<Vec<_>>()
		.join("\n");
	let origin = if state.reused_from_memory {
		"prior research stored in memory"
	} else {
		"fresh web research"
	};

	vec![
		ChatMessage::system(format!(
			"You are a senior market research analyst writing for marketing executives. Write an \
			 executive summary paragraph, then a blank line, then one key finding per line. {}",
			depth_instructions(state.depth)
		)),
		ChatMessage::user(format!(
			"Topic: {}\nContext ({origin}):\n{context}",
			state.topic
		)),
	]
}

/// Splits writer output at the first empty line (`\n\n`) into a summary and one finding per line.
///
/// Output without an empty line is all summary. A line holding only spaces does not split.
pub fn parse_draft(raw: &str) -> Draft {
	let normalized = raw.replace("\r\n", "\n");
	let Some((summary, findings)) = normalized.split_once("\n\n") else {
		return Draft { executive_summary: normalized.trim().to_string(), ..Default::default() };
	};
	let executive_summary = summary.trim().to_string();
	let key_findings = findings
		.lines()
		.map(crate::strip_bullet)
		.filter(|line| !line.is_empty())
		.map(str::to_string)
		.collect();

	Draft { executive_summary, key_findings, citations: Vec::new() }
}

impl ResearchService {
	pub(crate) async fn write(&self, state: &mut RunState) -> Result<()> {
		let messages = writer_messages(state);
		let raw = self.generate("writer", &messages).await?;
		let draft = parse_draft(&raw);

		if draft.key_findings.is_empty() {
			tracing::warn!(topic = %state.topic, "Writer output has no key findings.");
		}

		tracing::info!(
			topic = %state.topic,
			findings = draft.key_findings.len(),
			attempt = state.retry_count + 1,
			"Draft written."
		);

		state.replace_draft(draft);

		Ok(())
	}
}
