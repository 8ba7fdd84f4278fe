use mm_providers::llm::ChatMessage;

use crate::{ResearchService, Result, model::Depth, state::RunState};

/// Planner output is cut to this many queries.
pub const MAX_QUERIES: usize = 3;

pub fn depth_hint(depth: Depth) -> &'static str {
	match depth {
		Depth::Quick => "high-level overview",
		Depth::Detailed => "detailed multi-angle analysis",
	}
}

pub fn planner_messages(topic: &str, depth: Depth) -> Vec<ChatMessage> {
	vec![
		ChatMessage::system(format!(
			"You are a market research planner. Break a topic into {MAX_QUERIES} focused web \
			 search queries for marketing insights."
		)),
		ChatMessage::user(format!(
			"Topic: {topic}\nDepth: {}\nReturn EXACTLY {MAX_QUERIES} search queries, one per line.",
			depth_hint(depth)
		)),
	]
}

/// One query per non-empty line, bullets stripped, at most [`MAX_QUERIES`].
pub fn parse_queries(raw: &str) -> Vec<String> {
	raw.lines()
		.map(crate::strip_bullet)
		.filter(|line| !line.is_empty())
		.take(MAX_QUERIES)
		.map(str::to_string)
		.collect()
}

impl ResearchService {
	pub(crate) async fn plan(&self, state: &mut RunState) -> Result<()> {
		let messages = planner_messages(&state.topic, state.depth);
		let raw = self.generate("planner", &messages).await?;

		state.search_queries = parse_queries(&raw);

		if state.search_queries.is_empty() {
			tracing::warn!(topic = %state.topic, "Planner returned no usable queries.");
		} else {
			tracing::info!(
				topic = %state.topic,
				queries = state.search_queries.len(),
				"Planned search queries."
			);
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn truncates_to_three_queries() {
		let raw = "q1\nq2\nq3\nq4\nq5";

		assert_eq!(parse_queries(raw), vec!["q1", "q2", "q3"]);
	}

	#[test]
	fn drops_blank_lines_and_bullets() {
		let raw = "\n- GenAI ad spend 2025\n\n2. GenAI brand safety\n";

		assert_eq!(parse_queries(raw), vec!["GenAI ad spend 2025", "GenAI brand safety"]);
	}

	#[test]
	fn empty_output_yields_no_queries() {
		assert!(parse_queries("  \n\n").is_empty());
	}

	#[test]
	fn depth_changes_only_the_hint() {
		let quick = planner_messages("Sneakers", Depth::Quick);
		let detailed = planner_messages("Sneakers", Depth::Detailed);

		assert_eq!(quick[0], detailed[0]);
		assert!(quick[1].content.contains("high-level overview"));
		assert!(detailed[1].content.contains("detailed multi-angle analysis"));
		assert!(detailed[1].content.contains("EXACTLY 3"));
	}
}
