use mm_providers::search::SearchResult;

use crate::{
	Error, Result,
	guardrail::MAX_RETRIES_MARKER,
	model::{Depth, Draft, GuardrailReport, ResearchResult},
};

/// A raw web result tagged with the planner query that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
	pub query: String,
	pub title: Option<String>,
	pub url: Option<String>,
	pub content: Option<String>,
}
impl SearchHit {
	pub fn from_result(query: &str, result: SearchResult) -> Self {
		let SearchResult { title, url, content } = result;

		Self { query: query.to_string(), title, url, content }
	}
}

/// Working record of one run. Owned by the run and handed to each stage in turn.
#[derive(Debug, Clone)]
pub struct RunState {
	pub topic: String,
	pub depth: Depth,
	pub search_queries: Vec<String>,
	pub search_results: Vec<SearchHit>,
	pub memory_context: Vec<String>,
	pub reused_from_memory: bool,
	pub draft: Option<Draft>,
	pub verdict: Option<GuardrailReport>,
	pub retry_count: u32,
}
impl RunState {
	pub fn new(topic: impl Into<String>, depth: Depth) -> Self {
		Self {
			topic: topic.into(),
			depth,
			search_queries: Vec::new(),
			search_results: Vec::new(),
			memory_context: Vec::new(),
			reused_from_memory: false,
			draft: None,
			verdict: None,
			retry_count: 0,
		}
	}

	/// Installs a fresh draft. Any verdict belongs to the previous draft and is dropped.
	pub fn replace_draft(&mut self, draft: Draft) {
		self.draft = Some(draft);
		self.verdict = None;
	}

	pub(crate) fn mark_retries_exhausted(&mut self) {
		if let Some(verdict) = self.verdict.as_mut() {
			verdict.issues.push(MAX_RETRIES_MARKER.to_string());
		}
	}

	pub fn into_result(self) -> Result<ResearchResult> {
		let Some(draft) = self.draft else {
			return Err(Error::InvalidState { message: "Run ended without a draft.".to_string() });
		};
		let Some(guardrail) = self.verdict else {
			return Err(Error::InvalidState {
				message: "Run ended without a guardrail verdict.".to_string(),
			});
		};
		let Draft { executive_summary, key_findings, citations } = draft;

		Ok(ResearchResult {
			executive_summary,
			key_findings,
			citations,
			reused_from_memory: self.reused_from_memory,
			guardrail,
		})
	}
}
