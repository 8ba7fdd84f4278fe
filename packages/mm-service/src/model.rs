use serde::{Deserialize, Serialize};

/// How thorough a run should be. Fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
	Quick,
	#[default]
	Detailed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRequest {
	pub topic: String,
	#[serde(default)]
	pub depth: Depth,
}
impl ResearchRequest {
	pub fn new(topic: impl Into<String>, depth: Depth) -> Self {
		Self { topic: topic.into(), depth }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
	pub source_url: String,
	#[serde(default)]
	pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
	pub executive_summary: String,
	pub key_findings: Vec<String>,
	pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailStatus {
	Approved,
	NeedsRevision,
	Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailReport {
	pub status: GuardrailStatus,
	#[serde(default)]
	pub issues: Vec<String>,
}
impl GuardrailReport {
	pub fn approved() -> Self {
		Self { status: GuardrailStatus::Approved, issues: Vec::new() }
	}
}

/// Final payload of a run: the last draft plus how it was produced and judged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchResult {
	pub executive_summary: String,
	pub key_findings: Vec<String>,
	pub citations: Vec<Citation>,
	pub reused_from_memory: bool,
	pub guardrail: GuardrailReport,
}
