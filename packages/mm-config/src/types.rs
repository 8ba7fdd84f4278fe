use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub research: Research,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// One of "local", "dev", or "prod". Reported by the health endpoint.
	#[serde(default = "default_environment")]
	pub environment: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
	/// Dimension of the `research_chunks.embedding` column.
	pub vector_dim: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub llm: LlmProviderConfig,
	pub embedding: EmbeddingProviderConfig,
	pub search: SearchProviderConfig,
}

/// Wire format spoken by a model backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
	/// `/v1/chat/completions` and `/v1/embeddings` style endpoints.
	#[default]
	OpenAi,
	/// Native `/api/chat` and `/api/embed` endpoints.
	Ollama,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	#[serde(default)]
	pub dialect: Dialect,
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	#[serde(default)]
	pub dialect: Dialect,
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchProviderConfig {
	pub api_base: String,
	/// Optional. When absent every query yields a single placeholder result.
	pub api_key: Option<String>,
	pub path: String,
	pub max_results: u32,
	#[serde(default = "default_search_depth")]
	pub search_depth: String,
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Research {
	/// Upper bound on guardrail-driven rewrites after the first draft.
	#[serde(default = "default_max_revisions")]
	pub max_revisions: u32,
	/// Cosine distance at or below which a stored chunk counts as a memory hit.
	#[serde(default = "default_memory_max_distance")]
	pub memory_max_distance: f32,
	#[serde(default = "default_memory_limit")]
	pub memory_limit: u32,
	/// Applied to every collaborator call made during a run.
	#[serde(default = "default_call_timeout_ms")]
	pub call_timeout_ms: u64,
}
impl Default for Research {
	fn default() -> Self {
		Self {
			max_revisions: default_max_revisions(),
			memory_max_distance: default_memory_max_distance(),
			memory_limit: default_memory_limit(),
			call_timeout_ms: default_call_timeout_ms(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Security {
	#[serde(default = "default_true")]
	pub cors_allow_any_origin: bool,
}
impl Default for Security {
	fn default() -> Self {
		Self { cors_allow_any_origin: true }
	}
}

fn default_environment() -> String {
	"local".to_string()
}

fn default_search_depth() -> String {
	"advanced".to_string()
}

fn default_max_revisions() -> u32 {
	3
}

fn default_memory_max_distance() -> f32 {
	0.2
}

fn default_memory_limit() -> u32 {
	8
}

fn default_call_timeout_ms() -> u64 {
	120_000
}

fn default_true() -> bool {
	true
}
