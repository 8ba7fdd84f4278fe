pub mod guardrail;
pub mod memory;
pub mod model;
pub mod orchestrator;
pub mod planning;
pub mod progress;
pub mod search;
pub mod state;
pub mod writing;

mod error;

pub use error::{Error, Result};
pub use memory::{PgVectorMemory, VectorMemory};
pub use mm_providers::{
	llm::{ChatMessage, Role},
	search::SearchResult,
};
pub use mm_storage::models::{ChunkMatch, NewChunk};
pub use model::{
	Citation, Depth, Draft, GuardrailReport, GuardrailStatus, ResearchRequest, ResearchResult,
};
pub use orchestrator::{Stage, StageOutcome, Termination, Transition, transition};
pub use progress::{ProgressEvent, ProgressSink, RunEvent};
pub use state::{RunState, SearchHit};

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use mm_config::{Config, EmbeddingProviderConfig, LlmProviderConfig, SearchProviderConfig};
use mm_providers::{embedding, llm, search as web};
use mm_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait Generator
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, Result<String>>;
}

pub trait Embedder
where
	Self: Send + Sync,
{
	fn embed_batch<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;

	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		Box::pin(async move {
			let texts = [text.to_string()];
			let vectors = self.embed_batch(cfg, &texts).await?;

			vectors.into_iter().next().ok_or_else(|| Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			})
		})
	}
}

pub trait WebSearch
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a SearchProviderConfig,
		api_key: &'a str,
		query: &'a str,
	) -> BoxFuture<'a, Result<Vec<SearchResult>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub generator: Arc<dyn Generator>,
	pub embedder: Arc<dyn Embedder>,
	pub search: Arc<dyn WebSearch>,
}
impl Providers {
	pub fn new(
		generator: Arc<dyn Generator>,
		embedder: Arc<dyn Embedder>,
		search: Arc<dyn WebSearch>,
	) -> Self {
		Self { generator, embedder, search }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(HttpProviders);

		Self { generator: provider.clone(), embedder: provider.clone(), search: provider }
	}
}

pub struct ResearchService {
	pub cfg: Config,
	pub memory: Arc<dyn VectorMemory>,
	pub providers: Providers,
}
impl ResearchService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, memory: Arc::new(PgVectorMemory::new(db)), providers: Providers::default() }
	}

	pub fn with_parts(cfg: Config, memory: Arc<dyn VectorMemory>, providers: Providers) -> Self {
		Self { cfg, memory, providers }
	}

	/// Runs one collaborator call under the configured per-call timeout.
	pub(crate) async fn bounded<T, F>(&self, operation: &str, call: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		let timeout_ms = self.cfg.research.call_timeout_ms;

		match tokio::time::timeout(Duration::from_millis(timeout_ms), call).await {
			Ok(result) => result,
			Err(_) => {
				tracing::warn!(operation, timeout_ms, "Collaborator call timed out.");

				Err(Error::Timeout { operation: operation.to_string(), timeout_ms })
			},
		}
	}

	pub(crate) async fn generate(&self, operation: &str, messages: &[ChatMessage]) -> Result<String> {
		self.bounded(
			operation,
			self.providers.generator.generate(&self.cfg.providers.llm, messages),
		)
		.await
	}

	pub(crate) fn check_dimensions(&self, vector: &[f32]) -> Result<()> {
		let expected = self.cfg.providers.embedding.dimensions as usize;

		if vector.len() != expected {
			return Err(Error::Provider {
				message: format!(
					"Embedding vector has {} dimensions; expected {expected}.",
					vector.len()
				),
			});
		}

		Ok(())
	}
}

struct HttpProviders;

impl Generator for HttpProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok(llm::complete(cfg, messages).await?) })
	}
}

impl Embedder for HttpProviders {
	fn embed_batch<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, texts).await?) })
	}
}

impl WebSearch for HttpProviders {
	fn search<'a>(
		&'a self,
		cfg: &'a SearchProviderConfig,
		api_key: &'a str,
		query: &'a str,
	) -> BoxFuture<'a, Result<Vec<SearchResult>>> {
		Box::pin(async move { Ok(web::search(cfg, api_key, query).await?) })
	}
}

/// Trims a generated line and drops a leading bullet (`-`, `*`, `•`) or a one- or two-digit
/// ordinal (`1.`, `12)`).
pub fn strip_bullet(line: &str) -> &str {
	let trimmed = line.trim().trim_start_matches(['-', '*', '•']).trim_start();

	strip_ordinal(trimmed).trim()
}

fn strip_ordinal(text: &str) -> &str {
	let digits = text.chars().take_while(|ch| ch.is_ascii_digit()).count();

	if !(1..=2).contains(&digits) {
		return text;
	}

	match text[digits..].strip_prefix(['.', ')']) {
		Some(rest) if rest.starts_with(char::is_whitespace) => rest,
		_ => text,
	}
}
