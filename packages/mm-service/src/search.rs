use futures::future;

use mm_providers::llm::ChatMessage;
use mm_storage::models::NewChunk;

use crate::{Error, ResearchService, Result, state::{RunState, SearchHit}};

pub const PLACEHOLDER_TITLE: &str = "Search API key not configured";
pub const PLACEHOLDER_URL: &str = "https://tavily.com";
pub const PLACEHOLDER_CONTENT: &str =
	"Search API key is missing. Configure providers.search.api_key to enable real web search.";

/// Stand-in result used when no search credentials are configured.
pub fn placeholder_hit(query: &str) -> SearchHit {
	SearchHit {
		query: query.to_string(),
		title: Some(PLACEHOLDER_TITLE.to_string()),
		url: Some(PLACEHOLDER_URL.to_string()),
		content: Some(PLACEHOLDER_CONTENT.to_string()),
	}
}

pub fn render_results(results: &[SearchHit]) -> String {
	results
		.iter()
		.map(|hit| {
			format!(
				"Title: {}\nURL: {}\nContent: {}",
				hit.title.as_deref().unwrap_or_default(),
				hit.url.as_deref().unwrap_or_default(),
				hit.content.as_deref().unwrap_or_default(),
			)
		})
		.collect::<Vec<_>>()
		.join("\n\n")
}

pub fn summarizer_messages(topic: &str, rendered: &str) -> Vec<ChatMessage> {
	vec![
		ChatMessage::system(
			"You condense raw web results into 5-10 concise, standalone factual bullet points \
			 about marketing insights. Focus on brand positioning, consumer behavior, competitive \
			 landscape, and channel trends.",
		),
		ChatMessage::user(format!(
			"Topic: {topic}\n\nRaw results:\n{rendered}\n\nReturn bullet points, each on its own \
			 line."
		)),
	]
}

/// One statement per non-empty line with bullet markers removed.
pub fn parse_bullets(raw: &str) -> Vec<String> {
	raw.lines()
		.map(crate::strip_bullet)
		.filter(|line| !line.is_empty())
		.map(str::to_string)
		.collect()
}

impl ResearchService {
	/// Runs every planned query concurrently and concatenates the results in query order.
	pub(crate) async fn search(&self, state: &mut RunState) -> Result<()> {
		let per_query =
			future::try_join_all(state.search_queries.iter().map(|query| self.search_one(query)))
				.await?;

		state.search_results = per_query.into_iter().flatten().collect();

		tracing::info!(
			topic = %state.topic,
			queries = state.search_queries.len(),
			results = state.search_results.len(),
			"Web search finished."
		);

		Ok(())
	}

	async fn search_one(&self, query: &str) -> Result<Vec<SearchHit>> {
		let cfg = &self.cfg.providers.search;
		let Some(api_key) = cfg.api_key.as_deref().filter(|key| !key.trim().is_empty()) else {
			tracing::warn!(query, "Search API key is not configured. Using a placeholder result.");

			return Ok(vec![placeholder_hit(query)]);
		};
		let results =
			self.bounded("web search", self.providers.search.search(cfg, api_key, query)).await?;

		Ok(results.into_iter().map(|result| SearchHit::from_result(query, result)).collect())
	}

	/// Condenses the raw results into bullet statements, embeds them, and stores them as memory
	/// chunks under the run's topic.
	pub(crate) async fn summarize(&self, state: &mut RunState) -> Result<()> {
		if state.search_results.is_empty() {
			tracing::info!(topic = %state.topic, "No search results to summarize.");

			return Ok(());
		}

		let rendered = render_results(&state.search_results);
		let messages = summarizer_messages(&state.topic, &rendered);
		let raw = self.generate("summarizer", &messages).await?;
		let bullets = parse_bullets(&raw);
		let vectors = if bullets.is_empty() {
			Vec::new()
		} else {
			self.bounded(
				"embed bullets",
				self.providers.embedder.embed_batch(&self.cfg.providers.embedding, &bullets),
			)
			.await?
		};

		if vectors.len() != bullets.len() {
			return Err(Error::Provider {
				message: format!(
					"Embedding provider returned {} vectors for {} bullets.",
					vectors.len(),
					bullets.len()
				),
			});
		}

		for vector in &vectors {
			self.check_dimensions(vector)?;
		}

		let chunks: Vec<NewChunk> = bullets
			.iter()
			.zip(vectors)
			.map(|(content, embedding)| NewChunk {
				content: content.clone(),
				source_url: None,
				embedding,
			})
			.collect();

		self.bounded("upsert memory", self.memory.upsert(&state.topic, &chunks)).await?;

		tracing::info!(topic = %state.topic, chunks = chunks.len(), "Summarized search results.");

		state.memory_context = bullets;
		state.reused_from_memory = false;

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn renders_results_as_blocks() {
		let hits = vec![
			SearchHit {
				query: "q".to_string(),
				title: Some("A".to_string()),
				url: Some("https://a.example".to_string()),
				content: Some("alpha".to_string()),
			},
			SearchHit { query: "q".to_string(), title: None, url: None, content: None },
		];
		let rendered = render_results(&hits);

		assert_eq!(
			rendered,
			"Title: A\nURL: https://a.example\nContent: alpha\n\nTitle: \nURL: \nContent: "
		);
	}

	#[test]
	fn parses_bullets_without_markers() {
		let raw = "- Gen Z trusts creators over brands.\n\n• Retail media is the fastest-growing \
		           channel.\n";

		assert_eq!(parse_bullets(raw), vec![
			"Gen Z trusts creators over brands.".to_string(),
			"Retail media is the fastest-growing channel.".to_string(),
		]);
	}

	#[test]
	fn placeholder_names_the_missing_key() {
		let hit = placeholder_hit("genai ads");

		assert_eq!(hit.query, "genai ads");
		assert_eq!(hit.url.as_deref(), Some(PLACEHOLDER_URL));
		assert!(hit.content.as_deref().unwrap_or_default().contains("providers.search.api_key"));
	}
}
