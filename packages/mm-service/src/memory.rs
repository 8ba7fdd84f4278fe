use mm_storage::{
	db::Db,
	models::{ChunkMatch, NewChunk},
	queries,
};

use crate::{BoxFuture, ResearchService, Result, state::RunState};

/// Similarity store holding condensed research chunks, partitioned by topic label.
pub trait VectorMemory
where
	Self: Send + Sync,
{
	/// Appends chunks under `topic`. Empty input is a no-op; duplicates are allowed.
	fn upsert<'a>(&'a self, topic: &'a str, chunks: &'a [NewChunk]) -> BoxFuture<'a, Result<()>>;

	/// Up to `limit` chunks whose label contains `topic` case-insensitively and whose cosine
	/// distance to `vector` is at most `max_distance`, closest first.
	fn query_similar<'a>(
		&'a self,
		topic: &'a str,
		vector: &'a [f32],
		max_distance: f32,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<ChunkMatch>>>;
}

pub struct PgVectorMemory {
	db: Db,
}
impl PgVectorMemory {
	pub fn new(db: Db) -> Self {
		Self { db }
	}
}
impl VectorMemory for PgVectorMemory {
	fn upsert<'a>(&'a self, topic: &'a str, chunks: &'a [NewChunk]) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let written = queries::insert_chunks(&self.db, topic, chunks).await?;

			tracing::info!(topic, written, "Stored research chunks.");

			Ok(())
		})
	}

	fn query_similar<'a>(
		&'a self,
		topic: &'a str,
		vector: &'a [f32],
		max_distance: f32,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<ChunkMatch>>> {
		Box::pin(async move {
			Ok(queries::query_similar_chunks(&self.db, topic, vector, max_distance, limit).await?)
		})
	}
}

impl ResearchService {
	/// Looks for prior research on the run's topic. On a hit the retrieved chunks become the
	/// memory context and the run is marked as reused.
	pub(crate) async fn check_memory(&self, state: &mut RunState) -> Result<bool> {
		let research = &self.cfg.research;
		let vector = self
			.bounded(
				"embed topic",
				self.providers.embedder.embed(&self.cfg.providers.embedding, &state.topic),
			)
			.await?;

		self.check_dimensions(&vector)?;

		let matches = self
			.bounded(
				"query memory",
				self.memory.query_similar(
					&state.topic,
					&vector,
					research.memory_max_distance,
					research.memory_limit,
				),
			)
			.await?;

		tracing::info!(topic = %state.topic, hits = matches.len(), "Memory lookup finished.");

		if matches.is_empty() {
			return Ok(false);
		}

		state.memory_context = matches.into_iter().map(|chunk| chunk.content).collect();
		state.reused_from_memory = true;

		Ok(true)
	}
}
