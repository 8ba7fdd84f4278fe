use uuid::Uuid;

/// A chunk returned by a similarity query, with its cosine distance to the probe vector.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ChunkMatch {
	pub chunk_id: Uuid,
	pub content: String,
	pub source_url: Option<String>,
	pub distance: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewChunk {
	pub content: String,
	pub source_url: Option<String>,
	pub embedding: Vec<f32>,
}
