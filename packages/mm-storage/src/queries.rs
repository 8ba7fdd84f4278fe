use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Error, Result,
	db::Db,
	models::{ChunkMatch, NewChunk},
};

/// Appends `chunks` under `topic` in one transaction. Returns the number of rows written.
pub async fn insert_chunks(db: &Db, topic: &str, chunks: &[NewChunk]) -> Result<u64> {
	if chunks.is_empty() {
		return Ok(0);
	}

	for chunk in chunks {
		check_dim(db, &chunk.embedding)?;
	}

	let now = OffsetDateTime::now_utc();
	let mut tx = db.pool.begin().await?;
	let mut written = 0;

	for chunk in chunks {
		let vec_text = vector_to_pg(&chunk.embedding);
		let result = sqlx::query(
			"\
INSERT INTO research_chunks (chunk_id, topic, content, source_url, embedding, created_at)
VALUES ($1, $2, $3, $4, $5::text::vector, $6)",
		)
		.bind(Uuid::new_v4())
		.bind(topic)
		.bind(chunk.content.as_str())
		.bind(chunk.source_url.as_deref())
		.bind(vec_text.as_str())
		.bind(now)
		.execute(&mut *tx)
		.await?;

		written += result.rows_affected();
	}

	tx.commit().await?;

	Ok(written)
}

/// Nearest chunks whose topic label contains `topic` (case-insensitive), within `max_distance`
/// cosine distance, closest first.
pub async fn query_similar_chunks(
	db: &Db,
	topic: &str,
	embedding: &[f32],
	max_distance: f32,
	limit: u32,
) -> Result<Vec<ChunkMatch>> {
	check_dim(db, embedding)?;

	let vec_text = vector_to_pg(embedding);
	let rows = sqlx::query_as::<_, ChunkMatch>(
		"\
SELECT
	chunk_id,
	content,
	source_url,
	(embedding <=> $1::text::vector)::real AS distance
FROM research_chunks
WHERE topic ILIKE $2 ESCAPE '\\'
	AND (embedding <=> $1::text::vector) <= $3
ORDER BY embedding <=> $1::text::vector, created_at, chunk_id
LIMIT $4",
	)
	.bind(vec_text.as_str())
	.bind(topic_pattern(topic))
	.bind(f64::from(max_distance))
	.bind(i64::from(limit))
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

/// `%topic%` with LIKE metacharacters escaped so the topic matches literally.
pub fn topic_pattern(topic: &str) -> String {
	let mut out = String::with_capacity(topic.len() + 2);

	out.push('%');

	for ch in topic.chars() {
		if matches!(ch, '%' | '_' | '\\') {
			out.push('\\');
		}

		out.push(ch);
	}

	out.push('%');

	out
}

pub fn vector_to_pg(vec: &[f32]) -> String {
	let mut out = String::with_capacity(vec.len() * 8);

	out.push('[');

	for (i, value) in vec.iter().enumerate() {
		if i > 0 {
			out.push(',');
		}

		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}

fn check_dim(db: &Db, vec: &[f32]) -> Result<()> {
	if vec.len() != db.vector_dim as usize {
		return Err(Error::InvalidArgument(format!(
			"Embedding has {} dimensions; expected {}.",
			vec.len(),
			db.vector_dim
		)));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn escapes_like_metacharacters() {
		assert_eq!(topic_pattern("GenAI"), "%GenAI%");
		assert_eq!(topic_pattern("100%_growth\\"), "%100\\%\\_growth\\\\%");
	}

	#[test]
	fn renders_pg_vector_literal() {
		assert_eq!(vector_to_pg(&[0.5, -1.0, 2.0]), "[0.5,-1,2]");
		assert_eq!(vector_to_pg(&[]), "[]");
	}
}
