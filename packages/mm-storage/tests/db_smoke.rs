use mm_config::Postgres;
use mm_storage::{db::Db, models::NewChunk, queries};
use mm_testkit::TestDatabase;

const DIM: u32 = 4;

async fn connect(test_db: &TestDatabase) -> Db {
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1, vector_dim: DIM };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	db
}

fn chunk(content: &str, embedding: [f32; 4]) -> NewChunk {
	NewChunk { content: content.to_string(), source_url: None, embedding: embedding.to_vec() }
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set MM_PG_DSN to run."]
async fn db_connects_and_bootstraps_twice() {
	let Some(base_dsn) = mm_testkit::env_dsn() else {
		eprintln!("Skipping db_connects_and_bootstraps_twice; set MM_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = connect(&test_db).await;

	db.ensure_schema().await.expect("Schema bootstrap must be idempotent.");

	let count: i64 = sqlx::query_scalar(
		"SELECT count(*) FROM information_schema.tables WHERE table_name = 'research_chunks'",
	)
	.fetch_one(&db.pool)
	.await
	.expect("Failed to query schema tables.");

	assert_eq!(count, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set MM_PG_DSN to run."]
async fn similar_chunks_respect_topic_and_distance() {
	let Some(base_dsn) = mm_testkit::env_dsn() else {
		eprintln!("Skipping similar_chunks_respect_topic_and_distance; set MM_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = connect(&test_db).await;
	let written = queries::insert_chunks(
		&db,
		"GenAI in Marketing 2025",
		&[
			chunk("Brands test GenAI copy at scale.", [1.0, 0.0, 0.0, 0.0]),
			chunk("Retail media budgets keep growing.", [0.9, 0.1, 0.0, 0.0]),
			chunk("Unrelated note about logistics.", [0.0, 0.0, 1.0, 0.0]),
		],
	)
	.await
	.expect("Failed to insert chunks.");

	assert_eq!(written, 3);

	queries::insert_chunks(&db, "Sneaker resale", &[chunk("Resale is up.", [1.0, 0.0, 0.0, 0.0])])
		.await
		.expect("Failed to insert chunks.");

	let probe = [1.0, 0.0, 0.0, 0.0];
	let first = queries::query_similar_chunks(&db, "genai marketing", &probe, 0.2, 8)
		.await
		.expect("Failed to query chunks.");

	// "genai marketing" is not a substring of the stored label.
	assert!(first.is_empty());

	let first = queries::query_similar_chunks(&db, "genai in marketing", &probe, 0.2, 8)
		.await
		.expect("Failed to query chunks.");
	let second = queries::query_similar_chunks(&db, "genai in marketing", &probe, 0.2, 8)
		.await
		.expect("Failed to query chunks.");

	assert_eq!(first.len(), 2);
	assert_eq!(first[0].content, "Brands test GenAI copy at scale.");
	assert!(first[0].distance <= first[1].distance);
	assert_eq!(first, second);

	let limited = queries::query_similar_chunks(&db, "GenAI", &probe, 0.2, 1)
		.await
		.expect("Failed to query chunks.");

	assert_eq!(limited.len(), 1);

	let err = queries::query_similar_chunks(&db, "GenAI", &[1.0, 0.0], 0.2, 1)
		.await
		.expect_err("Expected dimension mismatch.");

	assert!(matches!(err, mm_storage::Error::InvalidArgument(_)));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set MM_PG_DSN to run."]
async fn empty_insert_is_a_no_op() {
	let Some(base_dsn) = mm_testkit::env_dsn() else {
		eprintln!("Skipping empty_insert_is_a_no_op; set MM_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = connect(&test_db).await;
	let written = queries::insert_chunks(&db, "anything", &[]).await.expect("Insert failed.");

	assert_eq!(written, 0);

	let stored: i64 = sqlx::query_scalar("SELECT count(*) FROM research_chunks")
		.fetch_one(&db.pool)
		.await
		.expect("Failed to count chunks.");

	assert_eq!(stored, 0);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
