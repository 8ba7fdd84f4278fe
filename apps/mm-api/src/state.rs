use std::sync::Arc;

use mm_service::ResearchService;
use mm_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<ResearchService>,
}
impl AppState {
	pub async fn new(config: mm_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		Ok(Self::from_service(Arc::new(ResearchService::new(config, db))))
	}

	pub fn from_service(service: Arc<ResearchService>) -> Self {
		Self { service }
	}
}
