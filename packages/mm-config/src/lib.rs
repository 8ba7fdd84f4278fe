mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Dialect, EmbeddingProviderConfig, LlmProviderConfig, Postgres, Providers, Research,
	SearchProviderConfig, Security, Service, Storage,
};

use std::{fs, path::Path};

pub const ENVIRONMENTS: [&str; 3] = ["local", "dev", "prod"];

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if !ENVIRONMENTS.contains(&cfg.service.environment.as_str()) {
		return Err(Error::Validation {
			message: "service.environment must be one of local, dev, or prod.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.postgres.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.postgres.vector_dim."
				.to_string(),
		});
	}
	if !cfg.providers.llm.temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be a finite number.".to_string(),
		});
	}
	if cfg.providers.search.max_results == 0 {
		return Err(Error::Validation {
			message: "providers.search.max_results must be greater than zero.".to_string(),
		});
	}

	for (label, timeout_ms) in [
		("providers.llm.timeout_ms", cfg.providers.llm.timeout_ms),
		("providers.embedding.timeout_ms", cfg.providers.embedding.timeout_ms),
		("providers.search.timeout_ms", cfg.providers.search.timeout_ms),
		("research.call_timeout_ms", cfg.research.call_timeout_ms),
	] {
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if !cfg.research.memory_max_distance.is_finite() {
		return Err(Error::Validation {
			message: "research.memory_max_distance must be a finite number.".to_string(),
		});
	}
	// Cosine distance spans 0.0 (identical) to 2.0 (opposite).
	if !(0.0..=2.0).contains(&cfg.research.memory_max_distance) {
		return Err(Error::Validation {
			message: "research.memory_max_distance must be in the range 0.0-2.0.".to_string(),
		});
	}
	if cfg.research.memory_limit == 0 {
		return Err(Error::Validation {
			message: "research.memory_limit must be greater than zero.".to_string(),
		});
	}

	for (label, dialect, key) in [
		("llm", cfg.providers.llm.dialect, &cfg.providers.llm.api_key),
		("embedding", cfg.providers.embedding.dialect, &cfg.providers.embedding.api_key),
	] {
		if dialect == Dialect::OpenAi && key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty for the openai dialect."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.providers.search.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.providers.search.api_key = None;
	}

	cfg.service.environment = cfg.service.environment.trim().to_ascii_lowercase();
}
