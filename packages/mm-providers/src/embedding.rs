use serde_json::Value;

use mm_config::{Dialect, EmbeddingProviderConfig};

use crate::{Error, Result};

pub async fn embed(cfg: &EmbeddingProviderConfig, texts: &[String]) -> Result<Vec<Vec<f32>>> {
	if texts.is_empty() {
		return Ok(Vec::new());
	}

	let client = crate::http_client(cfg.timeout_ms)?;
	let url = crate::endpoint(&cfg.api_base, &cfg.path);
	let body = match cfg.dialect {
		Dialect::OpenAi => serde_json::json!({
			"model": cfg.model,
			"input": texts,
			"dimensions": cfg.dimensions,
		}),
		Dialect::Ollama => serde_json::json!({
			"model": cfg.model,
			"input": texts,
		}),
	};
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	match cfg.dialect {
		Dialect::OpenAi => parse_openai_response(json),
		Dialect::Ollama => parse_ollama_response(json),
	}
}

fn parse_openai_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json
		.get("data")
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::invalid_response("Embedding response is missing data array."))?;
	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item
			.get("embedding")
			.ok_or_else(|| Error::invalid_response("Embedding item missing embedding array."))?;

		indexed.push((index, parse_vector(embedding)?));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}

fn parse_ollama_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let embeddings = json
		.get("embeddings")
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::invalid_response("Embedding response is missing embeddings array."))?;

	embeddings.iter().map(parse_vector).collect()
}

fn parse_vector(value: &Value) -> Result<Vec<f32>> {
	let values = value
		.as_array()
		.ok_or_else(|| Error::invalid_response("Embedding must be an array."))?;
	let mut vec = Vec::with_capacity(values.len());

	for value in values {
		let number =
			value.as_f64().ok_or_else(|| Error::invalid_response("Embedding value must be numeric."))?;

		vec.push(number as f32);
	}

	Ok(vec)
}
