use serde::{Deserialize, Serialize};
use serde_json::Value;

use mm_config::SearchProviderConfig;

use crate::{Error, Result};

/// One hit from the web-search provider. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub content: Option<String>,
}

/// Tavily-style search. The caller decides what to do when no key is configured.
pub async fn search(
	cfg: &SearchProviderConfig,
	api_key: &str,
	query: &str,
) -> Result<Vec<SearchResult>> {
	let client = crate::http_client(cfg.timeout_ms)?;
	let url = crate::endpoint(&cfg.api_base, &cfg.path);
	let body = serde_json::json!({
		"api_key": api_key,
		"query": query,
		"max_results": cfg.max_results,
		"search_depth": cfg.search_depth,
	});
	let res = client.post(url).json(&body).send().await?;
	let json: Value = res.error_for_status()?.json().await?;
	let results = parse_search_response(json)?;

	tracing::debug!(query, results = results.len(), "Web search completed.");

	Ok(results)
}

fn parse_search_response(json: Value) -> Result<Vec<SearchResult>> {
	let Some(results) = json.get("results") else {
		return Ok(Vec::new());
	};

	if !results.is_array() {
		return Err(Error::invalid_response("Search response results must be an array."));
	}

	Ok(serde_json::from_value(results.clone())?)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_results_with_missing_fields() {
		let json = serde_json::json!({
			"query": "genai marketing",
			"results": [
				{ "title": "GenAI in ads", "url": "https://example.com/a", "content": "Spend is up." },
				{ "url": "https://example.com/b", "score": 0.4 }
			]
		});
		let parsed = parse_search_response(json).expect("parse failed");

		assert_eq!(parsed.len(), 2);
		assert_eq!(parsed[0].title.as_deref(), Some("GenAI in ads"));
		assert_eq!(parsed[1].title, None);
		assert_eq!(parsed[1].url.as_deref(), Some("https://example.com/b"));
	}

	#[test]
	fn missing_results_is_empty() {
		let parsed = parse_search_response(serde_json::json!({})).expect("parse failed");

		assert!(parsed.is_empty());
	}

	#[test]
	fn rejects_non_array_results() {
		assert!(parse_search_response(serde_json::json!({ "results": "nope" })).is_err());
	}
}
