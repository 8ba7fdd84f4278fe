use serde::{Deserialize, Serialize};
use serde_json::Value;

use mm_config::{Dialect, LlmProviderConfig};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	System,
	User,
	Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
	pub role: Role,
	pub content: String,
}
impl ChatMessage {
	pub fn system(content: impl Into<String>) -> Self {
		Self { role: Role::System, content: content.into() }
	}

	pub fn user(content: impl Into<String>) -> Self {
		Self { role: Role::User, content: content.into() }
	}
}

/// Sends one chat completion request and returns the generated text.
pub async fn complete(cfg: &LlmProviderConfig, messages: &[ChatMessage]) -> Result<String> {
	let client = crate::http_client(cfg.timeout_ms)?;
	let url = crate::endpoint(&cfg.api_base, &cfg.path);
	let body = match cfg.dialect {
		Dialect::OpenAi => serde_json::json!({
			"model": cfg.model,
			"temperature": cfg.temperature,
			"messages": messages,
		}),
		Dialect::Ollama => serde_json::json!({
			"model": cfg.model,
			"messages": messages,
			"stream": false,
			"options": { "temperature": cfg.temperature },
		}),
	};
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	tracing::debug!(model = %cfg.model, "Chat completion received.");

	parse_completion(cfg.dialect, &json)
}

fn parse_completion(dialect: Dialect, json: &Value) -> Result<String> {
	let content = match dialect {
		Dialect::OpenAi => json
			.get("choices")
			.and_then(|v| v.as_array())
			.and_then(|arr| arr.first())
			.and_then(|choice| choice.get("message"))
			.and_then(|msg| msg.get("content")),
		Dialect::Ollama => json.get("message").and_then(|msg| msg.get("content")),
	};

	content
		.and_then(|c| c.as_str())
		.map(str::to_string)
		.ok_or_else(|| Error::invalid_response("Completion response is missing message content."))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_openai_choice_content() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "role": "assistant", "content": "OK" } }
			]
		});
		let parsed = parse_completion(Dialect::OpenAi, &json).expect("parse failed");

		assert_eq!(parsed, "OK");
	}

	#[test]
	fn parses_ollama_message_content() {
		let json = serde_json::json!({
			"model": "llama3.1",
			"message": { "role": "assistant", "content": "query one\nquery two" },
			"done": true
		});
		let parsed = parse_completion(Dialect::Ollama, &json).expect("parse failed");

		assert_eq!(parsed, "query one\nquery two");
	}

	#[test]
	fn rejects_missing_content() {
		let json = serde_json::json!({ "choices": [] });
		let err = parse_completion(Dialect::OpenAi, &json).expect_err("expected error");

		assert!(matches!(err, Error::InvalidResponse { .. }));
	}

	#[test]
	fn serializes_roles_in_lowercase() {
		let value = serde_json::to_value(ChatMessage::system("be brief")).expect("serialize");

		assert_eq!(value["role"], "system");
		assert_eq!(value["content"], "be brief");
	}
}
