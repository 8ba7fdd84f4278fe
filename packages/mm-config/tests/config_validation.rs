use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use mm_config::{Config, Dialect};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let mut table = root.as_table_mut().expect("Template config must be a table.");

	for part in section.split('.') {
		table = table
			.get_mut(part)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Template config must include [{section}]."));
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("mm_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse test config.")
}

#[test]
fn sample_config_loads_and_normalizes_blank_search_key() {
	let path = write_temp_config(SAMPLE_CONFIG_TEMPLATE_TOML.to_string());
	let result = mm_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Sample config must load.");

	assert_eq!(cfg.providers.search.api_key, None);
	assert_eq!(cfg.providers.llm.dialect, Dialect::OpenAi);
	assert_eq!(cfg.research.max_revisions, 3);
	assert_eq!(cfg.service.environment, "local");
}

#[test]
fn research_section_falls_back_to_defaults() {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");

	root.as_table_mut().expect("Template config must be a table.").remove("research");

	let cfg: Config = toml::from_str(&toml::to_string(&root).expect("Failed to render config."))
		.expect("Config without [research] must parse.");

	assert_eq!(cfg.research.max_revisions, 3);
	assert_eq!(cfg.research.memory_limit, 8);
	assert!((cfg.research.memory_max_distance - 0.2).abs() < f32::EPSILON);
	assert!(mm_config::validate(&cfg).is_ok());
}

#[test]
fn embedding_dimensions_must_match_vector_dim() {
	let payload = sample_toml_with("providers.embedding", "dimensions", Value::Integer(768));
	let path = write_temp_config(payload);
	let result = mm_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let err = result.expect_err("Expected dimension mismatch validation error.");
	let message = err.to_string();

	assert!(
		message.contains(
			"providers.embedding.dimensions must match storage.postgres.vector_dim."
		),
		"Unexpected error message: {message}"
	);
}

#[test]
fn environment_must_be_known() {
	let payload = sample_toml_with("service", "environment", Value::String("staging".to_string()));
	let path = write_temp_config(payload);
	let result = mm_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let err = result.expect_err("Expected environment validation error.");

	assert!(
		err.to_string().contains("service.environment must be one of local, dev, or prod."),
		"Unexpected error: {err}"
	);
}

#[test]
fn memory_max_distance_must_be_a_cosine_distance() {
	let mut cfg = base_config();

	cfg.research.memory_max_distance = 2.5;

	let err = mm_config::validate(&cfg).expect_err("Expected distance range validation error.");

	assert!(
		err.to_string().contains("research.memory_max_distance must be in the range 0.0-2.0."),
		"Unexpected error: {err}"
	);

	cfg.research.memory_max_distance = f32::NAN;

	let err = mm_config::validate(&cfg).expect_err("Expected finite distance validation error.");

	assert!(
		err.to_string().contains("research.memory_max_distance must be a finite number."),
		"Unexpected error: {err}"
	);
}

#[test]
fn openai_dialect_requires_api_key() {
	let mut cfg = base_config();

	cfg.providers.llm.api_key = "  ".to_string();

	let err = mm_config::validate(&cfg).expect_err("Expected api_key validation error.");

	assert!(
		err.to_string().contains("Provider llm api_key must be non-empty for the openai dialect."),
		"Unexpected error: {err}"
	);

	cfg.providers.llm.dialect = Dialect::Ollama;

	assert!(mm_config::validate(&cfg).is_ok());
}

#[test]
fn timeouts_must_be_positive() {
	let mut cfg = base_config();

	cfg.research.call_timeout_ms = 0;

	let err = mm_config::validate(&cfg).expect_err("Expected timeout validation error.");

	assert!(
		err.to_string().contains("research.call_timeout_ms must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn unreadable_config_reports_path() {
	let mut path = env::temp_dir();

	path.push("mm_config_test_missing_file.toml");

	let err = mm_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, mm_config::Error::ReadConfig { .. }), "Unexpected error: {err}");
}
