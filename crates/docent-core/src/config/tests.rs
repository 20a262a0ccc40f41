use std::io::Write;

use serial_test::serial;

use super::*;

const ENV_KEYS: [&str; 8] = [
    "DOCENT_OPENAI_API_KEY",
    "DOCENT_MODEL",
    "DOCENT_DOCS_PATH",
    "DOCENT_CHUNK_SIZE",
    "DOCENT_CHUNK_OVERLAP",
    "DOCENT_CACHE_TTL_SECS",
    "DOCENT_RATE_LIMIT_MS",
    "DOCENT_USAGE_LOG_DIR",
];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

#[test]
fn defaults_are_the_documented_values() {
    let config = Config::default();
    assert_eq!(config.openai.api_key, "");
    assert_eq!(config.openai.model, "gpt-3.5-turbo");
    assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
    assert_eq!(config.ingestion.docs_path, "../docs");
    assert_eq!(config.ingestion.chunk_size, 1000);
    assert_eq!(config.ingestion.chunk_overlap, 200);
    assert!(config.cache.enabled);
    assert_eq!(config.cache.ttl_secs, 3600);
    assert_eq!(config.rate_limit.min_interval_ms, 1000);
    assert_eq!(config.usage.log_dir, "logs");
}

#[test]
#[serial]
fn load_missing_file_uses_defaults() {
    clear_env();
    let config = Config::load(std::path::Path::new("/nonexistent/docent.toml")).unwrap();
    assert_eq!(config.ingestion.chunk_size, 1000);
    assert_eq!(config.openai.model, "gpt-3.5-turbo");
}

#[test]
#[serial]
fn parse_valid_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    write!(
        f,
        r#"
[openai]
api_key = "sk-abc"
model = "gpt-4"

[ingestion]
docs_path = "./docs"
chunk_size = 500
chunk_overlap = 100

[cache]
enabled = false
ttl_secs = 60

[rate_limit]
min_interval_ms = 250

[usage]
log_dir = "./usage"
"#
    )
    .unwrap();

    clear_env();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.openai.api_key, "sk-abc");
    assert_eq!(config.openai.model, "gpt-4");
    assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
    assert_eq!(config.ingestion.docs_path, "./docs");
    assert_eq!(config.ingestion.chunk_size, 500);
    assert_eq!(config.ingestion.chunk_overlap, 100);
    assert!(!config.cache.enabled);
    assert_eq!(config.cache.ttl_secs, 60);
    assert_eq!(config.rate_limit.min_interval_ms, 250);
    assert_eq!(config.usage.log_dir, "./usage");
}

#[test]
#[serial]
fn partial_toml_fills_in_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    write!(
        f,
        r#"
[ingestion]
chunk_size = 800
"#
    )
    .unwrap();

    clear_env();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.ingestion.chunk_size, 800);
    assert_eq!(config.ingestion.chunk_overlap, 200);
    assert_eq!(config.openai.model, "gpt-3.5-turbo");
    assert!(config.cache.enabled);
}

#[test]
#[serial]
fn invalid_toml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[openai\napi_key = ").unwrap();

    clear_env();

    assert!(Config::load(&path).is_err());
}

#[test]
#[serial]
fn env_overrides_replace_file_values() {
    clear_env();
    let mut config = Config::default();

    unsafe {
        std::env::set_var("DOCENT_OPENAI_API_KEY", "sk-env");
        std::env::set_var("DOCENT_MODEL", "gpt-4-turbo");
        std::env::set_var("DOCENT_DOCS_PATH", "/srv/docs");
        std::env::set_var("DOCENT_CHUNK_SIZE", "640");
        std::env::set_var("DOCENT_CHUNK_OVERLAP", "64");
        std::env::set_var("DOCENT_CACHE_TTL_SECS", "120");
        std::env::set_var("DOCENT_RATE_LIMIT_MS", "500");
        std::env::set_var("DOCENT_USAGE_LOG_DIR", "/tmp/usage");
    }
    config.apply_env_overrides();
    clear_env();

    assert_eq!(config.openai.api_key, "sk-env");
    assert_eq!(config.openai.model, "gpt-4-turbo");
    assert_eq!(config.ingestion.docs_path, "/srv/docs");
    assert_eq!(config.ingestion.chunk_size, 640);
    assert_eq!(config.ingestion.chunk_overlap, 64);
    assert_eq!(config.cache.ttl_secs, 120);
    assert_eq!(config.rate_limit.min_interval_ms, 500);
    assert_eq!(config.usage.log_dir, "/tmp/usage");
}

#[test]
#[serial]
fn invalid_numeric_env_keeps_default() {
    clear_env();
    let mut config = Config::default();

    unsafe { std::env::set_var("DOCENT_CHUNK_SIZE", "not-a-number") };
    config.apply_env_overrides();
    unsafe { std::env::remove_var("DOCENT_CHUNK_SIZE") };

    assert_eq!(config.ingestion.chunk_size, 1000);
}

#[test]
fn validate_accepts_defaults() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn validate_rejects_zero_chunk_size() {
    let mut config = Config::default();
    config.ingestion.chunk_size = 0;
    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_overlap_not_below_size() {
    let mut config = Config::default();
    config.ingestion.chunk_overlap = config.ingestion.chunk_size;
    assert!(config.validate().is_err());
}

#[test]
fn debug_redacts_api_key() {
    let mut config = Config::default();
    config.openai.api_key = "sk-secret".into();
    let debug = format!("{config:?}");
    assert!(!debug.contains("sk-secret"));
    assert!(debug.contains("<redacted>"));
}
