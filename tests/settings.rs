//! Settings from YAML plus environment-style overrides.

use llm_api_interface::{Error, Settings};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

fn yaml_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn yaml_fills_missing_fields_with_defaults() {
    let file = yaml_file("cache_dir: /tmp/llm-cache\ncache_ttl_secs: 120\n");
    let settings = Settings::from_yaml_file(file.path()).unwrap();

    assert_eq!(settings.cache_dir, PathBuf::from("/tmp/llm-cache"));
    assert_eq!(settings.cache_ttl_secs, 120);
    assert!(settings.cache_enabled);
    assert_eq!(settings.api_timeout_secs, 30);
    assert_eq!(settings.log_level, "info");
}

#[test]
fn environment_overrides_yaml() {
    let file = yaml_file("cache_enabled: true\napi_timeout_secs: 10\n");
    let mut settings = Settings::from_yaml_file(file.path()).unwrap();
    settings
        .apply_overrides(env(&[
            ("CACHE_ENABLED", "false"),
            ("API_TIMEOUT", "45"),
            ("CACHE_DIR", "custom-cache"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1/chat/completions"),
            ("DEBUG", "1"),
        ]))
        .unwrap();
    settings.validate().unwrap();

    let cache = settings.cache_config();
    assert!(!cache.enabled);
    assert_eq!(cache.directory, PathBuf::from("custom-cache"));
    assert_eq!(settings.api_timeout(), Duration::from_secs(45));
    assert_eq!(settings.log_filter(), "debug");
}

#[test]
fn malformed_yaml_is_a_configuration_error() {
    let file = yaml_file("cache_ttl_secs: [not, a, number]\n");
    let err = Settings::from_yaml_file(file.path()).unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[test]
fn missing_file_is_a_configuration_error() {
    let err = Settings::from_yaml_file("/definitely/not/here.yaml").unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[test]
fn invalid_boolean_names_the_variable() {
    let mut settings = Settings::default();
    let err = settings
        .apply_overrides(env(&[("CACHE_ENABLED", "sometimes")]))
        .unwrap_err();
    assert!(err.to_string().contains("CACHE_ENABLED"));
}

#[test]
fn invalid_base_url_fails_validation() {
    let mut settings = Settings::default();
    settings
        .apply_overrides(env(&[("ANTHROPIC_BASE_URL", "not a url")]))
        .unwrap();
    let err = settings.validate().unwrap_err();
    assert_eq!(
        err.context().and_then(|c| c.field_path.as_deref()),
        Some("anthropic_base_url")
    );
}
