//! Unit tests for config module

use studio_preview::Config;
use tempfile::TempDir;

#[test]
fn default_config_has_expected_values() {
    let config = Config::default();
    assert_eq!(config.tiny.max_dimension, 24);
    assert_eq!(config.tiny.quality, 0.5);
    assert_eq!(config.full.max_dimension, 800);
    assert_eq!(config.full.quality, 0.8);
    assert_eq!(config.full.mime_type, "image/jpeg");
    assert_eq!(config.queue.max_concurrency, 3);
    assert!(config.worker.enabled);
    assert!(config.validate().is_ok());
}

#[test]
fn config_serialization_roundtrip() {
    let config = Config::default().with_concurrency(5).without_worker();
    let toml_str = toml::to_string(&config).unwrap();
    let parsed: Config = toml::from_str(&toml_str).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn missing_sections_use_defaults() {
    let toml_str = r#"
[full]
max_dimension = 1200
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.full.max_dimension, 1200);
    assert_eq!(config.full.quality, 0.8);
    assert_eq!(config.tiny.max_dimension, 24);
    assert_eq!(config.queue.max_concurrency, 3);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut config = Config::default();
    config.full.quality = 0.0;
    assert!(config.validate().unwrap_err().contains("full.quality"));

    let mut config = Config::default();
    config.tiny.max_dimension = 0;
    assert!(config.validate().unwrap_err().contains("tiny.max_dimension"));

    let mut config = Config::default();
    config.queue.max_concurrency = 0;
    assert!(config.validate().unwrap_err().contains("max_concurrency"));
}

#[test]
fn with_concurrency_never_goes_below_one() {
    assert_eq!(Config::default().with_concurrency(0).queue.max_concurrency, 1);
}

#[test]
fn load_from_missing_file_returns_defaults() {
    let temp = TempDir::new().unwrap();
    let config = Config::load_from(&temp.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn save_then_load_preserves_values() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("config.toml");
    let mut config = Config::default();
    config.full.mime_type = "image/webp".to_string();

    config.save_to(&path).unwrap();
    let loaded = Config::load_from(&path).unwrap();

    assert_eq!(loaded.full.mime_type, "image/webp");
}

#[test]
fn load_from_invalid_values_is_an_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "[queue]\nmax_concurrency = 0\n").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Invalid config"));
}

#[test]
fn load_from_malformed_toml_names_the_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "[full\n").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}
