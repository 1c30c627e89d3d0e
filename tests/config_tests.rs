use drs_validator::config::*;
use std::time::Duration;

#[test]
fn test_defaults() {
    let config = ValidatorConfig::default();
    assert_eq!(config.timeout_seconds, 3);
    assert_eq!(config.port, 65050);
    assert_eq!(config.read_buffer_size, 1024);
    assert_eq!(config.pacing(), Duration::from_millis(100));
    assert_eq!(config.mock_latency_min_millis, 50);
    assert_eq!(config.mock_latency_max_millis, 200);
    assert_eq!(config.pass_threshold_percent, 80.0);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_json_keeps_defaults() {
    let config = ValidatorConfig::from_json(r#"{"timeout_seconds": 5, "port": 7000}"#).unwrap();
    assert_eq!(config.timeout(), Duration::from_secs(5));
    assert_eq!(config.port, 7000);
    assert_eq!(config.pacing_millis, 100);
}

#[test]
fn test_invalid_values_are_rejected() {
    assert!(matches!(
        ValidatorConfig::from_json(r#"{"timeout_seconds": 0}"#),
        Err(ConfigError::Invalid { field: "timeout_seconds", .. })
    ));
    assert!(matches!(
        ValidatorConfig::from_json(r#"{"mock_latency_min_millis": 300}"#),
        Err(ConfigError::Invalid { field: "mock_latency_min_millis", .. })
    ));
    assert!(matches!(
        ValidatorConfig::from_json(r#"{"pass_threshold_percent": 120.0}"#),
        Err(ConfigError::Invalid { .. })
    ));
    assert!(matches!(ValidatorConfig::from_json("{"), Err(ConfigError::Parse(_))));
    assert!(matches!(
        ValidatorConfig::load("/nonexistent/drs.json"),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn test_timeout_override_clamping() {
    let config = ValidatorConfig::default();
    assert_eq!(config.effective_timeout(None), Duration::from_secs(DEFAULT_TIMEOUT_SECONDS));
    assert_eq!(config.effective_timeout(Some(10)), Duration::from_secs(10));
    assert_eq!(config.effective_timeout(Some(0)), Duration::from_secs(MIN_TIMEOUT_SECONDS));
    assert_eq!(config.effective_timeout(Some(600)), Duration::from_secs(MAX_TIMEOUT_SECONDS));
}
