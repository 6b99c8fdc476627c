use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use cadence2d::config::EngineConfig;
use cadence2d::error::ConfigError;
use cadence2d::KeyCode;

#[test]
fn defaults_match_documented_values() {
    let config = EngineConfig::default();
    assert_eq!(config.title, None);
    assert_eq!((config.width, config.height), (1280, 720));
    assert_eq!(config.update_frequency, 60);
    assert_eq!(config.max_frame_delta(), Duration::from_millis(1000));
    assert!(config.auto_scaling);
    assert!(config.disable_context_menu);
    assert!(config.load_modules.is_empty());
    assert_eq!(config.debug_toggle_key, KeyCode::F3);
    assert_eq!(config.asset_root, PathBuf::from("."));
}

/// A config file only needs the fields it changes.
#[test]
fn sparse_json_keeps_defaults() {
    let config = EngineConfig::from_json_str(r#"{ "width": 320, "load_modules": ["debug"] }"#).unwrap();
    assert_eq!(config.width, 320);
    assert_eq!(config.height, 720);
    assert_eq!(config.load_modules, vec!["debug".to_string()]);
}

#[test]
fn update_interval_follows_frequency() {
    let config = EngineConfig { update_frequency: 100, ..Default::default() };
    assert_eq!(config.update_interval(), Duration::from_millis(10));
}

#[test]
fn zero_frequency_is_rejected() {
    let err = EngineConfig::from_json_str(r#"{ "update_frequency": 0 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidUpdateFrequency), "got {err:?}");
}

#[test]
fn zero_resolution_is_rejected() {
    let err = EngineConfig::from_json_str(r#"{ "width": 0 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidResolution { width: 0, height: 720 }), "got {err:?}");
}

#[test]
fn max_frame_delta_must_be_in_range() {
    let err = EngineConfig::from_json_str(r#"{ "max_frame_delta_ms": 0 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidMaxFrameDelta(0)), "got {err:?}");

    let err = EngineConfig::from_json_str(r#"{ "max_frame_delta_ms": 1001 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidMaxFrameDelta(1001)), "got {err:?}");

    let config = EngineConfig::from_json_str(r#"{ "max_frame_delta_ms": 250 }"#).unwrap();
    assert_eq!(config.max_frame_delta(), Duration::from_millis(250));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = EngineConfig::from_json_str("{ width: }").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)), "got {err:?}");
}

#[test]
fn loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "title": "demo", "update_frequency": 30 }}"#).unwrap();

    let config = EngineConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.title.as_deref(), Some("demo"));
    assert_eq!(config.update_frequency, 30);
}

#[test]
fn missing_file_reports_path() {
    let err = EngineConfig::from_json_file("/definitely/not/here.json").unwrap_err();
    match err {
        ConfigError::Read { path, .. } => assert_eq!(path, PathBuf::from("/definitely/not/here.json")),
        other => panic!("expected read error, got {other:?}"),
    }
}
