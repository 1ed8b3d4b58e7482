//! Unit tests for the config module
//!
//! Tests cover:
//! - Defaults and partial files
//! - Environment overrides
//! - Feeding the stage from config

use disputecast::config::{Config, PlaybackConfig, SCENARIO_ENV, SPEED_ENV};
use disputecast::errors::DisputecastError;
use disputecast::playback::Stage;
use disputecast::script::ScenarioLibrary;
use std::fs;

#[test]
fn test_explicit_path_missing_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(Config::load(missing.to_str()).is_err());
}

#[test]
fn test_env_overrides_file_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("disputecast.toml");
    fs::write(
        &path,
        "[playback]\ndefault_speed = 0.5\ndefault_scenario = \"duplicate-charge\"\n",
    )
    .unwrap();

    std::env::set_var(SPEED_ENV, "1.5");
    std::env::set_var(SCENARIO_ENV, "undelivered-goods");
    let config = Config::load(path.to_str());
    std::env::remove_var(SPEED_ENV);
    std::env::remove_var(SCENARIO_ENV);

    let config = config.unwrap();
    assert_eq!(config.playback.default_speed, 1.5);
    assert_eq!(
        config.playback.default_scenario.as_deref(),
        Some("undelivered-goods")
    );
}

#[test]
fn test_stage_uses_configured_speed_and_scenario() {
    let config = PlaybackConfig {
        default_speed: 2.0,
        default_scenario: Some("undelivered-goods".into()),
        ..Default::default()
    };
    let stage = Stage::new(ScenarioLibrary::builtin(), &config).unwrap();
    assert_eq!(stage.transport().speed.get(), 2.0);
    assert_eq!(stage.transport().selected_scenario, "undelivered-goods");
}

#[test]
fn test_stage_clamps_nonpositive_speed() {
    let config = PlaybackConfig {
        default_speed: -3.0,
        ..Default::default()
    };
    let stage = Stage::new(ScenarioLibrary::builtin(), &config).unwrap();
    assert_eq!(stage.transport().speed.get(), 0.25);
}

#[test]
fn test_stage_rejects_unknown_configured_scenario() {
    let config = PlaybackConfig {
        default_scenario: Some("lost-card".into()),
        ..Default::default()
    };
    let result = Stage::new(ScenarioLibrary::builtin(), &config);
    assert!(matches!(result, Err(DisputecastError::UnknownScenario(_))));
}

#[test]
fn test_stage_with_empty_library_is_config_error() {
    let result = Stage::new(ScenarioLibrary::new(), &PlaybackConfig::default());
    assert!(matches!(result, Err(DisputecastError::Config(_))));
}

#[test]
fn test_custom_speed_steps() {
    let config = PlaybackConfig {
        speed_steps: vec![4.0, 1.0, 0.0, 8.0],
        ..Default::default()
    };
    let mut stage = Stage::new(ScenarioLibrary::builtin(), &config).unwrap();
    assert_eq!(stage.speed_up().get(), 4.0);
    assert_eq!(stage.speed_up().get(), 8.0);
    assert_eq!(stage.speed_up().get(), 8.0);
    assert_eq!(stage.slow_down().get(), 4.0);
    assert_eq!(stage.slow_down().get(), 1.0);
    assert_eq!(stage.slow_down().get(), 1.0);
}
