//! Configuration Management
//!
//! Loads playback and UI settings from TOML files.
//! Configuration includes:
//! - Playback defaults (speed, scenario, speed steps, autoplay)
//! - UI settings (theme, timestamps)
//! - An optional directory of extra scenario scripts

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::playback::timing::DEFAULT_SPEED_STEPS;

/// Environment override for the playback speed multiplier
pub const SPEED_ENV: &str = "DISPUTECAST_SPEED";
/// Environment override for the initially selected scenario
pub const SCENARIO_ENV: &str = "DISPUTECAST_SCENARIO";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub ui: UiConfig,

    /// Directory of extra `*.json` scenario scripts
    #[serde(default)]
    pub scripts_dir: Option<PathBuf>,
}

/// Transport defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Speed multiplier at startup (1.0 = normal)
    #[serde(default = "default_speed")]
    pub default_speed: f64,
    /// Scenario selected at startup; first in the library when unset
    #[serde(default)]
    pub default_scenario: Option<String>,
    /// Multipliers `+`/`-` step through
    #[serde(default = "default_speed_steps")]
    pub speed_steps: Vec<f64>,
    /// Start playing without waiting for a key press
    #[serde(default)]
    pub autoplay: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_speed: default_speed(),
            default_scenario: None,
            speed_steps: default_speed_steps(),
            autoplay: false,
        }
    }
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Color theme: "bank", "mono"
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Show wall-clock reveal times next to turns
    #[serde(default)]
    pub show_timestamps: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            show_timestamps: false,
        }
    }
}

fn default_speed() -> f64 {
    1.0
}
fn default_speed_steps() -> Vec<f64> {
    DEFAULT_SPEED_STEPS.to_vec()
}
fn default_theme() -> String {
    "bank".to_string()
}

impl Config {
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config: Config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config from {}", p))?;
                toml::from_str(&content).context("Failed to parse config")?
            }
            None => {
                let mut default_paths = vec![PathBuf::from("disputecast.toml")];
                if let Some(home) = dirs::home_dir() {
                    default_paths.push(home.join(".config/disputecast/config.toml"));
                }

                let mut loaded: Option<Config> = None;
                for p in &default_paths {
                    if let Ok(content) = std::fs::read_to_string(p) {
                        loaded = Some(toml::from_str(&content).with_context(|| {
                            format!("Failed to parse config {}", p.display())
                        })?);
                        tracing::debug!(path = %p.display(), "Loaded config");
                        break;
                    }
                }
                loaded.unwrap_or_default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Override with environment variables. Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(speed) = std::env::var(SPEED_ENV) {
            match speed.parse::<f64>() {
                Ok(s) => self.playback.default_speed = s,
                Err(_) => tracing::warn!(value = %speed, "Ignoring invalid {}", SPEED_ENV),
            }
        }
        if let Ok(scenario) = std::env::var(SCENARIO_ENV) {
            if !scenario.trim().is_empty() {
                self.playback.default_scenario = Some(scenario.trim().to_string());
            }
        }
    }
}
