//! Operator configuration – reads/writes `~/.teleos/config.toml`.
//!
//! Every scale, dead-zone, and axis-inversion flag the adapters use is a
//! config field: the screen→base and stick→frame mappings encode how the
//! robot is mounted relative to the operator, so a different cell layout
//! means a config change, not a code change.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use teleos_fusion::adapters::{GamepadSettings, KeySettings, PointerSettings, SpatialSettings};
use teleos_fusion::stiffness::StiffnessLimits;
use teleos_runtime::TeleopNodeConfig;
use teleos_types::TeleopError;

/// Persisted operator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Goal publication cadence (ticks per second).
    pub publish_rate_hz: u32,
    pub key: KeySettings,
    pub pointer: PointerSettings,
    pub spatial: SpatialSettings,
    pub gamepad: GamepadSettings,
    pub stiffness: StiffnessLimits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            publish_rate_hz: 100,
            key: KeySettings::default(),
            pointer: PointerSettings::default(),
            spatial: SpatialSettings::default(),
            gamepad: GamepadSettings::default(),
            stiffness: StiffnessLimits::default(),
        }
    }
}

impl Config {
    /// The slice of the config the runtime node consumes.
    pub fn node_config(&self) -> TeleopNodeConfig {
        TeleopNodeConfig {
            publish_rate_hz: self.publish_rate_hz,
            key: self.key,
            pointer: self.pointer,
            spatial: self.spatial,
            gamepad: self.gamepad,
        }
    }
}

/// Return the path to `~/.teleos/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".teleos").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, TeleopError> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, TeleopError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        TeleopError::Config(format!("failed to read config at {}: {}", path.display(), e))
    })?;
    let mut cfg: Config = toml::from_str(&raw)
        .map_err(|e| TeleopError::Config(format!("failed to parse config: {}", e)))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `TELEOS_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `TELEOS_RATE_HZ` | `publish_rate_hz` |
/// | `TELEOS_STIFFNESS_TRANSLATIONAL` | `stiffness.translational` |
/// | `TELEOS_STIFFNESS_ROTATIONAL` | `stiffness.rotational` |
///
/// Unparseable values are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("TELEOS_RATE_HZ")
        && let Ok(rate) = v.parse::<u32>()
    {
        cfg.publish_rate_hz = rate;
    }
    if let Ok(v) = std::env::var("TELEOS_STIFFNESS_TRANSLATIONAL")
        && let Ok(k) = v.parse::<f64>()
    {
        cfg.stiffness.translational = k;
    }
    if let Ok(v) = std::env::var("TELEOS_STIFFNESS_ROTATIONAL")
        && let Ok(k) = v.parse::<f64>()
    {
        cfg.stiffness.rotational = k;
    }
}

/// Save the config to disk, creating `~/.teleos/` if necessary.
pub fn save(cfg: &Config) -> Result<(), TeleopError> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), TeleopError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            TeleopError::Config(format!("failed to create config directory: {}", e))
        })?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| TeleopError::Config(format!("failed to serialize config: {}", e)))?;
    fs::write(path, raw).map_err(|e| {
        TeleopError::Config(format!("failed to write config at {}: {}", path.display(), e))
    })
}
