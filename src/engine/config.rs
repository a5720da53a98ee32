//! Engine configuration — YAML load/save and the defaults everything assumes.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Tunable engine settings, consumed at startup. The engine never writes
/// these back; `save_config` exists for tooling that edits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pre-seeded substitution variables.
    pub variables: HashMap<String, String>,
    /// Action list fired once at startup, before any trigger.
    pub startup_actions: String,
    /// Ceiling on captured scalar values per snapshot store.
    pub snapshot_param_limit: usize,
    /// Capture parameters of devices nested inside rack chains.
    pub snapshot_include_nested: bool,
    /// Ticks before a failed store's name notice reverts.
    pub snapshot_restore_delay: u32,
    /// Ramp length used when a `RAMP` flag carries no number.
    pub snapshot_ramp_ticks: u32,
    /// Key sequences by trigger identity instead of display name.
    pub strict_seq_identity: bool,
    /// Track whose recalls load the morph set instead of applying.
    pub morph_track_name: String,
    /// Seed for the engine's deterministic RNG.
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variables: HashMap::new(),
            startup_actions: String::new(),
            snapshot_param_limit: 500,
            snapshot_include_nested: false,
            snapshot_restore_delay: 8,
            snapshot_ramp_ticks: 8,
            strict_seq_identity: false,
            morph_track_name: "MORPH".to_string(),
            seed: 1,
        }
    }
}

/// Default location for the config file.
pub fn default_config_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".stagehand");
    path.push("config.yaml");
    path
}

/// Load a config from a YAML file. Returns defaults if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Config, io::Error> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Save a config to a YAML file, creating parent directories as needed.
pub fn save_config(path: &Path, config: &Config) -> Result<(), io::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let yaml = serde_yaml::to_string(config).map_err(io::Error::other)?;
    std::fs::write(path, yaml)
}
