// CLASSIFICATION: COMMUNITY
// Filename: config.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{StateError, StateResult};

/// Locations of the signal artifacts exchanged with the morph driver and
/// the shell front-end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalPaths {
    pub emergency_morph: PathBuf,
    pub morph_frequency: PathBuf,
    pub attacker_blocklist: PathBuf,
    pub command_delay: PathBuf,
    pub intel_dir: PathBuf,
}

impl SignalPaths {
    /// Standard file names under `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            emergency_morph: dir.join("emergency_morph.signal"),
            morph_frequency: dir.join("morph_frequency.conf"),
            attacker_blocklist: dir.join("attacker_blocklist.txt"),
            command_delay: dir.join("behavior.conf"),
            intel_dir: dir.join("intel"),
        }
    }
}

/// Threat scoring weights and thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatConfig {
    pub coordination_window_secs: i64,
    pub min_coordinated_attackers: usize,
    pub rapid_morph_threshold: f32,
    pub fake_errors_threshold: f32,
    pub add_delays_threshold: f32,
    pub attempt_weight: f32,
    pub exploit_weight: f32,
    pub coordination_bonus: f32,
}

impl Default for ThreatConfig {
    fn default() -> Self {
        Self {
            coordination_window_secs: 300,
            min_coordinated_attackers: 2,
            rapid_morph_threshold: 0.6,
            fake_errors_threshold: 0.7,
            add_delays_threshold: 0.5,
            attempt_weight: 1.0,
            exploit_weight: 0.1,
            coordination_bonus: 0.3,
        }
    }
}

/// Adaptive responder settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptConfig {
    pub default_morph_frequency_minutes: u32,
    pub elevated_morph_frequency_minutes: u32,
    pub command_delay_ms: u32,
}

impl Default for AdaptConfig {
    fn default() -> Self {
        Self {
            default_morph_frequency_minutes: 360,
            elevated_morph_frequency_minutes: 15,
            command_delay_ms: 1500,
        }
    }
}

/// Engine configuration: optional TOML file plus `CERBERUS_*` overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub signal_dir: PathBuf,
    pub state_file: PathBuf,
    pub profiles_file: Option<PathBuf>,
    pub threat: ThreatConfig,
    pub adapt: AdaptConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            signal_dir: PathBuf::from("build/signals"),
            state_file: PathBuf::from("build/morph_state.conf"),
            profiles_file: None,
            threat: ThreatConfig::default(),
            adapt: AdaptConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse TOML text; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> StateResult<Self> {
        toml::from_str(text).map_err(|e| StateError::Config(e.to_string()))
    }

    /// Load from `path` when given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> StateResult<Self> {
        let mut cfg = match path {
            Some(p) => {
                let text = std::fs::read_to_string(p)
                    .map_err(|e| StateError::Config(format!("{}: {}", p.display(), e)))?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        cfg.apply_env();
        debug!("engine config: signals in {}", cfg.signal_dir.display());
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var("CERBERUS_SIGNAL_DIR") {
            self.signal_dir = PathBuf::from(dir);
        }
        if let Ok(file) = std::env::var("CERBERUS_STATE_FILE") {
            self.state_file = PathBuf::from(file);
        }
    }

    pub fn signals(&self) -> SignalPaths {
        SignalPaths::in_dir(&self.signal_dir)
    }
}

static CONFIG: Lazy<RwLock<EngineConfig>> = Lazy::new(|| {
    let mut cfg = EngineConfig::default();
    cfg.apply_env();
    RwLock::new(cfg)
});

/// Replace the global engine configuration.
pub fn set_config(cfg: EngineConfig) -> StateResult<()> {
    let mut guard = CONFIG.write().map_err(|_| StateError::LockPoisoned)?;
    *guard = cfg;
    Ok(())
}

/// Get a clone of the current configuration.
pub fn get_config() -> StateResult<EngineConfig> {
    CONFIG
        .read()
        .map_err(|_| StateError::LockPoisoned)
        .map(|g| g.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = EngineConfig::from_toml_str(
            "signal_dir = \"/run/cerberus\"\n[threat]\ncoordination_window_secs = 120\n",
        )
        .unwrap();
        assert_eq!(cfg.signal_dir, PathBuf::from("/run/cerberus"));
        assert_eq!(cfg.threat.coordination_window_secs, 120);
        assert_eq!(cfg.threat.min_coordinated_attackers, 2);
        assert_eq!(cfg.adapt.default_morph_frequency_minutes, 360);
    }

    #[test]
    fn bad_toml_is_config_error() {
        assert!(matches!(
            EngineConfig::from_toml_str("signal_dir = ["),
            Err(StateError::Config(_))
        ));
    }

    #[test]
    #[serial]
    fn env_overrides_file() {
        std::env::set_var("CERBERUS_SIGNAL_DIR", "/tmp/cerberus-signals");
        let cfg = EngineConfig::load(None).unwrap();
        std::env::remove_var("CERBERUS_SIGNAL_DIR");
        assert_eq!(cfg.signal_dir, PathBuf::from("/tmp/cerberus-signals"));
        assert_eq!(
            cfg.signals().emergency_morph,
            PathBuf::from("/tmp/cerberus-signals/emergency_morph.signal")
        );
    }

    #[test]
    #[serial]
    fn global_roundtrip() {
        let mut cfg = get_config().unwrap();
        cfg.adapt.command_delay_ms = 42;
        set_config(cfg.clone()).unwrap();
        assert_eq!(get_config().unwrap().adapt.command_delay_ms, 42);
        set_config(EngineConfig::default()).unwrap();
    }
}
