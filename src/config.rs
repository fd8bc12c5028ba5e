//! Cabinet configuration, read from a TOML file.
//!
//! ```toml
//! [cabinet]
//! frame_interval_ms = 16
//! instructions_ms = 3000
//!
//! [audio]
//! muted = false
//! [audio.effects]
//! eat = 1
//!
//! [logging]
//! level = "info"
//! file = "rustcade.log"
//! ```
//!
//! A missing file means defaults. Command line flags override file values.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::cabinet::audio::default_effects;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CabinetConfig {
    /// Host frame period.
    pub frame_interval_ms: u64,
    /// How long the instructions overlay stays up before the game starts.
    pub instructions_ms: u64,
}

impl Default for CabinetConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            instructions_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub muted: bool,
    /// Effect id to number of terminal bell rings.
    pub effects: BTreeMap<String, u8>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            muted: false,
            effects: default_effects(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// The terminal belongs to the UI, so logs only go to this file. `None`
    /// disables logging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("rustcade.log".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cabinet: CabinetConfig,
    pub audio: AudioConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Writes the default configuration. Refuses to overwrite an existing file.
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if path.exists() {
            bail!("{} already exists", path.display());
        }
        let content = toml::to_string_pretty(&Config::default())?;
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=1000).contains(&self.cabinet.frame_interval_ms) {
            bail!(
                "cabinet.frame_interval_ms must be between 1 and 1000, got {}",
                self.cabinet.frame_interval_ms
            );
        }
        if self.cabinet.instructions_ms > 60_000 {
            bail!(
                "cabinet.instructions_ms must be at most 60000, got {}",
                self.cabinet.instructions_ms
            );
        }
        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<log::LevelFilter> {
        self.logging
            .level
            .parse()
            .map_err(|_| anyhow!("invalid logging.level: {}", self.logging.level))
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.cabinet.frame_interval_ms)
    }

    pub fn instructions_duration(&self) -> Duration {
        Duration::from_millis(self.cabinet.instructions_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[cabinet]\ninstructions_ms = 500\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.instructions_duration(), Duration::from_millis(500));
        assert_eq!(config.frame_interval(), Duration::from_millis(16));
        assert_eq!(config.audio.effects.get("eat"), Some(&1));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut config = Config::default();
        config.cabinet.frame_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "loud".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn create_default_round_trips_and_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Config::create_default(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());
        assert!(Config::create_default(&path).is_err());
    }
}
