//! Log setup for the cabinet binary.
//!
//! The terminal is in raw mode with an alternate screen while the cabinet
//! runs, so records go to the configured file only.

use std::fs::OpenOptions;
use std::io::Write;

use anyhow::{Context, Result};
use log::LevelFilter;

use crate::config::Config;

/// Level from `-v` flags, falling back to the configured level.
pub fn level_for(config: &Config, verbosity: u8) -> Result<LevelFilter> {
    Ok(match verbosity {
        0 => config.log_level()?,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    })
}

pub fn init_logging(config: &Config, verbosity: u8) -> Result<()> {
    let Some(path) = config.logging.file.as_deref() else {
        log::set_max_level(LevelFilter::Off);
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path))?;

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level_for(config, verbosity)?)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.target(),
                record.args()
            )
        });
    builder
        .try_init()
        .with_context(|| format!("installing logger for {}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn verbosity_overrides_config_level() {
        let config = Config::default();
        assert_eq!(level_for(&config, 0).unwrap(), LevelFilter::Info);
        assert_eq!(level_for(&config, 1).unwrap(), LevelFilter::Debug);
        assert_eq!(level_for(&config, 3).unwrap(), LevelFilter::Trace);
    }

    #[test]
    fn second_logger_install_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cabinet.log");
        let mut config = Config::default();
        config.logging.file = Some(path.to_string_lossy().into_owned());

        init_logging(&config, 0).unwrap();
        log::info!("cabinet up");
        assert!(path.exists());

        let err = init_logging(&config, 0).unwrap_err();
        assert!(err.to_string().contains("installing logger"));
    }
}
