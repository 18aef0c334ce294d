//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{PlaytraceError, PlaytraceResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory where exported session datasets are stored.
    pub output_dir: PathBuf,

    /// Default recording settings.
    pub recording: RecordingDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default recording parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingDefaults {
    /// Keys whose transitions are recorded into the dataset.
    pub recording_keys: Vec<String>,

    /// Key that ends the current session and triggers export.
    pub finish_key: String,

    /// Seconds of content discarded from the end of every session so the
    /// user's stopping motion is not kept as training signal.
    pub discard_tail_secs: f64,

    /// Offset added to every key timestamp at receipt, compensating for
    /// hook delivery latency. Typically a small negative number.
    pub key_delay_secs: f64,

    /// Maximum frame rate requested from the frame source.
    pub max_fps: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "playtrace=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: dirs_default_output(),
            recording: RecordingDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RecordingDefaults {
    fn default() -> Self {
        Self {
            recording_keys: vec![
                "w".to_string(),
                "a".to_string(),
                "s".to_string(),
                "d".to_string(),
            ],
            finish_key: "space".to_string(),
            discard_tail_secs: 3.0,
            key_delay_secs: -0.010,
            max_fps: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Reject configurations the capture pipeline cannot honor.
    pub fn validate(&self) -> PlaytraceResult<()> {
        if self.recording.recording_keys.is_empty() {
            return Err(PlaytraceError::config(
                "recording_keys must name at least one key",
            ));
        }
        if self.recording.finish_key.is_empty() {
            return Err(PlaytraceError::config("finish_key must not be empty"));
        }
        if self.recording.discard_tail_secs < 0.0 || !self.recording.discard_tail_secs.is_finite() {
            return Err(PlaytraceError::config(
                "discard_tail_secs must be a finite value >= 0",
            ));
        }
        if !self.recording.key_delay_secs.is_finite() {
            return Err(PlaytraceError::config("key_delay_secs must be finite"));
        }
        if self.recording.max_fps == 0 {
            return Err(PlaytraceError::config("max_fps must be at least 1"));
        }
        Ok(())
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("playtrace").join("config.json")
}

/// Default dataset output directory.
fn dirs_default_output() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("playtrace").join("sessions")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_key_set_rejected() {
        let mut config = AppConfig::default();
        config.recording.recording_keys.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_tail_rejected() {
        let mut config = AppConfig::default();
        config.recording.discard_tail_secs = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_key_delay_is_allowed() {
        let mut config = AppConfig::default();
        config.recording.key_delay_secs = -0.25;
        assert!(config.validate().is_ok());
    }
}
