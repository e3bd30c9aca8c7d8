//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ShieldError, ShieldResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Scoring policy file. `None` means the built-in default policy.
    pub policy_path: Option<PathBuf>,

    /// Frame pipeline defaults.
    pub pipeline: PipelineDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default parameters for frame analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineDefaults {
    /// Maximum number of frames analyzed concurrently.
    pub worker_pool_size: usize,

    /// Analyze one frame out of every `frame_interval` decoded frames
    /// (30 is roughly one frame per second for typical footage).
    pub frame_interval: u32,

    /// Optional cap on the number of sampled frames per video.
    pub max_frames: Option<usize>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "shield_risk_core=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for PipelineDefaults {
    fn default() -> Self {
        Self {
            worker_pool_size: 4,
            frame_interval: 30,
            max_frames: None,
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
    /// Load config from the standard location.
    ///
    /// Defaults apply only when no config file exists; a file that is present
    /// but unreadable or invalid is an error.
    pub fn load() -> ShieldResult<Self> {
        Self::load_or_default(&config_file_path())
    }

    /// Load config from `path`, or defaults if nothing is there.
    pub fn load_or_default(path: &Path) -> ShieldResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(path).map_err(|e| ShieldError::config(format!("{}: {e}", path.display())))
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> ShieldResult<Self> {
        if !path.exists() {
            return Err(ShieldError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> ShieldResult<()> {
        if self.pipeline.worker_pool_size == 0 {
            return Err(ShieldError::config("pipeline.worker_pool_size must be at least 1"));
        }
        if self.pipeline.frame_interval == 0 {
            return Err(ShieldError::config("pipeline.frame_interval must be at least 1"));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("electionshield").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"pipeline": {"worker_pool_size": 8}}"#).unwrap();
        assert_eq!(config.pipeline.worker_pool_size, 8);
        assert_eq!(config.pipeline.frame_interval, 30);
        assert_eq!(config.logging.level, "info");
        assert!(config.policy_path.is_none());
    }

    #[test]
    fn zero_workers_rejected() {
        let mut config = AppConfig::default();
        config.pipeline.worker_pool_size = 0;
        assert!(matches!(config.validate(), Err(ShieldError::Config { .. })));
    }

    #[test]
    fn missing_file_reported() {
        let err = AppConfig::load_from(Path::new("/nonexistent/electionshield.json")).unwrap_err();
        assert!(matches!(err, ShieldError::FileNotFound { .. }));
    }

    #[test]
    fn absent_file_means_defaults() {
        let path = std::env::temp_dir().join("electionshield_test_absent/config.json");
        let config = AppConfig::load_or_default(&path).unwrap();
        assert_eq!(config.pipeline.worker_pool_size, 4);
    }

    #[test]
    fn present_but_invalid_file_is_an_error() {
        let dir = std::env::temp_dir().join("electionshield_test_invalid_config");
        std::fs::create_dir_all(&dir).unwrap();

        let path = dir.join("broken.json");
        std::fs::write(&path, "{ \"pipeline\": ").unwrap();
        let err = AppConfig::load_or_default(&path).unwrap_err();
        assert!(matches!(err, ShieldError::Config { .. }));
        assert!(err.to_string().contains("broken.json"));

        let path = dir.join("zero_workers.json");
        std::fs::write(&path, r#"{"pipeline": {"worker_pool_size": 0}}"#).unwrap();
        let err = AppConfig::load_or_default(&path).unwrap_err();
        assert!(err.to_string().contains("worker_pool_size"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
