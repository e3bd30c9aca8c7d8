//! Error types shared across ElectionShield crates.

use std::path::PathBuf;

/// Top-level error type for ElectionShield operations.
///
/// The scoring core itself never returns these; they surface at load time
/// (configuration, policy) and at the caller boundary (frame sampling).
#[derive(Debug, thiserror::Error)]
pub enum ShieldError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid scoring policy: {message}")]
    Policy { message: String },

    #[error("Frame sampling error: {message}")]
    Sampler { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ShieldError.
pub type ShieldResult<T> = Result<T, ShieldError>;

impl ShieldError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn policy(msg: impl Into<String>) -> Self {
        Self::Policy {
            message: msg.into(),
        }
    }

    pub fn sampler(msg: impl Into<String>) -> Self {
        Self::Sampler {
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_error_message_includes_reason() {
        let err = ShieldError::policy("max_risk must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid scoring policy: max_risk must be positive"
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ShieldError = io.into();
        assert!(matches!(err, ShieldError::Io(_)));
    }
}
