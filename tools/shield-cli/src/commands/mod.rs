pub mod aggregate;
pub mod analyze;
pub mod classify;
pub mod policy;

use std::path::PathBuf;

use serde::Serialize;
use shield_common::config::AppConfig;
use shield_risk_core::policy::ScoringPolicy;

/// Resolve the policy: explicit flag, then config file, then built-in default.
pub fn load_policy(config: &AppConfig, explicit: Option<PathBuf>) -> anyhow::Result<ScoringPolicy> {
    match explicit.or_else(|| config.policy_path.clone()) {
        Some(path) => ScoringPolicy::load(&path)
            .map_err(|e| anyhow::anyhow!("Failed to load policy {}: {e}", path.display())),
        None => {
            tracing::debug!("Using built-in scoring policy");
            Ok(ScoringPolicy::default())
        }
    }
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
