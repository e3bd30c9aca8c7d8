//! Score a single image.

use std::path::PathBuf;

use shield_common::config::AppConfig;
use shield_risk_core::classify::classify;
use shield_risk_core::normalize::normalize_json;

pub fn run(
    config: &AppConfig,
    detection: PathBuf,
    text: Option<String>,
    text_file: Option<PathBuf>,
    policy: Option<PathBuf>,
) -> anyhow::Result<()> {
    let policy = super::load_policy(config, policy)?;

    let raw = std::fs::read_to_string(&detection)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", detection.display()))?;
    let detection = normalize_json(&raw);

    let text = match (text, text_file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?,
        (None, None) => String::new(),
    };

    let verdict = classify(&detection, text.trim(), &policy);
    tracing::info!(
        risk_score = verdict.risk_score,
        level = %verdict.risk_level(),
        policy = %policy.version,
        "{}",
        verdict.summary
    );

    super::print_json(&verdict)
}
