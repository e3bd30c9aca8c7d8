//! Inspect and validate scoring policies.

use std::path::PathBuf;

use shield_common::config::AppConfig;
use shield_risk_core::policy::{ScoringPolicy, Signal};

pub fn show(config: &AppConfig, policy: Option<PathBuf>) -> anyhow::Result<()> {
    let policy = super::load_policy(config, policy)?;
    super::print_json(&policy)
}

pub fn validate(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating policy at: {}", path.display());

    let policy = ScoringPolicy::load(&path).map_err(|e| anyhow::anyhow!("{e}"))?;

    println!("  Version: {}", policy.version);
    println!("  Crowd threshold: {} people", policy.crowd_person_threshold);
    println!(
        "  Objects: {} suspicious, {} dangerous",
        policy.suspicious_objects.len(),
        policy.dangerous_objects.len()
    );
    println!(
        "  Keywords: {} political, {} bribery",
        policy.political_keywords.len(),
        policy.bribery_keywords.len()
    );
    println!("  Weights (max risk {}):", policy.max_risk);
    for signal in Signal::ALL {
        println!("    {:<20} {}", signal.as_str(), policy.weight(signal));
    }
    println!("\nPolicy is valid.");

    Ok(())
}
