//! Fold recorded frame verdicts into a video verdict.

use std::path::PathBuf;

use shield_risk_core::aggregate::VideoAccumulator;
use shield_verdict_model::verdict::FrameVerdict;

pub fn run(verdicts: PathBuf) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&verdicts)
        .map_err(|_| anyhow::anyhow!("Verdicts file not found: {}", verdicts.display()))?;

    let mut acc = VideoAccumulator::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let verdict: FrameVerdict = serde_json::from_str(line)
            .map_err(|e| anyhow::anyhow!("Invalid frame verdict on line {}: {e}", line_no + 1))?;
        acc.push(&verdict);
    }

    tracing::info!(frames = acc.frames_seen(), "Aggregating frame verdicts");
    let video = acc.finish();
    tracing::info!(
        risk_score = video.risk_score,
        level = %video.risk_level(),
        "{}",
        video.summary
    );

    super::print_json(&video)
}
