//! Re-score a recorded capture through the frame pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use shield_common::config::AppConfig;
use shield_frame_pipeline::analyzer::{MediaAnalyzer, PipelineConfig};
use shield_frame_pipeline::collaborators::SamplingConfig;
use shield_frame_pipeline::replay::ReplayCapture;
use shield_risk_core::classify::FrameClassifier;

pub async fn run(
    config: &AppConfig,
    capture: PathBuf,
    workers: Option<usize>,
    frame_interval: Option<u32>,
    max_frames: Option<usize>,
    fps: f64,
    policy: Option<PathBuf>,
) -> anyhow::Result<()> {
    let policy = super::load_policy(config, policy)?;
    let replay = ReplayCapture::load(&capture)
        .map_err(|e| anyhow::anyhow!("Failed to load capture: {e}"))?
        .with_fps(fps);
    let replay = Arc::new(replay);

    let mut pipeline = PipelineConfig::from(&config.pipeline);
    if let Some(workers) = workers {
        anyhow::ensure!(workers > 0, "--workers must be at least 1");
        pipeline.worker_pool_size = workers;
    }

    let mut sampling = SamplingConfig::from(&config.pipeline);
    if let Some(interval) = frame_interval {
        anyhow::ensure!(interval > 0, "--frame-interval must be at least 1");
        sampling.frame_interval = interval;
    }
    if max_frames.is_some() {
        sampling.max_frames = max_frames;
    }

    tracing::info!(
        capture = %capture.display(),
        workers = pipeline.worker_pool_size,
        interval = sampling.frame_interval,
        policy = %policy.version,
        "Analyzing capture"
    );

    let analyzer = MediaAnalyzer::new(
        replay.clone(),
        replay.clone(),
        FrameClassifier::new(Arc::new(policy)),
        pipeline,
    );
    let video = analyzer
        .analyze_video(replay.as_ref(), &sampling)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to sample capture: {e}"))?;

    tracing::info!(
        risk_score = video.risk_score,
        level = %video.risk_level(),
        "{}",
        video.summary
    );

    super::print_json(&video)
}
