//! Per-frame analysis on a bounded worker pool.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use shield_common::config::PipelineDefaults;
use shield_common::error::ShieldResult;
use shield_risk_core::aggregate::VideoAccumulator;
use shield_risk_core::classify::FrameClassifier;
use shield_risk_core::normalize::normalize;
use shield_verdict_model::detection::NormalizedDetection;
use shield_verdict_model::verdict::{FrameVerdict, VideoVerdict};
use tokio::task::{JoinError, JoinSet};

use crate::collaborators::{Detector, Frame, FrameSampler, SamplingConfig, TextExtractor};

/// Worker pool configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Frames analyzed concurrently. Detector and OCR calls dominate the cost,
    /// so this bounds both memory and load on those services.
    pub worker_pool_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_pool_size: 4,
        }
    }
}

impl From<&PipelineDefaults> for PipelineConfig {
    fn from(defaults: &PipelineDefaults) -> Self {
        Self {
            worker_pool_size: defaults.worker_pool_size,
        }
    }
}

/// Runs detector and OCR per frame, then classifies and aggregates.
#[derive(Clone)]
pub struct MediaAnalyzer {
    detector: Arc<dyn Detector>,
    text_extractor: Arc<dyn TextExtractor>,
    classifier: FrameClassifier,
    config: PipelineConfig,
}

impl MediaAnalyzer {
    pub fn new(
        detector: Arc<dyn Detector>,
        text_extractor: Arc<dyn TextExtractor>,
        classifier: FrameClassifier,
        config: PipelineConfig,
    ) -> Self {
        Self {
            detector,
            text_extractor,
            classifier,
            config,
        }
    }

    /// Analyze a single image.
    pub async fn analyze_image(&self, frame: &Frame) -> FrameVerdict {
        analyze_frame(
            self.detector.as_ref(),
            self.text_extractor.as_ref(),
            &self.classifier,
            frame,
        )
        .await
    }

    /// Classify every frame, returning verdicts in input order.
    pub async fn classify_frames(&self, frames: Vec<Frame>) -> Vec<FrameVerdict> {
        let mut verdicts = Vec::with_capacity(frames.len());
        // In-memory frames cannot fail to sample.
        let _ = self
            .run_pool(frames.into_iter().map(Ok), |verdict| verdicts.push(verdict))
            .await;
        verdicts
    }

    /// Classify frames and fold them into a video verdict.
    pub async fn analyze_frames(&self, frames: Vec<Frame>) -> VideoVerdict {
        let started = Instant::now();
        let mut acc = VideoAccumulator::new();
        let _ = self
            .run_pool(frames.into_iter().map(Ok), |verdict| acc.push(&verdict))
            .await;
        finish_video(acc, started)
    }

    /// Sample a video and analyze the sampled frames as they are decoded.
    ///
    /// Only a sampler failure is an error; a video without frames yields an
    /// empty verdict.
    pub async fn analyze_video(
        &self,
        sampler: &dyn FrameSampler,
        sampling: &SamplingConfig,
    ) -> ShieldResult<VideoVerdict> {
        let started = Instant::now();
        let mut acc = VideoAccumulator::new();
        self.run_pool(sampler.sample(sampling), |verdict| acc.push(&verdict))
            .await?;
        if acc.frames_seen() == 0 {
            tracing::warn!("No frames sampled from video");
        }
        Ok(finish_video(acc, started))
    }

    /// Analyze frames on the worker pool, handing verdicts to `sink` in
    /// stream order.
    ///
    /// At most `worker_pool_size` frames are pulled from `frames` and held in
    /// flight; the next one is pulled only when a worker finishes. A frame
    /// whose worker panics is scored as empty. On a sampler error the
    /// in-flight workers are drained and the error is returned.
    async fn run_pool<I, F>(&self, mut frames: I, mut sink: F) -> ShieldResult<usize>
    where
        I: Iterator<Item = ShieldResult<Frame>> + Send,
        F: FnMut(FrameVerdict) + Send,
    {
        let workers = self.config.worker_pool_size.max(1);
        let mut tasks = JoinSet::new();
        let mut finished: BTreeMap<usize, FrameVerdict> = BTreeMap::new();
        let mut pulled = 0;
        let mut emitted = 0;
        let mut exhausted = false;

        tracing::debug!(workers, "Starting frame workers");

        loop {
            while !exhausted && tasks.len() < workers {
                match frames.next() {
                    Some(Ok(frame)) => {
                        self.spawn_worker(&mut tasks, pulled, frame);
                        pulled += 1;
                    }
                    Some(Err(e)) => {
                        tracing::warn!(
                            sampled = pulled,
                            in_flight = tasks.len(),
                            "Sampler failed, draining workers: {e}"
                        );
                        while tasks.join_next().await.is_some() {}
                        return Err(e);
                    }
                    None => exhausted = true,
                }
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };
            match joined {
                Ok((position, Ok(verdict))) => {
                    finished.insert(position, verdict);
                }
                Ok((position, Err(e))) => {
                    tracing::warn!(position, "Frame worker failed, scoring it as empty: {e}");
                    finished.insert(position, self.empty_verdict());
                }
                Err(e) => tracing::warn!("Frame worker was lost: {e}"),
            }

            while let Some(verdict) = finished.remove(&emitted) {
                sink(verdict);
                emitted += 1;
            }
        }

        // Only a lost worker leaves gaps; score them as empty.
        for position in emitted..pulled {
            let verdict = finished
                .remove(&position)
                .unwrap_or_else(|| self.empty_verdict());
            sink(verdict);
        }
        Ok(pulled)
    }

    /// Spawn one frame's analysis. The analysis runs in its own task so a
    /// panic is reported together with the frame position.
    fn spawn_worker(
        &self,
        tasks: &mut JoinSet<(usize, Result<FrameVerdict, JoinError>)>,
        position: usize,
        frame: Frame,
    ) {
        let detector = Arc::clone(&self.detector);
        let text_extractor = Arc::clone(&self.text_extractor);
        let classifier = self.classifier.clone();

        tasks.spawn(async move {
            let worker = tokio::spawn(async move {
                analyze_frame(
                    detector.as_ref(),
                    text_extractor.as_ref(),
                    &classifier,
                    &frame,
                )
                .await
            });
            (position, worker.await)
        });
    }

    fn empty_verdict(&self) -> FrameVerdict {
        self.classifier.classify(&NormalizedDetection::empty(), "")
    }
}

fn finish_video(acc: VideoAccumulator, started: Instant) -> VideoVerdict {
    let video = acc.finish();
    tracing::info!(
        frames = video.frames_analyzed,
        risk_score = video.risk_score,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Video analysis complete"
    );
    video
}

/// Run both collaborators for one frame, degrading failures to empty input.
async fn analyze_frame(
    detector: &dyn Detector,
    text_extractor: &dyn TextExtractor,
    classifier: &FrameClassifier,
    frame: &Frame,
) -> FrameVerdict {
    let (detected, extracted) =
        tokio::join!(detector.detect(frame), text_extractor.extract_text(frame));

    let detection = match detected {
        Ok(raw) => normalize(&raw),
        Err(e) => {
            tracing::warn!(frame = frame.index, "Detector failed, using empty detection: {e:#}");
            NormalizedDetection::empty()
        }
    };

    let text = match extracted {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            tracing::warn!(frame = frame.index, "Text extraction failed, using empty text: {e:#}");
            String::new()
        }
    };

    classifier.classify(&detection, &text)
}
