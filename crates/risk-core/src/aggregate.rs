//! Temporal aggregation of frame verdicts into a video verdict.
//!
//! The fold is well defined on any prefix of a video, including an empty
//! one, so a caller that stops sampling early can still aggregate what it
//! has. Text and sample verdicts depend on frame order; everything else is
//! order-independent.

use std::collections::{BTreeMap, BTreeSet};

use shield_verdict_model::verdict::{FrameVerdict, VideoVerdict};

/// Frame verdicts retained verbatim in a video verdict.
pub const SAMPLE_VERDICT_CAP: usize = 10;

/// Incremental video aggregation. Feed verdicts in frame order.
#[derive(Debug, Clone, Default)]
pub struct VideoAccumulator {
    frames: usize,
    /// Running mean; exact when every frame has the same score.
    mean_score: f64,
    peak_score: f64,
    tags: BTreeSet<String>,
    tag_counts: BTreeMap<String, usize>,
    texts: Vec<String>,
    samples: Vec<FrameVerdict>,
}

impl VideoAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one verdict. Only its text and, for the first
    /// [`SAMPLE_VERDICT_CAP`] frames, the verdict itself are copied.
    pub fn push(&mut self, verdict: &FrameVerdict) {
        self.frames += 1;
        self.mean_score += (verdict.risk_score - self.mean_score) / self.frames as f64;
        self.peak_score = self.peak_score.max(verdict.risk_score);

        for tag in verdict.tags.iter() {
            self.tags.insert(tag.to_string());
            *self.tag_counts.entry(tag.to_string()).or_insert(0) += 1;
        }

        if !verdict.text.is_empty() {
            self.texts.push(verdict.text.clone());
        }

        if self.samples.len() < SAMPLE_VERDICT_CAP {
            self.samples.push(verdict.clone());
        }
    }

    pub fn frames_seen(&self) -> usize {
        self.frames
    }

    pub fn finish(self) -> VideoVerdict {
        if self.frames == 0 {
            return VideoVerdict::empty();
        }

        let risk_score = round2(self.mean_score);
        let summary = self
            .tags
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" | ");
        let reasons = self
            .tags
            .iter()
            .map(|tag| format!("Detected '{tag}' in multiple frames"))
            .collect();

        tracing::debug!(
            frames = self.frames,
            risk_score,
            tags = %summary,
            "Aggregated video verdict"
        );

        VideoVerdict {
            risk_score,
            peak_risk_score: round2(self.peak_score),
            tags: self.tags,
            tag_counts: self.tag_counts,
            summary,
            reasons,
            combined_text: self.texts.join(" "),
            sample_verdicts: self.samples,
            frames_analyzed: self.frames,
        }
    }
}

impl<'a> Extend<&'a FrameVerdict> for VideoAccumulator {
    fn extend<I: IntoIterator<Item = &'a FrameVerdict>>(&mut self, iter: I) {
        for verdict in iter {
            self.push(verdict);
        }
    }
}

/// Fold frame verdicts, given in frame order, into one video verdict.
pub fn aggregate(frame_verdicts: &[FrameVerdict]) -> VideoVerdict {
    let mut acc = VideoAccumulator::new();
    acc.extend(frame_verdicts);
    acc.finish()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
