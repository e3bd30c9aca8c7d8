//! Frame and video verdicts.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::tags::TagSet;

/// Summary emitted when no scoring rule fires for a frame.
pub const NO_ACTIVITY_SUMMARY: &str = "no_suspicious_activity_detected";

/// The assessment of a single image or sampled video frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameVerdict {
    /// Tags in the order their rules fired.
    pub tags: TagSet,
    /// Normalized risk in `[0.0, 1.0]`.
    pub risk_score: f64,
    /// `"; "`-joined tags, or [`NO_ACTIVITY_SUMMARY`].
    pub summary: String,
    /// One human-readable line per fired rule.
    pub reasons: Vec<String>,
    /// Per-label object counts the verdict was computed from.
    pub counts: BTreeMap<String, usize>,
    /// Text extracted from the frame (possibly empty).
    pub text: String,
}

impl FrameVerdict {
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.risk_score)
    }
}

/// The assessment of a whole video, folded from its frame verdicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoVerdict {
    /// Mean frame risk, rounded to two decimals.
    pub risk_score: f64,
    /// Highest single-frame risk, rounded to two decimals.
    pub peak_risk_score: f64,
    pub tags: BTreeSet<String>,
    /// Number of frames in which each tag appeared.
    pub tag_counts: BTreeMap<String, usize>,
    /// `" | "`-joined tags.
    pub summary: String,
    pub reasons: Vec<String>,
    /// Non-empty frame texts joined by single spaces, in frame order.
    pub combined_text: String,
    /// The first few frame verdicts, kept for inspection.
    pub sample_verdicts: Vec<FrameVerdict>,
    pub frames_analyzed: usize,
}

impl VideoVerdict {
    /// The verdict for a video with no analyzable frames.
    pub fn empty() -> Self {
        Self {
            risk_score: 0.0,
            peak_risk_score: 0.0,
            tags: BTreeSet::new(),
            tag_counts: BTreeMap::new(),
            summary: String::new(),
            reasons: Vec::new(),
            combined_text: String::new(),
            sample_verdicts: Vec::new(),
            frames_analyzed: 0,
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.risk_score)
    }
}

/// Coarse risk bands used by report triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Below 0.3.
    Low,
    /// 0.3 up to 0.7.
    Medium,
    /// 0.7 up to 0.9.
    High,
    /// 0.9 and above.
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 0.9 => RiskLevel::Critical,
            s if s >= 0.7 => RiskLevel::High,
            s if s >= 0.3 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
