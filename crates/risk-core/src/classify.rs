//! Frame classification: the scoring policy applied to one frame.
//!
//! # Rules
//!
//! Evaluated in this order; every rule is checked, none short-circuits:
//!
//! 1. **Dangerous object:** each distinct dangerous label adds `dangerous_object`.
//! 2. **Suspicious object:** each distinct suspicious label adds `suspicious_object`.
//! 3. **Crowd:** at least `crowd_person_threshold` people adds `crowd`.
//! 4. **Person with danger:** a person plus any dangerous object adds `person_with_danger`.
//! 5. **Crowd with danger:** a crowd plus any dangerous or suspicious object adds `crowd_with_danger`.
//! 6. **Political text:** any political keyword adds `party_text`.
//! 7. **Bribery text:** any bribery keyword adds `bribery_text`.
//!
//! The raw sum is clamped to `[0, max_risk]` and divided by `max_risk`.

use std::sync::Arc;

use serde_json::Value;
use shield_verdict_model::detection::NormalizedDetection;
use shield_verdict_model::tags::TagSet;
use shield_verdict_model::verdict::{FrameVerdict, NO_ACTIVITY_SUMMARY};

use crate::keywords::find_keywords;
use crate::normalize::normalize;
use crate::policy::{ScoringPolicy, Signal};

pub const TAG_DANGEROUS_OBJECT: &str = "dangerous_object_present";
pub const TAG_SUSPICIOUS_OBJECT: &str = "suspicious_object_present";
pub const TAG_CROWD: &str = "crowd_present";
pub const TAG_PERSON_WITH_DANGER: &str = "person_with_weapon_or_fire";
pub const TAG_CROWD_WITH_DANGER: &str = "crowd_with_danger";
pub const TAG_POLITICAL_TEXT: &str = "political_text_present";
pub const TAG_BRIBERY_TEXT: &str = "bribery_text_present";

/// Matched keywords listed in a reason line.
const MAX_REASON_KEYWORDS: usize = 5;

/// Running tally while rules are evaluated.
struct ScoreCard<'p> {
    policy: &'p ScoringPolicy,
    tags: TagSet,
    reasons: Vec<String>,
    raw_score: f64,
}

impl<'p> ScoreCard<'p> {
    fn new(policy: &'p ScoringPolicy) -> Self {
        Self {
            policy,
            tags: TagSet::new(),
            reasons: Vec::new(),
            raw_score: 0.0,
        }
    }

    fn fire(&mut self, tag: &str, signal: Signal, reason: String) {
        self.tags.insert(tag);
        self.reasons.push(reason);
        self.raw_score += self.policy.weight(signal);
    }

    fn normalized_score(&self) -> f64 {
        let max_risk = self.policy.max_risk;
        if !max_risk.is_finite() || max_risk <= 0.0 {
            return 0.0;
        }
        self.raw_score.clamp(0.0, max_risk) / max_risk
    }
}

/// Score one frame. Pure and total: the same inputs always give the same verdict.
pub fn classify(detection: &NormalizedDetection, text: &str, policy: &ScoringPolicy) -> FrameVerdict {
    let mut card = ScoreCard::new(policy);

    let dangerous: Vec<&str> = detection
        .labels()
        .filter(|label| policy.dangerous_objects.contains(*label))
        .collect();
    for label in &dangerous {
        card.fire(
            TAG_DANGEROUS_OBJECT,
            Signal::DangerousObject,
            format!(
                "Dangerous object detected: {label} (x{})",
                detection.count(label)
            ),
        );
    }

    let suspicious: Vec<&str> = detection
        .labels()
        .filter(|label| policy.suspicious_objects.contains(*label))
        .collect();
    for label in &suspicious {
        card.fire(
            TAG_SUSPICIOUS_OBJECT,
            Signal::SuspiciousObject,
            format!(
                "Suspicious object detected: {label} (x{})",
                detection.count(label)
            ),
        );
    }

    let people = detection.person_count();
    let crowd = people >= policy.crowd_person_threshold;
    if crowd {
        card.fire(
            TAG_CROWD,
            Signal::Crowd,
            format!(
                "Crowd of {people} people detected (threshold {})",
                policy.crowd_person_threshold
            ),
        );
    }

    if people >= 1 && !dangerous.is_empty() {
        card.fire(
            TAG_PERSON_WITH_DANGER,
            Signal::PersonWithDanger,
            format!(
                "Person present alongside dangerous objects: {}",
                dangerous.join(", ")
            ),
        );
    }

    if crowd && (!dangerous.is_empty() || !suspicious.is_empty()) {
        card.fire(
            TAG_CROWD_WITH_DANGER,
            Signal::CrowdWithDanger,
            "Crowd present alongside dangerous or suspicious objects".to_string(),
        );
    }

    let political = find_keywords(text, &policy.political_keywords);
    if !political.is_empty() {
        card.fire(
            TAG_POLITICAL_TEXT,
            Signal::PartyText,
            format!("Political keywords in text: {}", keyword_list(&political)),
        );
    }

    let bribery = find_keywords(text, &policy.bribery_keywords);
    if !bribery.is_empty() {
        card.fire(
            TAG_BRIBERY_TEXT,
            Signal::BriberyText,
            format!("Bribery keywords in text: {}", keyword_list(&bribery)),
        );
    }

    let risk_score = card.normalized_score();
    let summary = if card.tags.is_empty() {
        NO_ACTIVITY_SUMMARY.to_string()
    } else {
        card.tags.join("; ")
    };

    tracing::debug!(
        risk_score,
        tags = %summary,
        objects = detection.objects().len(),
        "Classified frame"
    );

    FrameVerdict {
        tags: card.tags,
        risk_score,
        summary,
        reasons: card.reasons,
        counts: detection.counts().clone(),
        text: text.to_string(),
    }
}

fn keyword_list(keywords: &[String]) -> String {
    keywords
        .iter()
        .take(MAX_REASON_KEYWORDS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A classifier bound to one policy, shareable across worker tasks.
#[derive(Debug, Clone)]
pub struct FrameClassifier {
    policy: Arc<ScoringPolicy>,
}

impl FrameClassifier {
    pub fn new(policy: Arc<ScoringPolicy>) -> Self {
        Self { policy }
    }

    /// Create a classifier with the built-in policy.
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(ScoringPolicy::default()))
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn classify(&self, detection: &NormalizedDetection, text: &str) -> FrameVerdict {
        classify(detection, text, &self.policy)
    }

    /// Normalize raw detector output, then classify it.
    pub fn classify_raw(&self, raw: &Value, text: &str) -> FrameVerdict {
        self.classify(&normalize(raw), text)
    }
}
