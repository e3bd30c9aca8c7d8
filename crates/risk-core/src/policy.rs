//! Scoring policy: thresholds, label sets, keyword sets, and weights.
//!
//! A policy is loaded and validated once at startup, then shared read-only
//! (typically behind an `Arc`). Replacing a policy means building a new value,
//! never mutating one that classification may be reading.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use shield_common::error::{ShieldError, ShieldResult};

/// Identifier of the built-in policy.
pub const DEFAULT_POLICY_VERSION: &str = "2024.1";

/// A scoring signal that carries a configurable weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Crowd,
    SuspiciousObject,
    DangerousObject,
    PartyText,
    BriberyText,
    /// Escalation: a person in the same frame as a dangerous object.
    PersonWithDanger,
    /// Escalation: a crowd in the same frame as a dangerous or suspicious object.
    CrowdWithDanger,
}

impl Signal {
    pub const ALL: [Signal; 7] = [
        Signal::Crowd,
        Signal::SuspiciousObject,
        Signal::DangerousObject,
        Signal::PartyText,
        Signal::BriberyText,
        Signal::PersonWithDanger,
        Signal::CrowdWithDanger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Crowd => "crowd",
            Signal::SuspiciousObject => "suspicious_object",
            Signal::DangerousObject => "dangerous_object",
            Signal::PartyText => "party_text",
            Signal::BriberyText => "bribery_text",
            Signal::PersonWithDanger => "person_with_danger",
            Signal::CrowdWithDanger => "crowd_with_danger",
        }
    }
}

/// Declarative scoring configuration consumed by the frame classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringPolicy {
    /// Policy identifier, reported alongside verdicts in logs.
    #[serde(default = "custom_version")]
    pub version: String,

    /// Minimum number of people that counts as a crowd.
    pub crowd_person_threshold: usize,

    /// Labels that suggest cash handouts (bags, envelopes, ...).
    pub suspicious_objects: BTreeSet<String>,

    /// Labels for weapons and fire. Weighted more heavily than suspicious ones.
    pub dangerous_objects: BTreeSet<String>,

    /// Campaign-related text triggers. Matched in list order.
    pub political_keywords: Vec<String>,

    /// Vote-buying text triggers. Matched in list order.
    pub bribery_keywords: Vec<String>,

    /// Weight added when each signal fires. Must name every [`Signal`].
    pub weights: BTreeMap<Signal, f64>,

    /// Raw score ceiling; the final score is `min(sum, max_risk) / max_risk`.
    pub max_risk: f64,
}

fn custom_version() -> String {
    "custom".to_string()
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        let set = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>();
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            version: DEFAULT_POLICY_VERSION.to_string(),
            crowd_person_threshold: 5,
            suspicious_objects: set(&[
                "handbag", "bag", "box", "envelope", "wallet", "package", "bottle",
            ]),
            dangerous_objects: set(&[
                "gun", "knife", "fire", "smoke", "pistol", "rifle", "scissor", "blade",
            ]),
            political_keywords: list(&[
                "vote",
                "voting",
                "candidate",
                "party",
                "election",
                "support",
                "vote for",
                "votefor",
                "vote_for",
                "मत",
                "छापा",
                "समर्थन",
                "उपहार",
                "निःशुल्क",
                "सहयोग",
                "free",
                "masubhat",
                "petrol",
            ]),
            bribery_keywords: list(&[
                "gift", "donation", "free", "support", "help", "reward", "उपहार", "दान",
                "निःशुल्क", "सहयोग", "समर्थन",
            ]),
            weights: BTreeMap::from([
                (Signal::Crowd, 30.0),
                (Signal::SuspiciousObject, 25.0),
                (Signal::DangerousObject, 40.0),
                (Signal::PartyText, 20.0),
                (Signal::BriberyText, 25.0),
                (Signal::PersonWithDanger, 20.0),
                (Signal::CrowdWithDanger, 15.0),
            ]),
            max_risk: 100.0,
        }
    }
}

impl ScoringPolicy {
    /// Load, canonicalize, and validate a policy file.
    pub fn load(path: &Path) -> ShieldResult<Self> {
        if !path.exists() {
            return Err(ShieldError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let policy = Self::from_json(&content)?;
        tracing::info!(
            version = %policy.version,
            path = %path.display(),
            "Loaded scoring policy"
        );
        Ok(policy)
    }

    /// Parse, canonicalize, and validate a policy from JSON text.
    pub fn from_json(json: &str) -> ShieldResult<Self> {
        let policy: Self = serde_json::from_str(json)
            .map_err(|e| ShieldError::policy(format!("malformed policy: {e}")))?;
        let policy = policy.canonicalized();
        policy.validate()?;
        Ok(policy)
    }

    /// Lowercase labels and keywords and drop duplicate keywords, keeping
    /// the first occurrence.
    pub fn canonicalized(self) -> Self {
        let labels = |set: BTreeSet<String>| {
            set.into_iter()
                .map(|s| s.trim().to_lowercase())
                .collect::<BTreeSet<_>>()
        };
        let keywords = |list: Vec<String>| {
            let mut out: Vec<String> = Vec::with_capacity(list.len());
            for keyword in list {
                let keyword = keyword.trim().to_lowercase();
                if !out.contains(&keyword) {
                    out.push(keyword);
                }
            }
            out
        };

        Self {
            suspicious_objects: labels(self.suspicious_objects),
            dangerous_objects: labels(self.dangerous_objects),
            political_keywords: keywords(self.political_keywords),
            bribery_keywords: keywords(self.bribery_keywords),
            ..self
        }
    }

    /// Reject policies that would make scoring meaningless.
    pub fn validate(&self) -> ShieldResult<()> {
        if self.version.trim().is_empty() {
            return Err(ShieldError::policy("version must not be empty"));
        }
        if self.crowd_person_threshold == 0 {
            return Err(ShieldError::policy(
                "crowd_person_threshold must be at least 1",
            ));
        }
        if !self.max_risk.is_finite() || self.max_risk <= 0.0 {
            return Err(ShieldError::policy(format!(
                "max_risk must be a positive number, got {}",
                self.max_risk
            )));
        }

        for signal in Signal::ALL {
            match self.weights.get(&signal) {
                None => {
                    return Err(ShieldError::policy(format!(
                        "missing weight for signal '{}'",
                        signal.as_str()
                    )))
                }
                Some(w) if !w.is_finite() || *w < 0.0 => {
                    return Err(ShieldError::policy(format!(
                        "weight for '{}' must be a non-negative number, got {w}",
                        signal.as_str()
                    )))
                }
                Some(_) => {}
            }
        }

        let labels = self.suspicious_objects.iter().chain(&self.dangerous_objects);
        let keywords = self.political_keywords.iter().chain(&self.bribery_keywords);
        if labels.chain(keywords).any(|s| s.trim().is_empty()) {
            return Err(ShieldError::policy(
                "object labels and keywords must not be empty",
            ));
        }

        let overlap: Vec<&String> = self
            .suspicious_objects
            .intersection(&self.dangerous_objects)
            .collect();
        if !overlap.is_empty() {
            tracing::warn!(
                ?overlap,
                "Labels listed as both suspicious and dangerous; both rules will fire"
            );
        }

        Ok(())
    }

    /// Weight of a signal. Validated policies name every signal.
    pub fn weight(&self, signal: Signal) -> f64 {
        self.weights.get(&signal).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        let policy = ScoringPolicy::default();
        policy.validate().unwrap();
        assert_eq!(policy.weight(Signal::Crowd), 30.0);
        assert_eq!(policy.crowd_person_threshold, 5);
    }

    #[test]
    fn default_policy_roundtrips_through_json() {
        let json = serde_json::to_string_pretty(&ScoringPolicy::default()).unwrap();
        let parsed = ScoringPolicy::from_json(&json).unwrap();
        assert_eq!(parsed, ScoringPolicy::default());
    }

    #[test]
    fn missing_weight_rejected() {
        let mut policy = ScoringPolicy::default();
        policy.weights.remove(&Signal::BriberyText);
        let err = policy.validate().unwrap_err();
        assert!(err.to_string().contains("bribery_text"));
    }

    #[test]
    fn negative_weight_rejected() {
        let mut policy = ScoringPolicy::default();
        policy.weights.insert(Signal::Crowd, -1.0);
        assert!(matches!(policy.validate(), Err(ShieldError::Policy { .. })));
    }

    #[test]
    fn zero_threshold_and_max_risk_rejected() {
        let mut policy = ScoringPolicy::default();
        policy.crowd_person_threshold = 0;
        assert!(policy.validate().is_err());

        let mut policy = ScoringPolicy::default();
        policy.max_risk = 0.0;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn unknown_fields_rejected() {
        let mut value = serde_json::to_value(ScoringPolicy::default()).unwrap();
        value["risk_scoore"] = serde_json::json!(1);
        assert!(ScoringPolicy::from_json(&value.to_string()).is_err());
    }

    #[test]
    fn unknown_signal_rejected() {
        let mut value = serde_json::to_value(ScoringPolicy::default()).unwrap();
        value["weights"]["repeated_reports"] = serde_json::json!(10);
        assert!(ScoringPolicy::from_json(&value.to_string()).is_err());
    }

    #[test]
    fn canonicalization_lowercases_and_dedupes() {
        let mut policy = ScoringPolicy::default();
        policy.dangerous_objects.insert("Machete".to_string());
        policy.political_keywords = vec!["Vote".into(), "vote".into(), "Rally".into()];
        let policy = policy.canonicalized();
        assert!(policy.dangerous_objects.contains("machete"));
        assert_eq!(policy.political_keywords, vec!["vote", "rally"]);
    }

    #[test]
    fn version_defaults_when_absent() {
        let mut value = serde_json::to_value(ScoringPolicy::default()).unwrap();
        value.as_object_mut().unwrap().remove("version");
        let policy = ScoringPolicy::from_json(&value.to_string()).unwrap();
        assert_eq!(policy.version, "custom");
    }
}
