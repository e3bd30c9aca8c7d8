//! Canonical detection types.
//!
//! Detector output arrives in several shapes; the risk engine reduces all
//! of them to a [`NormalizedDetection`] before scoring.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical label for a detected person.
pub const PERSON_LABEL: &str = "person";

/// Canonical label for a detected flag or party symbol.
pub const FLAG_LABEL: &str = "flag";

/// A single object reported by a detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    /// Lowercased label, e.g. `"person"`, `"gun"`.
    pub name: String,
    /// Detector confidence in `[0.0, 1.0]`.
    pub confidence: f64,
}

impl DetectedObject {
    /// Build an object, canonicalizing the label and bounding the confidence.
    ///
    /// Non-finite confidences become `0.0`.
    pub fn new(name: &str, confidence: f64) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            name: canonical_label(name),
            confidence,
        }
    }
}

/// Lowercase and trim a detector label.
pub fn canonical_label(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The canonical detection set for one image or frame.
///
/// `counts` is always derived from `objects`; there is no way to build a
/// value where the two disagree. Deserialization recomputes the counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "DetectionRepr")]
pub struct NormalizedDetection {
    objects: Vec<DetectedObject>,
    counts: BTreeMap<String, usize>,
}

#[derive(Deserialize)]
struct DetectionRepr {
    #[serde(default)]
    objects: Vec<DetectedObject>,
}

impl From<DetectionRepr> for NormalizedDetection {
    fn from(repr: DetectionRepr) -> Self {
        Self::from_objects(repr.objects)
    }
}

impl NormalizedDetection {
    /// A detection with no objects (the degraded result for failed detectors).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from an object list, canonicalizing labels and computing counts.
    pub fn from_objects(objects: Vec<DetectedObject>) -> Self {
        let objects: Vec<DetectedObject> = objects
            .into_iter()
            .map(|o| DetectedObject::new(&o.name, o.confidence))
            .filter(|o| !o.name.is_empty())
            .collect();

        let mut counts = BTreeMap::new();
        for object in &objects {
            *counts.entry(object.name.clone()).or_insert(0) += 1;
        }

        Self { objects, counts }
    }

    pub fn objects(&self) -> &[DetectedObject] {
        &self.objects
    }

    pub fn counts(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }

    /// Number of objects carrying `label` (already canonical).
    pub fn count(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    pub fn person_count(&self) -> usize {
        self.count(PERSON_LABEL)
    }

    /// Distinct labels present, in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_follow_objects() {
        let detection = NormalizedDetection::from_objects(vec![
            DetectedObject::new("Person", 0.9),
            DetectedObject::new("person", 0.8),
            DetectedObject::new(" GUN ", 0.7),
        ]);
        assert_eq!(detection.person_count(), 2);
        assert_eq!(detection.count("gun"), 1);
        assert_eq!(detection.counts().len(), 2);
        assert_eq!(detection.labels().collect::<Vec<_>>(), vec!["gun", "person"]);
    }

    #[test]
    fn blank_labels_dropped() {
        let detection = NormalizedDetection::from_objects(vec![DetectedObject::new("  ", 0.5)]);
        assert!(detection.is_empty());
        assert!(detection.counts().is_empty());
    }

    #[test]
    fn confidence_bounded() {
        assert_eq!(DetectedObject::new("box", 1.7).confidence, 1.0);
        assert_eq!(DetectedObject::new("box", -0.2).confidence, 0.0);
        assert_eq!(DetectedObject::new("box", f64::NAN).confidence, 0.0);
    }

    #[test]
    fn deserialization_recomputes_counts() {
        let json = r#"{"objects":[{"name":"Flag","confidence":0.4}],"counts":{"flag":7}}"#;
        let detection: NormalizedDetection = serde_json::from_str(json).unwrap();
        assert_eq!(detection.count("flag"), 1);
    }
}
