//! Detection normalization.
//!
//! Detectors report objects in several historical shapes. Each is reduced to
//! a [`NormalizedDetection`]; the first shape whose key holds an array wins
//! and shapes are never merged:
//!
//! 1. Canonical: `{"objects": [{"name": ..., "confidence": ...}, ...]}`
//! 2. Legacy: `{"people": [...], "flags": [...]}` (either key optional)
//! 3. Raw detector: `{"raw": {"results": [{"boxes": [...]}, ...]}}`
//!
//! Anything else, and any box that cannot be decoded, contributes nothing.

use serde_json::Value;
use shield_verdict_model::detection::{DetectedObject, NormalizedDetection, FLAG_LABEL, PERSON_LABEL};

/// Keys that may carry a label, in priority order.
const LABEL_KEYS: [&str; 3] = ["class", "cls", "name"];

/// Label keys accepted on canonical objects.
const OBJECT_LABEL_KEYS: [&str; 4] = ["name", "class", "cls", "label"];

/// Keys that may carry a confidence, in priority order.
const CONFIDENCE_KEYS: [&str; 2] = ["confidence", "conf"];

/// Normalize arbitrary detector output. Never fails.
pub fn normalize(raw: &Value) -> NormalizedDetection {
    let objects = if let Some(items) = array_at(raw, "objects") {
        decode_canonical(items)
    } else if array_at(raw, "people").is_some() || array_at(raw, "flags").is_some() {
        decode_legacy(raw)
    } else if let Some(results) = raw.get("raw").and_then(|r| array_at(r, "results")) {
        decode_raw_results(results)
    } else {
        Vec::new()
    };

    NormalizedDetection::from_objects(objects)
}

/// Parse and normalize a JSON document. Unparsable input yields an empty detection.
pub fn normalize_json(json: &str) -> NormalizedDetection {
    match serde_json::from_str::<Value>(json) {
        Ok(value) => normalize(&value),
        Err(e) => {
            tracing::debug!("Detector output is not valid JSON, treating as empty: {e}");
            NormalizedDetection::empty()
        }
    }
}

fn decode_canonical(items: &[Value]) -> Vec<DetectedObject> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(name) => Some(DetectedObject::new(name, 0.0)),
            Value::Object(_) => {
                let name = first_label(item, &OBJECT_LABEL_KEYS)?;
                Some(DetectedObject::new(&name, confidence(item)))
            }
            _ => None,
        })
        .collect()
}

fn decode_legacy(raw: &Value) -> Vec<DetectedObject> {
    let people = array_at(raw, "people").unwrap_or_default();
    let flags = array_at(raw, "flags").unwrap_or_default();

    people
        .iter()
        .map(|item| DetectedObject::new(PERSON_LABEL, confidence(item)))
        .chain(
            flags
                .iter()
                .map(|item| DetectedObject::new(FLAG_LABEL, confidence(item))),
        )
        .collect()
}

fn decode_raw_results(results: &[Value]) -> Vec<DetectedObject> {
    let mut objects = Vec::new();
    for result in results {
        let Some(boxes) = array_at(result, "boxes") else {
            continue;
        };
        for detection_box in boxes {
            let Some(name) = first_label(detection_box, &LABEL_KEYS) else {
                tracing::trace!("Skipping box without a usable label");
                continue;
            };
            objects.push(DetectedObject::new(&name, confidence(detection_box)));
        }
    }
    objects
}

/// The array under `key`, if that is what `key` holds.
fn array_at<'a>(value: &'a Value, key: &str) -> Option<&'a [Value]> {
    value.get(key)?.as_array().map(Vec::as_slice)
}

/// Label under the first present key. A present but unusable value skips the
/// box rather than falling through to the next key.
fn first_label(item: &Value, keys: &[&str]) -> Option<String> {
    let value = keys.iter().find_map(|key| item.get(*key))?;
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        }),
        _ => None,
    }
}

fn confidence(item: &Value) -> f64 {
    CONFIDENCE_KEYS
        .iter()
        .find_map(|key| item.get(*key))
        .and_then(number)
        .unwrap_or(0.0)
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        // Tensor-style `[0.87]`
        Value::Array(items) if items.len() == 1 => number(&items[0]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_shape_recomputes_counts() {
        let detection = normalize(&json!({
            "objects": [
                {"name": "Person", "confidence": 0.9},
                {"name": "person", "confidence": 0.7},
                {"name": "gun"}
            ],
            "counts": {"person": 99}
        }));
        assert_eq!(detection.person_count(), 2);
        assert_eq!(detection.count("gun"), 1);
        assert_eq!(detection.objects()[2].confidence, 0.0);
    }

    #[test]
    fn legacy_shape_maps_people_and_flags() {
        let detection = normalize(&json!({
            "people": [{"confidence": 0.8, "xyxy": [0, 0, 10, 10]}, {"confidence": 0.6}],
            "flags": [{"class": 0, "confidence": 0.5}]
        }));
        assert_eq!(detection.person_count(), 2);
        assert_eq!(detection.count("flag"), 1);
        assert_eq!(detection.objects()[0].confidence, 0.8);
    }

    #[test]
    fn legacy_shape_with_only_flags() {
        let detection = normalize(&json!({"flags": [{}, {}]}));
        assert_eq!(detection.count("flag"), 2);
        assert_eq!(detection.person_count(), 0);
    }

    #[test]
    fn first_matching_shape_wins() {
        let detection = normalize(&json!({
            "objects": [{"name": "knife"}],
            "people": [{}, {}, {}]
        }));
        assert_eq!(detection.person_count(), 0);
        assert_eq!(detection.count("knife"), 1);
    }

    #[test]
    fn shape_key_without_an_array_does_not_match() {
        let detection = normalize(&json!({"objects": null, "people": [{}, {}]}));
        assert_eq!(detection.person_count(), 2);

        let detection = normalize(&json!({
            "objects": {"name": "gun"},
            "people": "many",
            "raw": {"results": [{"boxes": [{"class": "flag"}]}]}
        }));
        assert_eq!(detection.count("flag"), 1);
        assert_eq!(detection.person_count(), 0);
    }

    #[test]
    fn raw_shape_uses_label_key_priority() {
        let detection = normalize(&json!({
            "raw": {"results": [
                {"boxes": [
                    {"class": "Person", "cls": "ignored", "conf": [0.91]},
                    {"cls": "knife", "confidence": "0.4"},
                    {"name": "Bag"}
                ]},
                {"boxes": [{"cls": 3}]}
            ]}
        }));
        assert_eq!(detection.person_count(), 1);
        assert_eq!(detection.count("knife"), 1);
        assert_eq!(detection.count("bag"), 1);
        assert_eq!(detection.count("3"), 1);
        assert!((detection.objects()[0].confidence - 0.91).abs() < 1e-9);
        assert!((detection.objects()[1].confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn malformed_boxes_skipped() {
        let detection = normalize(&json!({
            "raw": {"results": [
                {"boxes": [{"class": null}, {"xyxy": [1, 2]}, "junk", {"class": "gun", "conf": "high"}]},
                {"no_boxes": true},
                42
            ]}
        }));
        assert_eq!(detection.objects().len(), 1);
        assert_eq!(detection.count("gun"), 1);
        assert_eq!(detection.objects()[0].confidence, 0.0);
    }

    #[test]
    fn unknown_shapes_are_empty() {
        assert!(normalize(&json!(null)).is_empty());
        assert!(normalize(&json!([1, 2, 3])).is_empty());
        assert!(normalize(&json!({"detections": []})).is_empty());
        assert!(normalize(&json!({"objects": "nope"})).is_empty());
    }

    #[test]
    fn invalid_json_is_empty() {
        assert!(normalize_json("{not json").is_empty());
        assert_eq!(normalize_json(r#"{"people": [{}]}"#).person_count(), 1);
    }

    #[test]
    fn canonical_output_is_a_fixed_point() {
        let first = normalize(&json!({"flags": [{"confidence": 0.3}], "people": [{}]}));
        let reencoded = serde_json::to_value(&first).unwrap();
        assert_eq!(normalize(&reencoded), first);
    }
}
