//! Replay collaborators backed by recorded detector and OCR output.
//!
//! A capture is a JSONL file with one record per decoded frame:
//!
//! ```text
//! # comment lines and blank lines are ignored
//! {"frame": 0, "timestamp_secs": 0.0, "detection": {"people": [{}]}, "text": "vote"}
//! {"frame": 30, "detection_error": "CUDA out of memory"}
//! ```
//!
//! The same capture acts as frame sampler, detector, and text extractor, so
//! a recorded video can be re-scored offline under a different policy.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shield_common::error::{ShieldError, ShieldResult};

use crate::collaborators::{
    Detector, Frame, FrameSampler, FrameStream, SamplingConfig, TextExtractor,
};

/// Recorded collaborator output for one decoded frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecord {
    /// Index of the frame in the decoded stream.
    pub frame: usize,

    #[serde(default)]
    pub timestamp_secs: Option<f64>,

    /// Raw detector output in any supported shape.
    #[serde(default)]
    pub detection: Value,

    #[serde(default)]
    pub text: String,

    /// When set, the detector call for this frame fails with this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_error: Option<String>,

    /// When set, the OCR call for this frame fails with this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_error: Option<String>,
}

/// A recorded capture, keyed by frame index.
#[derive(Debug, Clone, Default)]
pub struct ReplayCapture {
    records: BTreeMap<usize, ReplayRecord>,
    /// Fallback frame rate for records without timestamps.
    fps: f64,
}

impl ReplayCapture {
    /// Load a capture from a JSONL file.
    pub fn load(path: &Path) -> ShieldResult<Self> {
        if !path.exists() {
            return Err(ShieldError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let capture = Self::parse(&content)?;
        tracing::info!(
            frames = capture.len(),
            path = %path.display(),
            "Loaded replay capture"
        );
        Ok(capture)
    }

    /// Parse JSONL capture text. A malformed line is an error naming the line.
    pub fn parse(content: &str) -> ShieldResult<Self> {
        let mut records = BTreeMap::new();
        for (line_no, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let record: ReplayRecord = serde_json::from_str(trimmed).map_err(|e| {
                ShieldError::sampler(format!("capture line {}: {e}", line_no + 1))
            })?;
            if records.insert(record.frame, record).is_some() {
                tracing::warn!(line = line_no + 1, "Duplicate frame record, keeping the last");
            }
        }
        Ok(Self { records, fps: 30.0 })
    }

    pub fn from_records(records: impl IntoIterator<Item = ReplayRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.frame, r)).collect(),
            fps: 30.0,
        }
    }

    /// Override the frame rate used to derive missing timestamps.
    pub fn with_fps(mut self, fps: f64) -> Self {
        if fps.is_finite() && fps > 0.0 {
            self.fps = fps;
        }
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn record(&self, frame: &Frame) -> anyhow::Result<&ReplayRecord> {
        self.records
            .get(&frame.index)
            .ok_or_else(|| anyhow::anyhow!("no recorded output for frame {}", frame.index))
    }
}

impl FrameSampler for ReplayCapture {
    fn sample<'a>(&'a self, config: &SamplingConfig) -> FrameStream<'a> {
        let config = *config;
        let fps = self.fps;
        tracing::debug!(
            recorded = self.records.len(),
            interval = config.frame_interval,
            max_frames = ?config.max_frames,
            "Sampling replay frames"
        );
        let frames = self
            .records
            .values()
            .filter(move |record| config.should_sample(record.frame))
            .map(move |record| {
                let timestamp = record.timestamp_secs.unwrap_or(record.frame as f64 / fps);
                Ok(Frame::placeholder(record.frame, timestamp))
            });
        match config.max_frames {
            Some(max) => Box::new(frames.take(max)),
            None => Box::new(frames),
        }
    }
}

#[async_trait::async_trait]
impl Detector for ReplayCapture {
    async fn detect(&self, frame: &Frame) -> anyhow::Result<Value> {
        let record = self.record(frame)?;
        if let Some(message) = &record.detection_error {
            anyhow::bail!("{message}");
        }
        Ok(record.detection.clone())
    }
}

#[async_trait::async_trait]
impl TextExtractor for ReplayCapture {
    async fn extract_text(&self, frame: &Frame) -> anyhow::Result<String> {
        let record = self.record(frame)?;
        if let Some(message) = &record.text_error {
            anyhow::bail!("{message}");
        }
        Ok(record.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPTURE: &str = r#"
# two seconds of footage at 30 fps
{"frame": 0, "detection": {"people": [{}, {}]}, "text": "vote"}
{"frame": 15, "detection": {"objects": [{"name": "gun"}]}}

{"frame": 30, "timestamp_secs": 1.02, "detection_error": "model crashed", "text": "free"}
{"frame": 60, "text_error": "ocr timeout"}
"#;

    #[test]
    fn parses_and_skips_comments() {
        let capture = ReplayCapture::parse(CAPTURE).unwrap();
        assert_eq!(capture.len(), 4);
    }

    #[test]
    fn malformed_line_reports_position() {
        let err = ReplayCapture::parse("{\"frame\": 0}\n{oops").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn samples_on_cadence() {
        let capture = ReplayCapture::parse(CAPTURE).unwrap();
        let frames: Vec<Frame> = capture
            .sample(&SamplingConfig::default())
            .collect::<ShieldResult<_>>()
            .unwrap();
        let indices: Vec<usize> = frames.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 30, 60]);
        assert_eq!(frames[1].timestamp_secs, 1.02);
        assert_eq!(frames[2].timestamp_secs, 2.0);
    }

    #[test]
    fn sample_cap() {
        let capture = ReplayCapture::parse(CAPTURE).unwrap();
        let sampled = capture.sample(&SamplingConfig {
            frame_interval: 1,
            max_frames: Some(2),
        });
        assert_eq!(sampled.count(), 2);
    }

    #[test]
    fn from_records_derives_timestamps_from_fps() {
        let capture = ReplayCapture::from_records((0..3).map(|i| ReplayRecord {
            frame: i * 25,
            timestamp_secs: None,
            detection: Value::Null,
            text: String::new(),
            detection_error: None,
            text_error: None,
        }))
        .with_fps(25.0);
        let times: Vec<f64> = capture
            .sample(&SamplingConfig {
                frame_interval: 25,
                max_frames: None,
            })
            .map(|frame| frame.unwrap().timestamp_secs)
            .collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0]);
    }

    #[tokio::test]
    async fn recorded_errors_surface_as_failures() {
        let capture = ReplayCapture::parse(CAPTURE).unwrap();
        assert!(capture.detect(&Frame::placeholder(30, 1.0)).await.is_err());
        assert_eq!(
            capture.extract_text(&Frame::placeholder(30, 1.0)).await.unwrap(),
            "free"
        );
        assert!(capture
            .extract_text(&Frame::placeholder(60, 2.0))
            .await
            .is_err());
        assert!(capture.detect(&Frame::placeholder(99, 3.3)).await.is_err());
    }
}
