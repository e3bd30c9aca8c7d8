//! Interfaces to the external detector, OCR, and video-decoding components.

use std::sync::Arc;

use serde_json::Value;
use shield_common::config::PipelineDefaults;
use shield_common::error::ShieldResult;

/// One image to analyze: a standalone picture or a sampled video frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Position of the frame in the decoded stream.
    pub index: usize,
    /// Presentation time in seconds (0 for still images).
    pub timestamp_secs: f64,
    /// Encoded image bytes. Empty for replayed frames.
    pub image: Arc<[u8]>,
}

impl Frame {
    pub fn new(index: usize, timestamp_secs: f64, image: impl Into<Arc<[u8]>>) -> Self {
        Self {
            index,
            timestamp_secs,
            image: image.into(),
        }
    }

    /// A frame that carries only its position.
    pub fn placeholder(index: usize, timestamp_secs: f64) -> Self {
        Self::new(index, timestamp_secs, Vec::new())
    }
}

/// Object detector producing one of the shapes accepted by
/// [`shield_risk_core::normalize::normalize`].
#[async_trait::async_trait]
pub trait Detector: Send + Sync {
    async fn detect(&self, frame: &Frame) -> anyhow::Result<Value>;
}

/// OCR engine producing the text visible in a frame (possibly empty).
#[async_trait::async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, frame: &Frame) -> anyhow::Result<String>;
}

/// Lazily decoded frames, in temporal order.
pub type FrameStream<'a> = Box<dyn Iterator<Item = ShieldResult<Frame>> + Send + 'a>;

/// Video decoder producing frames at a fixed cadence.
pub trait FrameSampler: Send + Sync {
    /// Frames to analyze. A frame is decoded only when the stream is advanced,
    /// so the caller decides how many are held in memory at once.
    fn sample<'a>(&'a self, config: &SamplingConfig) -> FrameStream<'a>;
}

/// A text extractor for sources known to carry no text.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoText;

#[async_trait::async_trait]
impl TextExtractor for NoText {
    async fn extract_text(&self, _frame: &Frame) -> anyhow::Result<String> {
        Ok(String::new())
    }
}

/// Frame sampling cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingConfig {
    /// Keep one frame out of every `frame_interval` decoded frames.
    pub frame_interval: u32,
    /// Stop after this many sampled frames.
    pub max_frames: Option<usize>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            frame_interval: 30,
            max_frames: None,
        }
    }
}

impl SamplingConfig {
    /// Whether the decoded frame at `index` should be analyzed.
    pub fn should_sample(&self, index: usize) -> bool {
        index % self.frame_interval.max(1) as usize == 0
    }
}

impl From<&PipelineDefaults> for SamplingConfig {
    fn from(defaults: &PipelineDefaults) -> Self {
        Self {
            frame_interval: defaults.frame_interval,
            max_frames: defaults.max_frames,
        }
    }
}
