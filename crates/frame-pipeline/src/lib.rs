//! ElectionShield Frame Pipeline
//!
//! Drives the risk engine from images and videos:
//! - **Collaborators:** Detector, text extractor, and frame sampler traits
//! - **Analyzer:** Runs collaborators per frame on a bounded worker pool,
//!   classifies, and aggregates in frame order
//! - **Replay:** Collaborators backed by recorded detector/OCR output
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   frames   ┌──────────────────────────────────┐
//! │ FrameSampler │ ─────────▶ │          MediaAnalyzer           │
//! └──────────────┘            │  ┌──────────┐  ┌──────────────┐  │
//!                             │  │ Detector │  │ TextExtractor│  │
//!                             │  └────┬─────┘  └──────┬───────┘  │
//!                             │       ▼               ▼          │
//!                             │   normalize ──▶ classify (xN)    │
//!                             │                   │              │
//!                             │      re-order ──▶ aggregate      │
//!                             └──────────────────────────────────┘
//! ```
//!
//! Collaborator failures never abort a video: a failed detector becomes an
//! empty detection, a failed OCR call becomes empty text.

pub mod analyzer;
pub mod collaborators;
pub mod replay;

pub use analyzer::*;
pub use collaborators::*;
