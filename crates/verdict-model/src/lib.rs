//! ElectionShield Verdict Model
//!
//! Defines the data contracts exchanged between the risk engine and its callers:
//! - **Detections:** Canonical object lists with per-label counts
//! - **Tags:** Insertion-ordered, duplicate-free tag sets
//! - **Verdicts:** Per-frame and per-video risk assessments
//!
//! Scores are always normalized to `[0.0, 1.0]`. Every type here is plain
//! data: built once by its producer and never mutated afterwards.

pub mod detection;
pub mod tags;
pub mod verdict;

pub use detection::*;
pub use tags::*;
pub use verdict::*;
