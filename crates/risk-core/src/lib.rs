//! ElectionShield Risk Core
//!
//! Turns detector output and extracted text into risk verdicts:
//! - **Normalize:** Reduce heterogeneous detector output to canonical objects and counts
//! - **Keywords:** Case-insensitive keyword hits in free text
//! - **Classify:** Apply the scoring policy to one frame
//! - **Aggregate:** Fold per-frame verdicts into one video verdict
//!
//! This crate is pure computation: no I/O beyond loading a policy file,
//! no shared mutable state. Every function here is total: malformed input
//! degrades to empty values instead of erroring.

pub mod aggregate;
pub mod classify;
pub mod keywords;
pub mod normalize;
pub mod policy;

pub use aggregate::{aggregate, VideoAccumulator};
pub use classify::{classify, FrameClassifier};
pub use keywords::find_keywords;
pub use normalize::{normalize, normalize_json};
pub use policy::{ScoringPolicy, Signal};
