//! Identification engine for detections
//!
//! This module computes the next state of a detection for each human action:
//! picking a taxon, typing a morphospecies, marking an error, or accepting the
//! current identification as-is.
//!
//! # Architecture
//!
//! - [`input`] - Identification inputs, call context, skip reasons and outcomes
//! - [`engine`] - The single-detection transition function
//! - [`batch`] - Independent application of one input to many detections
//! - [`session`] - Per-night detection state with change notification
//!
//! # Failure Semantics
//!
//! The engine never returns an error. Invalid input (an empty morphospecies, a
//! pick with no rank fields, a morphospecies without higher taxonomy) produces a
//! skipped outcome with a [`SkipReason`] and leaves the detection untouched.
//!
//! # Example Usage
//!
//! ```rust
//! use taxon_annotator::app::models::DetectionEntity;
//! use taxon_annotator::app::services::identification::{
//!     IdentificationContext, IdentificationInput, identify,
//! };
//!
//! let detection = DetectionEntity::new_auto("patch_0", "patch_0", "photo", "night");
//! let context = IdentificationContext::at(1_750_000_000_000);
//!
//! let outcome = identify(&detection, &IdentificationInput::MarkError, &context);
//! assert!(outcome.changed);
//! assert_eq!(outcome.detection.label, "ERROR");
//! ```

pub mod batch;
pub mod engine;
pub mod input;
pub mod session;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use batch::{BatchOutcome, identify_many};
pub use engine::{PickBranch, classify_pick, identify};
pub use input::{IdentificationContext, IdentificationInput, IdentifyOutcome, SkipReason};
pub use session::{ChannelListener, DetectionChange, DetectionChangeListener, IdentificationSession};
