//! Shape codec for persisted identification documents
//!
//! This module maps detections to and from the flat JSON shapes stored one
//! document per photo, plus the per-night summary document written alongside.
//!
//! # Architecture
//!
//! - [`shape`] - Persisted `Shape`, `PhotoDocument` and `PhotoContext` types
//! - [`encode`] - Detection to shape, whole-document encoding
//! - [`decode`] - Shape to detection with legacy reconciliation and overlay
//! - [`summary`] - Per-night `NightSummary` aggregation
//!
//! # Compatibility
//!
//! Every shape field is optional. Older documents kept morphospecies codes in
//! the `species` field; decoding moves them back to the morphospecies slot so
//! they never resurface as formal epithets.

pub mod decode;
pub mod encode;
pub mod shape;
pub mod summary;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use decode::{
    decode_photo_document, detection_id, from_persisted_shape, overlay_photo_document,
    shape_is_error,
};
pub use encode::{encode_photo_document, to_persisted_shape};
pub use shape::{PhotoContext, PhotoDocument, Shape};
pub use summary::NightSummary;
