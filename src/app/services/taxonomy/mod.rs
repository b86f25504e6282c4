//! Taxonomy utilities for identification and export
//!
//! Pure functions over [`TaxonRecord`](crate::app::models::TaxonRecord) values. Nothing
//! in this module mutates its inputs; every operation returns a new record.
//!
//! # Architecture
//!
//! - [`ranks`] - Rank lattice comparison, rank merging with cascade-clear and
//!   higher-taxonomy context checks
//! - [`species`] - Species epithet normalization, binomial parsing and
//!   morphospecies code detection
//! - [`label`] - Display label computation for detections
//!
//! # Cascade-clear
//!
//! Asserting a rank invalidates every deeper rank: re-assigning the order of a
//! record that carried a genus and species drops both, since they were chosen
//! under the old order.

pub mod label;
pub mod ranks;
pub mod species;

#[cfg(test)]
pub mod tests;

pub use label::{compute_label, label_for_detection};
pub use ranks::{
    has_higher_taxonomy_context, higher_taxonomy_context, is_rank_deeper_or_equal, merge_ranks,
    rank_value_changed,
};
pub use species::{Binomial, looks_like_morphospecies_code, normalize_species, parse_binomial};
