//! Display label computation
//!
//! Derives the single human-readable label of a detection. A morphospecies is
//! always shown verbatim and is never prefixed with its genus.

use crate::app::models::{DetectionEntity, TaxonRank, TaxonRecord};
use crate::constants::ERROR_LABEL;

/// Compute the display label for a taxon/morphospecies/error state
///
/// Priority, highest first:
/// 1. `"ERROR"` when the detection is marked as an error
/// 2. The morphospecies, verbatim
/// 3. `"{genus} {species}"` when both are set
/// 4. The deepest populated rank value (species > genus > ... > kingdom)
/// 5. The explicit label, else an empty string
pub fn compute_label(
    taxon: Option<&TaxonRecord>,
    explicit_label: Option<&str>,
    morphospecies: Option<&str>,
    is_error: bool,
) -> String {
    if is_error {
        return ERROR_LABEL.to_string();
    }

    if let Some(morphospecies) = morphospecies.map(str::trim).filter(|m| !m.is_empty()) {
        return morphospecies.to_string();
    }

    if let Some(taxon) = taxon {
        if let Some(binomial) = taxon.binomial() {
            return binomial;
        }

        let deepest = TaxonRank::PRINCIPAL
            .iter()
            .rev()
            .find_map(|rank| taxon.rank_value(*rank));
        if let Some(value) = deepest {
            return value.to_string();
        }
    }

    explicit_label
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Compute the label a detection should carry in its current state
///
/// The stored label serves as the explicit fallback.
pub fn label_for_detection(detection: &DetectionEntity) -> String {
    compute_label(
        detection.active_taxon(),
        Some(detection.label.as_str()),
        detection.morphospecies(),
        detection.is_error(),
    )
}
