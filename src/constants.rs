//! Application constants for the taxon annotator
//!
//! This module contains the fixed taxonomy, labels, file names, column values
//! and patterns used throughout the identification and export pipeline.

// =============================================================================
// Fixed Taxonomy
// =============================================================================

/// Fixed higher taxonomy for every exported record
///
/// Monitoring stations only ever label insects, so the three shallowest ranks
/// are constants rather than per-detection data.
pub mod fixed_taxonomy {
    /// Kingdom exported for every non-error row
    pub const KINGDOM: &str = "Animalia";

    /// Phylum exported for every non-error row
    pub const PHYLUM: &str = "Arthropoda";

    /// Class exported for every non-error row
    pub const CLASS: &str = "Insecta";
}

// =============================================================================
// Labels and Provenance
// =============================================================================

/// Display label of a detection marked as an error
pub const ERROR_LABEL: &str = "ERROR";

/// Persisted `detectedBy` value for detector output
pub const DETECTED_BY_AUTO: &str = "auto";

/// Persisted `detectedBy` value for human identifications
pub const DETECTED_BY_USER: &str = "user";

// =============================================================================
// Persistence
// =============================================================================

/// Version written into every photo document
pub const PHOTO_DOCUMENT_VERSION: &str = "1";

/// Version written into every night summary document
pub const NIGHT_SUMMARY_VERSION: &str = "1";

/// Extension of persisted photo documents
pub const PHOTO_DOCUMENT_EXTENSION: &str = "json";

/// File name of the per-night summary document
pub const NIGHT_SUMMARY_FILENAME: &str = "night_summary.json";

// =============================================================================
// Darwin Core Export
// =============================================================================

/// Darwin Core basis of record for camera-trap detections
pub const BASIS_OF_RECORD: &str = "MachineObservation";

/// Default file name of the exported CSV
pub const DEFAULT_EXPORT_FILENAME: &str = "darwin_core.csv";

/// Timestamp embedded in photo file names, e.g. `box01_2025_06_22__21_15_03_HDR0`
pub const FILENAME_TIMESTAMP_PATTERN: &str =
    r"(\d{4})_(\d{2})_(\d{2})__(\d{2})_(\d{2})_(\d{2})";

/// Night folder names, e.g. `2025-06-22`
pub const NIGHT_DATE_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}$";

/// Short codes that are morphospecies identifiers rather than epithets
///
/// Matches purely numeric tokens (`111`) and short prefixed codes (`sp1`, `sp. 12`,
/// `MS3a`). Longer working names such as `Forcipomyia1` do not match.
pub const MORPHOSPECIES_CODE_PATTERN: &str = r"^(?:[A-Za-z]{1,3}\.?\s?)?\d+[A-Za-z]?$";

// =============================================================================
// Identification Defaults
// =============================================================================

/// Maximum number of candidates requested from a species list search
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Identifier initials used when none are configured
pub const DEFAULT_IDENTIFIER_HUMAN: &str = "";

/// Environment variable overriding the configured identifier initials
pub const ENV_IDENTIFIER_HUMAN: &str = "TAXON_ANNOTATOR_IDENTIFIER";

/// Environment variable overriding the configured dataset id
pub const ENV_DATASET_ID: &str = "TAXON_ANNOTATOR_DATASET_ID";

/// Get the photo document file name for a photo base name
pub fn get_photo_document_filename(photo_base: &str) -> String {
    format!("{}.{}", photo_base, PHOTO_DOCUMENT_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_photo_document_filename() {
        assert_eq!(
            get_photo_document_filename("box01_2025_06_22__21_15_03_HDR0"),
            "box01_2025_06_22__21_15_03_HDR0.json"
        );
    }

    #[test]
    fn test_patterns_compile() {
        assert!(Regex::new(FILENAME_TIMESTAMP_PATTERN).is_ok());
        assert!(Regex::new(NIGHT_DATE_PATTERN).is_ok());
        assert!(Regex::new(MORPHOSPECIES_CODE_PATTERN).is_ok());
    }
}
