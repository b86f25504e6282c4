//! Identification inputs, context and outcomes

use crate::app::models::{DetectionEntity, TaxonRecord};
use chrono::Utc;

/// A single human identification action
#[derive(Debug, Clone, PartialEq)]
pub enum IdentificationInput {
    /// A taxon picked from a species list or entered by rank
    TaxonPick {
        taxon: TaxonRecord,
        /// Label to fall back to when the taxon yields none
        label: Option<String>,
    },
    /// Free-text morphospecies working name
    MorphospeciesText(String),
    /// Mark the detection as a false positive
    MarkError,
    /// Confirm the current identification without changing it
    Accept,
}

impl IdentificationInput {
    /// Taxon pick without an explicit label
    pub fn taxon_pick(taxon: TaxonRecord) -> Self {
        IdentificationInput::TaxonPick { taxon, label: None }
    }

    /// Morphospecies input from any string-like value
    pub fn morphospecies(text: impl Into<String>) -> Self {
        IdentificationInput::MorphospeciesText(text.into())
    }

    /// Short name of the action for logs and reports
    pub fn kind(&self) -> &'static str {
        match self {
            IdentificationInput::TaxonPick { .. } => "taxon-pick",
            IdentificationInput::MorphospeciesText(_) => "morphospecies",
            IdentificationInput::MarkError => "mark-error",
            IdentificationInput::Accept => "accept",
        }
    }
}

/// Already-resolved data an identification needs from its caller
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IdentificationContext {
    /// Epoch milliseconds stamped into `identified_at`
    pub identified_at: i64,
    /// Checklist the picked taxon came from, if any
    pub species_list_id: Option<String>,
    pub species_list_doi: Option<String>,
}

impl IdentificationContext {
    /// Context stamped with a fixed timestamp
    pub fn at(identified_at: i64) -> Self {
        Self {
            identified_at,
            ..Default::default()
        }
    }

    /// Context stamped with the current wall-clock time
    pub fn now() -> Self {
        Self::at(Utc::now().timestamp_millis())
    }

    /// Attach the checklist that produced the picked taxon
    pub fn with_species_list(mut self, id: impl Into<String>, doi: Option<String>) -> Self {
        self.species_list_id = Some(id.into());
        self.species_list_doi = doi;
        self
    }
}

/// Why an identification was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Morphospecies text was blank after trimming
    EmptyMorphospecies,
    /// Morphospecies requested on a detection without order, family or genus
    MissingHigherTaxonomy,
    /// Picked taxon carries no rank fields
    EmptyTaxon,
    /// Batch referenced an id that is not loaded
    DetectionNotFound,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            SkipReason::EmptyMorphospecies => "morphospecies text is empty",
            SkipReason::MissingHigherTaxonomy => {
                "morphospecies needs an order, family or genus identified first"
            }
            SkipReason::EmptyTaxon => "picked taxon has no rank fields",
            SkipReason::DetectionNotFound => "detection not found",
        };
        f.write_str(message)
    }
}

/// Result of applying one input to one detection
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifyOutcome {
    /// Next state, or the untouched input state when skipped
    pub detection: DetectionEntity,
    pub changed: bool,
    pub skip_reason: Option<SkipReason>,
}

impl IdentifyOutcome {
    pub(crate) fn applied(detection: DetectionEntity) -> Self {
        Self {
            detection,
            changed: true,
            skip_reason: None,
        }
    }

    pub(crate) fn skipped_with(detection: &DetectionEntity, reason: SkipReason) -> Self {
        Self {
            detection: detection.clone(),
            changed: false,
            skip_reason: Some(reason),
        }
    }

    /// Whether the input was rejected
    pub fn skipped(&self) -> bool {
        self.skip_reason.is_some()
    }
}
