//! Data models for taxonomic identification
//!
//! This module contains the core data structures for representing taxonomic
//! snapshots and machine-detected image patches, following the Darwin Core
//! naming used by the persisted documents and the export.

use crate::constants::{DETECTED_BY_AUTO, DETECTED_BY_USER};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

// =============================================================================
// Taxonomic Rank
// =============================================================================

/// Taxonomic rank of a record
///
/// Ranks form a fixed lattice from kingdom (shallowest) to species (deepest).
/// Intermediate ranks share the depth of the principal rank they refine, so
/// `Suborder` sits with `Order` and `Subfamily`/`Tribe` sit with `Family`.
/// Only the seven principal ranks own a field on [`TaxonRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxonRank {
    Kingdom,
    Phylum,
    Class,
    Order,
    Suborder,
    Family,
    Subfamily,
    Tribe,
    Genus,
    Species,
}

impl TaxonRank {
    /// Principal ranks, shallowest first
    pub const PRINCIPAL: [TaxonRank; 7] = [
        TaxonRank::Kingdom,
        TaxonRank::Phylum,
        TaxonRank::Class,
        TaxonRank::Order,
        TaxonRank::Family,
        TaxonRank::Genus,
        TaxonRank::Species,
    ];

    /// Depth of this rank in the lattice (kingdom = 0, species = 6)
    pub fn depth(self) -> u8 {
        match self {
            TaxonRank::Kingdom => 0,
            TaxonRank::Phylum => 1,
            TaxonRank::Class => 2,
            TaxonRank::Order | TaxonRank::Suborder => 3,
            TaxonRank::Family | TaxonRank::Subfamily | TaxonRank::Tribe => 4,
            TaxonRank::Genus => 5,
            TaxonRank::Species => 6,
        }
    }

    /// Total ordering by depth
    pub fn cmp_depth(self, other: TaxonRank) -> Ordering {
        self.depth().cmp(&other.depth())
    }

    /// Whether this rank owns a field on [`TaxonRecord`]
    pub fn is_principal(self) -> bool {
        Self::PRINCIPAL.contains(&self)
    }

    /// Lowercase name as persisted and exported
    pub fn as_str(self) -> &'static str {
        match self {
            TaxonRank::Kingdom => "kingdom",
            TaxonRank::Phylum => "phylum",
            TaxonRank::Class => "class",
            TaxonRank::Order => "order",
            TaxonRank::Suborder => "suborder",
            TaxonRank::Family => "family",
            TaxonRank::Subfamily => "subfamily",
            TaxonRank::Tribe => "tribe",
            TaxonRank::Genus => "genus",
            TaxonRank::Species => "species",
        }
    }
}

impl FromStr for TaxonRank {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "kingdom" => Ok(TaxonRank::Kingdom),
            "phylum" => Ok(TaxonRank::Phylum),
            "class" => Ok(TaxonRank::Class),
            "order" => Ok(TaxonRank::Order),
            "suborder" => Ok(TaxonRank::Suborder),
            "family" => Ok(TaxonRank::Family),
            "subfamily" => Ok(TaxonRank::Subfamily),
            "tribe" => Ok(TaxonRank::Tribe),
            "genus" => Ok(TaxonRank::Genus),
            "species" => Ok(TaxonRank::Species),
            _ => Err(Error::data_validation(format!(
                "Invalid taxon rank '{}': expected kingdom, phylum, class, order, suborder, \
                 family, subfamily, tribe, genus or species",
                s
            ))),
        }
    }
}

impl std::fmt::Display for TaxonRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Taxon Record
// =============================================================================

/// Snapshot of a taxonomic assignment
///
/// A rank field is only ever set when all shallower rank fields are also set.
/// `scientific_name` never holds a morphospecies code; morphospecies live on
/// [`DetectionEntity::morphospecies`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonRecord {
    /// Display name at the assigned rank ("Musca domestica", "Muscidae")
    #[serde(rename = "scientificName", default)]
    pub scientific_name: String,

    /// Deepest rank this record claims to assign
    #[serde(rename = "taxonRank")]
    pub taxon_rank: TaxonRank,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kingdom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phylum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genus: Option<String>,

    /// Specific epithet only ("domestica"), never the full binomial once normalized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,

    #[serde(rename = "taxonID", default, skip_serializing_if = "Option::is_none")]
    pub taxon_id: Option<String>,
    #[serde(rename = "acceptedTaxonKey", default, skip_serializing_if = "Option::is_none")]
    pub accepted_taxon_key: Option<String>,
    #[serde(
        rename = "acceptedScientificName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub accepted_scientific_name: Option<String>,
    #[serde(rename = "vernacularName", default, skip_serializing_if = "Option::is_none")]
    pub vernacular_name: Option<String>,
    #[serde(rename = "taxonomicStatus", default, skip_serializing_if = "Option::is_none")]
    pub taxonomic_status: Option<String>,

    /// Display label bound by the identification engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl TaxonRecord {
    /// Create an empty record at the given rank
    pub fn new(taxon_rank: TaxonRank, scientific_name: impl Into<String>) -> Self {
        Self {
            scientific_name: scientific_name.into(),
            taxon_rank,
            kingdom: None,
            phylum: None,
            class: None,
            order: None,
            family: None,
            genus: None,
            species: None,
            taxon_id: None,
            accepted_taxon_key: None,
            accepted_scientific_name: None,
            vernacular_name: None,
            taxonomic_status: None,
            name: None,
        }
    }

    /// Builder-style setter for a principal rank field
    pub fn with_rank(mut self, rank: TaxonRank, value: impl Into<String>) -> Self {
        self.set_rank_value(rank, Some(value.into()));
        self
    }

    /// Value of a principal rank field, ignoring blank strings
    ///
    /// Intermediate ranks have no field and always return `None`.
    pub fn rank_value(&self, rank: TaxonRank) -> Option<&str> {
        let value = match rank {
            TaxonRank::Kingdom => self.kingdom.as_deref(),
            TaxonRank::Phylum => self.phylum.as_deref(),
            TaxonRank::Class => self.class.as_deref(),
            TaxonRank::Order => self.order.as_deref(),
            TaxonRank::Family => self.family.as_deref(),
            TaxonRank::Genus => self.genus.as_deref(),
            TaxonRank::Species => self.species.as_deref(),
            TaxonRank::Suborder | TaxonRank::Subfamily | TaxonRank::Tribe => None,
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    /// Set or clear a principal rank field; intermediate ranks are ignored
    pub fn set_rank_value(&mut self, rank: TaxonRank, value: Option<String>) {
        let value = value.filter(|v| !v.trim().is_empty());
        match rank {
            TaxonRank::Kingdom => self.kingdom = value,
            TaxonRank::Phylum => self.phylum = value,
            TaxonRank::Class => self.class = value,
            TaxonRank::Order => self.order = value,
            TaxonRank::Family => self.family = value,
            TaxonRank::Genus => self.genus = value,
            TaxonRank::Species => self.species = value,
            TaxonRank::Suborder | TaxonRank::Subfamily | TaxonRank::Tribe => {}
        }
    }

    /// Whether any principal rank field is populated
    pub fn has_any_rank(&self) -> bool {
        TaxonRank::PRINCIPAL
            .iter()
            .any(|rank| self.rank_value(*rank).is_some())
    }

    /// Deepest populated principal rank
    pub fn deepest_rank(&self) -> Option<TaxonRank> {
        TaxonRank::PRINCIPAL
            .iter()
            .rev()
            .copied()
            .find(|rank| self.rank_value(*rank).is_some())
    }

    /// "Genus epithet" when both are populated
    pub fn binomial(&self) -> Option<String> {
        match (self.rank_value(TaxonRank::Genus), self.rank_value(TaxonRank::Species)) {
            (Some(genus), Some(species)) => Some(format!("{} {}", genus, species)),
            _ => None,
        }
    }

    /// Scientific name implied by the rank fields at `rank`
    pub fn name_at_rank(&self, rank: TaxonRank) -> Option<String> {
        if rank == TaxonRank::Species {
            return self
                .binomial()
                .or_else(|| self.rank_value(TaxonRank::Species).map(str::to_string));
        }
        self.rank_value(rank).map(str::to_string)
    }

    /// Reset `taxon_rank` and `scientific_name` to the deepest populated rank
    ///
    /// Records without any rank field are returned unchanged.
    pub fn with_inferred_rank(mut self) -> Self {
        if let Some(rank) = self.deepest_rank() {
            self.taxon_rank = rank;
            self.scientific_name = self.name_at_rank(rank).unwrap_or_default();
        }
        self
    }

    /// Drop the opaque checklist metadata
    pub fn clear_metadata(&mut self) {
        self.taxon_id = None;
        self.accepted_taxon_key = None;
        self.accepted_scientific_name = None;
        self.vernacular_name = None;
        self.taxonomic_status = None;
    }
}

// =============================================================================
// Detection
// =============================================================================

/// Provenance of a detection's current identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedBy {
    /// Produced by the detector, never touched by a human
    #[default]
    Auto,
    /// At least one human action has been applied
    User,
}

impl DetectedBy {
    pub fn as_str(self) -> &'static str {
        match self {
            DetectedBy::Auto => DETECTED_BY_AUTO,
            DetectedBy::User => DETECTED_BY_USER,
        }
    }
}

impl std::fmt::Display for DetectedBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single labeled or unlabeled image patch
///
/// Identity fields (`id`, `patch_id`, `photo_id`, `night_id`) never change after
/// ingestion. `label` caches the label computation for the current state and is
/// kept in sync by the identification engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionEntity {
    pub id: String,
    pub patch_id: String,
    pub photo_id: String,
    pub night_id: String,

    /// Single-line display text
    #[serde(default)]
    pub label: String,

    /// Formal taxonomy, absent when unidentified, pure morphospecies or error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxon: Option<TaxonRecord>,

    /// Informal working identifier ("111", "Forcipomyia1")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morphospecies: Option<String>,

    #[serde(default)]
    pub detected_by: DetectedBy,

    /// Epoch milliseconds of the last human action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identified_at: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,

    // Detector geometry and confidence, opaque to the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_path: Option<String>,

    /// Reference checklist that produced the current taxon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species_list_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species_list_doi: Option<String>,
}

impl DetectionEntity {
    /// Create an unlabeled detector-produced detection
    pub fn new_auto(
        id: impl Into<String>,
        patch_id: impl Into<String>,
        photo_id: impl Into<String>,
        night_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            patch_id: patch_id.into(),
            photo_id: photo_id.into(),
            night_id: night_id.into(),
            label: String::new(),
            taxon: None,
            morphospecies: None,
            detected_by: DetectedBy::Auto,
            identified_at: None,
            is_error: None,
            score: None,
            direction: None,
            shape_type: None,
            points: None,
            cluster_id: None,
            patch_path: None,
            species_list_id: None,
            species_list_doi: None,
        }
    }

    /// Whether the detection is marked as an error
    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// Trimmed morphospecies, ignoring blank values
    pub fn morphospecies(&self) -> Option<&str> {
        self.morphospecies
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }

    /// Taxon that still counts, i.e. `None` for error detections
    pub fn active_taxon(&self) -> Option<&TaxonRecord> {
        if self.is_error() {
            None
        } else {
            self.taxon.as_ref()
        }
    }

    /// Whether a human has acted on this detection
    pub fn is_user_identified(&self) -> bool {
        self.detected_by == DetectedBy::User
    }
}
