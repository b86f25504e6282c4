//! Persisted document types
//!
//! One JSON document per photo holds the shapes of all detections on that
//! photo. Every shape field is optional: documents written by older versions,
//! by the detector, or by hand may carry any subset of them.

use serde::{Deserialize, Serialize};

/// Flat persisted record of one detection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    // Detector geometry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_path: Option<String>,
    #[serde(rename = "clusterID", default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<i64>,

    // Flattened taxonomy
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,

    /// Kept as text so unknown ranks in old documents do not fail the whole file
    #[serde(rename = "taxonRank", default, skip_serializing_if = "Option::is_none")]
    pub taxon_rank: Option<String>,
    #[serde(rename = "scientificName", default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,

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

    /// Absent when never set, so reload can tell it apart from a cleared value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morphospecies: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species_list: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species_list_doi: Option<String>,

    // Identification metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier_human: Option<String>,
    /// Epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identified_at: Option<i64>,
}

/// Persisted document for one photo
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoDocument {
    #[serde(default)]
    pub version: String,
    #[serde(rename = "photoBase", default)]
    pub photo_base: String,
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

/// Where a shape sits, needed to rebuild detection identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoContext {
    pub photo_id: String,
    pub night_id: String,
    /// Position of the shape within its document
    pub shape_index: usize,
}

impl PhotoContext {
    pub fn new(photo_id: impl Into<String>, night_id: impl Into<String>, shape_index: usize) -> Self {
        Self {
            photo_id: photo_id.into(),
            night_id: night_id.into(),
            shape_index,
        }
    }
}
