//! Darwin Core output row and export context

use serde::Serialize;

/// One flattened Darwin Core occurrence record
///
/// Field order is the CSV column order. Every value is a string; unmappable
/// values are empty rather than missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DarwinRow {
    pub kingdom: String,
    pub phylum: String,
    pub class: String,
    pub order: String,
    pub family: String,
    pub genus: String,
    pub species: String,
    pub morphospecies: String,
    #[serde(rename = "taxonID")]
    pub taxon_id: String,
    #[serde(rename = "commonName")]
    pub common_name: String,
    #[serde(rename = "scientificName")]
    pub scientific_name: String,
    #[serde(rename = "taxonRank")]
    pub taxon_rank: String,
    pub name: String,
    pub species_list: String,
    pub species_list_doi: String,
    pub deployment: String,
    #[serde(rename = "eventDate")]
    pub event_date: String,
    #[serde(rename = "eventTime")]
    pub event_time: String,
    #[serde(rename = "verbatimEventDate")]
    pub verbatim_event_date: String,
    pub year: String,
    pub month: String,
    pub day: String,
    #[serde(rename = "basisOfRecord")]
    pub basis_of_record: String,
    #[serde(rename = "datasetID")]
    pub dataset_id: String,
    #[serde(rename = "parentEventID")]
    pub parent_event_id: String,
    #[serde(rename = "eventID")]
    pub event_id: String,
    #[serde(rename = "occurrenceID")]
    pub occurrence_id: String,
    #[serde(rename = "identifiedBy")]
    pub identified_by: String,
    #[serde(rename = "dateIdentified")]
    pub date_identified: String,
    #[serde(rename = "detectedBy")]
    pub detected_by: String,
    pub score: String,
    #[serde(rename = "clusterID")]
    pub cluster_id: String,
    pub patch_path: String,
    pub photo: String,
}

impl DarwinRow {
    /// CSV header, in column order
    pub const COLUMNS: [&'static str; 34] = [
        "kingdom",
        "phylum",
        "class",
        "order",
        "family",
        "genus",
        "species",
        "morphospecies",
        "taxonID",
        "commonName",
        "scientificName",
        "taxonRank",
        "name",
        "species_list",
        "species_list_doi",
        "deployment",
        "eventDate",
        "eventTime",
        "verbatimEventDate",
        "year",
        "month",
        "day",
        "basisOfRecord",
        "datasetID",
        "parentEventID",
        "eventID",
        "occurrenceID",
        "identifiedBy",
        "dateIdentified",
        "detectedBy",
        "score",
        "clusterID",
        "patch_path",
        "photo",
    ];
}

/// Night-level information the row builder needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportContext {
    /// Hierarchical night path, e.g. `project/site/deployment/2025-06-22`
    pub night_path: String,
    /// Configured dataset id; falls back to the first night path segment
    pub dataset_id: Option<String>,
    /// Recorded in `identifiedBy` for user-identified detections
    pub identifier_human: String,
}

impl ExportContext {
    pub fn new(night_path: impl Into<String>) -> Self {
        Self {
            night_path: night_path.into(),
            ..Default::default()
        }
    }

    pub fn with_dataset_id(mut self, dataset_id: impl Into<String>) -> Self {
        self.dataset_id = Some(dataset_id.into());
        self
    }

    pub fn with_identifier(mut self, identifier_human: impl Into<String>) -> Self {
        self.identifier_human = identifier_human.into();
        self
    }
}
