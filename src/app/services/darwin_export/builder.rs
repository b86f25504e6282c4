//! Detection to Darwin Core row mapping
//!
//! Rows are built from possibly inconsistent historical data. Morphospecies
//! codes found in formal fields are blanked, error detections export no
//! taxonomy, and no input causes a failure.

use super::naming::{
    dataset_id, deployment_from_night_path, event_id, normalize_night_path, occurrence_id,
    parse_filename_timestamp,
};
use super::row::{DarwinRow, ExportContext};
use crate::app::models::{DetectionEntity, TaxonRank};
use crate::app::services::taxonomy::{
    label_for_detection, looks_like_morphospecies_code, normalize_species,
};
use crate::constants::{BASIS_OF_RECORD, ERROR_LABEL, fixed_taxonomy};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

/// Counters for one export run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub rows: usize,
    pub error_rows: usize,
    pub morphospecies_rows: usize,
    /// Species values blanked because they looked like morphospecies codes
    pub sanitized_species: usize,
    /// Scientific names blanked for the same reason
    pub sanitized_scientific_names: usize,
    /// Rows whose photo and patch ids carry no usable timestamp
    pub missing_timestamps: usize,
}

impl ExportStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sanitized_total(&self) -> usize {
        self.sanitized_species + self.sanitized_scientific_names
    }

    /// One-line summary for reporting
    pub fn summary(&self) -> String {
        format!(
            "Export Summary: {} rows | {} errors | {} morphospecies | {} values sanitized | {} without timestamp",
            self.rows,
            self.error_rows,
            self.morphospecies_rows,
            self.sanitized_total(),
            self.missing_timestamps
        )
    }
}

#[derive(Debug, Default)]
struct Sanitized {
    species: bool,
    scientific_name: bool,
}

/// Map one detection to its output row
pub fn build_row(detection: &DetectionEntity, context: &ExportContext) -> DarwinRow {
    build_row_tracked(detection, context).0
}

fn build_row_tracked(detection: &DetectionEntity, context: &ExportContext) -> (DarwinRow, Sanitized) {
    let mut row = DarwinRow::default();
    let mut sanitized = Sanitized::default();

    fill_event_columns(&mut row, detection, context);

    if detection.is_error() {
        row.name = ERROR_LABEL.to_string();
        return (row, sanitized);
    }

    let morphospecies = detection.morphospecies();

    row.kingdom = fixed_taxonomy::KINGDOM.to_string();
    row.phylum = fixed_taxonomy::PHYLUM.to_string();
    row.class = fixed_taxonomy::CLASS.to_string();
    row.morphospecies = morphospecies.unwrap_or_default().to_string();
    row.name = label_for_detection(detection);

    if let Some(original) = detection.taxon.as_ref() {
        let taxon = normalize_species(original);
        let value = |rank| taxon.rank_value(rank).unwrap_or_default().to_string();
        row.order = value(TaxonRank::Order);
        row.family = value(TaxonRank::Family);
        row.genus = value(TaxonRank::Genus);

        let species = value(TaxonRank::Species);
        let is_morphospecies = |text: &str| {
            looks_like_morphospecies_code(text)
                || morphospecies.is_some_and(|m| m.eq_ignore_ascii_case(text))
        };
        // "Lispe 111" style names carry a code in the epithet position
        let has_code_epithet = |text: &str| {
            let tokens: Vec<&str> = text.split_whitespace().collect();
            tokens.len() > 1 && tokens.last().is_some_and(|t| is_morphospecies(*t))
        };

        if !species.is_empty() && is_morphospecies(&species) {
            debug!("Blanking species '{}' on {}", species, detection.id);
            sanitized.species = true;
        } else {
            row.species = species;
        }

        let scientific_name = original.scientific_name.trim();
        if !scientific_name.is_empty()
            && (is_morphospecies(scientific_name) || has_code_epithet(scientific_name))
        {
            debug!("Blanking scientificName '{}' on {}", scientific_name, detection.id);
            sanitized.scientific_name = true;
        } else {
            row.scientific_name = scientific_name.to_string();
        }

        row.taxon_rank = taxon.taxon_rank.to_string();
        row.taxon_id = taxon.taxon_id.clone().unwrap_or_default();
        row.common_name = taxon.vernacular_name.clone().unwrap_or_default();
    }

    (row, sanitized)
}

fn fill_event_columns(row: &mut DarwinRow, detection: &DetectionEntity, context: &ExportContext) {
    let night_path = normalize_night_path(&context.night_path);
    let event = event_id(&night_path, &detection.photo_id);

    if let Some(timestamp) = parse_filename_timestamp(&detection.photo_id)
        .or_else(|| parse_filename_timestamp(&detection.patch_id))
    {
        row.event_date = timestamp.event_date();
        row.event_time = timestamp.event_time();
        row.verbatim_event_date = timestamp.verbatim.clone();
        row.year = timestamp.date.format("%Y").to_string();
        row.month = timestamp.date.format("%-m").to_string();
        row.day = timestamp.date.format("%-d").to_string();
    }

    row.deployment = deployment_from_night_path(&night_path);
    row.basis_of_record = BASIS_OF_RECORD.to_string();
    row.dataset_id = dataset_id(context.dataset_id.as_deref(), &night_path);
    row.occurrence_id = occurrence_id(&event, &detection.id);
    row.event_id = event;
    row.parent_event_id = night_path;

    row.species_list = detection.species_list_id.clone().unwrap_or_default();
    row.species_list_doi = detection.species_list_doi.clone().unwrap_or_default();

    if detection.is_user_identified() {
        row.identified_by = context.identifier_human.trim().to_string();
    }
    row.date_identified = detection
        .identified_at
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default();
    row.detected_by = detection.detected_by.to_string();
    row.score = detection.score.map(|s| s.to_string()).unwrap_or_default();
    row.cluster_id = detection.cluster_id.map(|c| c.to_string()).unwrap_or_default();
    row.patch_path = detection.patch_path.clone().unwrap_or_default();
    row.photo = detection.photo_id.clone();
}

/// Map every detection to a row, collecting export counters
pub fn build_rows<'a, I>(detections: I, context: &ExportContext) -> (Vec<DarwinRow>, ExportStats)
where
    I: IntoIterator<Item = &'a DetectionEntity>,
{
    let mut stats = ExportStats::new();
    let rows = detections
        .into_iter()
        .map(|detection| {
            let (row, sanitized) = build_row_tracked(detection, context);

            stats.rows += 1;
            if detection.is_error() {
                stats.error_rows += 1;
            }
            if !row.morphospecies.is_empty() {
                stats.morphospecies_rows += 1;
            }
            if sanitized.species {
                stats.sanitized_species += 1;
            }
            if sanitized.scientific_name {
                stats.sanitized_scientific_names += 1;
            }
            if row.event_date.is_empty() {
                stats.missing_timestamps += 1;
            }
            row
        })
        .collect();

    (rows, stats)
}
