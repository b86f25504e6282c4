//! Persisted shape to detection
//!
//! Rebuilds detections from shapes of any age. Taxonomy is reconstructed from
//! the flat rank fields by priority (species first), legacy morphospecies codes
//! stored in `species` are moved back to the morphospecies slot, and an error
//! flag voids everything else.

use super::shape::{PhotoContext, PhotoDocument, Shape};
use crate::app::models::{DetectedBy, DetectionEntity, TaxonRank, TaxonRecord};
use crate::app::services::taxonomy::{compute_label, looks_like_morphospecies_code, normalize_species};
use crate::constants::ERROR_LABEL;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Detection id for a shape: the patch file stem, else `{photo}_{index}`
pub fn detection_id(shape: &Shape, context: &PhotoContext) -> String {
    shape
        .patch_path
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .and_then(|p| Path::new(p).file_stem())
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}_{}", context.photo_id, context.shape_index))
}

/// Whether a shape is marked as an error, by flag or by label
pub fn shape_is_error(shape: &Shape) -> bool {
    shape.is_error == Some(true)
        || shape
            .label
            .as_deref()
            .is_some_and(|label| label.trim().eq_ignore_ascii_case(ERROR_LABEL))
}

fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Split a shape's `species` value into formal epithet and morphospecies
///
/// Returns `(species, morphospecies)`.
fn reconcile_morphospecies(shape: &Shape) -> (Option<String>, Option<String>) {
    let species = clean(&shape.species);
    let morphospecies = clean(&shape.morphospecies);

    if shape.morphospecies.is_none() {
        if let Some(value) = species.as_deref() {
            let legacy_bare = shape.taxon_rank.is_none() && clean(&shape.genus).is_none();
            if looks_like_morphospecies_code(value) || legacy_bare {
                debug!("Reloading species '{}' as morphospecies", value);
                return (None, species);
            }
        }
        return (species, None);
    }

    match (species, morphospecies) {
        (Some(s), Some(m)) if s.eq_ignore_ascii_case(&m) => (None, Some(m)),
        (s, m) => (s, m),
    }
}

fn rebuild_taxon(shape: &Shape, species: Option<String>) -> Option<TaxonRecord> {
    let mut taxon = TaxonRecord::new(TaxonRank::Kingdom, "");
    taxon.kingdom = clean(&shape.kingdom);
    taxon.phylum = clean(&shape.phylum);
    taxon.class = clean(&shape.class);
    taxon.order = clean(&shape.order);
    taxon.family = clean(&shape.family);
    taxon.genus = clean(&shape.genus);
    taxon.species = species;

    if !taxon.has_any_rank() {
        return None;
    }

    let mut taxon = taxon.with_inferred_rank();

    // Intermediate ranks cannot be recovered from the rank fields
    let stored_rank = shape
        .taxon_rank
        .as_deref()
        .and_then(|r| TaxonRank::from_str(r).ok());
    if let (Some(rank), Some(name)) = (stored_rank, clean(&shape.scientific_name)) {
        if !rank.is_principal() {
            taxon.taxon_rank = rank;
            taxon.scientific_name = name;
        }
    }

    taxon.taxon_id = clean(&shape.taxon_id);
    taxon.accepted_taxon_key = clean(&shape.accepted_taxon_key);
    taxon.accepted_scientific_name = clean(&shape.accepted_scientific_name);
    taxon.vernacular_name = clean(&shape.vernacular_name);
    taxon.taxonomic_status = clean(&shape.taxonomic_status);

    Some(normalize_species(&taxon))
}

/// Rebuild a detection from its persisted shape
///
/// With an `existing` detection, identity and metadata the shape does not carry
/// fall back to the existing values instead of defaults, so user edits can be
/// overlaid onto previously ingested detections.
pub fn from_persisted_shape(
    shape: &Shape,
    context: &PhotoContext,
    existing: Option<&DetectionEntity>,
) -> DetectionEntity {
    let id = existing
        .map(|d| d.id.clone())
        .unwrap_or_else(|| detection_id(shape, context));
    let patch_id = existing
        .map(|d| d.patch_id.clone())
        .unwrap_or_else(|| id.clone());

    let mut detection = DetectionEntity::new_auto(id, patch_id, &context.photo_id, &context.night_id);

    detection.points = shape.points.clone().or_else(|| existing.and_then(|d| d.points.clone()));
    detection.shape_type = clean(&shape.shape_type).or_else(|| existing.and_then(|d| d.shape_type.clone()));
    detection.score = shape.score.or_else(|| existing.and_then(|d| d.score));
    detection.direction = shape.direction.or_else(|| existing.and_then(|d| d.direction));
    detection.cluster_id = shape.cluster_id.or_else(|| existing.and_then(|d| d.cluster_id));
    detection.patch_path = clean(&shape.patch_path).or_else(|| existing.and_then(|d| d.patch_path.clone()));
    detection.species_list_id =
        clean(&shape.species_list).or_else(|| existing.and_then(|d| d.species_list_id.clone()));
    detection.species_list_doi =
        clean(&shape.species_list_doi).or_else(|| existing.and_then(|d| d.species_list_doi.clone()));
    detection.identified_at = shape
        .identified_at
        .or_else(|| existing.and_then(|d| d.identified_at));

    let user_marked = shape.identifier_human.is_some() || shape.identified_at.is_some();
    detection.detected_by = if user_marked {
        DetectedBy::User
    } else {
        existing.map(|d| d.detected_by).unwrap_or_default()
    };

    if shape_is_error(shape) {
        detection.is_error = Some(true);
        detection.label = ERROR_LABEL.to_string();
        return detection;
    }

    let (species, morphospecies) = reconcile_morphospecies(shape);
    let mut taxon = rebuild_taxon(shape, species);

    let label = compute_label(
        taxon.as_ref(),
        shape.label.as_deref(),
        morphospecies.as_deref(),
        false,
    );
    if let Some(taxon) = taxon.as_mut() {
        taxon.name = Some(label.clone()).filter(|l| !l.is_empty());
    }

    detection.taxon = taxon;
    detection.morphospecies = morphospecies;
    detection.label = label;
    detection
}

/// Decode every shape of a photo document
pub fn decode_photo_document(document: &PhotoDocument, night_id: &str) -> Vec<DetectionEntity> {
    overlay_photo_document(document, night_id, &HashMap::new())
}

/// Decode a photo document on top of already loaded detections, matched by id
pub fn overlay_photo_document(
    document: &PhotoDocument,
    night_id: &str,
    existing: &HashMap<String, DetectionEntity>,
) -> Vec<DetectionEntity> {
    document
        .shapes
        .iter()
        .enumerate()
        .map(|(index, shape)| {
            let context = PhotoContext::new(&document.photo_base, night_id, index);
            let previous = existing.get(&detection_id(shape, &context));
            from_persisted_shape(shape, &context, previous)
        })
        .collect()
}
