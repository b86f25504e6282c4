//! Detection to persisted shape

use super::shape::{PhotoDocument, Shape};
use crate::app::models::{DetectedBy, DetectionEntity};
use crate::constants::PHOTO_DOCUMENT_VERSION;

/// Flatten a detection into its persisted shape
///
/// `identifier_human` is recorded only for user-identified detections. Error
/// detections persist no taxonomy at all.
pub fn to_persisted_shape(detection: &DetectionEntity, identifier_human: &str) -> Shape {
    let mut shape = Shape {
        label: Some(detection.label.clone()),
        points: detection.points.clone(),
        shape_type: detection.shape_type.clone(),
        score: detection.score,
        direction: detection.direction,
        patch_path: detection.patch_path.clone(),
        cluster_id: detection.cluster_id,
        species_list: detection.species_list_id.clone(),
        species_list_doi: detection.species_list_doi.clone(),
        identified_at: detection.identified_at,
        ..Default::default()
    };

    if detection.detected_by == DetectedBy::User {
        shape.identifier_human = Some(identifier_human.trim().to_string());
    }

    if detection.is_error() {
        shape.is_error = Some(true);
        return shape;
    }

    if let Some(taxon) = detection.taxon.as_ref() {
        shape.kingdom = taxon.kingdom.clone();
        shape.phylum = taxon.phylum.clone();
        shape.class = taxon.class.clone();
        shape.order = taxon.order.clone();
        shape.family = taxon.family.clone();
        shape.genus = taxon.genus.clone();
        shape.species = taxon.species.clone();
        shape.taxon_rank = Some(taxon.taxon_rank.to_string());
        shape.scientific_name = Some(taxon.scientific_name.clone()).filter(|n| !n.is_empty());
        shape.taxon_id = taxon.taxon_id.clone();
        shape.accepted_taxon_key = taxon.accepted_taxon_key.clone();
        shape.accepted_scientific_name = taxon.accepted_scientific_name.clone();
        shape.vernacular_name = taxon.vernacular_name.clone();
        shape.taxonomic_status = taxon.taxonomic_status.clone();
    }

    shape.morphospecies = detection.morphospecies().map(str::to_string);
    shape
}

/// Build the document for one photo, keeping detection order
pub fn encode_photo_document<'a, I>(
    photo_base: &str,
    detections: I,
    identifier_human: &str,
) -> PhotoDocument
where
    I: IntoIterator<Item = &'a DetectionEntity>,
{
    PhotoDocument {
        version: PHOTO_DOCUMENT_VERSION.to_string(),
        photo_base: photo_base.to_string(),
        shapes: detections
            .into_iter()
            .map(|detection| to_persisted_shape(detection, identifier_human))
            .collect(),
    }
}
