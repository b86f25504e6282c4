//! Decoding and legacy reconciliation tests

use super::*;
use crate::app::models::DetectedBy;
use crate::app::services::shape_codec::{
    PhotoDocument, decode_photo_document, detection_id, from_persisted_shape,
    overlay_photo_document,
};
use std::collections::HashMap;

#[test]
fn test_detection_id_from_patch_path() {
    let shape = Shape {
        patch_path: Some("patches/2024_06_01__22_15_00_3.jpg".to_string()),
        ..Default::default()
    };
    assert_eq!(
        detection_id(&shape, &create_test_photo_context(3)),
        "2024_06_01__22_15_00_3"
    );

    let anonymous = Shape::default();
    assert_eq!(
        detection_id(&anonymous, &create_test_photo_context(7)),
        format!("{}_7", TEST_PHOTO)
    );
}

#[test]
fn test_rank_detected_by_priority() {
    let shape = Shape {
        order: Some("Diptera".to_string()),
        family: Some("Muscidae".to_string()),
        ..Default::default()
    };
    let detection = from_persisted_shape(&shape, &create_test_photo_context(0), None);
    let taxon = detection.taxon.unwrap();

    assert_eq!(taxon.taxon_rank, TaxonRank::Family);
    assert_eq!(taxon.scientific_name, "Muscidae");
    assert_eq!(detection.label, "Muscidae");
    assert_eq!(detection.detected_by, DetectedBy::Auto);
}

#[test]
fn test_intermediate_rank_restored_from_shape() {
    let shape = Shape {
        order: Some("Diptera".to_string()),
        family: Some("Muscidae".to_string()),
        taxon_rank: Some("tribe".to_string()),
        scientific_name: Some("Muscini".to_string()),
        ..Default::default()
    };
    let taxon = from_persisted_shape(&shape, &create_test_photo_context(0), None)
        .taxon
        .unwrap();

    assert_eq!(taxon.taxon_rank, TaxonRank::Tribe);
    assert_eq!(taxon.scientific_name, "Muscini");
}

#[test]
fn test_unknown_rank_text_is_ignored() {
    let shape = Shape {
        order: Some("Diptera".to_string()),
        taxon_rank: Some("morphospecies".to_string()),
        scientific_name: Some("111".to_string()),
        ..Default::default()
    };
    let taxon = from_persisted_shape(&shape, &create_test_photo_context(0), None)
        .taxon
        .unwrap();

    assert_eq!(taxon.taxon_rank, TaxonRank::Order);
    assert_eq!(taxon.scientific_name, "Diptera");
}

#[test]
fn test_legacy_numeric_species_becomes_morphospecies() {
    let shape = create_legacy_shape(Some("Lispe"), Some("111"));
    let detection = from_persisted_shape(&shape, &create_test_photo_context(0), None);
    let taxon = detection.taxon.as_ref().unwrap();

    assert_eq!(detection.morphospecies.as_deref(), Some("111"));
    assert_eq!(taxon.species, None);
    assert_eq!(taxon.genus.as_deref(), Some("Lispe"));
    assert_eq!(detection.label, "111");
}

#[test]
fn test_legacy_bare_species_becomes_morphospecies() {
    let shape = create_legacy_shape(None, Some("Forcipomyia1"));
    let detection = from_persisted_shape(&shape, &create_test_photo_context(0), None);

    assert_eq!(detection.morphospecies.as_deref(), Some("Forcipomyia1"));
    assert_eq!(detection.taxon.as_ref().unwrap().taxon_rank, TaxonRank::Order);
}

#[test]
fn test_formal_epithet_with_genus_is_kept() {
    let shape = create_legacy_shape(Some("Musca"), Some("domestica"));
    let detection = from_persisted_shape(&shape, &create_test_photo_context(0), None);
    let taxon = detection.taxon.as_ref().unwrap();

    assert_eq!(detection.morphospecies, None);
    assert_eq!(taxon.species.as_deref(), Some("domestica"));
    assert_eq!(taxon.scientific_name, "Musca domestica");
    assert_eq!(detection.label, "Musca domestica");
}

#[test]
fn test_species_equal_to_morphospecies_dropped() {
    let mut shape = create_legacy_shape(Some("Lispe"), Some("Lispe-A"));
    shape.morphospecies = Some("Lispe-A".to_string());
    let detection = from_persisted_shape(&shape, &create_test_photo_context(0), None);

    assert_eq!(detection.morphospecies.as_deref(), Some("Lispe-A"));
    assert_eq!(detection.taxon.unwrap().species, None);
}

#[test]
fn test_error_flag_voids_taxonomy() {
    let mut shape = create_legacy_shape(Some("Musca"), Some("domestica"));
    shape.is_error = Some(true);
    let detection = from_persisted_shape(&shape, &create_test_photo_context(0), None);

    assert!(detection.is_error());
    assert!(detection.taxon.is_none());
    assert_eq!(detection.label, "ERROR");
}

#[test]
fn test_error_label_voids_taxonomy() {
    let mut shape = create_legacy_shape(Some("Musca"), Some("domestica"));
    shape.label = Some("error".to_string());
    let detection = from_persisted_shape(&shape, &create_test_photo_context(0), None);

    assert!(detection.is_error());
    assert!(detection.taxon.is_none());
}

#[test]
fn test_missing_fields_fall_back_to_existing() {
    let mut existing = create_test_detection("p1");
    existing.detected_by = DetectedBy::User;
    existing.identified_at = Some(42);
    existing.cluster_id = Some(5);

    let shape = Shape {
        label: Some("Diptera".to_string()),
        order: Some("Diptera".to_string()),
        ..Default::default()
    };
    let detection = from_persisted_shape(&shape, &create_test_photo_context(0), Some(&existing));

    assert_eq!(detection.id, "p1");
    assert_eq!(detection.identified_at, Some(42));
    assert_eq!(detection.detected_by, DetectedBy::User);
    assert_eq!(detection.cluster_id, Some(5));
    assert_eq!(detection.score, Some(0.87));
}

#[test]
fn test_label_only_shape_keeps_label() {
    let shape = Shape {
        label: Some("moth".to_string()),
        ..Default::default()
    };
    let detection = from_persisted_shape(&shape, &create_test_photo_context(2), None);

    assert!(detection.taxon.is_none());
    assert_eq!(detection.label, "moth");
    assert_eq!(detection.id, format!("{}_2", TEST_PHOTO));
}

#[test]
fn test_decode_document_tolerates_partial_json() {
    let json = r#"{
        "photoBase": "2024_06_01__22_15_00",
        "shapes": [
            {"label": "Diptera", "order": "Diptera", "patch_path": "patches/a.jpg", "extra": 1},
            {}
        ]
    }"#;
    let document: PhotoDocument = serde_json::from_str(json).unwrap();
    let detections = decode_photo_document(&document, TEST_NIGHT);

    assert_eq!(detections.len(), 2);
    assert_eq!(detections[0].id, "a");
    assert_eq!(detections[0].night_id, TEST_NIGHT);
    assert_eq!(detections[1].id, format!("{}_1", TEST_PHOTO));
    assert_eq!(detections[1].label, "");
}

#[test]
fn test_overlay_matches_existing_by_id() {
    let mut existing = create_test_detection("a");
    existing.identified_at = Some(7);
    let mut previous = HashMap::new();
    previous.insert("a".to_string(), existing);

    let document = PhotoDocument {
        version: "1".to_string(),
        photo_base: TEST_PHOTO.to_string(),
        shapes: vec![Shape {
            patch_path: Some("patches/a.jpg".to_string()),
            ..Default::default()
        }],
    };
    let detections = overlay_photo_document(&document, TEST_NIGHT, &previous);

    assert_eq!(detections[0].identified_at, Some(7));
    assert_eq!(detections[0].detected_by, DetectedBy::Auto);
}
