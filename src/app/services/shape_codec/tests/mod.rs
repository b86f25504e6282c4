//! Tests for the shape codec
//!
//! Fixtures build detections through the identification engine so encoded
//! shapes reflect states the engine actually produces.

pub mod decode_tests;

use crate::app::models::{DetectionEntity, TaxonRank, TaxonRecord};
use crate::app::services::identification::{IdentificationContext, IdentificationInput, identify};
use crate::app::services::shape_codec::{PhotoContext, Shape};

pub const TEST_PHOTO: &str = "2024_06_01__22_15_00";
pub const TEST_NIGHT: &str = "site-a/2024-06-01";

pub fn create_test_photo_context(index: usize) -> PhotoContext {
    PhotoContext::new(TEST_PHOTO, TEST_NIGHT, index)
}

pub fn create_test_detection(id: &str) -> DetectionEntity {
    let mut detection = DetectionEntity::new_auto(id, id, TEST_PHOTO, TEST_NIGHT);
    detection.patch_path = Some(format!("patches/{}.jpg", id));
    detection.score = Some(0.87);
    detection.shape_type = Some("rectangle".to_string());
    detection.points = Some(vec![vec![10.0, 20.0], vec![110.0, 140.0]]);
    detection
}

pub fn create_diptera_pick() -> TaxonRecord {
    TaxonRecord::new(TaxonRank::Order, "Diptera")
        .with_rank(TaxonRank::Kingdom, "Animalia")
        .with_rank(TaxonRank::Phylum, "Arthropoda")
        .with_rank(TaxonRank::Class, "Insecta")
        .with_rank(TaxonRank::Order, "Diptera")
}

pub fn create_lispe_pick() -> TaxonRecord {
    let mut taxon = create_diptera_pick()
        .with_rank(TaxonRank::Family, "Muscidae")
        .with_rank(TaxonRank::Genus, "Lispe");
    taxon.taxon_rank = TaxonRank::Genus;
    taxon.scientific_name = "Lispe".to_string();
    taxon
}

pub fn create_musca_domestica_pick() -> TaxonRecord {
    let mut taxon = create_diptera_pick()
        .with_rank(TaxonRank::Family, "Muscidae")
        .with_rank(TaxonRank::Genus, "Musca")
        .with_rank(TaxonRank::Species, "domestica");
    taxon.taxon_rank = TaxonRank::Species;
    taxon.scientific_name = "Musca domestica".to_string();
    taxon.taxon_id = Some("GBIF:5049975".to_string());
    taxon.vernacular_name = Some("House fly".to_string());
    taxon
}

/// Apply a sequence of inputs, asserting each one succeeds
pub fn identify_all(detection: DetectionEntity, inputs: Vec<IdentificationInput>) -> DetectionEntity {
    let context = IdentificationContext::at(1_750_000_000_000);
    inputs.into_iter().fold(detection, |current, input| {
        let outcome = identify(&current, &input, &context);
        assert!(!outcome.skipped(), "{} skipped", input.kind());
        outcome.detection
    })
}

/// Shape with only the given rank fields set
pub fn create_legacy_shape(genus: Option<&str>, species: Option<&str>) -> Shape {
    Shape {
        label: Some("legacy".to_string()),
        order: Some("Diptera".to_string()),
        genus: genus.map(str::to_string),
        species: species.map(str::to_string),
        ..Default::default()
    }
}
