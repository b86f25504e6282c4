//! End-to-end identification sequences on a single detection

use super::*;
use crate::app::models::DetectedBy;
use crate::app::services::identification::{IdentificationInput, identify};

fn apply(detection: &DetectionEntity, input: IdentificationInput) -> DetectionEntity {
    let outcome = identify(detection, &input, &create_test_context());
    assert!(outcome.changed, "{} was skipped: {:?}", input.kind(), outcome.skip_reason);
    outcome.detection
}

#[test]
fn test_genus_refinement_keeps_morphospecies() {
    let detection = apply(
        &create_test_detection("p1"),
        IdentificationInput::taxon_pick(create_order_pick("Diptera")),
    );
    assert_eq!(detection.label, "Diptera");

    let detection = apply(&detection, IdentificationInput::morphospecies("111"));
    assert_eq!(detection.label, "111");

    let detection = apply(
        &detection,
        IdentificationInput::taxon_pick(create_genus_pick("Diptera", "Muscidae", "Lispe")),
    );
    let taxon = detection.taxon.as_ref().unwrap();

    assert_eq!(detection.label, "111");
    assert_eq!(detection.morphospecies.as_deref(), Some("111"));
    assert_eq!(taxon.order.as_deref(), Some("Diptera"));
    assert_eq!(taxon.family.as_deref(), Some("Muscidae"));
    assert_eq!(taxon.genus.as_deref(), Some("Lispe"));
    assert_eq!(taxon.species, None);
    assert_eq!(taxon.taxon_rank, TaxonRank::Genus);
    assert_eq!(taxon.scientific_name, "Lispe");
    assert_eq!(detection.detected_by, DetectedBy::User);
}

#[test]
fn test_family_refinement_keeps_morphospecies() {
    let detection = apply(
        &create_detection_with_taxon("p1", create_order_pick("Diptera")),
        IdentificationInput::morphospecies("Chiro-7"),
    );

    let mut family = create_order_pick("Diptera").with_rank(TaxonRank::Family, "Chironomidae");
    family.taxon_rank = TaxonRank::Family;
    family.scientific_name = "Chironomidae".to_string();
    let detection = apply(&detection, IdentificationInput::taxon_pick(family));

    assert_eq!(detection.label, "Chiro-7");
    assert_eq!(detection.taxon.as_ref().unwrap().taxon_rank, TaxonRank::Family);
    assert_eq!(detection.taxon.as_ref().unwrap().name.as_deref(), Some("Chiro-7"));
}

#[test]
fn test_species_pick_replaces_morphospecies() {
    let detection = apply(
        &create_detection_with_taxon("p1", create_genus_pick("Diptera", "Muscidae", "Lispe")),
        IdentificationInput::morphospecies("111"),
    );

    let detection = apply(
        &detection,
        IdentificationInput::taxon_pick(create_species_pick(
            "Diptera", "Muscidae", "Musca", "domestica",
        )),
    );
    let taxon = detection.taxon.as_ref().unwrap();

    assert_eq!(detection.label, "Musca domestica");
    assert_eq!(detection.morphospecies, None);
    assert_eq!(taxon.genus.as_deref(), Some("Musca"));
    assert_eq!(taxon.species.as_deref(), Some("domestica"));
    assert_eq!(taxon.scientific_name, "Musca domestica");
}

#[test]
fn test_order_change_cascade_clears_deeper_ranks() {
    let detection = create_detection_with_taxon(
        "p1",
        create_species_pick("Diptera", "Muscidae", "Musca", "domestica"),
    );

    let detection = apply(
        &detection,
        IdentificationInput::taxon_pick(create_order_pick("Lepidoptera")),
    );
    let taxon = detection.taxon.as_ref().unwrap();

    assert_eq!(detection.label, "Lepidoptera");
    assert_eq!(taxon.order.as_deref(), Some("Lepidoptera"));
    assert_eq!(taxon.family, None);
    assert_eq!(taxon.genus, None);
    assert_eq!(taxon.species, None);
    assert_eq!(taxon.class.as_deref(), Some("Insecta"));
}

#[test]
fn test_error_and_identification_are_mutually_exclusive() {
    let detection = apply(
        &create_detection_with_taxon("p1", create_order_pick("Diptera")),
        IdentificationInput::MarkError,
    );
    assert!(detection.is_error());
    assert!(detection.taxon.is_none());

    let outcome = identify(
        &detection,
        &IdentificationInput::morphospecies("111"),
        &create_test_context(),
    );
    assert!(outcome.skipped());

    let detection = apply(
        &detection,
        IdentificationInput::taxon_pick(create_order_pick("Coleoptera")),
    );
    assert!(!detection.is_error());
    assert_eq!(detection.is_error, None);
    assert_eq!(detection.label, "Coleoptera");
}

#[test]
fn test_label_never_prefixes_morphospecies_with_genus() {
    let detection = apply(
        &create_detection_with_taxon("p1", create_genus_pick("Diptera", "Muscidae", "Lispe")),
        IdentificationInput::morphospecies("sp1"),
    );

    assert_eq!(detection.label, "sp1");
    assert_eq!(detection.taxon.as_ref().unwrap().scientific_name, "Lispe");
}
