//! Tests for display label computation

use super::*;
use crate::app::models::DetectionEntity;
use crate::app::services::taxonomy::label::{compute_label, label_for_detection};

#[test]
fn test_error_label_wins() {
    let taxon = create_species_taxon("Muscidae", "Musca", "domestica");
    assert_eq!(
        compute_label(Some(&taxon), Some("fly"), Some("111"), true),
        "ERROR"
    );
}

#[test]
fn test_morphospecies_is_never_genus_prefixed() {
    let taxon = create_genus_taxon("Muscidae", "Lispe");

    let label = compute_label(Some(&taxon), None, Some("111"), false);

    assert_eq!(label, "111");
    assert_ne!(label, "Lispe 111");
}

#[test]
fn test_morphospecies_returned_verbatim() {
    assert_eq!(
        compute_label(None, None, Some("Forcipomyia1"), false),
        "Forcipomyia1"
    );
    // Blank morphospecies falls through to the taxon
    let taxon = create_order_taxon("Diptera");
    assert_eq!(compute_label(Some(&taxon), None, Some("  "), false), "Diptera");
}

#[test]
fn test_binomial_label() {
    let taxon = create_species_taxon("Muscidae", "Musca", "domestica");
    assert_eq!(compute_label(Some(&taxon), None, None, false), "Musca domestica");
}

#[test]
fn test_deepest_rank_label() {
    let family = create_order_taxon("Diptera").with_rank(TaxonRank::Family, "Muscidae");
    assert_eq!(compute_label(Some(&family), None, None, false), "Muscidae");

    let bare_species =
        TaxonRecord::new(TaxonRank::Species, "domestica").with_rank(TaxonRank::Species, "domestica");
    assert_eq!(compute_label(Some(&bare_species), None, None, false), "domestica");
}

#[test]
fn test_explicit_label_fallback() {
    let empty = TaxonRecord::new(TaxonRank::Tribe, "Muscini");
    assert_eq!(compute_label(Some(&empty), Some("moth"), None, false), "moth");
    assert_eq!(compute_label(None, Some("  "), None, false), "");
    assert_eq!(compute_label(None, None, None, false), "");
}

#[test]
fn test_label_for_detection() {
    let mut detection = DetectionEntity::new_auto("p1", "p1", "photo", "night");
    detection.label = "creature".to_string();
    assert_eq!(label_for_detection(&detection), "creature");

    detection.taxon = Some(create_genus_taxon("Muscidae", "Lispe"));
    detection.morphospecies = Some("111".to_string());
    assert_eq!(label_for_detection(&detection), "111");

    detection.is_error = Some(true);
    assert_eq!(label_for_detection(&detection), "ERROR");
}
