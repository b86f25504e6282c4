//! Tests for the identification engine
//!
//! Shared fixtures for single-detection, batch, session and end-to-end
//! identification scenarios.

pub mod scenario_tests;

use crate::app::models::{DetectionEntity, TaxonRank, TaxonRecord};
use crate::app::services::identification::IdentificationContext;

pub const TEST_TIMESTAMP: i64 = 1_750_000_000_000;

/// Create a fixed-time identification context
pub fn create_test_context() -> IdentificationContext {
    IdentificationContext::at(TEST_TIMESTAMP)
}

/// Create an unlabeled auto detection
pub fn create_test_detection(id: &str) -> DetectionEntity {
    DetectionEntity::new_auto(id, id, "2024_06_01__22_15_00", "site-a/2024-06-01")
}

/// Create an auto detection carrying the given taxon
pub fn create_detection_with_taxon(id: &str, taxon: TaxonRecord) -> DetectionEntity {
    let mut detection = create_test_detection(id);
    detection.label = taxon
        .binomial()
        .or_else(|| taxon.deepest_rank().and_then(|r| taxon.name_at_rank(r)))
        .unwrap_or_default();
    detection.taxon = Some(taxon);
    detection
}

/// Order-level pick under Insecta
pub fn create_order_pick(order: &str) -> TaxonRecord {
    TaxonRecord::new(TaxonRank::Order, order)
        .with_rank(TaxonRank::Kingdom, "Animalia")
        .with_rank(TaxonRank::Phylum, "Arthropoda")
        .with_rank(TaxonRank::Class, "Insecta")
        .with_rank(TaxonRank::Order, order)
}

/// Genus-level pick carrying its family and order
pub fn create_genus_pick(order: &str, family: &str, genus: &str) -> TaxonRecord {
    let mut taxon = create_order_pick(order)
        .with_rank(TaxonRank::Family, family)
        .with_rank(TaxonRank::Genus, genus);
    taxon.taxon_rank = TaxonRank::Genus;
    taxon.scientific_name = genus.to_string();
    taxon
}

/// Species-level pick with a full classification
pub fn create_species_pick(order: &str, family: &str, genus: &str, epithet: &str) -> TaxonRecord {
    let mut taxon = create_genus_pick(order, family, genus).with_rank(TaxonRank::Species, epithet);
    taxon.taxon_rank = TaxonRank::Species;
    taxon.scientific_name = format!("{} {}", genus, epithet);
    taxon.taxon_id = Some(format!("test:{}_{}", genus, epithet));
    taxon
}
