//! Tests for the taxonomy utilities
//!
//! Shared fixtures for rank merging, species normalization and label tests.

pub mod label_tests;
pub mod species_tests;

use crate::app::models::{TaxonRank, TaxonRecord};

/// Create a record with only an order
pub fn create_order_taxon(order: &str) -> TaxonRecord {
    TaxonRecord::new(TaxonRank::Order, order)
        .with_rank(TaxonRank::Kingdom, "Animalia")
        .with_rank(TaxonRank::Phylum, "Arthropoda")
        .with_rank(TaxonRank::Class, "Insecta")
        .with_rank(TaxonRank::Order, order)
}

/// Create a genus-level record under Diptera
pub fn create_genus_taxon(family: &str, genus: &str) -> TaxonRecord {
    let mut taxon = create_order_taxon("Diptera")
        .with_rank(TaxonRank::Family, family)
        .with_rank(TaxonRank::Genus, genus);
    taxon.taxon_rank = TaxonRank::Genus;
    taxon.scientific_name = genus.to_string();
    taxon
}

/// Create a species-level record under Diptera
pub fn create_species_taxon(family: &str, genus: &str, epithet: &str) -> TaxonRecord {
    let mut taxon = create_genus_taxon(family, genus).with_rank(TaxonRank::Species, epithet);
    taxon.taxon_rank = TaxonRank::Species;
    taxon.scientific_name = format!("{} {}", genus, epithet);
    taxon.taxon_id = Some(format!("test:{}-{}", genus, epithet));
    taxon
}
