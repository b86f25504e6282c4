//! Tests for species normalization, binomial parsing and code detection

use super::*;
use crate::app::services::taxonomy::species::{
    Binomial, looks_like_morphospecies_code, normalize_species, parse_binomial,
};

#[test]
fn test_parse_binomial_valid() {
    assert_eq!(
        parse_binomial("Musca domestica"),
        Some(Binomial {
            genus: "Musca".to_string(),
            epithet: "domestica".to_string(),
        })
    );

    // Surrounding and repeated whitespace is tolerated
    let parsed = parse_binomial("  Aedes   albo-pictus ").unwrap();
    assert_eq!(parsed.genus, "Aedes");
    assert_eq!(parsed.epithet, "albo-pictus");
}

#[test]
fn test_parse_binomial_rejects_other_shapes() {
    assert_eq!(parse_binomial("Musca"), None);
    assert_eq!(parse_binomial(""), None);
    assert_eq!(parse_binomial("Musca domestica nebulo"), None);
    assert_eq!(parse_binomial("Forcipomyia 111"), None);
    assert_eq!(parse_binomial("Musca sp."), None);
}

#[test]
fn test_normalize_splits_binomial_species() {
    let mut taxon = create_genus_taxon("Muscidae", "Musca");
    taxon.species = Some("Musca domestica".to_string());
    taxon.taxon_rank = TaxonRank::Species;

    let normalized = normalize_species(&taxon);

    assert_eq!(normalized.species.as_deref(), Some("domestica"));
    assert_eq!(normalized.genus.as_deref(), Some("Musca"));
    assert_eq!(normalized.scientific_name, "Musca domestica");
}

#[test]
fn test_normalize_fills_missing_genus() {
    let taxon = TaxonRecord::new(TaxonRank::Species, "Musca domestica")
        .with_rank(TaxonRank::Species, "Musca domestica");

    let normalized = normalize_species(&taxon);

    assert_eq!(normalized.genus.as_deref(), Some("Musca"));
    assert_eq!(normalized.species.as_deref(), Some("domestica"));
}

#[test]
fn test_normalize_binomial_genus_wins() {
    let mut taxon = create_genus_taxon("Muscidae", "Lispe");
    taxon.species = Some("Musca domestica".to_string());
    taxon.taxon_rank = TaxonRank::Species;

    let normalized = normalize_species(&taxon);

    assert_eq!(normalized.genus.as_deref(), Some("Musca"));
    assert_eq!(normalized.species.as_deref(), Some("domestica"));
    assert_eq!(normalized.scientific_name, "Musca domestica");
}

#[test]
fn test_normalize_strips_genus_prefix_from_trinomial() {
    let mut taxon = create_genus_taxon("Muscidae", "Musca");
    taxon.species = Some("Musca domestica nebulo".to_string());
    taxon.taxon_rank = TaxonRank::Species;

    let normalized = normalize_species(&taxon);
    assert_eq!(normalized.species.as_deref(), Some("domestica nebulo"));
}

#[test]
fn test_normalize_drops_species_duplicating_genus() {
    let mut taxon = create_genus_taxon("Muscidae", "Musca");
    taxon.species = Some("Musca".to_string());
    taxon.taxon_rank = TaxonRank::Species;

    let normalized = normalize_species(&taxon);

    assert_eq!(normalized.species, None);
    assert_eq!(normalized.taxon_rank, TaxonRank::Genus);
    assert_eq!(normalized.scientific_name, "Musca");
}

#[test]
fn test_normalize_leaves_epithet_untouched() {
    let taxon = create_species_taxon("Muscidae", "Musca", "domestica");
    assert_eq!(normalize_species(&taxon), taxon);
}

#[test]
fn test_normalize_is_idempotent() {
    let mut taxon = create_genus_taxon("Muscidae", "Musca");
    taxon.species = Some("Musca domestica".to_string());
    taxon.taxon_rank = TaxonRank::Species;

    let once = normalize_species(&taxon);
    let twice = normalize_species(&once);
    assert_eq!(once, twice);
}

#[test]
fn test_looks_like_morphospecies_code() {
    assert!(looks_like_morphospecies_code("111"));
    assert!(looks_like_morphospecies_code(" 7 "));
    assert!(looks_like_morphospecies_code("sp1"));
    assert!(looks_like_morphospecies_code("sp. 12"));
    assert!(looks_like_morphospecies_code("MS3a"));

    assert!(!looks_like_morphospecies_code("domestica"));
    assert!(!looks_like_morphospecies_code("Forcipomyia1"));
    assert!(!looks_like_morphospecies_code("Musca domestica"));
    assert!(!looks_like_morphospecies_code(""));
    assert!(!looks_like_morphospecies_code("sp"));
}
