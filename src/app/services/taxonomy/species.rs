//! Species epithet handling
//!
//! Normalizes the species slot of a record to an epithet, parses two-token
//! binomials and recognizes morphospecies codes.

use crate::app::models::{TaxonRank, TaxonRecord};
use crate::constants::MORPHOSPECIES_CODE_PATTERN;
use regex::Regex;
use std::sync::LazyLock;

static MORPHOSPECIES_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(MORPHOSPECIES_CODE_PATTERN).expect("morphospecies code pattern is valid")
});

/// Genus and specific epithet of a binomial name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binomial {
    pub genus: String,
    pub epithet: String,
}

/// Parse a two-token scientific name such as "Musca domestica"
///
/// Returns `None` for single tokens, more than two tokens, or tokens containing
/// anything other than letters and hyphens.
pub fn parse_binomial(text: &str) -> Option<Binomial> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() != 2 {
        return None;
    }

    let is_name_token = |token: &str| {
        token.chars().any(char::is_alphabetic)
            && token.chars().all(|c| c.is_alphabetic() || c == '-')
    };

    if tokens.iter().all(|token| is_name_token(token)) {
        Some(Binomial {
            genus: tokens[0].to_string(),
            epithet: tokens[1].to_string(),
        })
    } else {
        None
    }
}

/// Normalize the species slot of a record to an epithet
///
/// A full binomial in `species` is split and only the epithet kept; its genus
/// replaces whatever genus the record had. A species equal to the
/// genus text is dropped. Species-rank records get their scientific name
/// rebuilt as "Genus epithet".
pub fn normalize_species(taxon: &TaxonRecord) -> TaxonRecord {
    let mut normalized = taxon.clone();

    if let Some(species) = taxon.rank_value(TaxonRank::Species) {
        let genus = taxon.rank_value(TaxonRank::Genus);

        if species.contains(char::is_whitespace) {
            if let Some(binomial) = parse_binomial(species) {
                normalized.genus = Some(binomial.genus);
                normalized.species = Some(binomial.epithet);
            } else if let Some(genus) = genus {
                let epithet = species
                    .strip_prefix(genus)
                    .map(str::trim)
                    .filter(|rest| !rest.is_empty());
                if let Some(epithet) = epithet {
                    normalized.species = Some(epithet.to_string());
                }
            }
        } else if genus.is_some_and(|g| g.eq_ignore_ascii_case(species)) {
            normalized.species = None;
        }
    }

    if normalized.taxon_rank == TaxonRank::Species {
        match normalized.binomial() {
            Some(binomial) => normalized.scientific_name = binomial,
            None if normalized.rank_value(TaxonRank::Species).is_none() => {
                normalized = normalized.with_inferred_rank();
            }
            None => {}
        }
    }

    normalized
}

/// Check whether a value looks like a morphospecies code rather than an epithet
///
/// True for purely numeric tokens ("111") and short prefixed codes ("sp1").
/// Only the export uses this, to scrub codes that leaked into formal fields;
/// identification input is never rejected by it.
pub fn looks_like_morphospecies_code(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && MORPHOSPECIES_CODE.is_match(trimmed)
}
