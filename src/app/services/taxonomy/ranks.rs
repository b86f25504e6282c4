//! Rank lattice operations
//!
//! Comparison and merging of taxonomic records along the fixed
//! kingdom < phylum < class < order < family < genus < species ordering.

use crate::app::models::{TaxonRank, TaxonRecord};
use tracing::debug;

/// Ranks whose presence gives a morphospecies something to be grouped under
const CONTEXT_RANKS: [TaxonRank; 3] = [TaxonRank::Order, TaxonRank::Family, TaxonRank::Genus];

/// Check whether rank `a` is at least as deep as rank `b`
pub fn is_rank_deeper_or_equal(a: TaxonRank, b: TaxonRank) -> bool {
    a.depth() >= b.depth()
}

/// Merge an incoming record into an existing one
///
/// For each principal rank the incoming value wins when present, otherwise the
/// existing value is kept. Ranks deeper than the incoming record's asserted
/// `taxon_rank` are dropped from both sides (cascade-clear).
///
/// Scientific name, rank and checklist metadata come from the incoming record.
/// The display `name` is left empty for the caller to bind.
pub fn merge_ranks(existing: &TaxonRecord, incoming: &TaxonRecord) -> TaxonRecord {
    let asserted = incoming.taxon_rank;
    let mut merged = TaxonRecord::new(asserted, incoming.scientific_name.trim());

    for rank in TaxonRank::PRINCIPAL {
        if !is_rank_deeper_or_equal(asserted, rank) {
            if existing.rank_value(rank).is_some() {
                debug!("Cascade-clearing {} below asserted {}", rank, asserted);
            }
            continue;
        }

        let value = incoming
            .rank_value(rank)
            .or_else(|| existing.rank_value(rank));
        merged.set_rank_value(rank, value.map(str::to_string));
    }

    if merged.scientific_name.is_empty() {
        if let Some(name) = merged.name_at_rank(asserted) {
            merged.scientific_name = name;
        }
    }

    merged.taxon_id = incoming.taxon_id.clone();
    merged.accepted_taxon_key = incoming.accepted_taxon_key.clone();
    merged.accepted_scientific_name = incoming.accepted_scientific_name.clone();
    merged.vernacular_name = incoming.vernacular_name.clone();
    merged.taxonomic_status = incoming.taxonomic_status.clone();

    merged
}

/// Check whether the incoming record changes the value at its own asserted rank
///
/// Only a replacement counts as a change: filling a rank the existing record
/// never had is a refinement. Intermediate ranks compare scientific names when
/// both records sit at that same rank.
pub fn rank_value_changed(existing: &TaxonRecord, incoming: &TaxonRecord) -> bool {
    let rank = incoming.taxon_rank;

    if rank.is_principal() {
        return match (existing.rank_value(rank), incoming.rank_value(rank)) {
            (Some(old), Some(new)) => !old.eq_ignore_ascii_case(new),
            _ => false,
        };
    }

    existing.taxon_rank == rank
        && !existing.scientific_name.trim().is_empty()
        && !existing
            .scientific_name
            .trim()
            .eq_ignore_ascii_case(incoming.scientific_name.trim())
}

/// Check whether a record has order, family or genus populated
///
/// This is the precondition for attaching a morphospecies: a working name with
/// no taxonomic context cannot be grouped or exported meaningfully.
pub fn has_higher_taxonomy_context(taxon: &TaxonRecord) -> bool {
    CONTEXT_RANKS
        .iter()
        .any(|rank| taxon.rank_value(*rank).is_some())
}

/// Reduce a record to its kingdom..genus context
///
/// The species epithet is dropped, rank and scientific name are re-derived from
/// the deepest remaining rank, and species-level checklist metadata is cleared.
/// Returns `None` when no higher-taxonomy context exists.
pub fn higher_taxonomy_context(taxon: &TaxonRecord) -> Option<TaxonRecord> {
    if !has_higher_taxonomy_context(taxon) {
        return None;
    }

    let mut context = TaxonRecord::new(taxon.taxon_rank, taxon.scientific_name.clone());
    for rank in TaxonRank::PRINCIPAL {
        if rank != TaxonRank::Species {
            context.set_rank_value(rank, taxon.rank_value(rank).map(str::to_string));
        }
    }

    let keeps_metadata = taxon.taxon_rank != TaxonRank::Species;
    if keeps_metadata {
        context.taxon_id = taxon.taxon_id.clone();
        context.accepted_taxon_key = taxon.accepted_taxon_key.clone();
        context.accepted_scientific_name = taxon.accepted_scientific_name.clone();
        context.vernacular_name = taxon.vernacular_name.clone();
        context.taxonomic_status = taxon.taxonomic_status.clone();
    }

    // Intermediate ranks (subfamily, tribe) keep their own name
    if taxon.taxon_rank.is_principal() {
        context = context.with_inferred_rank();
    }

    Some(context)
}
