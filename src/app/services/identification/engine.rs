//! Single-detection identification transitions
//!
//! [`identify`] is a pure function: it reads the current detection and returns
//! the next one, never mutating its arguments.

use super::input::{IdentificationContext, IdentificationInput, IdentifyOutcome, SkipReason};
use crate::app::models::{DetectedBy, DetectionEntity, TaxonRank, TaxonRecord};
use crate::app::services::taxonomy::{
    compute_label, has_higher_taxonomy_context, higher_taxonomy_context, merge_ranks,
    normalize_species, parse_binomial, rank_value_changed,
};
use crate::constants::ERROR_LABEL;
use tracing::debug;

/// How a taxon pick relates to the detection's existing state
///
/// Variants are checked in declaration order; the first that matches wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickBranch {
    /// Pick carries genus and species at species rank; replaces everything
    FullSpecies,
    /// Species-rank pick without genus, family or order
    BareSpecies,
    /// Pick replaces the value at its own rank; merge with cascade-clear
    RankChanged,
    /// Order..genus pick arriving over an existing morphospecies; keep it
    RefineAboveMorphospecies,
    /// Anything else: take the pick as-is
    Replace,
}

/// Classify a taxon pick against the existing taxon and morphospecies
pub fn classify_pick(
    existing: Option<&TaxonRecord>,
    morphospecies: Option<&str>,
    pick: &TaxonRecord,
) -> PickBranch {
    let rank = pick.taxon_rank;
    let has_genus = pick.rank_value(TaxonRank::Genus).is_some();

    if rank == TaxonRank::Species && has_genus && pick.rank_value(TaxonRank::Species).is_some() {
        return PickBranch::FullSpecies;
    }

    // Must precede the rank-change test: a typed binomial's genus beats the existing one
    let bare = [TaxonRank::Genus, TaxonRank::Family, TaxonRank::Order]
        .iter()
        .all(|r| pick.rank_value(*r).is_none());
    if rank == TaxonRank::Species && bare {
        return PickBranch::BareSpecies;
    }

    if existing.is_some_and(|taxon| rank_value_changed(taxon, pick)) {
        return PickBranch::RankChanged;
    }

    let refines_context = rank.depth() >= TaxonRank::Order.depth()
        && rank.depth() < TaxonRank::Species.depth()
        && (has_higher_taxonomy_context(pick) || existing.is_some_and(has_higher_taxonomy_context));
    if morphospecies.is_some() && refines_context {
        return PickBranch::RefineAboveMorphospecies;
    }

    PickBranch::Replace
}

/// Apply one identification input to one detection
///
/// Successful transitions stamp `detected_by = User` and `identified_at`, and
/// recompute the label. Rejected input returns the detection unchanged with a
/// skip reason.
pub fn identify(
    detection: &DetectionEntity,
    input: &IdentificationInput,
    context: &IdentificationContext,
) -> IdentifyOutcome {
    match input {
        IdentificationInput::MarkError => IdentifyOutcome::applied(mark_error(detection, context)),
        IdentificationInput::Accept => IdentifyOutcome::applied(accept(detection, context)),
        IdentificationInput::MorphospeciesText(text) => {
            apply_morphospecies(detection, text, context)
        }
        IdentificationInput::TaxonPick { taxon, label } => {
            apply_taxon_pick(detection, taxon, label.as_deref(), context)
        }
    }
}

fn stamp(detection: &mut DetectionEntity, context: &IdentificationContext) {
    detection.detected_by = DetectedBy::User;
    detection.identified_at = Some(context.identified_at);
}

fn mark_error(detection: &DetectionEntity, context: &IdentificationContext) -> DetectionEntity {
    let mut next = detection.clone();
    next.taxon = None;
    next.morphospecies = None;
    next.is_error = Some(true);
    next.label = ERROR_LABEL.to_string();
    stamp(&mut next, context);

    debug!("Detection {} marked as error", next.id);
    next
}

fn accept(detection: &DetectionEntity, context: &IdentificationContext) -> DetectionEntity {
    let mut next = detection.clone();
    stamp(&mut next, context);
    next
}

fn apply_morphospecies(
    detection: &DetectionEntity,
    text: &str,
    context: &IdentificationContext,
) -> IdentifyOutcome {
    let text = text.trim();
    if text.is_empty() {
        return IdentifyOutcome::skipped_with(detection, SkipReason::EmptyMorphospecies);
    }

    let Some(mut taxon) = detection.active_taxon().and_then(higher_taxonomy_context) else {
        debug!(
            "Rejecting morphospecies '{}' for {}: no higher taxonomy",
            text, detection.id
        );
        return IdentifyOutcome::skipped_with(detection, SkipReason::MissingHigherTaxonomy);
    };

    let label = compute_label(Some(&taxon), None, Some(text), false);
    taxon.name = Some(label.clone());

    let mut next = detection.clone();
    next.taxon = Some(taxon);
    next.morphospecies = Some(text.to_string());
    next.label = label;
    next.is_error = None;
    stamp(&mut next, context);

    debug!("Detection {} assigned morphospecies '{}'", next.id, text);
    IdentifyOutcome::applied(next)
}

fn apply_taxon_pick(
    detection: &DetectionEntity,
    pick: &TaxonRecord,
    explicit_label: Option<&str>,
    context: &IdentificationContext,
) -> IdentifyOutcome {
    if !pick.has_any_rank() {
        return IdentifyOutcome::skipped_with(detection, SkipReason::EmptyTaxon);
    }

    let existing = detection.active_taxon();
    let morphospecies = if detection.is_error() {
        None
    } else {
        detection.morphospecies()
    };

    let branch = classify_pick(existing, morphospecies, pick);
    debug!(
        "Taxon pick '{}' ({}) on {}: {:?}",
        pick.scientific_name, pick.taxon_rank, detection.id, branch
    );

    let (mut taxon, kept_morphospecies) = match branch {
        PickBranch::FullSpecies => (normalize_species(pick), None),
        PickBranch::RankChanged => {
            // classify_pick only yields RankChanged when an existing taxon is present
            let merged = existing.map_or_else(|| pick.clone(), |e| merge_ranks(e, pick));
            (normalize_if_species(merged), None)
        }
        PickBranch::RefineAboveMorphospecies => {
            let merged = match existing {
                Some(e) => merge_ranks(e, pick),
                None => pick.clone(),
            };
            (
                align_rank_with_pick(merged, pick),
                morphospecies.map(str::to_string),
            )
        }
        PickBranch::BareSpecies => (apply_bare_species(existing, pick), None),
        PickBranch::Replace => (normalize_if_species(pick.clone()), None),
    };

    if taxon.scientific_name.trim().is_empty() {
        if let Some(name) = taxon.name_at_rank(taxon.taxon_rank) {
            taxon.scientific_name = name;
        }
    }

    let label = compute_label(
        Some(&taxon),
        explicit_label,
        kept_morphospecies.as_deref(),
        false,
    );
    taxon.name = Some(label.clone()).filter(|l| !l.is_empty());

    let mut next = detection.clone();
    next.taxon = Some(taxon);
    next.morphospecies = kept_morphospecies;
    next.label = label;
    next.is_error = None;
    if context.species_list_id.is_some() {
        next.species_list_id = context.species_list_id.clone();
        next.species_list_doi = context.species_list_doi.clone();
    }
    stamp(&mut next, context);

    IdentifyOutcome::applied(next)
}

fn normalize_if_species(taxon: TaxonRecord) -> TaxonRecord {
    if taxon.taxon_rank == TaxonRank::Species {
        normalize_species(&taxon)
    } else {
        taxon
    }
}

/// Set rank and scientific name to the deepest of genus, family, order the pick supplied
fn align_rank_with_pick(mut merged: TaxonRecord, pick: &TaxonRecord) -> TaxonRecord {
    if !pick.taxon_rank.is_principal() {
        return merged;
    }

    let supplied = [TaxonRank::Genus, TaxonRank::Family, TaxonRank::Order]
        .into_iter()
        .find(|rank| pick.rank_value(*rank).is_some());

    if let Some(rank) = supplied {
        if let Some(name) = merged.name_at_rank(rank) {
            merged.taxon_rank = rank;
            merged.scientific_name = name;
        }
    }
    merged
}

/// Resolve a species-rank pick that came without genus, family or order
///
/// A binomial in the species or scientific name field supplies the genus. The
/// result is merged into existing higher ranks when there are any.
fn apply_bare_species(existing: Option<&TaxonRecord>, pick: &TaxonRecord) -> TaxonRecord {
    let typed = pick
        .rank_value(TaxonRank::Species)
        .unwrap_or_else(|| pick.scientific_name.trim());

    let mut synthesized = pick.clone();
    if let Some(binomial) = parse_binomial(typed) {
        synthesized.scientific_name = format!("{} {}", binomial.genus, binomial.epithet);
        synthesized.genus = Some(binomial.genus);
        synthesized.species = Some(binomial.epithet);
    }

    let has_higher_ranks = existing.is_some_and(|taxon| {
        TaxonRank::PRINCIPAL
            .iter()
            .filter(|rank| **rank != TaxonRank::Species)
            .any(|rank| taxon.rank_value(*rank).is_some())
    });

    match existing {
        Some(existing) if has_higher_ranks => normalize_species(&merge_ranks(existing, &synthesized)),
        _ => normalize_species(&synthesized),
    }
}
