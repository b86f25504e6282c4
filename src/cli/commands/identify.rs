//! Identify command implementation
//!
//! Loads the photo documents of one night, applies a single identification
//! action to the selected detections through an [`IdentificationSession`], and
//! writes back only the documents that hold a changed detection.

use super::shared::{
    CommandStats, ConfigOverrides, load_configuration, log_configuration, setup_logging,
};
use crate::app::adapters::filesystem::{
    NightDocuments, PendingWrite, default_night_path, load_night, spawn_document_writer,
    write_night_summary,
};
use crate::app::models::DetectionEntity;
use crate::app::services::identification::{
    BatchOutcome, ChannelListener, DetectionChange, IdentificationContext, IdentificationInput,
    IdentificationSession, SkipReason,
};
use crate::app::services::shape_codec::{
    NightSummary, PhotoContext, PhotoDocument, detection_id, to_persisted_shape,
};
use crate::app::services::species_list::{SpeciesListCatalog, SpeciesLookup};
use crate::cli::args::{IdentifyAction, IdentifyArgs, OutputFormat};
use crate::config::Config;
use crate::constants::PHOTO_DOCUMENT_VERSION;
use crate::{Error, Result};
use chrono::Utc;
use colored::*;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Run the identify command
pub async fn run_identify(args: IdentifyArgs) -> Result<CommandStats> {
    let start_time = Instant::now();
    let action = args.action()?;

    let overrides = ConfigOverrides {
        identifier: args.identifier.clone(),
        species_list_path: args.species_list.clone(),
        default_species_list: args.list_id.clone(),
        ..Default::default()
    };
    let config = load_configuration(&args.common, &overrides)?;
    setup_logging(&args.common, &config)?;
    log_configuration(&args.common, &config);

    let night_id = args
        .night_id
        .clone()
        .unwrap_or_else(|| default_night_path(&args.night_dir));
    let night = load_night(&args.night_dir).await?;

    let (input, context) = resolve_input(action, &config).await?;
    info!("Applying {} to night {}", input.kind(), night_id);

    let detections = night.detections(&night_id);
    let mut stats = CommandStats {
        documents_loaded: night.documents.len(),
        detections_loaded: detections.len(),
        errors_encountered: night.skipped.len(),
        ..Default::default()
    };

    let (change_tx, mut change_rx) = mpsc::unbounded_channel::<DetectionChange>();
    let mut session = IdentificationSession::new(detections).with_listener(ChannelListener(change_tx));

    let ids = if args.all {
        session.ids()
    } else {
        args.requested_ids()
    };
    let outcome = session.apply(&ids, &input, &context);

    for (id, reason) in &outcome.skip_reasons {
        warn!("Skipped detection {}: {}", id, reason);
    }
    if nothing_found(&outcome) {
        return Err(Error::detection_not_found(outcome.skipped_ids.join(", ")));
    }
    stats.detections_updated = outcome.updated_count();
    stats.detections_skipped = outcome.skipped_count();

    let mut changes = Vec::new();
    while let Ok(change) = change_rx.try_recv() {
        changes.push(change);
    }

    let identifier = config.identification.identifier_human.trim().to_string();
    let pending = pending_writes(&night, &session, &changes, &identifier);

    if args.dry_run {
        info!(
            "Dry run: {} documents would be rewritten",
            pending.len()
        );
    } else {
        stats.documents_written = write_documents(pending).await?;

        let summary = NightSummary::from_detections(&night_id, session.detections(), Utc::now());
        write_night_summary(&args.night_dir, &summary).await?;
    }

    stats.processing_time = start_time.elapsed();
    generate_report(&args, &night_id, &input, &outcome, &stats)?;

    Ok(stats)
}

/// Every requested id was unknown, most likely a typo in `--ids`
fn nothing_found(outcome: &BatchOutcome) -> bool {
    outcome.updated.is_empty()
        && !outcome.skip_reasons.is_empty()
        && outcome
            .skip_reasons
            .iter()
            .all(|(_, reason)| *reason == SkipReason::DetectionNotFound)
}

/// Turn the requested action into an engine input plus its context
async fn resolve_input(
    action: IdentifyAction,
    config: &Config,
) -> Result<(IdentificationInput, IdentificationContext)> {
    let context = IdentificationContext::now();

    let input = match action {
        IdentifyAction::Lookup {
            query,
            list_file,
            list_id,
        } => {
            let path = list_file
                .or_else(|| config.identification.species_list_path.clone())
                .ok_or_else(|| {
                    Error::configuration(
                        "--taxon needs a species list: pass --species-list or set \
                         identification.species_list_path",
                    )
                })?;
            let catalog = SpeciesListCatalog::load(&path).await?;
            let list_id = choose_list(&catalog, list_id.or_else(|| {
                config.identification.default_species_list.clone()
            }))?;

            let candidates = catalog.search(&list_id, &query, config.identification.search_limit);
            if candidates.len() > 1 {
                debug!(
                    "{} candidates for '{}', using the first: {}",
                    candidates.len(),
                    query,
                    candidates
                        .iter()
                        .map(|t| t.scientific_name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            let taxon = catalog.resolve(&list_id, &query)?;
            let doi = catalog.doi(&list_id).map(str::to_string);

            return Ok((
                IdentificationInput::taxon_pick(taxon),
                context.with_species_list(list_id, doi),
            ));
        }
        IdentifyAction::Manual(taxon) => IdentificationInput::taxon_pick(taxon),
        IdentifyAction::Morphospecies(text) => IdentificationInput::morphospecies(text),
        IdentifyAction::MarkError => IdentificationInput::MarkError,
        IdentifyAction::Accept => IdentificationInput::Accept,
    };

    Ok((input, context))
}

/// Pick the list to search: the requested one, or the only one loaded
fn choose_list(catalog: &SpeciesListCatalog, requested: Option<String>) -> Result<String> {
    if let Some(list_id) = requested {
        return Ok(list_id);
    }
    match catalog.list_ids().as_slice() {
        [only] => Ok(only.to_string()),
        ids => Err(Error::configuration(format!(
            "Pass --list-id to choose a species list (available: {})",
            ids.join(", ")
        ))),
    }
}

/// Documents that hold at least one changed detection, re-encoded
///
/// Shapes of unchanged detections are kept exactly as they were read.
pub(crate) fn pending_writes(
    night: &NightDocuments,
    session: &IdentificationSession,
    changes: &[DetectionChange],
    identifier_human: &str,
) -> Vec<PendingWrite> {
    let changed_ids: HashSet<&str> = changes.iter().map(|c| c.detection_id.as_str()).collect();
    let changed_photos: BTreeSet<&str> = changes.iter().map(|c| c.photo_id.as_str()).collect();

    changed_photos
        .into_iter()
        .filter_map(|photo_id| {
            let Some(loaded) = night.find_by_photo(photo_id) else {
                warn!("No document found for changed photo {}", photo_id);
                return None;
            };
            let document = reencode_document(
                &loaded.document,
                |id| changed_ids.contains(id).then(|| session.get(id)).flatten(),
                identifier_human,
            );
            Some(PendingWrite {
                path: loaded.path.clone(),
                document,
            })
        })
        .collect()
}

fn reencode_document<'a, F>(
    document: &PhotoDocument,
    changed: F,
    identifier_human: &str,
) -> PhotoDocument
where
    F: Fn(&str) -> Option<&'a DetectionEntity>,
{
    let shapes = document
        .shapes
        .iter()
        .enumerate()
        .map(|(index, shape)| {
            let context = PhotoContext::new(&document.photo_base, "", index);
            match changed(&detection_id(shape, &context)) {
                Some(detection) => to_persisted_shape(detection, identifier_human),
                None => shape.clone(),
            }
        })
        .collect();

    PhotoDocument {
        version: PHOTO_DOCUMENT_VERSION.to_string(),
        photo_base: document.photo_base.clone(),
        shapes,
    }
}

/// Hand documents to the write-behind task and wait for it to drain
async fn write_documents(pending: Vec<PendingWrite>) -> Result<usize> {
    if pending.is_empty() {
        return Ok(0);
    }

    let (tx, handle) = spawn_document_writer();
    for write in pending {
        tx.send(write)
            .map_err(|_| Error::processing_interrupted("Document writer stopped early"))?;
    }
    drop(tx);

    let write_stats = handle
        .await
        .map_err(|e| Error::processing_interrupted(format!("Document writer failed: {}", e)))?;

    if write_stats.failed > 0 {
        return Err(Error::data_validation(format!(
            "{} photo documents could not be written",
            write_stats.failed
        )));
    }
    Ok(write_stats.written)
}

#[derive(Debug, Serialize)]
struct SkippedDetection<'a> {
    id: &'a str,
    reason: String,
}

#[derive(Debug, Serialize)]
struct IdentifyReport<'a> {
    night_id: &'a str,
    action: &'a str,
    updated: &'a [String],
    skipped: Vec<SkippedDetection<'a>>,
    documents_written: usize,
    dry_run: bool,
    processing_time_seconds: f64,
}

/// Generate the result report
fn generate_report(
    args: &IdentifyArgs,
    night_id: &str,
    input: &IdentificationInput,
    outcome: &BatchOutcome,
    stats: &CommandStats,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            generate_human_report(args, input, outcome, stats);
            Ok(())
        }
        OutputFormat::Json => {
            let report = IdentifyReport {
                night_id,
                action: input.kind(),
                updated: &outcome.updated_ids,
                skipped: outcome
                    .skip_reasons
                    .iter()
                    .map(|(id, reason)| SkippedDetection {
                        id,
                        reason: reason.to_string(),
                    })
                    .collect(),
                documents_written: stats.documents_written,
                dry_run: args.dry_run,
                processing_time_seconds: stats.processing_time.as_secs_f64(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

fn generate_human_report(
    args: &IdentifyArgs,
    input: &IdentificationInput,
    outcome: &BatchOutcome,
    stats: &CommandStats,
) {
    if args.common.quiet {
        return;
    }

    println!("\n{}", format!("Identification ({})", input.kind()).bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   • Detections loaded: {}", stats.detections_loaded);
    println!(
        "   • Updated: {}",
        outcome.updated_count().to_string().green()
    );
    if outcome.skipped_count() > 0 {
        println!(
            "   • Skipped: {}",
            outcome.skipped_count().to_string().yellow()
        );
        for (reason, count) in outcome.skip_counts() {
            println!("       {} × {}", count, reason);
        }
    }
    if args.dry_run {
        println!("   • {}", "Dry run, nothing written".cyan());
    } else {
        println!("   • Documents written: {}", stats.documents_written);
    }
    if stats.has_errors() {
        println!(
            "{}",
            format!("⚠️  Unreadable documents: {}", stats.errors_encountered).yellow()
        );
    }
    println!();
}
