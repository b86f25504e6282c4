//! Batch identification
//!
//! Applies one input to many detections independently. There are no
//! cross-detection invariants, so a missing id or a rejected detection never
//! affects the others, and processing order does not change the result.

use super::engine::identify;
use super::input::{IdentificationContext, IdentificationInput, SkipReason};
use crate::app::models::DetectionEntity;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Result of a batch identification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    /// Next state of every detection that changed, in request order
    pub updated: Vec<DetectionEntity>,
    pub updated_ids: Vec<String>,
    pub skipped_ids: Vec<String>,
    /// Reason for each skipped id, aligned with `skipped_ids`
    pub skip_reasons: Vec<(String, SkipReason)>,
}

impl BatchOutcome {
    /// Create an empty batch outcome
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updated_count(&self) -> usize {
        self.updated_ids.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped_ids.len()
    }

    /// Count skips per reason
    pub fn skip_counts(&self) -> HashMap<SkipReason, usize> {
        let mut counts = HashMap::new();
        for (_, reason) in &self.skip_reasons {
            *counts.entry(*reason).or_insert(0) += 1;
        }
        counts
    }

    /// One-line summary for reporting
    pub fn summary(&self) -> String {
        format!(
            "Identification Summary: {} updated | {} skipped",
            self.updated_count(),
            self.skipped_count()
        )
    }
}

/// Apply an input to each requested detection
///
/// Ids are processed once each, in request order; duplicates are ignored.
/// Unknown ids are reported as [`SkipReason::DetectionNotFound`].
pub fn identify_many<'a, I>(
    detections: I,
    ids: &[String],
    input: &IdentificationInput,
    context: &IdentificationContext,
) -> BatchOutcome
where
    I: IntoIterator<Item = &'a DetectionEntity>,
{
    let index: HashMap<&str, &DetectionEntity> = detections
        .into_iter()
        .map(|detection| (detection.id.as_str(), detection))
        .collect();

    let mut outcome = BatchOutcome::new();
    let mut seen = HashSet::new();

    for id in ids {
        if !seen.insert(id.as_str()) {
            continue;
        }

        let Some(detection) = index.get(id.as_str()) else {
            debug!("Skipping unknown detection {}", id);
            outcome.skipped_ids.push(id.clone());
            outcome
                .skip_reasons
                .push((id.clone(), SkipReason::DetectionNotFound));
            continue;
        };

        let result = identify(detection, input, context);
        match result.skip_reason {
            Some(reason) => {
                debug!("Skipped {} for {}: {}", input.kind(), id, reason);
                outcome.skipped_ids.push(id.clone());
                outcome.skip_reasons.push((id.clone(), reason));
            }
            None => {
                outcome.updated_ids.push(id.clone());
                outcome.updated.push(result.detection);
            }
        }
    }

    info!(
        "Applied {} to {} detections: {} updated, {} skipped",
        input.kind(),
        seen.len(),
        outcome.updated_count(),
        outcome.skipped_count()
    );

    outcome
}
