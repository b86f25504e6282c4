//! Per-night summary document

use crate::app::models::DetectionEntity;
use crate::constants::NIGHT_SUMMARY_VERSION;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Aggregate identification progress for one night
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NightSummary {
    pub version: String,
    pub night_id: String,
    pub total_detections: usize,
    pub user_identified: usize,
    pub errors: usize,
    /// Neither taxon nor morphospecies, and not an error
    pub unidentified: usize,
    /// Distinct morphospecies, sorted
    pub morphospecies: Vec<String>,
    /// Detection count per display label, errors included
    pub label_counts: BTreeMap<String, usize>,
    pub generated_at: DateTime<Utc>,
}

impl NightSummary {
    /// Summarize the detections of a night
    pub fn from_detections<'a, I>(night_id: &str, detections: I, generated_at: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a DetectionEntity>,
    {
        let mut summary = Self {
            version: NIGHT_SUMMARY_VERSION.to_string(),
            night_id: night_id.to_string(),
            total_detections: 0,
            user_identified: 0,
            errors: 0,
            unidentified: 0,
            morphospecies: Vec::new(),
            label_counts: BTreeMap::new(),
            generated_at,
        };
        let mut morphospecies = BTreeSet::new();

        for detection in detections {
            summary.total_detections += 1;
            if detection.is_user_identified() {
                summary.user_identified += 1;
            }

            if detection.is_error() {
                summary.errors += 1;
            } else if let Some(code) = detection.morphospecies() {
                morphospecies.insert(code.to_string());
            } else if detection.taxon.is_none() {
                summary.unidentified += 1;
            }

            let label = detection.label.trim();
            if !label.is_empty() {
                *summary.label_counts.entry(label.to_string()).or_insert(0) += 1;
            }
        }

        summary.morphospecies = morphospecies.into_iter().collect();
        summary
    }

    /// Share of detections a human has acted on, in percent
    pub fn identified_percentage(&self) -> f64 {
        if self.total_detections == 0 {
            0.0
        } else {
            (self.user_identified as f64 / self.total_detections as f64) * 100.0
        }
    }

    /// One-line summary for reporting
    pub fn summary(&self) -> String {
        format!(
            "Night {}: {} detections | {} identified ({:.1}%) | {} errors | {} morphospecies | {} unidentified",
            self.night_id,
            self.total_detections,
            self.user_identified,
            self.identified_percentage(),
            self.errors,
            self.morphospecies.len(),
            self.unidentified
        )
    }
}
