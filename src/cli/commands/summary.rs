//! Summary command implementation

use super::shared::{
    CommandStats, ConfigOverrides, load_configuration, log_configuration, setup_logging,
};
use crate::app::adapters::filesystem::{default_night_path, load_night, read_night_summary};
use crate::app::services::shape_codec::NightSummary;
use crate::cli::args::{OutputFormat, SummaryArgs};
use crate::Result;
use chrono::Utc;
use colored::*;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Number of labels listed in the human report
const TOP_LABELS: usize = 15;

/// Run the summary command
pub async fn run_summary(args: SummaryArgs) -> Result<CommandStats> {
    let start_time = Instant::now();
    args.validate()?;

    let config = load_configuration(&args.common, &ConfigOverrides::default())?;
    setup_logging(&args.common, &config)?;
    log_configuration(&args.common, &config);

    let (summary, documents_loaded) = load_or_compute(&args.night_dir, args.recompute).await?;

    match args.output_format {
        OutputFormat::Human => {
            if !args.common.quiet {
                print!("{}", render_human_summary(&summary));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    Ok(CommandStats {
        documents_loaded,
        detections_loaded: summary.total_detections,
        processing_time: start_time.elapsed(),
        ..Default::default()
    })
}

/// Stored summary when present, otherwise computed from the photo documents
async fn load_or_compute(night_dir: &Path, recompute: bool) -> Result<(NightSummary, usize)> {
    if !recompute {
        if let Some(summary) = read_night_summary(night_dir).await? {
            info!("Using stored night summary from {}", summary.generated_at);
            return Ok((summary, 0));
        }
    }

    let night_id = default_night_path(night_dir);
    let night = load_night(night_dir).await?;
    let detections = night.detections(&night_id);
    Ok((
        NightSummary::from_detections(&night_id, &detections, Utc::now()),
        night.documents.len(),
    ))
}

/// Render the human-readable report
fn render_human_summary(summary: &NightSummary) -> String {
    let mut output = format!(
        "\n{}\n\
         ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\
         \u{20}  • Detections: {}\n\
         \u{20}  • Identified by a person: {} ({:.1}%)\n\
         \u{20}  • Errors: {}\n\
         \u{20}  • Unidentified: {}\n\
         \u{20}  • Generated: {}\n",
        format!("Night {}", summary.night_id).bold(),
        summary.total_detections,
        summary.user_identified,
        summary.identified_percentage(),
        summary.errors,
        summary.unidentified,
        summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
    );

    if !summary.morphospecies.is_empty() {
        output.push_str(&format!(
            "\n{} ({}): {}\n",
            "Morphospecies".cyan(),
            summary.morphospecies.len(),
            summary.morphospecies.join(", ")
        ));
    }

    if !summary.label_counts.is_empty() {
        let mut labels: Vec<(&String, &usize)> = summary.label_counts.iter().collect();
        labels.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        output.push_str(&format!("\n{}\n", "Labels".cyan()));
        for (label, count) in labels.iter().take(TOP_LABELS) {
            output.push_str(&format!("   {:>5}  {}\n", count, label));
        }
        if labels.len() > TOP_LABELS {
            output.push_str(&format!("   ... and {} more\n", labels.len() - TOP_LABELS));
        }
    }

    output.push('\n');
    output
}
