//! Export command implementation
//!
//! Decodes every photo document of a night, builds sanitized Darwin Core rows
//! and writes them as one CSV file.

use super::shared::{
    CommandStats, ConfigOverrides, create_progress_bar, load_configuration, log_configuration,
    setup_logging,
};
use crate::app::adapters::filesystem::{default_night_path, load_night};
use crate::app::services::darwin_export::{
    ExportContext, ExportStats, build_rows, normalize_night_path, write_darwin_csv_file,
};
use crate::cli::args::ExportArgs;
use crate::config::Config;
use crate::Result;
use colored::*;
use indicatif::HumanDuration;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Run the export command
pub async fn run_export(args: ExportArgs) -> Result<CommandStats> {
    let start_time = Instant::now();
    args.validate()?;

    let overrides = ConfigOverrides {
        identifier: args.identifier.clone(),
        dataset_id: args.dataset_id.clone(),
        ..Default::default()
    };
    let config = load_configuration(&args.common, &overrides)?;
    setup_logging(&args.common, &config)?;
    log_configuration(&args.common, &config);

    let night_path = normalize_night_path(
        &args
            .night_path
            .clone()
            .unwrap_or_else(|| default_night_path(&args.night_dir)),
    );
    let night = load_night(&args.night_dir).await?;

    let pb = create_progress_bar(
        night.documents.len() as u64,
        "Decoding photo documents",
        args.common.show_progress(),
    );
    let mut detections = Vec::new();
    for loaded in &night.documents {
        detections.extend(loaded.detections(&night_path));
        pb.inc(1);
    }
    pb.finish_with_message(format!("Decoded {} detections", detections.len()));

    let context = export_context(&config, &night_path);
    let (rows, export_stats) = build_rows(&detections, &context);

    let output_path = output_path(&args, &config);
    let written = write_darwin_csv_file(&output_path, &rows)?;
    info!("Exported {} rows to {}", written, output_path.display());

    let stats = CommandStats {
        documents_loaded: night.documents.len(),
        detections_loaded: detections.len(),
        rows_exported: written,
        errors_encountered: night.skipped.len(),
        processing_time: start_time.elapsed(),
        ..Default::default()
    };

    if !args.common.quiet {
        generate_human_report(&output_path, &export_stats, &stats);
    }
    Ok(stats)
}

/// Night-level export settings from configuration
pub(crate) fn export_context(config: &Config, night_path: &str) -> ExportContext {
    let context = ExportContext::new(night_path)
        .with_identifier(config.identification.identifier_human.trim());
    match &config.export.dataset_id {
        Some(dataset_id) => context.with_dataset_id(dataset_id.clone()),
        None => context,
    }
}

/// Explicit `--output`, else the configured file name inside the night directory
fn output_path(args: &ExportArgs, config: &Config) -> PathBuf {
    args.output_file
        .clone()
        .unwrap_or_else(|| args.night_dir.join(&config.export.output_filename))
}

fn generate_human_report(output_path: &Path, export_stats: &ExportStats, stats: &CommandStats) {
    println!("\n{}", "Darwin Core Export Complete".bold().green());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   • Photo documents: {}", stats.documents_loaded);
    println!("   • {}", export_stats.summary());
    if export_stats.sanitized_total() > 0 {
        println!(
            "   • {}",
            format!(
                "Sanitized {} morphospecies codes out of formal name columns",
                export_stats.sanitized_total()
            )
            .yellow()
        );
    }
    if stats.has_errors() {
        println!(
            "{}",
            format!("⚠️  Unreadable documents skipped: {}", stats.errors_encountered).yellow()
        );
    }
    println!("   • Output: {}", output_path.display());
    println!("   • Time: {}", HumanDuration(stats.processing_time));
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_context_from_config() {
        let config = Config::default().with_identifier(" AB ").with_dataset_id("ami");
        let context = export_context(&config, "panama/Gamboa/2025-06-22");

        assert_eq!(context.night_path, "panama/Gamboa/2025-06-22");
        assert_eq!(context.identifier_human, "AB");
        assert_eq!(context.dataset_id.as_deref(), Some("ami"));

        let context = export_context(&Config::default(), "panama/Gamboa/2025-06-22");
        assert!(context.dataset_id.is_none());
    }

    #[test]
    fn test_default_output_path_inside_night() {
        let args = ExportArgs {
            night_dir: PathBuf::from("/data/2025-06-22"),
            ..Default::default()
        };
        assert_eq!(
            output_path(&args, &Config::default()),
            PathBuf::from("/data/2025-06-22/darwin_core.csv")
        );

        let args = ExportArgs {
            output_file: Some(PathBuf::from("/tmp/out.csv")),
            ..args
        };
        assert_eq!(output_path(&args, &Config::default()), PathBuf::from("/tmp/out.csv"));
    }
}
