//! Command implementations for the taxon annotator CLI
//!
//! Each command is implemented in its own module:
//! - `identify`: apply one identification action to detections of a night
//! - `export`: write a night as Darwin Core CSV
//! - `summary`: report identification progress of a night

pub mod export;
pub mod identify;
pub mod shared;
pub mod summary;

// Re-export the main types for easy access
pub use shared::CommandStats;

use crate::cli::args::{Args, Commands};
use crate::{Error, Result};

/// Main command runner
///
/// Dispatches to the appropriate subcommand handler based on CLI args.
pub async fn run(args: Args) -> Result<CommandStats> {
    match args.get_command() {
        Some(Commands::Identify(identify_args)) => identify::run_identify(identify_args).await,
        Some(Commands::Export(export_args)) => export::run_export(export_args).await,
        Some(Commands::Summary(summary_args)) => summary::run_summary(summary_args).await,
        None => Err(Error::configuration("No command given")),
    }
}
