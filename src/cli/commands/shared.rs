//! Shared components for CLI commands
//!
//! This module contains common types, utilities, and functions used across
//! multiple CLI command implementations.

use crate::cli::args::CommonArgs;
use crate::config::Config;
use crate::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{debug, info};

/// Command statistics for reporting across all commands
#[derive(Debug, Clone, Default)]
pub struct CommandStats {
    /// Number of photo documents read
    pub documents_loaded: usize,
    /// Number of detections decoded
    pub detections_loaded: usize,
    /// Number of detections changed by an identification
    pub detections_updated: usize,
    /// Number of requested detections left untouched
    pub detections_skipped: usize,
    /// Number of photo documents written back
    pub documents_written: usize,
    /// Number of Darwin Core rows exported
    pub rows_exported: usize,
    /// Number of errors encountered
    pub errors_encountered: usize,
    /// Total command time
    pub processing_time: std::time::Duration,
}

impl CommandStats {
    /// Whether anything went wrong without aborting the command
    pub fn has_errors(&self) -> bool {
        self.errors_encountered > 0
    }
}

/// Command-line values that take precedence over file and environment config
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub identifier: Option<String>,
    pub dataset_id: Option<String>,
    pub species_list_path: Option<PathBuf>,
    pub default_species_list: Option<String>,
}

/// Set up structured logging
///
/// `RUST_LOG` wins; otherwise explicit `-v`/`-q` flags, then the configured level.
pub fn setup_logging(common: &CommonArgs, config: &Config) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = if common.quiet || common.verbose > 0 {
        common.get_log_level()
    } else {
        config.logging.level.as_str()
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("taxon_annotator={}", log_level)));

    let result = if common.quiet || !config.logging.structured {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    // A subscriber installed earlier in the process (tests, embedding) stays in charge
    if result.is_err() {
        debug!("Global subscriber already set; keeping it");
        return Ok(());
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using layered approach (file -> env -> args)
pub fn load_configuration(common: &CommonArgs, overrides: &ConfigOverrides) -> Result<Config> {
    let default_config_path = if common.config_file.is_none() {
        Config::default_config_path().ok()
    } else {
        None
    };

    let config_file = match &common.config_file {
        Some(path) => Some(path.as_path()),
        None => default_config_path
            .as_ref()
            .filter(|path| path.exists())
            .map(|path| path.as_path()),
    };

    let mut config = Config::load_layered(config_file)?;
    apply_cli_overrides(&mut config, common, overrides);
    config.validate()?;

    Ok(config)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_overrides(config: &mut Config, common: &CommonArgs, overrides: &ConfigOverrides) {
    if let Some(identifier) = &overrides.identifier {
        config.identification.identifier_human = identifier.clone();
    }
    if let Some(dataset_id) = &overrides.dataset_id {
        config.export.dataset_id = Some(dataset_id.clone());
    }
    if let Some(path) = &overrides.species_list_path {
        config.identification.species_list_path = Some(path.clone());
    }
    if let Some(list_id) = &overrides.default_species_list {
        config.identification.default_species_list = Some(list_id.clone());
    }

    if common.quiet || common.verbose > 0 {
        config.logging.level = common.get_log_level().to_string();
    }
    if common.quiet {
        config.logging.structured = false;
    }
}

/// Log where the configuration came from
pub fn log_configuration(common: &CommonArgs, config: &Config) {
    match &common.config_file {
        Some(path) => info!("Using config file: {}", path.display()),
        None => info!("Using default configuration location and environment variables"),
    }
    debug!("Effective configuration: {:?}", config);
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}
