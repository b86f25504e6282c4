//! Command-line argument definitions for the taxon annotator
//!
//! This module defines the complete CLI interface using the clap derive API.

use crate::app::models::{TaxonRank, TaxonRecord};
use crate::{Error, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the taxon annotator
///
/// Applies taxonomic identifications to detections stored as per-photo JSON
/// documents and exports them as Darwin Core occurrence records.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taxon-annotator",
    version,
    about = "Identify insect-monitoring detections and export them as Darwin Core CSV",
    long_about = "Applies taxon picks, morphospecies names and error marks to machine-detected \
                  image patches stored as per-photo JSON documents, keeps a per-night summary \
                  up to date, and exports sanitized Darwin Core occurrence records."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Apply one identification action to detections of a night
    Identify(IdentifyArgs),
    /// Export a night as Darwin Core CSV
    Export(ExportArgs),
    /// Show the identification summary of a night
    Summary(SummaryArgs),
}

/// Flags shared by every subcommand
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct CommonArgs {
    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, looks for
    /// ~/.config/taxon-annotator/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl CommonArgs {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    fn validate(&self) -> Result<()> {
        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }
        Ok(())
    }
}

/// Arguments for the identify command
#[derive(Debug, Clone, Default, Parser)]
pub struct IdentifyArgs {
    /// Night directory holding one JSON document per photo
    #[arg(short = 'n', long = "night", value_name = "DIR")]
    pub night_dir: PathBuf,

    /// Night id stored on decoded detections (defaults to the directory name)
    #[arg(long = "night-id", value_name = "ID")]
    pub night_id: Option<String>,

    /// Comma-separated detection ids
    #[arg(long = "ids", value_name = "LIST", conflicts_with = "all")]
    pub ids: Option<IdList>,

    /// Apply to every detection of the night
    #[arg(long = "all")]
    pub all: bool,

    /// Scientific name to look up in a species list
    #[arg(short = 't', long = "taxon", value_name = "QUERY")]
    pub taxon: Option<String>,

    /// JSON file of species lists (overrides the configured file)
    #[arg(long = "species-list", value_name = "FILE", requires = "taxon")]
    pub species_list: Option<PathBuf>,

    /// Species list to search (overrides the configured default list)
    #[arg(long = "list-id", value_name = "ID", requires = "taxon")]
    pub list_id: Option<String>,

    /// Rank of a manually entered taxon (inferred from the deepest field when omitted)
    #[arg(long = "rank", value_name = "RANK")]
    pub rank: Option<TaxonRank>,

    /// Scientific name for intermediate ranks such as tribe
    #[arg(long = "name", value_name = "NAME", requires = "rank")]
    pub scientific_name: Option<String>,

    #[arg(long = "order", value_name = "NAME")]
    pub order: Option<String>,

    #[arg(long = "family", value_name = "NAME")]
    pub family: Option<String>,

    #[arg(long = "genus", value_name = "NAME")]
    pub genus: Option<String>,

    /// Specific epithet or full binomial
    #[arg(long = "species", value_name = "NAME")]
    pub species: Option<String>,

    /// Assign a morphospecies working name
    #[arg(short = 'm', long = "morphospecies", value_name = "TEXT")]
    pub morphospecies: Option<String>,

    /// Mark the detections as false positives
    #[arg(long = "error")]
    pub mark_error: bool,

    /// Confirm the current identification without changing it
    #[arg(long = "accept")]
    pub accept: bool,

    /// Identifier initials recorded on changed detections
    #[arg(long = "identifier", value_name = "INITIALS")]
    pub identifier: Option<String>,

    /// Show what would change without writing any file
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Output format for the result report
    #[arg(long = "output-format", value_enum, default_value = "human")]
    pub output_format: OutputFormat,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the export command
#[derive(Debug, Clone, Default, Parser)]
pub struct ExportArgs {
    /// Night directory holding one JSON document per photo
    #[arg(short = 'n', long = "night", value_name = "DIR")]
    pub night_dir: PathBuf,

    /// Hierarchical night path, e.g. project/site/deployment/2025-06-22
    ///
    /// Drives datasetID, parentEventID, eventID and deployment. Defaults to
    /// the night directory name.
    #[arg(long = "night-path", value_name = "PATH")]
    pub night_path: Option<String>,

    /// Output CSV file (defaults to the configured file name inside the night directory)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Dataset id written to every row
    #[arg(long = "dataset-id", value_name = "ID")]
    pub dataset_id: Option<String>,

    /// Identifier initials written to identifiedBy
    #[arg(long = "identifier", value_name = "INITIALS")]
    pub identifier: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the summary command
#[derive(Debug, Clone, Default, Parser)]
pub struct SummaryArgs {
    /// Night directory holding one JSON document per photo
    #[arg(short = 'n', long = "night", value_name = "DIR")]
    pub night_dir: PathBuf,

    /// Recompute from photo documents instead of reading night_summary.json
    #[arg(long = "recompute")]
    pub recompute: bool,

    /// Output format for the summary
    #[arg(long = "format", value_enum, default_value = "human")]
    pub output_format: OutputFormat,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Output format options for machine-readable results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON format for scripting
    Json,
}

/// Wrapper for parsing comma-separated detection id lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdList {
    pub ids: Vec<String>,
}

impl FromStr for IdList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let ids: Vec<String> = s
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if ids.is_empty() {
            return Err(Error::data_validation("Detection id list cannot be empty"));
        }

        Ok(IdList { ids })
    }
}

/// Identification action requested on the command line
#[derive(Debug, Clone, PartialEq)]
pub enum IdentifyAction {
    /// Resolve `query` in a species list
    Lookup {
        query: String,
        list_file: Option<PathBuf>,
        list_id: Option<String>,
    },
    /// Taxon assembled from rank flags
    Manual(TaxonRecord),
    Morphospecies(String),
    MarkError,
    Accept,
}

impl Args {
    /// Get the command if one was specified
    pub fn get_command(&self) -> Option<Commands> {
        self.command.clone()
    }
}

impl Commands {
    pub fn common(&self) -> &CommonArgs {
        match self {
            Commands::Identify(args) => &args.common,
            Commands::Export(args) => &args.common,
            Commands::Summary(args) => &args.common,
        }
    }
}

impl IdentifyArgs {
    fn has_rank_fields(&self) -> bool {
        self.rank.is_some()
            || self.order.is_some()
            || self.family.is_some()
            || self.genus.is_some()
            || self.species.is_some()
    }

    /// Validate the identify command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        self.common.validate()?;

        if self.ids.is_none() && !self.all {
            return Err(Error::configuration(
                "Select detections with --ids or --all".to_string(),
            ));
        }

        let actions = [
            self.taxon.is_some(),
            self.has_rank_fields(),
            self.morphospecies.is_some(),
            self.mark_error,
            self.accept,
        ];
        match actions.iter().filter(|selected| **selected).count() {
            1 => {}
            0 => {
                return Err(Error::configuration(
                    "Choose one action: --taxon, rank fields, --morphospecies, --error or --accept"
                        .to_string(),
                ));
            }
            _ => {
                return Err(Error::configuration(
                    "Only one identification action can be applied at a time".to_string(),
                ));
            }
        }

        if let Some(rank) = self.rank {
            if !rank.is_principal() && self.scientific_name.is_none() {
                return Err(Error::configuration(format!(
                    "--rank {} needs --name because it has no field of its own",
                    rank
                )));
            }
        }

        Ok(())
    }

    /// Ids requested with `--ids`, empty when `--all` was given
    pub fn requested_ids(&self) -> Vec<String> {
        self.ids
            .as_ref()
            .map(|list| list.ids.clone())
            .unwrap_or_default()
    }

    /// Build the taxon described by the rank flags
    pub fn manual_taxon(&self) -> TaxonRecord {
        let mut taxon = TaxonRecord::new(TaxonRank::Species, "");
        taxon.order = self.order.clone();
        taxon.family = self.family.clone();
        taxon.genus = self.genus.clone();
        taxon.species = self.species.clone();
        let mut taxon = taxon.with_inferred_rank();

        if let Some(rank) = self.rank {
            taxon.taxon_rank = rank;
            taxon.scientific_name = self
                .scientific_name
                .clone()
                .or_else(|| taxon.name_at_rank(rank))
                .unwrap_or_default();
        }
        taxon
    }

    /// The single action these arguments request
    pub fn action(&self) -> Result<IdentifyAction> {
        self.validate()?;

        if let Some(query) = &self.taxon {
            return Ok(IdentifyAction::Lookup {
                query: query.clone(),
                list_file: self.species_list.clone(),
                list_id: self.list_id.clone(),
            });
        }
        if self.has_rank_fields() {
            return Ok(IdentifyAction::Manual(self.manual_taxon()));
        }
        if let Some(text) = &self.morphospecies {
            return Ok(IdentifyAction::Morphospecies(text.clone()));
        }
        if self.mark_error {
            return Ok(IdentifyAction::MarkError);
        }
        Ok(IdentifyAction::Accept)
    }
}

impl ExportArgs {
    /// Validate the export command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        self.common.validate()?;

        if let Some(output_file) = &self.output_file {
            if output_file.is_dir() {
                return Err(Error::configuration(format!(
                    "Output path is a directory: {}",
                    output_file.display()
                )));
            }
        }

        if let Some(night_path) = &self.night_path {
            if night_path.trim_matches('/').trim().is_empty() {
                return Err(Error::configuration(
                    "--night-path cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

impl SummaryArgs {
    pub fn validate(&self) -> Result<()> {
        self.common.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("taxon-annotator").chain(args.iter().copied()))
            .unwrap()
    }

    fn identify_args(args: &[&str]) -> IdentifyArgs {
        match parse(args).command {
            Some(Commands::Identify(identify)) => identify,
            other => panic!("expected identify command, got {:?}", other),
        }
    }

    #[test]
    fn test_id_list_parsing() {
        let list: IdList = " a, b ,,c ".parse().unwrap();
        assert_eq!(list.ids, vec!["a", "b", "c"]);

        assert!(" , ".parse::<IdList>().is_err());
    }

    #[test]
    fn test_morphospecies_action() {
        let args = identify_args(&["identify", "--night", "n", "--ids", "p1,p2", "-m", "111"]);

        assert_eq!(args.requested_ids(), vec!["p1", "p2"]);
        assert_eq!(
            args.action().unwrap(),
            IdentifyAction::Morphospecies("111".to_string())
        );
    }

    #[test]
    fn test_manual_taxon_infers_rank() {
        let args = identify_args(&[
            "identify", "--night", "n", "--all", "--order", "Diptera", "--family", "Muscidae",
            "--genus", "Lispe",
        ]);

        let IdentifyAction::Manual(taxon) = args.action().unwrap() else {
            panic!("expected manual taxon");
        };
        assert_eq!(taxon.taxon_rank, TaxonRank::Genus);
        assert_eq!(taxon.scientific_name, "Lispe");
        assert_eq!(taxon.family.as_deref(), Some("Muscidae"));
    }

    #[test]
    fn test_intermediate_rank_needs_name() {
        let args = identify_args(&[
            "identify", "--night", "n", "--all", "--order", "Diptera", "--rank", "suborder",
        ]);
        assert!(args.validate().is_err());

        let args = identify_args(&[
            "identify", "--night", "n", "--all", "--order", "Diptera", "--rank", "suborder",
            "--name", "Brachycera",
        ]);
        let taxon = args.manual_taxon();
        assert_eq!(taxon.taxon_rank, TaxonRank::Suborder);
        assert_eq!(taxon.scientific_name, "Brachycera");
    }

    #[test]
    fn test_actions_are_exclusive() {
        let args = identify_args(&["identify", "--night", "n", "--all", "--error", "--accept"]);
        assert!(args.validate().is_err());

        let args = identify_args(&["identify", "--night", "n", "--all"]);
        assert!(args.validate().is_err());

        let args = identify_args(&["identify", "--night", "n", "--accept"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_ids_conflict_with_all() {
        let result = Args::try_parse_from([
            "taxon-annotator", "identify", "--night", "n", "--ids", "p1", "--all", "--accept",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_rank_rejected_by_parser() {
        let result = Args::try_parse_from([
            "taxon-annotator", "identify", "--night", "n", "--all", "--rank", "clade",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_levels() {
        let mut common = CommonArgs::default();
        assert_eq!(common.get_log_level(), "warn");

        common.verbose = 2;
        assert_eq!(common.get_log_level(), "debug");

        common.verbose = 5;
        assert_eq!(common.get_log_level(), "trace");

        common.quiet = true;
        assert_eq!(common.get_log_level(), "error");
        assert!(!common.show_progress());
    }

    #[test]
    fn test_summary_format() {
        match parse(&["summary", "--night", "n", "--format", "json", "-v"]).command {
            Some(Commands::Summary(args)) => {
                assert_eq!(args.output_format, OutputFormat::Json);
                assert_eq!(args.common.verbose, 1);
            }
            other => panic!("expected summary command, got {:?}", other),
        }
    }

    #[test]
    fn test_export_rejects_blank_night_path() {
        let args = ExportArgs {
            night_dir: PathBuf::from("n"),
            night_path: Some("//".to_string()),
            ..Default::default()
        };
        assert!(args.validate().is_err());
    }
}
