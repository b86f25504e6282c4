//! Taxon Annotator Library
//!
//! A Rust library for assigning taxonomic identities to image patches produced by
//! automated insect-monitoring hardware, and for exporting those identifications
//! as Darwin Core occurrence records.
//!
//! This library provides tools for:
//! - Merging taxonomic records along the kingdom-to-species rank lattice
//! - Computing a single display label per detection
//! - Applying identification actions (taxon picks, morphospecies, error marks)
//! - Round-tripping detections through the persisted per-photo JSON shape
//! - Building sanitized Darwin Core rows and writing them as CSV

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod darwin_export;
        pub mod identification;
        pub mod shape_codec;
        pub mod species_list;
        pub mod taxonomy;
    }
    pub mod adapters {
        pub mod filesystem;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{DetectedBy, DetectionEntity, TaxonRank, TaxonRecord};
pub use config::Config;

/// Result type alias for the taxon annotator
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for annotator I/O, configuration and CLI operations
///
/// The identification engine and export row builder never produce these; invalid
/// identification input is reported through skip results instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON document could not be read or written
    #[error("JSON error in '{document}': {message}")]
    Json {
        document: String,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// CSV writing error
    #[error("CSV error: {message}")]
    Csv {
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Data validation error
    #[error("Data validation error: {message}")]
    DataValidation { message: String },

    /// Species reference list error
    #[error("Species list error: {message}")]
    SpeciesList { message: String },

    /// Detection not found
    #[error("Detection not found: {id}")]
    DetectionNotFound { id: String },

    /// Directory traversal error
    #[error("Directory traversal error: {message}")]
    DirectoryTraversal {
        message: String,
        #[source]
        source: walkdir::Error,
    },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a JSON error with context
    pub fn json(
        document: impl Into<String>,
        message: impl Into<String>,
        source: Option<serde_json::Error>,
    ) -> Self {
        Self::Json {
            document: document.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a CSV error with context
    pub fn csv(message: impl Into<String>, source: Option<csv::Error>) -> Self {
        Self::Csv {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create a species list error
    pub fn species_list(message: impl Into<String>) -> Self {
        Self::SpeciesList {
            message: message.into(),
        }
    }

    /// Create a detection not found error
    pub fn detection_not_found(id: impl Into<String>) -> Self {
        Self::DetectionNotFound { id: id.into() }
    }

    /// Create a directory traversal error
    pub fn directory_traversal(message: impl Into<String>, source: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: message.into(),
            source,
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Json {
            document: "unknown".to_string(),
            message: "JSON processing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::Csv {
            message: "CSV writing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration {
            message: format!("Invalid TOML configuration: {}", error),
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(error: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: "Directory traversal failed".to_string(),
            source: error,
        }
    }
}
