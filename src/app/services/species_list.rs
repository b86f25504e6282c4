//! Species reference lists
//!
//! The identification engine consumes species lists only as already-resolved
//! candidates. [`SpeciesLookup`] is the seam; [`SpeciesListCatalog`] is the
//! in-memory implementation backed by a JSON file of checklists.

use crate::app::models::TaxonRecord;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Search over reference checklists
pub trait SpeciesLookup {
    /// Ranked candidates for `query` in list `list_id`, at most `limit` of them
    fn search(&self, list_id: &str, query: &str, limit: usize) -> Vec<TaxonRecord>;
}

/// One reference checklist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesList {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub taxa: Vec<TaxonRecord>,
}

/// In-memory collection of checklists
#[derive(Debug, Clone, Default)]
pub struct SpeciesListCatalog {
    lists: Vec<SpeciesList>,
}

impl SpeciesListCatalog {
    pub fn from_lists(lists: Vec<SpeciesList>) -> Self {
        Self { lists }
    }

    /// Parse a catalog from JSON text (`[{id, doi, taxa}]`)
    pub fn from_json_str(json: &str) -> Result<Self> {
        let lists: Vec<SpeciesList> = serde_json::from_str(json).map_err(|e| {
            Error::json("species list", "Failed to parse species lists", Some(e))
        })?;
        Ok(Self::from_lists(lists))
    }

    /// Load a catalog from a JSON file
    pub async fn load(path: &Path) -> Result<Self> {
        debug!("Loading species lists from {}", path.display());

        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?;
        let lists: Vec<SpeciesList> = serde_json::from_str(&contents).map_err(|e| {
            Error::json(
                path.display().to_string(),
                "Failed to parse species lists",
                Some(e),
            )
        })?;

        let catalog = Self::from_lists(lists);
        info!(
            "Loaded {} species lists ({} taxa) from {}",
            catalog.lists.len(),
            catalog.lists.iter().map(|l| l.taxa.len()).sum::<usize>(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn get(&self, list_id: &str) -> Option<&SpeciesList> {
        self.lists.iter().find(|list| list.id == list_id)
    }

    pub fn list_ids(&self) -> Vec<&str> {
        self.lists.iter().map(|list| list.id.as_str()).collect()
    }

    /// DOI of a list, if it has one
    pub fn doi(&self, list_id: &str) -> Option<&str> {
        self.get(list_id).and_then(|list| list.doi.as_deref())
    }

    /// Best candidate for a query, or an error naming what was missing
    pub fn resolve(&self, list_id: &str, query: &str) -> Result<TaxonRecord> {
        if self.get(list_id).is_none() {
            return Err(Error::species_list(format!(
                "Unknown species list '{}' (available: {})",
                list_id,
                self.list_ids().join(", ")
            )));
        }

        self.search(list_id, query, 1)
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::species_list(format!("No taxon matching '{}' in list '{}'", query, list_id))
            })
    }
}

impl SpeciesLookup for SpeciesListCatalog {
    /// Case-insensitive scientific name match: exact matches first, then
    /// prefix matches, each in list order
    fn search(&self, list_id: &str, query: &str, limit: usize) -> Vec<TaxonRecord> {
        let query = query.trim().to_lowercase();
        let Some(list) = self.get(list_id) else {
            debug!("Species list '{}' not loaded", list_id);
            return Vec::new();
        };
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }

        let names: Vec<String> = list
            .taxa
            .iter()
            .map(|taxon| taxon.scientific_name.trim().to_lowercase())
            .collect();

        let exact = list
            .taxa
            .iter()
            .zip(&names)
            .filter(|(_, name)| **name == query);
        let prefix = list
            .taxa
            .iter()
            .zip(&names)
            .filter(|(_, name)| **name != query && name.starts_with(&query));

        exact
            .chain(prefix)
            .map(|(taxon, _)| taxon.clone())
            .take(limit)
            .collect()
    }
}
