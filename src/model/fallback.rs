//! Fallback dataset used whenever the scan backend cannot answer
//!
//! The data ships as `assets/fallback.json` and is decoded with the same
//! record types and normalization as live API bodies, so either source can
//! stand in for the other.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::organ::{CatalogEntry, Organ};
use crate::error::DataError;

const EMBEDDED_FALLBACK: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/fallback.json"));

#[derive(Deserialize)]
struct FallbackFile {
    default_organ: String,
    organs: BTreeMap<String, Organ>,
    #[serde(default)]
    catalog: Vec<CatalogEntry>,
}

/// In-process organ table and demo catalog
#[derive(Clone, Debug)]
pub struct FallbackData {
    default_organ: String,
    organs: BTreeMap<String, Organ>,
    catalog: Vec<CatalogEntry>,
}

impl FallbackData {
    /// The dataset compiled into the binary
    pub fn embedded() -> Result<Self, DataError> {
        Self::from_json(EMBEDDED_FALLBACK)
    }

    /// Load a replacement dataset from disk
    pub fn from_path(path: &Path) -> Result<Self, DataError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, DataError> {
        let file: FallbackFile = serde_json::from_str(content)?;

        let organs: BTreeMap<String, Organ> = file
            .organs
            .into_iter()
            .map(|(id, organ)| {
                let organ = organ.normalize(&id);
                (id, organ)
            })
            .collect();

        if !organs.contains_key(&file.default_organ) {
            return Err(DataError::MissingDefault(file.default_organ));
        }

        tracing::debug!(
            organs = organs.len(),
            catalog = file.catalog.len(),
            default = %file.default_organ,
            "Fallback data loaded"
        );

        Ok(Self {
            default_organ: file.default_organ,
            organs,
            catalog: file.catalog,
        })
    }

    /// Organ for `id`, or the default entry when the table has no such organ
    pub fn organ(&self, id: &str) -> Organ {
        match self.organs.get(id) {
            Some(organ) => organ.clone(),
            None => {
                tracing::debug!(requested = id, default = %self.default_organ, "No fallback entry, using default organ");
                self.organs[&self.default_organ].clone()
            }
        }
    }

    pub fn catalog(&self) -> Vec<CatalogEntry> {
        self.catalog.clone()
    }

    pub fn default_organ_id(&self) -> &str {
        &self.default_organ
    }
}
