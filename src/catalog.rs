//! Catalog records: the named entities the engine searches.

use crate::error::DalilError;
use crate::search::Searchable;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reciter {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub riwaya: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transliteration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verse_count: Option<u32>,
}

impl Searchable for Reciter {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Searchable for Chapter {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub reciters: Vec<Reciter>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

impl Catalog {
    /// Parse a catalog from JSON, rejecting records with empty names at
    /// the boundary rather than letting them reach the engine.
    pub fn from_json(json: &str) -> Result<Self, DalilError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, DalilError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    fn validate(&self) -> Result<(), DalilError> {
        for reciter in &self.reciters {
            if reciter.name.trim().is_empty() {
                return Err(DalilError::Catalog(format!(
                    "reciter {} has an empty name",
                    reciter.id
                )));
            }
        }
        for chapter in &self.chapters {
            if chapter.name.trim().is_empty() {
                return Err(DalilError::Catalog(format!(
                    "chapter {} has an empty name",
                    chapter.id
                )));
            }
        }
        Ok(())
    }
}
