use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogError};
use crate::model::{CatalogTable, TableRef, UpdateBehavior};

/// Catalog persisted as a single JSON document on the local filesystem.
///
/// Entries are keyed by `database.table`. Writes go through a full
/// read-modify-write of the document; last writer wins, matching the
/// consistency the external catalog offers.
#[derive(Debug)]
pub struct FileCatalog {
    path: PathBuf,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    tables: BTreeMap<String, CatalogTable>,
}

fn entry_key(reference: &TableRef) -> String {
    format!("{}.{}", reference.database, reference.table)
}

impl FileCatalog {
    /// Open a catalog document, creating an empty one if the file is absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let catalog = Self { path: path.into() };
        if !catalog.path.exists() {
            catalog.save(&CatalogDocument::default())?;
        }
        Ok(catalog)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<CatalogDocument, CatalogError> {
        let content = std::fs::read_to_string(&self.path).map_err(|error| {
            CatalogError::Backend(format!(
                "failed to read catalog file {}: {error}",
                self.path.display()
            ))
        })?;
        serde_json::from_str(&content).map_err(|error| {
            CatalogError::Backend(format!(
                "failed to parse catalog file {}: {error}",
                self.path.display()
            ))
        })
    }

    fn save(&self, document: &CatalogDocument) -> Result<(), CatalogError> {
        let content = serde_json::to_string_pretty(document).map_err(|error| {
            CatalogError::Backend(format!("failed to serialize catalog document: {error}"))
        })?;
        std::fs::write(&self.path, content).map_err(|error| {
            CatalogError::Backend(format!(
                "failed to write catalog file {}: {error}",
                self.path.display()
            ))
        })
    }
}

impl Catalog for FileCatalog {
    fn get_table(&self, reference: &TableRef) -> Result<CatalogTable, CatalogError> {
        let document = self.load()?;
        document
            .tables
            .get(&entry_key(reference))
            .cloned()
            .ok_or_else(|| CatalogError::not_found(reference))
    }

    fn update_table(
        &mut self,
        mut table: CatalogTable,
        behavior: UpdateBehavior,
    ) -> Result<(), CatalogError> {
        let mut document = self.load()?;
        let key = entry_key(&table.reference);
        let existing = document.tables.get(&key);

        if existing.is_some() && behavior == UpdateBehavior::FailOnConflict {
            return Err(CatalogError::already_exists(&table.reference));
        }

        let now = Utc::now().to_rfc3339();
        table.created_at = existing
            .and_then(|entry| entry.created_at.clone())
            .or_else(|| Some(now.clone()));
        table.updated_at = Some(now);

        document.tables.insert(key, table);
        self.save(&document)
    }
}
