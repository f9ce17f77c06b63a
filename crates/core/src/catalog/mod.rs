//! Catalog access: table lookup and registration.
//!
//! The catalog itself is an external collaborator; this module defines the
//! trait the pipeline talks through plus two local implementations, an
//! in-memory reference store and a JSON-file-backed store.

pub mod file;
pub mod memory;

use thiserror::Error;

use crate::model::{CatalogTable, TableRef, UpdateBehavior};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("table '{database}.{table}' not found in catalog")]
    TableNotFound { database: String, table: String },

    #[error("table '{database}.{table}' already exists and update behavior forbids overwrite")]
    TableAlreadyExists { database: String, table: String },

    #[error("catalog backend error: {0}")]
    Backend(String),
}

impl CatalogError {
    pub fn not_found(reference: &TableRef) -> Self {
        Self::TableNotFound {
            database: reference.database.clone(),
            table: reference.table.clone(),
        }
    }

    pub fn already_exists(reference: &TableRef) -> Self {
        Self::TableAlreadyExists {
            database: reference.database.clone(),
            table: reference.table.clone(),
        }
    }
}

pub trait Catalog {
    /// Resolve a registered table. Absence is a configuration error.
    fn get_table(&self, reference: &TableRef) -> Result<CatalogTable, CatalogError>;

    /// Register or update a table entry according to the declared policy.
    ///
    /// `UpdateInDatabase` upserts: the existing entry's schema, location and
    /// partition listing are replaced and `created_at` is preserved.
    fn update_table(
        &mut self,
        table: CatalogTable,
        behavior: UpdateBehavior,
    ) -> Result<(), CatalogError>;
}

pub use file::FileCatalog;
pub use memory::InMemoryCatalog;
