use std::collections::HashMap;

use chrono::Utc;

use crate::catalog::{Catalog, CatalogError};
use crate::model::{CatalogTable, TableRef, UpdateBehavior};

/// HashMap-backed catalog, the reference implementation used in tests and
/// embedded setups.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    tables: HashMap<TableRef, CatalogTable>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration for test setup.
    pub fn with_table(mut self, table: CatalogTable) -> Self {
        self.tables.insert(table.reference.clone(), table);
        self
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

impl Catalog for InMemoryCatalog {
    fn get_table(&self, reference: &TableRef) -> Result<CatalogTable, CatalogError> {
        self.tables
            .get(reference)
            .cloned()
            .ok_or_else(|| CatalogError::not_found(reference))
    }

    fn update_table(
        &mut self,
        mut table: CatalogTable,
        behavior: UpdateBehavior,
    ) -> Result<(), CatalogError> {
        let existing = self.tables.get(&table.reference);

        if existing.is_some() && behavior == UpdateBehavior::FailOnConflict {
            return Err(CatalogError::already_exists(&table.reference));
        }

        let now = Utc::now().to_rfc3339();
        table.created_at = existing
            .and_then(|entry| entry.created_at.clone())
            .or_else(|| Some(now.clone()));
        table.updated_at = Some(now);

        self.tables.insert(table.reference.clone(), table);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnDef, ColumnType, StorageFormat};

    fn make_table(database: &str, table: &str) -> CatalogTable {
        CatalogTable {
            reference: TableRef::new(database, table),
            location: format!("/data/{database}/{table}"),
            format: StorageFormat::Parquet,
            columns: vec![ColumnDef {
                name: "id".to_string(),
                column_type: ColumnType::Integer,
                nullable: Some(false),
            }],
            partition_columns: vec![],
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn get_missing_table_is_not_found() {
        let catalog = InMemoryCatalog::new();
        let result = catalog.get_table(&TableRef::new("db", "missing"));
        assert!(matches!(
            result,
            Err(CatalogError::TableNotFound { .. })
        ));
    }

    #[test]
    fn update_in_database_upserts_without_duplicating() {
        let mut catalog = InMemoryCatalog::new();
        let table = make_table("analytics", "final");

        catalog
            .update_table(table.clone(), UpdateBehavior::UpdateInDatabase)
            .unwrap();
        let first = catalog.get_table(&table.reference).unwrap();

        let mut updated = table.clone();
        updated.partition_columns = vec!["region".to_string()];
        catalog
            .update_table(updated, UpdateBehavior::UpdateInDatabase)
            .unwrap();

        assert_eq!(catalog.table_count(), 1);
        let second = catalog.get_table(&table.reference).unwrap();
        assert_eq!(second.partition_columns, vec!["region".to_string()]);
        assert_eq!(second.created_at, first.created_at);
    }

    #[test]
    fn fail_on_conflict_rejects_existing_entry() {
        let table = make_table("analytics", "final");
        let mut catalog = InMemoryCatalog::new().with_table(table.clone());

        let result = catalog.update_table(table, UpdateBehavior::FailOnConflict);
        assert!(matches!(
            result,
            Err(CatalogError::TableAlreadyExists { .. })
        ));
    }
}
