use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference to a named table within a catalog database.
///
/// Resolved once at read time; the pair is immutable for the duration of a
/// job run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub database: String,
    pub table: String,
}

impl TableRef {
    pub fn new(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.table)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub nullable: Option<bool>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageFormat {
    #[default]
    Parquet,
    Csv,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    #[default]
    Snappy,
    Zstd,
    None,
}

/// Policy applied when registering an output table that already exists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpdateBehavior {
    /// Upsert the catalog entry: overwrite schema and partition listing,
    /// never duplicate.
    #[default]
    UpdateInDatabase,
    /// Refuse to register over an existing entry.
    FailOnConflict,
}

/// A registered catalog entry: where a table lives and what shape it has.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogTable {
    pub reference: TableRef,
    /// Storage location of the table data (a directory or a single file).
    pub location: String,
    #[serde(default)]
    pub format: StorageFormat,
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub partition_columns: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}
