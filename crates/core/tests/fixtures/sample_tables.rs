//! Shared fixtures: small statistics/reference frames and catalog entries.

use conflux_core::model::{CatalogTable, StorageFormat, TableRef};
use polars::prelude::*;

/// Left side: per-video statistics keyed by category_id.
pub fn statistics_frame() -> LazyFrame {
    df! {
        "region" => &["US", "US", "GB"],
        "category_id" => &[10i64, 10, 24],
        "views" => &[100i64, 250, 40],
    }
    .unwrap()
    .lazy()
}

/// Right side: category reference data keyed by id.
pub fn reference_frame() -> LazyFrame {
    df! {
        "id" => &[10i64, 24],
        "category_name" => &["Music", "Entertainment"],
    }
    .unwrap()
    .lazy()
}

pub fn catalog_entry(database: &str, table: &str, location: &str) -> CatalogTable {
    CatalogTable {
        reference: TableRef::new(database, table),
        location: location.to_string(),
        format: StorageFormat::Parquet,
        columns: vec![],
        partition_columns: vec![],
        created_at: None,
        updated_at: None,
    }
}
