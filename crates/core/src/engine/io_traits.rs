use anyhow::Result;
use polars::prelude::{DataFrame, LazyFrame};

use crate::model::{CatalogTable, SinkConfig};

use super::sink::WriteReport;

/// Reads the full materialized dataset behind a catalog entry.
///
/// No filtering, no projection, no side effects. Implementations decide how
/// `CatalogTable.location` is interpreted (local files, object storage, in
/// memory).
pub trait DataLoader {
    fn load(&self, table: &CatalogTable) -> Result<LazyFrame>;
}

/// Writes a materialized frame to the configured output location.
pub trait DataSink {
    fn write(&self, frame: &DataFrame, config: &SinkConfig) -> Result<WriteReport>;
}
