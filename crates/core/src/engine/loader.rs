use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use polars::prelude::*;
use thiserror::Error;

use crate::engine::io_traits::DataLoader;
use crate::model::{CatalogTable, StorageFormat, TableRef};

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("table location does not exist: {path}")]
    LocationMissing { path: PathBuf },

    #[error("failed to scan parquet at {path}: {source}")]
    ParquetScan {
        path: PathBuf,
        source: PolarsError,
    },

    #[error("failed to scan csv at {path}: {source}")]
    CsvScan {
        path: PathBuf,
        source: PolarsError,
    },

    #[error("table '{table}' not found in loader; registered tables: {available:?}")]
    TableNotRegistered {
        table: String,
        available: Vec<String>,
    },
}

/// Loads catalog tables from the local filesystem.
///
/// A location may be a single data file or a directory; directories are
/// scanned recursively with a glob so partitioned layouts written by the sink
/// can be read back.
#[derive(Debug, Default)]
pub struct LocalDataLoader;

impl LocalDataLoader {
    pub fn new() -> Self {
        Self
    }

    fn scan_parquet(path: &Path) -> Result<LazyFrame, LoaderError> {
        let target = if path.is_dir() {
            path.join("**").join("*.parquet")
        } else {
            path.to_path_buf()
        };
        LazyFrame::scan_parquet(&target, Default::default()).map_err(|source| {
            LoaderError::ParquetScan {
                path: target,
                source,
            }
        })
    }

    fn scan_csv(path: &Path) -> Result<LazyFrame, LoaderError> {
        let target = if path.is_dir() {
            path.join("**").join("*.csv")
        } else {
            path.to_path_buf()
        };
        LazyCsvReader::new(&target)
            .finish()
            .map_err(|source| LoaderError::CsvScan {
                path: target,
                source,
            })
    }
}

impl DataLoader for LocalDataLoader {
    fn load(&self, table: &CatalogTable) -> Result<LazyFrame> {
        let path = Path::new(&table.location);
        if !path.exists() {
            return Err(LoaderError::LocationMissing {
                path: path.to_path_buf(),
            }
            .into());
        }

        let frame = match table.format {
            StorageFormat::Parquet => Self::scan_parquet(path)?,
            StorageFormat::Csv => Self::scan_csv(path)?,
        };
        Ok(frame)
    }
}

/// In-memory loader keyed by table reference, for tests and embedded runs.
#[derive(Default)]
pub struct InMemoryDataLoader {
    frames: HashMap<TableRef, LazyFrame>,
}

impl InMemoryDataLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, reference: TableRef, frame: LazyFrame) {
        self.frames.insert(reference, frame);
    }

    pub fn with_table(mut self, reference: TableRef, frame: LazyFrame) -> Self {
        self.add_table(reference, frame);
        self
    }
}

impl DataLoader for InMemoryDataLoader {
    fn load(&self, table: &CatalogTable) -> Result<LazyFrame> {
        self.frames
            .get(&table.reference)
            .cloned()
            .ok_or_else(|| {
                LoaderError::TableNotRegistered {
                    table: table.reference.to_string(),
                    available: self.frames.keys().map(ToString::to_string).collect(),
                }
                .into()
            })
    }
}
