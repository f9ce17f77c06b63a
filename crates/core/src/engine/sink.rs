//! Partitioned columnar sink.
//!
//! Writes a materialized frame under an output path using the hive directory
//! layout: one subdirectory level per partition column in declared order
//! (`.../region=US/category_id=10/part-00000.parquet`), with partition
//! columns dropped from the data files themselves. Files from a previous run
//! at the same path are overwritten; last writer wins, matching the storage
//! contract this sink stands in for.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::engine::io_traits::DataSink;
use crate::model::{Compression, SinkConfig, StorageFormat};

/// Directory name segment used for null partition values, hive convention.
pub const HIVE_NULL_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("partition column '{column}' not found in output schema; available columns: {available:?}")]
    PartitionColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("output frame has no columns")]
    EmptyFrame,

    #[error("failed to create output directory {path}: {message}")]
    CreateDirectory { path: PathBuf, message: String },

    #[error("failed to write data file {path}: {message}")]
    WriteFile { path: PathBuf, message: String },

    #[error("failed to split output into partitions: {0}")]
    PartitionSplit(#[from] PolarsError),
}

/// Outcome of a sink write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub rows_written: usize,
    /// Relative partition directories created, e.g. `region=US/category_id=10`.
    /// Empty for an unpartitioned write.
    pub partitions_written: Vec<String>,
    pub files: Vec<PathBuf>,
}

/// Filesystem sink writing hive-partitioned parquet or csv.
#[derive(Debug, Default)]
pub struct PartitionedSink;

impl PartitionedSink {
    pub fn new() -> Self {
        Self
    }
}

fn validate_partition_columns(frame: &DataFrame, partition_columns: &[String]) -> Result<(), SinkError> {
    if frame.width() == 0 {
        return Err(SinkError::EmptyFrame);
    }

    let available: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let names: HashSet<&str> = available.iter().map(String::as_str).collect();

    for column in partition_columns {
        if !names.contains(column.as_str()) {
            return Err(SinkError::PartitionColumnNotFound {
                column: column.clone(),
                available,
            });
        }
    }
    Ok(())
}

fn partition_value(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => HIVE_NULL_PARTITION.to_string(),
        AnyValue::String(text) => text.to_string(),
        AnyValue::StringOwned(text) => text.to_string(),
        other => other.to_string(),
    }
}

/// Relative directory for one partition frame, built from the first row of
/// its key columns. All rows in the frame share the same key tuple.
fn partition_directory(
    partition: &DataFrame,
    partition_columns: &[String],
) -> Result<String, SinkError> {
    let mut segments = Vec::with_capacity(partition_columns.len());
    for column in partition_columns {
        let series = partition.column(column.as_str())?;
        let value = series.get(0)?;
        segments.push(format!("{column}={}", partition_value(&value)));
    }
    Ok(segments.join("/"))
}

fn create_dir(path: &Path) -> Result<(), SinkError> {
    fs::create_dir_all(path).map_err(|error| SinkError::CreateDirectory {
        path: path.to_path_buf(),
        message: error.to_string(),
    })
}

fn parquet_compression(compression: Compression) -> ParquetCompression {
    match compression {
        Compression::Snappy => ParquetCompression::Snappy,
        Compression::Zstd => ParquetCompression::Zstd(None),
        Compression::None => ParquetCompression::Uncompressed,
    }
}

fn write_data_file(
    frame: &mut DataFrame,
    directory: &Path,
    config: &SinkConfig,
) -> Result<PathBuf, SinkError> {
    let (file_name, result): (&str, std::result::Result<_, PolarsError>) = match config.format {
        StorageFormat::Parquet => {
            let path = directory.join("part-00000.parquet");
            let file = fs::File::create(&path).map_err(|error| SinkError::WriteFile {
                path: path.clone(),
                message: error.to_string(),
            })?;
            let result = ParquetWriter::new(file)
                .with_compression(parquet_compression(config.compression))
                .finish(frame)
                .map(|_| path.clone());
            ("part-00000.parquet", result)
        }
        StorageFormat::Csv => {
            let path = directory.join("part-00000.csv");
            let file = fs::File::create(&path).map_err(|error| SinkError::WriteFile {
                path: path.clone(),
                message: error.to_string(),
            })?;
            let result = CsvWriter::new(file).finish(frame).map(|_| path.clone());
            ("part-00000.csv", result)
        }
    };

    result.map_err(|error| SinkError::WriteFile {
        path: directory.join(file_name),
        message: error.to_string(),
    })
}

impl DataSink for PartitionedSink {
    fn write(&self, frame: &DataFrame, config: &SinkConfig) -> Result<WriteReport> {
        validate_partition_columns(frame, &config.partition_columns)?;

        let base = Path::new(&config.path);
        create_dir(base)?;

        let rows_written = frame.height();
        let mut partitions_written = Vec::new();
        let mut files = Vec::new();

        if config.partition_columns.is_empty() {
            let mut data = frame.clone();
            let file = write_data_file(&mut data, base, config)?;
            files.push(file);
        } else {
            let partitions = frame
                .partition_by(config.partition_columns.iter().map(String::as_str), true)
                .map_err(SinkError::PartitionSplit)?;

            for partition in partitions {
                let directory_name = partition_directory(&partition, &config.partition_columns)?;
                let directory = base.join(&directory_name);
                create_dir(&directory)?;

                let mut data = partition.drop_many(
                    config.partition_columns.iter().map(String::as_str),
                );
                let file = write_data_file(&mut data, &directory, config)?;
                files.push(file);
                partitions_written.push(directory_name);
            }
            partitions_written.sort();
        }

        debug!(
            path = %config.path,
            rows = rows_written,
            partitions = partitions_written.len(),
            "sink write complete"
        );

        Ok(WriteReport {
            rows_written,
            partitions_written,
            files,
        })
    }
}
