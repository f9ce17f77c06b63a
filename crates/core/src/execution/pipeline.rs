//! Three-stage job pipeline: read both sources, join, write and register.
//!
//! Strictly sequential and all-or-nothing: any stage error aborts the run and
//! the catalog target is only touched after a successful write.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use polars::prelude::{DataFrame, DataType};
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::engine::io_traits::{DataLoader, DataSink};
use crate::engine::join::join_datasets;
use crate::model::{
    CatalogTable, ColumnDef, ColumnType, JobConfig, JobRun, RunStatus, SinkConfig, TableRef,
};

/// Summary of a committed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub rows_written: usize,
    pub partitions_written: Vec<String>,
    pub output_table: TableRef,
}

fn map_column_type(dtype: &DataType) -> Result<ColumnType> {
    let mapped = if dtype.is_string() {
        ColumnType::String
    } else if dtype.is_integer() {
        ColumnType::Integer
    } else if dtype.is_float() {
        ColumnType::Float
    } else {
        match dtype {
            DataType::Boolean => ColumnType::Boolean,
            DataType::Date => ColumnType::Date,
            DataType::Datetime(_, _) => ColumnType::Timestamp,
            _ => bail!("unsupported data type for catalog registration: {dtype:?}"),
        }
    };
    Ok(mapped)
}

fn catalog_entry_for_output(output: &DataFrame, sink: &SinkConfig) -> Result<CatalogTable> {
    let columns = output
        .schema()
        .iter()
        .map(|(name, dtype)| {
            Ok(ColumnDef {
                name: name.to_string(),
                column_type: map_column_type(dtype)?,
                nullable: Some(true),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CatalogTable {
        reference: sink.catalog_target.clone(),
        location: sink.path.clone(),
        format: sink.format,
        columns,
        partition_columns: sink.partition_columns.clone(),
        created_at: None,
        updated_at: None,
    })
}

/// Execute one job: resolve both sources, load, join, write, register.
pub fn run_job(
    config: &JobConfig,
    catalog: &mut dyn Catalog,
    loader: &dyn DataLoader,
    sink: &dyn DataSink,
) -> Result<JobReport> {
    // Both source tables must resolve before any data is read.
    let left_table = catalog
        .get_table(&config.left)
        .with_context(|| format!("failed to resolve source table '{}'", config.left))?;
    let right_table = catalog
        .get_table(&config.right)
        .with_context(|| format!("failed to resolve source table '{}'", config.right))?;

    let left = loader
        .load(&left_table)
        .with_context(|| format!("failed to load source table '{}'", config.left))?;
    let right = loader
        .load(&right_table)
        .with_context(|| format!("failed to load source table '{}'", config.right))?;
    debug!(left = %config.left, right = %config.right, "source tables loaded");

    let joined = join_datasets(left, right, &config.join).with_context(|| {
        format!(
            "failed to join '{}' and '{}' on '{}' = '{}'",
            config.left, config.right, config.join.left_on, config.join.right_on
        )
    })?;

    let output = joined
        .collect()
        .context("failed to materialize joined dataset")?;

    let report = sink
        .write(&output, &config.sink)
        .with_context(|| format!("failed to write output to '{}'", config.sink.path))?;

    // Registration only after a successful write.
    let entry = catalog_entry_for_output(&output, &config.sink)?;
    catalog
        .update_table(entry, config.sink.update_behavior)
        .with_context(|| {
            format!(
                "failed to register output table '{}'",
                config.sink.catalog_target
            )
        })?;

    info!(
        output = %config.sink.catalog_target,
        rows = report.rows_written,
        partitions = report.partitions_written.len(),
        "job output written and registered"
    );

    Ok(JobReport {
        rows_written: report.rows_written,
        partitions_written: report.partitions_written,
        output_table: config.sink.catalog_target.clone(),
    })
}

/// Outcome of a lifecycle-managed job execution.
#[derive(Debug)]
pub struct CompletedJob {
    pub run: JobRun,
    /// Present when the run committed.
    pub report: Option<JobReport>,
}

/// Job lifecycle wrapper: init starts a run, commit or fail terminates it.
#[derive(Debug)]
pub struct JobRunner {
    run: JobRun,
}

impl JobRunner {
    /// Start a new run with the externally supplied job name and arguments.
    pub fn init(name: impl Into<String>, arguments: BTreeMap<String, String>) -> Self {
        let run = JobRun {
            id: Uuid::now_v7(),
            name: name.into(),
            arguments,
            status: RunStatus::Running,
            started_at: Some(Utc::now().to_rfc3339()),
            completed_at: None,
            error: None,
        };
        info!(run_id = %run.id, name = %run.name, "job initialized");
        Self { run }
    }

    pub fn run(&self) -> &JobRun {
        &self.run
    }

    pub fn commit(mut self) -> JobRun {
        self.run.status = RunStatus::Committed;
        self.run.completed_at = Some(Utc::now().to_rfc3339());
        info!(run_id = %self.run.id, "job committed");
        self.run
    }

    pub fn fail(mut self, error: &anyhow::Error) -> JobRun {
        self.run.status = RunStatus::Failed;
        self.run.completed_at = Some(Utc::now().to_rfc3339());
        self.run.error = Some(format!("{error:#}"));
        self.run
    }

    /// Run the pipeline under this lifecycle, committing on success and
    /// failing the run otherwise.
    pub fn execute(
        self,
        config: &JobConfig,
        catalog: &mut dyn Catalog,
        loader: &dyn DataLoader,
        sink: &dyn DataSink,
    ) -> CompletedJob {
        match run_job(config, catalog, loader, sink) {
            Ok(report) => CompletedJob {
                run: self.commit(),
                report: Some(report),
            },
            Err(error) => CompletedJob {
                run: self.fail(&error),
                report: None,
            },
        }
    }
}
