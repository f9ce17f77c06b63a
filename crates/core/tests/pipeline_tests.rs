//! End-to-end pipeline: resolve, load, join, write, register, plus the job
//! lifecycle wrapper.

#[path = "fixtures/sample_tables.rs"]
mod sample_tables;

use std::collections::BTreeMap;

use conflux_core::model::{
    Compression, JobConfig, JoinConfig, RunStatus, SinkConfig, StorageFormat, TableRef,
    UpdateBehavior,
};
use conflux_core::{
    run_job, Catalog, CatalogError, InMemoryCatalog, InMemoryDataLoader, JobRunner,
    PartitionedSink,
};
use sample_tables::{catalog_entry, reference_frame, statistics_frame};
use tempfile::TempDir;

fn job_config(output_path: &str) -> JobConfig {
    JobConfig {
        left: TableRef::new("yt_cleaned", "raw_statistics"),
        right: TableRef::new("yt_cleaned", "reference_data"),
        join: JoinConfig {
            left_on: "category_id".to_string(),
            right_on: "id".to_string(),
        },
        sink: SinkConfig {
            path: output_path.to_string(),
            partition_columns: vec!["region".to_string(), "category_id".to_string()],
            format: StorageFormat::Parquet,
            compression: Compression::Snappy,
            catalog_target: TableRef::new("yt_analytics", "final_analytics"),
            update_behavior: UpdateBehavior::UpdateInDatabase,
        },
    }
}

fn setup() -> (InMemoryCatalog, InMemoryDataLoader) {
    let catalog = InMemoryCatalog::new()
        .with_table(catalog_entry("yt_cleaned", "raw_statistics", "unused"))
        .with_table(catalog_entry("yt_cleaned", "reference_data", "unused"));
    let loader = InMemoryDataLoader::new()
        .with_table(
            TableRef::new("yt_cleaned", "raw_statistics"),
            statistics_frame(),
        )
        .with_table(
            TableRef::new("yt_cleaned", "reference_data"),
            reference_frame(),
        );
    (catalog, loader)
}

#[test]
fn committed_job_writes_partitions_and_registers_output() {
    let dir = TempDir::new().unwrap();
    let output_path = dir.path().join("analytics");
    let config = job_config(output_path.to_str().unwrap());
    let (mut catalog, loader) = setup();
    let sink = PartitionedSink::new();

    let report = run_job(&config, &mut catalog, &loader, &sink).unwrap();

    assert_eq!(report.rows_written, 3);
    assert_eq!(
        report.partitions_written,
        vec![
            "region=GB/category_id=24".to_string(),
            "region=US/category_id=10".to_string(),
        ]
    );
    assert!(output_path.join("region=US").join("category_id=10").is_dir());

    let registered = catalog
        .get_table(&TableRef::new("yt_analytics", "final_analytics"))
        .unwrap();
    assert_eq!(
        registered.partition_columns,
        vec!["region".to_string(), "category_id".to_string()]
    );
    let column_names: Vec<&str> = registered
        .columns
        .iter()
        .map(|column| column.name.as_str())
        .collect();
    assert!(column_names.contains(&"category_id"));
    assert!(column_names.contains(&"views"));
    assert!(column_names.contains(&"id"));
    assert!(column_names.contains(&"category_name"));
}

#[test]
fn rerun_updates_catalog_entry_without_duplicating() {
    let dir = TempDir::new().unwrap();
    let output_path = dir.path().join("analytics");
    let config = job_config(output_path.to_str().unwrap());
    let (mut catalog, loader) = setup();
    let sink = PartitionedSink::new();

    run_job(&config, &mut catalog, &loader, &sink).unwrap();
    let first = catalog
        .get_table(&TableRef::new("yt_analytics", "final_analytics"))
        .unwrap();

    run_job(&config, &mut catalog, &loader, &sink).unwrap();
    let second = catalog
        .get_table(&TableRef::new("yt_analytics", "final_analytics"))
        .unwrap();

    // two sources + one output, not four entries
    assert_eq!(catalog.table_count(), 3);
    assert_eq!(second.created_at, first.created_at);
}

#[test]
fn missing_source_table_aborts_before_any_output() {
    let dir = TempDir::new().unwrap();
    let output_path = dir.path().join("analytics");
    let config = job_config(output_path.to_str().unwrap());

    let mut catalog =
        InMemoryCatalog::new().with_table(catalog_entry("yt_cleaned", "raw_statistics", "unused"));
    let loader = InMemoryDataLoader::new();
    let sink = PartitionedSink::new();

    let result = run_job(&config, &mut catalog, &loader, &sink);
    assert!(result.is_err());
    let error = result.unwrap_err();
    assert!(error
        .chain()
        .any(|cause| matches!(
            cause.downcast_ref::<CatalogError>(),
            Some(CatalogError::TableNotFound { .. })
        )));

    assert!(!output_path.exists());
    assert!(catalog
        .get_table(&TableRef::new("yt_analytics", "final_analytics"))
        .is_err());
}

#[test]
fn misdeclared_join_key_aborts_before_any_output() {
    let dir = TempDir::new().unwrap();
    let output_path = dir.path().join("analytics");
    let mut config = job_config(output_path.to_str().unwrap());
    config.join.left_on = "no_such_column".to_string();

    let (mut catalog, loader) = setup();
    let sink = PartitionedSink::new();

    let result = run_job(&config, &mut catalog, &loader, &sink);
    assert!(result.is_err());
    assert!(!output_path.exists());
    assert!(catalog
        .get_table(&TableRef::new("yt_analytics", "final_analytics"))
        .is_err());
}

#[test]
fn misdeclared_partition_column_aborts_before_registration() {
    let dir = TempDir::new().unwrap();
    let output_path = dir.path().join("analytics");
    let mut config = job_config(output_path.to_str().unwrap());
    config.sink.partition_columns = vec!["no_such_column".to_string()];

    let (mut catalog, loader) = setup();
    let sink = PartitionedSink::new();

    let result = run_job(&config, &mut catalog, &loader, &sink);
    assert!(result.is_err());
    assert!(catalog
        .get_table(&TableRef::new("yt_analytics", "final_analytics"))
        .is_err());
}

#[test]
fn job_runner_commits_on_success() {
    let dir = TempDir::new().unwrap();
    let output_path = dir.path().join("analytics");
    let config = job_config(output_path.to_str().unwrap());
    let (mut catalog, loader) = setup();
    let sink = PartitionedSink::new();

    let mut arguments = BTreeMap::new();
    arguments.insert("JOB_NAME".to_string(), "final_analytics_job".to_string());
    let runner = JobRunner::init("final_analytics_job", arguments);
    assert_eq!(runner.run().status, RunStatus::Running);

    let completed = runner.execute(&config, &mut catalog, &loader, &sink);
    assert_eq!(completed.run.status, RunStatus::Committed);
    assert!(completed.run.completed_at.is_some());
    assert_eq!(completed.report.unwrap().rows_written, 3);
}

#[test]
fn job_runner_records_failure() {
    let dir = TempDir::new().unwrap();
    let output_path = dir.path().join("analytics");
    let mut config = job_config(output_path.to_str().unwrap());
    config.left = TableRef::new("yt_cleaned", "missing");

    let (mut catalog, loader) = setup();
    let sink = PartitionedSink::new();

    let runner = JobRunner::init("final_analytics_job", BTreeMap::new());
    let completed = runner.execute(&config, &mut catalog, &loader, &sink);

    assert_eq!(completed.run.status, RunStatus::Failed);
    assert!(completed.report.is_none());
    let error = completed.run.error.unwrap();
    assert!(error.contains("missing"));
}
