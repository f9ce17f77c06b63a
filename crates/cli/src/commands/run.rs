use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use conflux_core::model::{JobConfig, RunStatus};
use conflux_core::{FileCatalog, JobRunner, LocalDataLoader, PartitionedSink};

/// Execute a job definition
#[derive(Debug, Parser)]
pub struct RunCommand {
    /// Path to the job definition YAML file
    #[arg(value_name = "CONFIG")]
    pub config_path: PathBuf,

    /// Job name recorded on the run
    #[arg(long, value_name = "NAME")]
    pub name: String,

    /// Path to the catalog document
    #[arg(long, value_name = "FILE", default_value = "catalog.json")]
    pub catalog: PathBuf,

    /// Runtime arguments, repeatable as KEY=VALUE
    #[arg(long = "arg", value_name = "KEY=VALUE")]
    pub arguments: Vec<String>,
}

impl RunCommand {
    pub fn execute(&self) -> Result<i32> {
        let config = parse_job_config(&self.config_path)?;
        let arguments = parse_arguments(&self.arguments)?;

        let mut catalog = FileCatalog::open(&self.catalog).with_context(|| {
            format!("failed to open catalog at {}", self.catalog.display())
        })?;
        let loader = LocalDataLoader::new();
        let sink = PartitionedSink::new();

        let runner = JobRunner::init(&self.name, arguments);
        let completed = runner.execute(&config, &mut catalog, &loader, &sink);

        match completed.run.status {
            RunStatus::Committed => {
                let report = completed
                    .report
                    .context("committed run is missing its report")?;
                println!(
                    "job '{}' committed: {} rows, {} partitions -> {}",
                    completed.run.name,
                    report.rows_written,
                    report.partitions_written.len(),
                    report.output_table
                );
                Ok(0)
            }
            _ => {
                let detail = completed
                    .run
                    .error
                    .unwrap_or_else(|| "unknown error".to_string());
                eprintln!("job '{}' failed: {detail}", completed.run.name);
                Ok(1)
            }
        }
    }
}

/// Parse a job definition from a YAML file with field-path error reporting.
fn parse_job_config(path: &Path) -> Result<JobConfig> {
    if !path.exists() {
        anyhow::bail!("job definition not found: {}", path.display());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read job definition: {}", path.display()))?;

    let deserializer = serde_yaml::Deserializer::from_str(&content);
    let config: JobConfig = serde_path_to_error::deserialize(deserializer)
        .with_context(|| format!("failed to parse job definition: {}", path.display()))?;

    Ok(config)
}

fn parse_arguments(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .with_context(|| format!("invalid argument '{pair}', expected KEY=VALUE"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_arguments_splits_pairs() {
        let parsed = parse_arguments(&["REGION=US".to_string(), "MODE=full".to_string()]).unwrap();
        assert_eq!(parsed.get("REGION").map(String::as_str), Some("US"));
        assert_eq!(parsed.get("MODE").map(String::as_str), Some("full"));
    }

    #[test]
    fn parse_arguments_rejects_missing_equals() {
        let result = parse_arguments(&["REGION".to_string()]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_job_config_reports_field_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("job.yaml");
        // sink.catalog_target is missing its table field
        let yaml = r#"
left: {database: src, table: a}
right: {database: src, table: b}
join: {left_on: category_id, right_on: id}
sink:
  path: /tmp/out
  catalog_target: {database: analytics}
"#;
        std::fs::write(&path, yaml).unwrap();

        let result = parse_job_config(&path);
        assert!(result.is_err());
    }

    #[test]
    fn parse_job_config_accepts_full_definition() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("job.yaml");
        let yaml = r#"
left:
  database: yt_cleaned
  table: raw_statistics
right:
  database: yt_cleaned
  table: reference_data
join:
  left_on: category_id
  right_on: id
sink:
  path: /tmp/analytics
  partition_columns: [region, category_id]
  format: parquet
  compression: snappy
  catalog_target:
    database: yt_analytics
    table: final_analytics
  update_behavior: update_in_database
"#;
        std::fs::write(&path, yaml).unwrap();

        let config = parse_job_config(&path).unwrap();
        assert_eq!(config.join.left_on, "category_id");
        assert_eq!(
            config.sink.partition_columns,
            vec!["region".to_string(), "category_id".to_string()]
        );
    }
}
