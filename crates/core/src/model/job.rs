use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::catalog::{Compression, StorageFormat, TableRef, UpdateBehavior};

/// Join key declaration: one column name per side, compared for equality.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JoinConfig {
    pub left_on: String,
    pub right_on: String,
}

/// Output declaration: where the joined result is written and how it is
/// registered back into the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SinkConfig {
    pub path: String,
    #[serde(default)]
    pub partition_columns: Vec<String>,
    #[serde(default)]
    pub format: StorageFormat,
    #[serde(default)]
    pub compression: Compression,
    pub catalog_target: TableRef,
    #[serde(default)]
    pub update_behavior: UpdateBehavior,
}

/// Declarative definition of a two-table join job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobConfig {
    pub left: TableRef,
    pub right: TableRef,
    pub join: JoinConfig,
    pub sink: SinkConfig,
}

impl JobConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Committed,
    Failed,
}

/// One job invocation. Single-shot: init, run, then commit or fail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobRun {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub arguments: BTreeMap<String, String>,
    pub status: RunStatus,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
