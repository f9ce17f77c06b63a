//! Inner equi-join between two loaded datasets.
//!
//! Semantics follow standard SQL: matching pairs produce the cross product,
//! null keys never match, unmatched rows are dropped. Both declared key
//! columns survive in the output so the joined record is the concatenation of
//! the left and right records.

use std::collections::HashSet;

use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::model::JoinConfig;

/// Suffix applied to right-side columns that collide with a left-side name.
pub const RIGHT_SUFFIX: &str = "_right";

const RIGHT_KEY_ALIAS: &str = "__conflux_right_key";

#[derive(Debug, Error)]
pub enum JoinError {
    #[error("join key column '{column}' not found on the {side} side; available columns: {available:?}")]
    KeyColumnNotFound {
        column: String,
        side: JoinSide,
        available: Vec<String>,
    },

    #[error("failed to inspect schema on the {side} side: {source}")]
    Schema {
        side: JoinSide,
        source: PolarsError,
    },

    #[error("join execution failed: {0}")]
    Execution(#[from] PolarsError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinSide {
    Left,
    Right,
}

impl std::fmt::Display for JoinSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinSide::Left => write!(f, "left"),
            JoinSide::Right => write!(f, "right"),
        }
    }
}

fn schema_columns(frame: &LazyFrame, side: JoinSide) -> Result<Vec<String>, JoinError> {
    let schema = frame
        .clone()
        .collect_schema()
        .map_err(|source| JoinError::Schema { side, source })?;
    Ok(schema.iter_names().map(|name| name.to_string()).collect())
}

fn require_key(columns: &[String], key: &str, side: JoinSide) -> Result<(), JoinError> {
    let names: HashSet<&str> = columns.iter().map(String::as_str).collect();
    if names.contains(key) {
        Ok(())
    } else {
        Err(JoinError::KeyColumnNotFound {
            column: key.to_string(),
            side,
            available: columns.to_vec(),
        })
    }
}

/// Join two datasets on `left[left_on] == right[right_on]`.
///
/// Key validation runs against the schemas before the join plan is built, so
/// a misdeclared key fails before any output is produced. The right key is
/// duplicated under an internal alias for the join itself; the coalesced
/// alias drops out of the result while the declared right key column is kept
/// as payload.
pub fn join_datasets(
    left: LazyFrame,
    right: LazyFrame,
    config: &JoinConfig,
) -> Result<LazyFrame, JoinError> {
    let left_columns = schema_columns(&left, JoinSide::Left)?;
    let right_columns = schema_columns(&right, JoinSide::Right)?;

    require_key(&left_columns, &config.left_on, JoinSide::Left)?;
    require_key(&right_columns, &config.right_on, JoinSide::Right)?;

    debug!(
        left_on = %config.left_on,
        right_on = %config.right_on,
        left_columns = left_columns.len(),
        right_columns = right_columns.len(),
        "joining datasets"
    );

    let right = right.with_column(col(config.right_on.as_str()).alias(RIGHT_KEY_ALIAS));

    let args = JoinArgs::new(JoinType::Inner)
        .with_coalesce(JoinCoalesce::CoalesceColumns)
        .with_suffix(Some(RIGHT_SUFFIX.into()));

    let joined = left.join(
        right,
        [col(config.left_on.as_str())],
        [col(RIGHT_KEY_ALIAS)],
        args,
    );

    Ok(joined)
}
