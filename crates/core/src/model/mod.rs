pub mod catalog;
pub mod job;

pub use catalog::{
    CatalogTable, ColumnDef, ColumnType, Compression, StorageFormat, TableRef, UpdateBehavior,
};
pub use job::{JobConfig, JobRun, JoinConfig, RunStatus, SinkConfig};
