pub mod catalog;
pub mod engine;
pub mod execution;
pub mod model;

pub use catalog::{Catalog, CatalogError, FileCatalog, InMemoryCatalog};
pub use engine::io_traits::{DataLoader, DataSink};
pub use engine::join::{join_datasets, JoinError};
pub use engine::loader::{InMemoryDataLoader, LocalDataLoader};
pub use engine::sink::{PartitionedSink, SinkError, WriteReport};
pub use execution::pipeline::{run_job, CompletedJob, JobReport, JobRunner};
