#![doc = include_str!("../README.md")]
// Declare modules
pub mod dataset;
pub mod error;
pub mod indexer;
pub mod request;
pub mod response;
pub mod table;
pub mod telemetry;
pub mod types;

/// Sparse, time-indexed dataset builder.
pub use crate::dataset::Dataset;
/// Configuration options for a dataset.
pub use crate::dataset::DatasetConfig;
/// Error type for table construction and serialization.
pub use crate::error::TableError;
/// Ordered set with stable, insertion-assigned positions.
pub use crate::indexer::Indexer;
/// Time range and query arguments supplied by the request layer.
pub use crate::request::{Args, Range};
/// Table and time-series responses handed to the serialization layer.
pub use crate::response::{Cell, Column, ColumnData, DataPoint, Response, TableResponse, TimeSeriesResponse};
/// Rectangular table of typed columns.
pub use crate::table::Table;
/// Structured event hook for observability.
pub use crate::telemetry::{TableEvent, TableEventListener};
/// Type alias for a timestamp (an exact UTC instant).
pub use crate::types::Timestamp;
/// Type alias for a value in a dataset (f64).
pub use crate::types::Value;
