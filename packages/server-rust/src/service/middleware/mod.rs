//! Tower middleware layers for the operation pipeline.
//!
//! - [`metrics`]: Operation timing and outcome via `tracing` spans
//! - [`pipeline`]: Composes the layers around the write service

pub mod metrics;
pub mod pipeline;

pub use metrics::OperationMetricsLayer;
pub use pipeline::build_write_pipeline;
