//! Operation types and execution framework.
//!
//! 1. **Operations** (`operation`): `OperationContext` plus typed write commands
//! 2. **Decorations** (`decoration`): typed per-operation state on the context
//! 3. **Domain services** (`domain`): the write service
//! 4. **Middleware** (`middleware`): Tower layers (metrics) and pipeline assembly

pub mod config;
pub mod decoration;
pub mod domain;
pub mod middleware;
pub mod operation;

// Re-export key types for convenient access.
pub use config::ServerConfig;
pub use decoration::{Decoration, Decorations};
pub use domain::WriteService;
pub use middleware::build_write_pipeline;
pub use operation::{
    service_names, InsertCommand, Operation, OperationContext, OperationError,
    OperationResponse, ReplaceCommand,
};
