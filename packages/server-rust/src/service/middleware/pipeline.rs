//! Pipeline composition: wraps the write service in the middleware stack.

use std::sync::Arc;

use tower::ServiceBuilder;

use super::metrics::OperationMetricsLayer;
use crate::catalog::Catalog;
use crate::service::config::ServerConfig;
use crate::service::domain::WriteService;
use crate::service::operation::{Operation, OperationError, OperationResponse};

/// Build the write pipeline: `OperationMetricsLayer` around a [`WriteService`].
///
/// The returned service implements `tower::Service<Operation>` and is cheap to
/// clone; every clone shares the same catalog.
#[must_use]
pub fn build_write_pipeline(
    catalog: Arc<Catalog>,
    config: Arc<ServerConfig>,
) -> impl tower::Service<Operation, Response = OperationResponse, Error = OperationError> + Clone
{
    ServiceBuilder::new()
        .layer(OperationMetricsLayer)
        .service(Arc::new(WriteService::new(catalog, config)))
}
