//! Metrics middleware for write operations.
//!
//! Wraps each operation in a `tracing` span carrying the target collection and
//! whether the command asked to bypass document validation, then records
//! duration and outcome once the inner service finishes. A requested bypass
//! that the server refuses shows up as `outcome = "error"`.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use tower::{Layer, Service};
use tracing::{info_span, Instrument};

use crate::catalog::should_bypass_document_validation;
use crate::service::operation::{Operation, OperationError, OperationResponse};

// ---------------------------------------------------------------------------
// OperationMetricsLayer
// ---------------------------------------------------------------------------

/// Tower layer that instruments operations with timing and outcome via `tracing` spans.
#[derive(Debug, Clone)]
pub struct OperationMetricsLayer;

impl<S> Layer<S> for OperationMetricsLayer {
    type Service = OperationMetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        OperationMetricsService { inner }
    }
}

// ---------------------------------------------------------------------------
// OperationMetricsService
// ---------------------------------------------------------------------------

/// Service wrapper that records operation duration and outcome in tracing spans.
#[derive(Debug, Clone)]
pub struct OperationMetricsService<S> {
    inner: S,
}

impl<S> Service<Operation> for OperationMetricsService<S>
where
    S: Service<Operation, Response = OperationResponse, Error = OperationError> + Send,
    S::Future: Send + 'static,
{
    type Response = OperationResponse;
    type Error = OperationError;
    type Future = Pin<Box<dyn Future<Output = Result<OperationResponse, OperationError>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        let service_name = op.ctx().service_name;
        let call_id = op.ctx().call_id;
        let bypass_requested = should_bypass_document_validation(op.options());

        let span = info_span!(
            "operation",
            service = service_name,
            call_id = call_id,
            collection = op.collection(),
            bypass_requested = bypass_requested,
            duration_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        let fut = self.inner.call(op);

        Box::pin(
            async move {
                let start = Instant::now();
                let result = fut.await;

                let outcome = match &result {
                    Ok(_) => "ok",
                    Err(OperationError::Write(_)) => "rejected",
                    Err(_) => "error",
                };

                #[allow(clippy::cast_possible_truncation)]
                let duration_ms = start.elapsed().as_millis() as u64;
                tracing::Span::current().record("duration_ms", duration_ms);
                tracing::Span::current().record("outcome", outcome);

                tracing::info!(
                    service = service_name,
                    call_id = call_id,
                    duration_ms = duration_ms,
                    outcome = outcome,
                    "operation complete"
                );

                result
            }
            .instrument(span),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
