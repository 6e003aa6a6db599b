//! Domain services.
//!
//! [`WriteService`] handles insert and replace operations. It is the place
//! where a command's `bypassDocumentValidation` option turns into a
//! [`DisableDocumentValidation`] guard around the collection writes.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tower::Service;
use vellum_core::Document;

use crate::catalog::{
    should_bypass_document_validation, Catalog, Collection, DisableDocumentValidation,
};
use crate::service::config::ServerConfig;
use crate::service::operation::{
    Operation, OperationContext, OperationError, OperationResponse,
};

/// Counter of writes executed with document validation bypassed.
pub const BYPASS_COUNTER: &str = "vellum_document_validation_bypass_total";

/// Executes write operations against the [`Catalog`].
pub struct WriteService {
    catalog: Arc<Catalog>,
    config: Arc<ServerConfig>,
}

impl WriteService {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, config: Arc<ServerConfig>) -> Self {
        Self { catalog, config }
    }

    /// Runs a single operation to completion.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::UnknownCollection`] if the target collection
    /// does not exist, [`OperationError::BypassNotPermitted`] if the command
    /// asks for a bypass the server does not allow, and
    /// [`OperationError::Write`] for the first failing document.
    pub fn execute(&self, op: Operation) -> Result<OperationResponse, OperationError> {
        match op {
            Operation::Insert { mut ctx, command } => {
                let collection = self.collection(&command.collection)?;
                let bypass = self.bypass_requested(&ctx, &command.collection, &command.options)?;
                let ids = if bypass {
                    let guard = DisableDocumentValidation::new(&mut ctx);
                    insert_ordered(&collection, &guard, command.documents)?
                } else {
                    insert_ordered(&collection, &ctx, command.documents)?
                };
                Ok(OperationResponse::Inserted {
                    call_id: ctx.call_id,
                    ids,
                })
            }
            Operation::Replace { mut ctx, command } => {
                let collection = self.collection(&command.collection)?;
                let bypass = self.bypass_requested(&ctx, &command.collection, &command.options)?;
                let matched = if bypass {
                    let guard = DisableDocumentValidation::new(&mut ctx);
                    collection.replace(&guard, &command.id, command.document)?
                } else {
                    collection.replace(&ctx, &command.id, command.document)?
                };
                Ok(OperationResponse::Replaced {
                    call_id: ctx.call_id,
                    matched,
                })
            }
        }
    }

    fn collection(&self, name: &str) -> Result<Arc<Collection>, OperationError> {
        self.catalog
            .get(name)
            .ok_or_else(|| OperationError::UnknownCollection {
                name: name.to_string(),
            })
    }

    /// Reads the bypass option and checks it against server policy.
    fn bypass_requested(
        &self,
        ctx: &OperationContext,
        collection: &str,
        options: &Document,
    ) -> Result<bool, OperationError> {
        if !should_bypass_document_validation(options) {
            return Ok(false);
        }
        if !self.config.allow_document_validation_bypass {
            tracing::warn!(
                call_id = ctx.call_id,
                collection,
                "rejected write requesting bypassDocumentValidation"
            );
            return Err(OperationError::BypassNotPermitted);
        }

        tracing::debug!(
            call_id = ctx.call_id,
            collection,
            client_id = ctx.client_id.as_deref(),
            "document validation bypassed"
        );
        metrics::counter!(BYPASS_COUNTER, "collection" => collection.to_string()).increment(1);
        Ok(true)
    }
}

/// Inserts documents in order, stopping at the first failure.
///
/// Documents written before the failure stay written.
fn insert_ordered(
    collection: &Collection,
    ctx: &OperationContext,
    documents: Vec<Document>,
) -> Result<Vec<String>, OperationError> {
    let mut ids = Vec::with_capacity(documents.len());
    for document in documents {
        ids.push(collection.insert(ctx, document)?);
    }
    Ok(ids)
}

impl Service<Operation> for Arc<WriteService> {
    type Response = OperationResponse;
    type Error = OperationError;
    type Future = Pin<Box<dyn Future<Output = Result<OperationResponse, OperationError>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        let svc = Arc::clone(self);
        Box::pin(async move { svc.execute(op) })
    }
}
