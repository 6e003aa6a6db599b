use vellum_core::Document;

use super::decoration::Decorations;
use crate::catalog::WriteError;

/// Well-known service names used to route operations.
pub mod service_names {
    pub const WRITE: &str = "write";
}

/// Context carried with every operation through the pipeline.
///
/// One per in-flight operation, accessed by one thread of control at a time.
/// Deliberately not `Clone`: its decorations must never be duplicated or
/// outlive the operation.
#[derive(Debug)]
pub struct OperationContext {
    pub call_id: u64,
    pub service_name: &'static str,
    pub client_id: Option<String>,
    decorations: Decorations,
}

impl OperationContext {
    /// Creates an anonymous context with no decorations set.
    #[must_use]
    pub fn new(call_id: u64, service_name: &'static str) -> Self {
        Self {
            call_id,
            service_name,
            client_id: None,
            decorations: Decorations::new(),
        }
    }

    #[must_use]
    pub fn decorations(&self) -> &Decorations {
        &self.decorations
    }

    pub fn decorations_mut(&mut self) -> &mut Decorations {
        &mut self.decorations
    }
}

/// Insert one or more documents into a collection.
#[derive(Debug, Clone)]
pub struct InsertCommand {
    pub collection: String,
    pub documents: Vec<Document>,
    /// Command options such as `bypassDocumentValidation`.
    pub options: Document,
}

/// Replace the document stored under `id`.
#[derive(Debug, Clone)]
pub struct ReplaceCommand {
    pub collection: String,
    pub id: String,
    pub document: Document,
    pub options: Document,
}

/// Typed operation variants dispatched through the pipeline.
#[derive(Debug)]
#[non_exhaustive]
pub enum Operation {
    Insert {
        ctx: OperationContext,
        command: InsertCommand,
    },
    Replace {
        ctx: OperationContext,
        command: ReplaceCommand,
    },
}

impl Operation {
    #[must_use]
    pub fn ctx(&self) -> &OperationContext {
        match self {
            Operation::Insert { ctx, .. } | Operation::Replace { ctx, .. } => ctx,
        }
    }

    /// Name of the collection the operation writes to.
    #[must_use]
    pub fn collection(&self) -> &str {
        match self {
            Operation::Insert { command, .. } => &command.collection,
            Operation::Replace { command, .. } => &command.collection,
        }
    }

    /// The command's options document.
    #[must_use]
    pub fn options(&self) -> &Document {
        match self {
            Operation::Insert { command, .. } => &command.options,
            Operation::Replace { command, .. } => &command.options,
        }
    }
}

/// Successful response from an operation handler.
#[derive(Debug, PartialEq, Eq)]
pub enum OperationResponse {
    /// Ids of the inserted documents, in command order.
    Inserted { call_id: u64, ids: Vec<String> },
    Replaced { call_id: u64, matched: bool },
}

/// Errors returned by operation handlers.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("unknown collection: {name}")]
    UnknownCollection { name: String },
    #[error("bypassDocumentValidation is not permitted on this server")]
    BypassNotPermitted,
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_is_anonymous_and_undecorated() {
        let ctx = OperationContext::new(3, service_names::WRITE);
        assert_eq!(ctx.call_id, 3);
        assert_eq!(ctx.service_name, "write");
        assert!(ctx.client_id.is_none());
        assert!(ctx.decorations().is_empty());
    }

    #[test]
    fn operation_accessors_read_the_command() {
        let mut options = Document::new();
        options.insert("bypassDocumentValidation".to_string(), true.into());
        let op = Operation::Replace {
            ctx: OperationContext::new(4, service_names::WRITE),
            command: ReplaceCommand {
                collection: "users".to_string(),
                id: "u1".to_string(),
                document: Document::new(),
                options: options.clone(),
            },
        };

        assert_eq!(op.ctx().call_id, 4);
        assert_eq!(op.collection(), "users");
        assert_eq!(op.options(), &options);
    }
}
