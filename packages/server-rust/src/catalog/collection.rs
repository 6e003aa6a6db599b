//! In-memory document collection with optional schema validation.
//!
//! Backed by [`DashMap`] for concurrent access across operations. Every write
//! consults the operation's document validation switch before running the
//! collection's schema.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use vellum_core::{CollectionSchema, Document, ValidationResult, Value, ValueKind};

use super::document_validation::is_document_validation_disabled;
use crate::service::operation::OperationContext;

/// Field holding a document's primary key.
pub const ID_FIELD: &str = "_id";

/// Errors raised by collection writes.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("document failed validation in collection '{collection}': {}", .errors.join("; "))]
    DocumentValidation {
        collection: String,
        errors: Vec<String>,
    },
    #[error("duplicate key '{id}' in collection '{collection}'")]
    DuplicateKey { collection: String, id: String },
    #[error("'_id' must be a string, found {found:?}")]
    InvalidId { found: ValueKind },
}

/// A named set of documents keyed by their string `_id`.
pub struct Collection {
    name: String,
    schema: RwLock<Option<CollectionSchema>>,
    documents: DashMap<String, Document>,
}

impl Collection {
    #[must_use]
    pub fn new(name: &str, schema: Option<CollectionSchema>) -> Self {
        Self {
            name: name.to_string(),
            schema: RwLock::new(schema),
            documents: DashMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a copy of the current schema, if any.
    #[must_use]
    pub fn schema(&self) -> Option<CollectionSchema> {
        self.schema.read().clone()
    }

    /// Replaces the schema. Existing documents are not re-validated.
    pub fn set_schema(&self, schema: Option<CollectionSchema>) {
        *self.schema.write() = schema;
    }

    /// Inserts `document`, returning its id.
    ///
    /// A missing `_id` is filled with a fresh UUID.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::InvalidId`] for a non-string `_id`,
    /// [`WriteError::DocumentValidation`] if the schema rejects the document,
    /// and [`WriteError::DuplicateKey`] if the id is taken.
    pub fn insert(
        &self,
        ctx: &OperationContext,
        mut document: Document,
    ) -> Result<String, WriteError> {
        let id = match document.get(ID_FIELD) {
            Some(Value::String(id)) => id.clone(),
            Some(other) => return Err(WriteError::InvalidId { found: other.kind() }),
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                id
            }
        };

        self.check_document(ctx, &document)?;

        match self.documents.entry(id.clone()) {
            Entry::Occupied(_) => Err(WriteError::DuplicateKey {
                collection: self.name.clone(),
                id,
            }),
            Entry::Vacant(slot) => {
                slot.insert(document);
                Ok(id)
            }
        }
    }

    /// Replaces the document stored under `id`. Returns `false` if none matched.
    ///
    /// The replacement is validated only when a document matched.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::DocumentValidation`] if the schema rejects the
    /// replacement.
    pub fn replace(
        &self,
        ctx: &OperationContext,
        id: &str,
        mut document: Document,
    ) -> Result<bool, WriteError> {
        let Some(mut existing) = self.documents.get_mut(id) else {
            return Ok(false);
        };

        document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        self.check_document(ctx, &document)?;
        *existing = document;
        Ok(true)
    }

    /// Returns a copy of the document stored under `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Document> {
        self.documents.get(id).map(|d| d.clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn check_document(
        &self,
        ctx: &OperationContext,
        document: &Document,
    ) -> Result<(), WriteError> {
        let schema = self.schema.read();
        let Some(schema) = schema.as_ref() else {
            return Ok(());
        };

        if is_document_validation_disabled(ctx) {
            tracing::trace!(
                collection = %self.name,
                call_id = ctx.call_id,
                "document validation skipped"
            );
            return Ok(());
        }

        match schema.validate(document) {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid { errors } => Err(WriteError::DocumentValidation {
                collection: self.name.clone(),
                errors,
            }),
        }
    }
}
