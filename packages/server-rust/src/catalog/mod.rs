//! Collections, their schemas, and the document validation bypass switch.
//!
//! - [`document_validation`]: per-operation switch and its scope guard
//! - [`collection`]: in-memory collection whose writes honor the switch
//! - [`Catalog`]: name -> collection lookup

pub mod collection;
pub mod document_validation;

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use vellum_core::CollectionSchema;

pub use collection::{Collection, WriteError, ID_FIELD};
pub use document_validation::{
    is_document_validation_disabled, set_document_validation_disabled,
    should_bypass_document_validation, DisableDocumentValidation, DocumentValidationDisabled,
    BYPASS_DOCUMENT_VALIDATION_OPTION,
};

/// Registry of collections by name.
pub struct Catalog {
    collections: DashMap<String, Arc<Collection>>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: DashMap::new(),
        }
    }

    /// Returns the collection `name`, creating it if needed.
    ///
    /// When `schema` is `Some`, it replaces the schema of an existing collection.
    pub fn create_collection(
        &self,
        name: &str,
        schema: Option<CollectionSchema>,
    ) -> Arc<Collection> {
        match self.collections.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                let existing = entry.get().clone();
                if schema.is_some() {
                    existing.set_schema(schema);
                }
                existing
            }
            Entry::Vacant(slot) => slot
                .insert(Arc::new(Collection::new(name, schema)))
                .value()
                .clone(),
        }
    }

    /// Retrieve a collection by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Collection>> {
        self.collections.get(name).map(|entry| entry.value().clone())
    }

    /// Names of all collections, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
