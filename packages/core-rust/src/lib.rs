//! Vellum Core — document values, the shared truthiness rule, and collection schemas.

pub mod schema;
pub mod types;

pub use schema::{CollectionSchema, FieldDef, ValidationResult};
pub use types::{option_true_value, Document, Value, ValueKind};
