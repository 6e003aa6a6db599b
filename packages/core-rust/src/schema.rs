use serde::{Deserialize, Serialize};

use crate::types::{Document, ValueKind};

/// Shape definition for the documents of one collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Schema version for migrations and compatibility checks.
    pub version: u32,
    /// Field definitions that comprise this collection's schema.
    pub fields: Vec<FieldDef>,
}

/// Single field definition within a schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    /// Name of the field.
    pub name: String,
    /// Whether the field must be present in every document.
    pub required: bool,
    /// Expected kind of the field's value, if constrained.
    pub kind: Option<ValueKind>,
}

impl FieldDef {
    /// A required field of the given kind.
    #[must_use]
    pub fn required(name: &str, kind: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            required: true,
            kind: Some(kind),
        }
    }

    /// An optional field of the given kind.
    #[must_use]
    pub fn optional(name: &str, kind: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            required: false,
            kind: Some(kind),
        }
    }
}

/// Result of validating a document against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// The document conforms to the schema.
    Valid,
    /// The document violates one or more schema constraints.
    Invalid {
        /// Human-readable descriptions of each validation failure.
        errors: Vec<String>,
    },
}

impl ValidationResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

impl CollectionSchema {
    /// Checks `document` against every field definition.
    ///
    /// Collects all failures in schema order rather than stopping at the
    /// first one. Fields not named by the schema are ignored.
    #[must_use]
    pub fn validate(&self, document: &Document) -> ValidationResult {
        let mut errors = Vec::new();

        for field in &self.fields {
            match document.get(&field.name) {
                None if field.required => {
                    errors.push(format!("missing required field '{}'", field.name));
                }
                None => {}
                Some(value) => {
                    if let Some(expected) = field.kind {
                        let actual = value.kind();
                        if actual != expected {
                            errors.push(format!(
                                "field '{}' expected {expected:?}, found {actual:?}",
                                field.name
                            ));
                        }
                    }
                }
            }
        }

        if errors.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid { errors }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::Value;

    fn user_schema() -> CollectionSchema {
        CollectionSchema {
            version: 1,
            fields: vec![
                FieldDef::required("name", ValueKind::String),
                FieldDef::optional("age", ValueKind::Int),
            ],
        }
    }

    fn doc(json: serde_json::Value) -> Document {
        Value::from(json).into_document().unwrap()
    }

    #[test]
    fn conforming_document_is_valid() {
        let result = user_schema().validate(&doc(json!({ "name": "ada", "age": 36 })));
        assert!(result.is_valid());
    }

    #[test]
    fn optional_field_may_be_absent() {
        let result = user_schema().validate(&doc(json!({ "name": "ada", "extra": true })));
        assert_eq!(result, ValidationResult::Valid);
    }

    #[test]
    fn reports_every_failure_in_schema_order() {
        let result = user_schema().validate(&doc(json!({ "age": "old" })));
        let ValidationResult::Invalid { errors } = result else {
            panic!("expected invalid");
        };
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("missing required field 'name'"));
        assert!(errors[1].contains("'age'"));
    }
}
