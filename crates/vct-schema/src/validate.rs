//! # Structural Validator
//!
//! Wraps a compiled `jsonschema` validator. Format assertions are enabled,
//! so `issuanceDate` / `expirationDate` must be RFC 3339 date-times when
//! present.
//!
//! Each violation is reported as a [`StructureIssue`] carrying:
//!
//! - `instancePath`: JSON Pointer into the document (`""` for the root),
//! - `schemaPath`: JSON Pointer into the schema,
//! - `keyword`: the failing schema keyword (`required`, `type`, `format`),
//! - `params`: keyword details, e.g. `{"missingProperty": "issuer"}`,
//! - `message`: human-readable description.

use std::path::Path;

use jsonschema::error::ValidationErrorKind;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// The built-in credential schema.
pub const VC_SCHEMA: &str = include_str!("../schemas/verifiable-credential.schema.json");

/// Errors raised while loading or compiling a schema.
#[derive(Error, Debug)]
pub enum SchemaLoadError {
    /// The schema file could not be read.
    #[error("failed to read schema {path}: {source}")]
    Io {
        /// Path of the schema file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The schema is not valid JSON.
    #[error("failed to parse schema {path}: {reason}")]
    Parse {
        /// Path or identifier of the schema.
        path: String,
        /// Human-readable reason.
        reason: String,
    },

    /// The schema is JSON but not a valid JSON Schema.
    #[error("failed to compile schema {path}: {reason}")]
    Compile {
        /// Path or identifier of the schema.
        path: String,
        /// Human-readable reason.
        reason: String,
    },
}

/// One schema violation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureIssue {
    /// JSON Pointer to the violating value.
    pub instance_path: String,
    /// JSON Pointer to the violated schema keyword.
    pub schema_path: String,
    /// Failing keyword.
    pub keyword: String,
    /// Keyword-specific details.
    pub params: Value,
    /// Human-readable description.
    pub message: String,
}

/// Result of structural validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureCheck {
    /// True iff `issues` is empty.
    pub valid: bool,
    /// Violations in schema evaluation order.
    pub issues: Vec<StructureIssue>,
}

/// A compiled credential schema.
pub struct StructuralValidator {
    source: String,
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for StructuralValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuralValidator")
            .field("source", &self.source)
            .finish()
    }
}

impl StructuralValidator {
    /// Compile the built-in credential schema.
    pub fn new() -> Result<Self, SchemaLoadError> {
        let schema: Value =
            serde_json::from_str(VC_SCHEMA).map_err(|e| SchemaLoadError::Parse {
                path: "<embedded>".to_string(),
                reason: e.to_string(),
            })?;
        Self::from_schema(&schema, "<embedded>")
    }

    /// Compile a schema loaded from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaLoadError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| SchemaLoadError::Io {
            path: display.clone(),
            source,
        })?;
        let schema: Value =
            serde_json::from_str(&content).map_err(|e| SchemaLoadError::Parse {
                path: display.clone(),
                reason: e.to_string(),
            })?;
        Self::from_schema(&schema, &display)
    }

    /// Compile an in-memory schema. `source` names it in diagnostics.
    pub fn from_schema(schema: &Value, source: &str) -> Result<Self, SchemaLoadError> {
        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft7)
            .should_validate_formats(true)
            .build(schema)
            .map_err(|e| SchemaLoadError::Compile {
                path: source.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            source: source.to_string(),
            validator,
        })
    }

    /// Where the compiled schema came from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Validate a parsed document. Never fails; violations are returned as
    /// issues.
    pub fn validate(&self, document: &Value) -> StructureCheck {
        let issues: Vec<StructureIssue> = self
            .validator
            .iter_errors(document)
            .map(|err| {
                let schema_path = err.schema_path.to_string();
                let keyword = schema_path
                    .rsplit('/')
                    .next()
                    .unwrap_or_default()
                    .to_string();
                let params = match &err.kind {
                    ValidationErrorKind::Required { property } => {
                        json!({ "missingProperty": property })
                    }
                    ValidationErrorKind::Format { format } => json!({ "format": format }),
                    _ => json!({}),
                };
                StructureIssue {
                    instance_path: err.instance_path.to_string(),
                    schema_path,
                    keyword,
                    params,
                    message: err.to_string(),
                }
            })
            .collect();

        StructureCheck {
            valid: issues.is_empty(),
            issues,
        }
    }
}
