//! # vct-schema: Structural Validation
//!
//! Checks an uploaded credential against a JSON Schema of required
//! top-level fields and type constraints. The default schema is compiled
//! into the crate; a deployment may override it with a schema file.
//!
//! Validation never fails: every violation becomes a [`StructureIssue`].
//! Only loading or compiling a schema can error.

pub mod validate;

pub use validate::{SchemaLoadError, StructuralValidator, StructureCheck, StructureIssue};
