//! # conform-schema — Declarative Schema Validation
//!
//! Validates loosely-typed JSON values against a JSON-Schema/OpenAPI-like
//! subset and returns the normalized value, or the first violation with a
//! path-addressed code (`body.tags[1]`, `schema.oneOf[1].type`).
//!
//! ## Entry Points
//!
//! - [`validate_schema`] — is this schema well-formed?
//! - [`validate_value`] — does this value conform, and what does it
//!   normalize to?
//! - [`Schema::compile`] — parse once, validate many values.
//!
//! ## Supported Keywords
//!
//! `type` (including the `[T, "null"]` spelling), `nullable`, `enum`,
//! `default`, `properties`, `required`, `additionalProperties`, `items`,
//! `minItems`, `maxItems`, `uniqueItems`, `minLength`, `maxLength`,
//! `pattern`, `format`, `minimum`, `maximum`, `exclusiveMinimum`,
//! `exclusiveMaximum`, `multipleOf`, `oneOf`, `anyOf`, `allOf`.
//!
//! There is no `$ref` resolution. Validation does no I/O, so every entry
//! point is synchronous and can be called from async code directly.

mod merge;
pub mod node;
pub mod validate;

pub use node::{
    Additional, ArraySchema, CombinatorKind, Common, ObjectSchema, Scalar, SchemaNode, Shape,
    StringFacets,
};
pub use validate::{validate_schema, validate_value, Schema};
