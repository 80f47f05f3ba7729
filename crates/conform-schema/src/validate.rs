//! # Value Validation
//!
//! Walks a parsed [`SchemaNode`] and a candidate JSON value together,
//! returning the normalized value or the first violation.
//!
//! ## Presence
//!
//! Every node sees its value as absent, `null`, or present. A blank string
//! counts as absent.
//!
//! - Absent: the default if there is one; otherwise a failure when the slot
//!   is required, or omission from the parent object when it is not.
//! - `null`: the default if there is one; otherwise accepted only by
//!   nullable, untyped, and `null`-typed nodes. Combinators hand `null` to
//!   their branches.
//! - Present: type dispatch, then `enum` membership.
//!
//! ## Ordering
//!
//! Object properties are visited in schema-declaration order, then required
//! names without a declaration, then undeclared input keys in input order.
//! Array elements are visited by index before the size and uniqueness
//! facets run. The first violation aborts the walk, so the reported code is
//! the same on every run.

use conform_core::{Context, PathContext, ValidationError};
use conform_facet::{
    check_enum, check_length, check_pattern, check_range, json_eq, render, Precision,
};
use serde_json::{Map, Value};

use crate::merge::deep_merge;
use crate::node::{Additional, ArraySchema, CombinatorKind, ObjectSchema, Scalar, SchemaNode, Shape};

/// Largest integer an IEEE double holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

// ─── Entry Points ────────────────────────────────────────────────────

/// A schema parsed and checked once, ready for repeated validation.
#[derive(Debug, Clone)]
pub struct Schema {
    prefix: String,
    root: SchemaNode,
}

impl Schema {
    /// Parse `raw`, rejecting malformed nodes at codes below `prefix`.
    pub fn compile(prefix: &str, raw: &Value) -> Result<Self, ValidationError> {
        let root = SchemaNode::parse(&PathContext::root(prefix), raw).map_err(|e| {
            tracing::debug!(code = e.code(), "schema rejected");
            e
        })?;
        tracing::debug!(prefix, root = root.type_label(), "schema compiled");
        Ok(Self {
            prefix: prefix.to_string(),
            root,
        })
    }

    /// The root prefix values are validated under.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The parsed root node.
    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    /// Validate and normalize `value` under the compile-time prefix.
    pub fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        self.validate_with(&PathContext::root(self.prefix.as_str()), value)
    }

    /// Validate and normalize `value` under a caller-supplied context.
    pub fn validate_with<C: Context>(&self, ctx: &C, value: &Value) -> Result<Value, ValidationError> {
        match resolve(&self.root, ctx, Some(value), true) {
            Ok(normalized) => Ok(normalized.unwrap_or(Value::Null)),
            Err(e) => {
                tracing::debug!(code = e.code(), message = e.message(), "value rejected");
                Err(e)
            }
        }
    }
}

/// Check that `schema` is well-formed without touching any value.
pub fn validate_schema(prefix: &str, schema: &Value) -> Result<(), ValidationError> {
    Schema::compile(prefix, schema).map(|_| ())
}

/// Validate and normalize `value` against `schema`.
///
/// Schema problems and value problems are both reported as
/// [`ValidationError`]s with codes below `prefix`.
pub fn validate_value(prefix: &str, schema: &Value, value: &Value) -> Result<Value, ValidationError> {
    Schema::compile(prefix, schema)?.validate(value)
}

// ─── Walk ────────────────────────────────────────────────────────────

fn is_blank(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.trim().is_empty())
}

/// A blank string is absent unless the node's `enum` lists `""` itself.
fn counts_as_absent(node: &SchemaNode, value: &Value) -> bool {
    let blank_listed = node
        .common
        .enumeration
        .as_ref()
        .is_some_and(|allowed| allowed.iter().any(|v| v.as_str() == Some("")));
    is_blank(value) && !blank_listed
}

fn mismatch<C: Context>(at: &C, expected: &str, value: &Value) -> ValidationError {
    at.fail(format!(
        "value {} is not of type '{expected}'",
        render(value)
    ))
}

/// Validate one slot. `Ok(None)` means the slot is absent and optional.
pub(crate) fn resolve<C: Context>(
    node: &SchemaNode,
    at: &C,
    value: Option<&Value>,
    required: bool,
) -> Result<Option<Value>, ValidationError> {
    tracing::trace!(code = at.error_code(), node = node.type_label(), "visiting");

    let Some(value) = value.filter(|v| !counts_as_absent(node, v)) else {
        if let Some(default) = &node.common.default {
            return Ok(Some(default.clone()));
        }
        if !required {
            return Ok(None);
        }
        return Err(match value {
            Some(blank) => at.fail(format!("value {} must not be blank", render(blank))),
            None => at.fail("required value is missing"),
        });
    };

    resolve_present(node, at, value).map(Some)
}

/// Validate a value that is known to be there, blank strings included.
pub(crate) fn resolve_present<C: Context>(
    node: &SchemaNode,
    at: &C,
    value: &Value,
) -> Result<Value, ValidationError> {
    if value.is_null() {
        return resolve_null(node, at);
    }

    let normalized = match &node.shape {
        Shape::Any => value.clone(),
        Shape::Scalar(scalar) => scalar_value(scalar, at, value)?,
        Shape::Object(object) => object_value(object, at, value)?,
        Shape::Array(array) => array_value(array, at, value)?,
        Shape::Combinator(kind, branches) => combine(*kind, branches, at, value)?,
    };
    if let Some(allowed) = &node.common.enumeration {
        check_enum(at, &normalized, allowed)?;
    }
    Ok(normalized)
}

fn resolve_null<C: Context>(node: &SchemaNode, at: &C) -> Result<Value, ValidationError> {
    if let Some(default) = &node.common.default {
        return Ok(default.clone());
    }
    if node.common.nullable {
        return Ok(Value::Null);
    }
    match &node.shape {
        Shape::Any | Shape::Scalar(Scalar::Null) => Ok(Value::Null),
        Shape::Combinator(kind, branches) => combine(*kind, branches, at, &Value::Null),
        _ => Err(at.fail("value 'null' is not allowed")),
    }
}

/// An integral JSON number, normalized to its integer representation.
fn as_integer(value: &Value) -> Option<(Value, f64)> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some((Value::from(i), i as f64));
    }
    if let Some(u) = n.as_u64() {
        return Some((Value::from(u), u as f64));
    }
    let f = n.as_f64()?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER)
        .then(|| (Value::from(f as i64), f))
}

fn scalar_value<C: Context>(scalar: &Scalar, at: &C, value: &Value) -> Result<Value, ValidationError> {
    match scalar {
        Scalar::Boolean => match value {
            Value::Bool(_) => Ok(value.clone()),
            _ => Err(mismatch(at, "boolean", value)),
        },
        Scalar::Null => Err(mismatch(at, "null", value)),
        Scalar::Integer(range) => {
            let (normalized, n) = as_integer(value).ok_or_else(|| mismatch(at, "integer", value))?;
            check_range(at, n, range, Precision::Exact)?;
            Ok(normalized)
        }
        Scalar::Number(range) => {
            let n = value.as_f64().ok_or_else(|| mismatch(at, "number", value))?;
            check_range(at, n, range, Precision::Tolerant)?;
            Ok(value.clone())
        }
        Scalar::String(facets) => {
            let Value::String(raw) = value else {
                return Err(mismatch(at, "string", value));
            };
            let trimmed = raw.trim();
            check_length(at, trimmed, &facets.length)?;
            if let Some(pattern) = &facets.pattern {
                check_pattern(at, trimmed, pattern)?;
            }
            if let Some(format) = &facets.format {
                format.check(at, trimmed)?;
            }
            Ok(Value::String(trimmed.to_string()))
        }
    }
}

fn object_value<C: Context>(
    schema: &ObjectSchema,
    at: &C,
    value: &Value,
) -> Result<Value, ValidationError> {
    let Value::Object(input) = value else {
        return Err(mismatch(at, "object", value));
    };
    let mut output = Map::new();

    for (name, property) in &schema.properties {
        let slot = resolve(property, &at.child(name), input.get(name), schema.is_required(name))?;
        if let Some(normalized) = slot {
            output.insert(name.clone(), normalized);
        }
    }

    for name in &schema.required {
        if schema.property(name).is_none() && !input.contains_key(name) {
            return Err(at.child(name).fail("required value is missing"));
        }
    }

    for (key, raw) in input {
        if schema.property(key).is_some() {
            continue;
        }
        match &schema.additional {
            Additional::Allow => {
                output.insert(key.clone(), raw.clone());
            }
            Additional::Deny => {
                return Err(at.child(key).fail(format!("property '{key}' is not allowed")));
            }
            Additional::Schema(node) => {
                if let Some(normalized) =
                    resolve(node, &at.child(key), Some(raw), schema.is_required(key))?
                {
                    output.insert(key.clone(), normalized);
                }
            }
        }
    }

    Ok(Value::Object(output))
}

fn array_value<C: Context>(
    schema: &ArraySchema,
    at: &C,
    value: &Value,
) -> Result<Value, ValidationError> {
    let Value::Array(elements) = value else {
        return Err(mismatch(at, "array", value));
    };

    let items: Vec<Value> = match &schema.items {
        None => elements.clone(),
        Some(node) => elements
            .iter()
            .enumerate()
            .map(|(index, element)| {
                resolve(node, &at.element(index), Some(element), true)
                    .map(|v| v.unwrap_or(Value::Null))
            })
            .collect::<Result<_, _>>()?,
    };

    let len = items.len();
    if let Some(min) = schema.min_items.filter(|min| len < *min) {
        return Err(at.fail(format!("array has {len} items, fewer than minItems {min}")));
    }
    if let Some(max) = schema.max_items.filter(|max| len > *max) {
        return Err(at.fail(format!("array has {len} items, more than maxItems {max}")));
    }
    if schema.unique_items {
        for later in 1..len {
            if items[..later].iter().any(|earlier| json_eq(earlier, &items[later])) {
                return Err(at.element(later).fail(format!(
                    "value {} duplicates an earlier item",
                    render(&items[later])
                )));
            }
        }
    }

    Ok(Value::Array(items))
}

// ─── Combinators ─────────────────────────────────────────────────────

fn no_match<C: Context>(
    at: &C,
    kind: CombinatorKind,
    value: &Value,
    cause: Option<ValidationError>,
) -> ValidationError {
    let message = format!(
        "value {} does not match any schema in {}",
        render(value),
        kind.keyword()
    );
    match cause {
        Some(cause) => ValidationError::with_cause(at.error_code(), message, cause),
        None => at.fail(message),
    }
}

/// Branches are validated at the combinator's own code, so a failure inside
/// an `allOf` branch is addressed exactly like one on a plain node.
fn combine<C: Context>(
    kind: CombinatorKind,
    branches: &[SchemaNode],
    at: &C,
    value: &Value,
) -> Result<Value, ValidationError> {
    let attempt = |branch: &SchemaNode| {
        resolve(branch, at, Some(value), true).map(|v| v.unwrap_or(Value::Null))
    };

    match kind {
        CombinatorKind::OneOf => {
            let mut matched: Vec<Value> = Vec::new();
            let mut first_error = None;
            for branch in branches {
                match attempt(branch) {
                    Ok(normalized) => matched.push(normalized),
                    Err(e) => {
                        first_error.get_or_insert(e);
                    }
                }
            }
            match matched.len() {
                0 => Err(no_match(at, kind, value, first_error)),
                1 => Ok(matched.swap_remove(0)),
                n => Err(at.fail(format!(
                    "value {} matches {n} schemas in oneOf, expected exactly one",
                    render(value)
                ))),
            }
        }
        CombinatorKind::AnyOf => {
            let mut last_error = None;
            for branch in branches {
                match attempt(branch) {
                    Ok(normalized) => return Ok(normalized),
                    Err(e) => last_error = Some(e),
                }
            }
            Err(no_match(at, kind, value, last_error))
        }
        CombinatorKind::AllOf => {
            let mut merged: Option<Value> = None;
            for branch in branches {
                let next = attempt(branch)?;
                merged = Some(match (merged, next) {
                    (Some(Value::Object(mut acc)), Value::Object(object)) => {
                        let (checked, passed) = split_passthrough(branch, object);
                        for (key, raw) in passed {
                            acc.entry(key).or_insert(raw);
                        }
                        deep_merge(&mut acc, checked);
                        Value::Object(acc)
                    }
                    (_, next) => next,
                });
            }
            Ok(merged.unwrap_or_else(|| value.clone()))
        }
    }
}

/// Split an `allOf` branch's object result into the keys the branch
/// validated and the keys it copied through untouched.
///
/// Copied keys still hold the raw input, so they only fill gaps in the
/// merged result and never replace a value another branch normalized.
fn split_passthrough(
    branch: &SchemaNode,
    object: Map<String, Value>,
) -> (Map<String, Value>, Map<String, Value>) {
    match &branch.shape {
        Shape::Object(schema) if matches!(schema.additional, Additional::Allow) => object
            .into_iter()
            .partition(|(key, _)| schema.property(key).is_some()),
        _ => (object, Map::new()),
    }
}
