//! # String and Enumeration Facets
//!
//! Presence, length bounds, full-match patterns, and allow-list membership.
//! Every string is trimmed before it is checked, and the trimmed form is the
//! normalized result.

use std::fmt;

use conform_core::{Context, ValidationError};
use regex::Regex;
use serde_json::Value;

use crate::json::{json_eq, render};

fn quoted(value: Option<&str>) -> String {
    match value {
        Some(s) => format!("'{s}'"),
        None => "'null'".to_string(),
    }
}

/// Trim `value`, mapping blank input to `None`.
pub fn normalize_string(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Require a non-blank string, failing at `ctx.child(field)`.
///
/// The message quotes the literal offending value, or `'null'`.
pub fn required_string<C: Context>(
    ctx: &C,
    field: &str,
    value: Option<&str>,
) -> Result<String, ValidationError> {
    normalize_string(value).ok_or_else(|| {
        ctx.child(field)
            .fail(format!("value {} must not be blank", quoted(value)))
    })
}

/// Trim an optional string field. Blank input is absent.
pub fn optional_string(value: Option<&str>) -> Option<String> {
    normalize_string(value)
}

// ─── Length ──────────────────────────────────────────────────────────

/// `minLength`/`maxLength` in characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LengthBounds {
    /// Minimum number of characters.
    pub min: Option<usize>,
    /// Maximum number of characters.
    pub max: Option<usize>,
}

impl LengthBounds {
    /// Inclusive character range.
    pub fn between(min: usize, max: usize) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Whether the bounds are unconstrained.
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Check the character length of an already-trimmed `value`.
pub fn check_length<C: Context>(
    at: &C,
    value: &str,
    bounds: &LengthBounds,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if let Some(min) = bounds.min {
        if len < min {
            return Err(at.fail(format!(
                "value '{value}' has length {len}, below minimum length {min}"
            )));
        }
    }
    if let Some(max) = bounds.max {
        if len > max {
            return Err(at.fail(format!(
                "value '{value}' has length {len}, above maximum length {max}"
            )));
        }
    }
    Ok(())
}

/// Validate an optional or required string with length bounds.
pub fn bounded_string<C: Context>(
    ctx: &C,
    field: &str,
    value: Option<&str>,
    bounds: &LengthBounds,
    required: bool,
) -> Result<Option<String>, ValidationError> {
    let normalized = if required {
        Some(required_string(ctx, field, value)?)
    } else {
        optional_string(value)
    };
    if let Some(s) = &normalized {
        check_length(&ctx.child(field), s, bounds)?;
    }
    Ok(normalized)
}

// ─── Pattern ─────────────────────────────────────────────────────────

/// A compiled regular expression that must match the whole value.
///
/// An empty pattern never matches anything.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Option<Regex>,
}

impl Pattern {
    /// Compile `source`, anchoring it at both ends.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = if source.is_empty() {
            None
        } else {
            Some(Regex::new(&format!("^(?:{source})$"))?)
        };
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `value` matches the pattern in full.
    pub fn is_full_match(&self, value: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(value))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Check an already-trimmed `value` against `pattern`.
pub fn check_pattern<C: Context>(
    at: &C,
    value: &str,
    pattern: &Pattern,
) -> Result<(), ValidationError> {
    if pattern.is_full_match(value) {
        Ok(())
    } else {
        Err(at.fail(format!("value '{value}' does not match pattern '{pattern}'")))
    }
}

/// Validate a string field against `pattern`.
pub fn matches_pattern<C: Context>(
    ctx: &C,
    field: &str,
    value: Option<&str>,
    pattern: &Pattern,
    required: bool,
) -> Result<Option<String>, ValidationError> {
    let normalized = if required {
        Some(required_string(ctx, field, value)?)
    } else {
        optional_string(value)
    };
    if let Some(s) = &normalized {
        check_pattern(&ctx.child(field), s, pattern)?;
    }
    Ok(normalized)
}

// ─── Enumeration ─────────────────────────────────────────────────────

fn listing<T: fmt::Display>(allowed: &[T]) -> String {
    allowed
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Require `value` to equal one of `allowed`, failing at `ctx.child(field)`.
///
/// The message lists the allowed values in their given order.
pub fn one_of<C, T>(ctx: &C, field: &str, value: T, allowed: &[T]) -> Result<T, ValidationError>
where
    C: Context,
    T: PartialEq + fmt::Display,
{
    if allowed.contains(&value) {
        Ok(value)
    } else {
        Err(ctx.child(field).fail(format!(
            "value '{value}' is not one of [{}]",
            listing(allowed)
        )))
    }
}

/// Require a JSON `value` to be a member of `allowed`.
pub fn check_enum<C: Context>(
    at: &C,
    value: &Value,
    allowed: &[Value],
) -> Result<(), ValidationError> {
    if allowed.iter().any(|candidate| json_eq(candidate, value)) {
        return Ok(());
    }
    let rendered: Vec<String> = allowed.iter().map(render).collect();
    Err(at.fail(format!(
        "value {} is not one of [{}]",
        render(value),
        rendered.join(", ")
    )))
}
