//! Field-level building blocks for `validate`, `merge_fields`, and
//! `update_fields` implementations.
//!
//! Nested entities are visited under `ctx.child(field)`, so a failure inside
//! them is already addressed relative to the root when it comes back.

use conform_core::{Clocked, Context, ValidationError};

use crate::capability::{Mergeable, Updatable, Validatable};

/// Merge-patch rule for a scalar: the source's value if present, else the current one.
pub fn merge_scalar<T: Clone>(current: Option<&T>, source: Option<T>) -> Option<T> {
    source.or_else(|| current.cloned())
}

/// Validate an optional nested entity at `ctx.child(field)`.
pub async fn validate_nested<T, C>(
    value: Option<&T>,
    field: &str,
    ctx: &C,
) -> Result<(), ValidationError>
where
    T: Validatable<C>,
    C: Context,
{
    match value {
        Some(value) => value.validate(&ctx.child(field)).await,
        None => Ok(()),
    }
}

/// Merge an optional nested entity at `ctx.child(field)`.
///
/// With no current value the source is validated standalone and taken as is.
pub async fn merge_nested<T, C>(
    current: Option<&T>,
    source: Option<T>,
    field: &str,
    ctx: &C,
) -> Result<Option<T>, ValidationError>
where
    T: Mergeable<C>,
    C: Clocked,
{
    let at = ctx.child(field);
    match (current, source) {
        (Some(current), source) => Ok(Some(current.merge(source, &at).await?.into_owned())),
        (None, Some(source)) => {
            source.validate(&at).await?;
            Ok(Some(source))
        }
        (None, None) => Ok(None),
    }
}

/// Replace an optional nested entity at `ctx.child(field)`.
///
/// An absent source clears the field.
pub async fn update_nested<T, C>(
    current: Option<&T>,
    source: Option<T>,
    field: &str,
    ctx: &C,
) -> Result<Option<T>, ValidationError>
where
    T: Updatable<C>,
    C: Clocked,
{
    let at = ctx.child(field);
    match (current, source) {
        (_, None) => Ok(None),
        (Some(current), Some(source)) => {
            Ok(Some(current.update(Some(source), &at).await?.into_owned()))
        }
        (None, Some(source)) => {
            source.validate(&at).await?;
            Ok(Some(source))
        }
    }
}
