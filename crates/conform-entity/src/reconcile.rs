//! # List Reconciliation
//!
//! Merges an ordered candidate list of sub-entities into the current list,
//! matching elements by a caller-supplied identity predicate.
//!
//! ## Algorithm
//!
//! - A missing candidate list means "no change": the current list is kept.
//! - Candidates are visited in order. A candidate matching a current element
//!   is merged (or updated) into it under `field[i]`, where `i` is the
//!   candidate's position. A candidate matching nothing is validated
//!   standalone under `field[i]` and taken as is.
//! - The result follows the candidate order. It is then scanned for two
//!   positions `i < j` with the same identity; the first such `j` fails.
//!
//! Current elements the candidate list does not mention are dropped. The
//! predicate only pairs elements; it never reorders or filters the result.

use conform_core::{Clocked, Context, ValidationError};

use crate::capability::{Mergeable, Tracked, Updatable, Validatable};

/// Identity predicate for tracked entities: both ids present and equal.
///
/// Elements without an id never match anything, so they are always treated
/// as new.
pub fn same_id<T: Tracked>(a: &T, b: &T) -> bool {
    let id = |t: &T| t.metadata().and_then(|m| m.id);
    matches!((id(a), id(b)), (Some(x), Some(y)) if x == y)
}

/// Fail at `field[j]` for the first `j` whose element shares an identity
/// with an earlier one.
pub fn ensure_distinct<T, C, F>(
    items: &[T],
    field: &str,
    ctx: &C,
    same: F,
) -> Result<(), ValidationError>
where
    C: Context,
    F: Fn(&T, &T) -> bool,
{
    for later in 1..items.len() {
        if let Some(earlier) = items[..later]
            .iter()
            .position(|earlier| same(earlier, &items[later]))
        {
            let at = ctx.child_element(field, later);
            tracing::debug!(code = at.error_code(), earlier, "duplicate list identity");
            return Err(at.fail(format!(
                "entry {later} has the same identity as entry {earlier}"
            )));
        }
    }
    Ok(())
}

/// Validate every element at `field[i]`, then reject duplicate identities.
pub async fn validate_list<T, C, F>(
    items: Option<&[T]>,
    field: &str,
    ctx: &C,
    same: F,
) -> Result<(), ValidationError>
where
    T: Validatable<C>,
    C: Context,
    F: Fn(&T, &T) -> bool + Send + Sync,
{
    let Some(items) = items else {
        return Ok(());
    };
    for (index, item) in items.iter().enumerate() {
        item.validate(&ctx.child_element(field, index)).await?;
    }
    ensure_distinct(items, field, ctx, same)
}

fn find_match<'a, T, F>(current: &'a [T], candidate: &T, same: &F) -> Option<&'a T>
where
    F: Fn(&T, &T) -> bool,
{
    current.iter().find(|existing| same(existing, candidate))
}

/// Reconcile `candidate` into `current` with merge-patch semantics.
pub async fn merge_list<T, C, F>(
    current: Option<&[T]>,
    candidate: Option<Vec<T>>,
    field: &str,
    ctx: &C,
    same: F,
) -> Result<Option<Vec<T>>, ValidationError>
where
    T: Mergeable<C>,
    C: Clocked,
    F: Fn(&T, &T) -> bool + Send + Sync,
{
    let Some(candidate) = candidate else {
        return Ok(current.map(<[T]>::to_vec));
    };
    let current = current.unwrap_or_default();

    let mut result = Vec::with_capacity(candidate.len());
    for (index, element) in candidate.into_iter().enumerate() {
        let at = ctx.child_element(field, index);
        let reconciled = match find_match(current, &element, &same) {
            Some(existing) => existing.merge(Some(element), &at).await?.into_owned(),
            None => {
                element.validate(&at).await?;
                element
            }
        };
        result.push(reconciled);
    }

    ensure_distinct(&result, field, ctx, &same)?;
    Ok(Some(result))
}

/// Reconcile `candidate` into `current` with replace-update semantics.
pub async fn update_list<T, C, F>(
    current: Option<&[T]>,
    candidate: Option<Vec<T>>,
    field: &str,
    ctx: &C,
    same: F,
) -> Result<Option<Vec<T>>, ValidationError>
where
    T: Updatable<C>,
    C: Clocked,
    F: Fn(&T, &T) -> bool + Send + Sync,
{
    let Some(candidate) = candidate else {
        return Ok(current.map(<[T]>::to_vec));
    };
    let current = current.unwrap_or_default();

    let mut result = Vec::with_capacity(candidate.len());
    for (index, element) in candidate.into_iter().enumerate() {
        let at = ctx.child_element(field, index);
        let reconciled = match find_match(current, &element, &same) {
            Some(existing) => existing.update(Some(element), &at).await?.into_owned(),
            None => {
                element.validate(&at).await?;
                element
            }
        };
        result.push(reconciled);
    }

    ensure_distinct(&result, field, ctx, &same)?;
    Ok(Some(result))
}
