//! # Identifier Existence
//!
//! Checks that referenced identifiers exist (or, for uniqueness checks, do
//! not yet exist) by asking a lookup owned by the persistence collaborator.
//!
//! The lookup is the only suspension point in the facet layer. A lookup
//! failure is reported once as a validation failure at the identifier's
//! field path and is never retried. The failure payload is not inspected
//! beyond its display text.

use std::future::Future;

use async_trait::async_trait;
use conform_core::{Context, ValidationError};
use thiserror::Error;

use crate::text::{normalize_string, required_string};

/// A lookup reported that an identifier does not exist.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{}", .message.as_deref().unwrap_or("not found"))]
pub struct NotFoundError {
    message: Option<String>,
}

impl NotFoundError {
    /// A not-found result with the generic message.
    pub fn new() -> Self {
        Self::default()
    }

    /// A not-found result with a collaborator-supplied message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

/// Existence callback supplied by the collaborator owning persistence.
///
/// `Ok(())` means the identifier exists; `Err` means it does not.
#[async_trait]
pub trait ExistenceLookup: Send + Sync {
    /// Look up `id`.
    async fn exists(&self, id: &str) -> Result<(), NotFoundError>;
}

/// Adapter turning an async closure into an [`ExistenceLookup`].
pub struct LookupFn<F>(pub F);

#[async_trait]
impl<F, Fut> ExistenceLookup for LookupFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), NotFoundError>> + Send,
{
    async fn exists(&self, id: &str) -> Result<(), NotFoundError> {
        (self.0)(id.to_string()).await
    }
}

/// What the caller requires of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// The identifier must refer to an existing record.
    MustExist,
    /// The identifier must not be taken yet.
    MustNotExist,
}

async fn check_identifier<C, L>(
    at: &C,
    id: &str,
    lookup: &L,
    expectation: Expectation,
) -> Result<(), ValidationError>
where
    C: Context,
    L: ExistenceLookup + ?Sized,
{
    match (lookup.exists(id).await, expectation) {
        (Ok(()), Expectation::MustExist) | (Err(_), Expectation::MustNotExist) => Ok(()),
        (Err(not_found), Expectation::MustExist) => {
            tracing::debug!(code = at.error_code(), id, "identifier lookup reported not found");
            Err(at.fail_with(not_found))
        }
        (Ok(()), Expectation::MustNotExist) => {
            Err(at.fail(format!("identifier '{id}' already exists")))
        }
    }
}

/// Validate one identifier field, failing at `ctx.child(field)`.
///
/// A blank identifier is absent: `Ok(None)` unless `required`.
pub async fn identifier<C, L>(
    ctx: &C,
    field: &str,
    id: Option<&str>,
    lookup: &L,
    expectation: Expectation,
    required: bool,
) -> Result<Option<String>, ValidationError>
where
    C: Context,
    L: ExistenceLookup + ?Sized,
{
    let id = if required {
        required_string(ctx, field, id)?
    } else {
        match normalize_string(id) {
            Some(id) => id,
            None => return Ok(None),
        }
    };
    check_identifier(&ctx.child(field), &id, lookup, expectation).await?;
    Ok(Some(id))
}

/// Validate a list of identifiers, failing at `ctx.child_element(field, i)`.
///
/// Entries are checked in order: blank entries and duplicates are rejected
/// before the lookup for that entry runs.
pub async fn identifiers<C, L>(
    ctx: &C,
    field: &str,
    ids: Option<&[String]>,
    lookup: &L,
    expectation: Expectation,
) -> Result<Option<Vec<String>>, ValidationError>
where
    C: Context,
    L: ExistenceLookup + ?Sized,
{
    let Some(ids) = ids else {
        return Ok(None);
    };
    let mut seen: Vec<String> = Vec::with_capacity(ids.len());
    for (index, raw) in ids.iter().enumerate() {
        let at = ctx.child_element(field, index);
        let Some(id) = normalize_string(Some(raw)) else {
            return Err(at.fail(format!("value '{raw}' must not be blank")));
        };
        if seen.contains(&id) {
            return Err(at.fail(format!("duplicate identifier '{id}'")));
        }
        check_identifier(&at, &id, lookup, expectation).await?;
        seen.push(id);
    }
    Ok(Some(seen))
}
