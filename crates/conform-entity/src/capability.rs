//! # Entity Capabilities
//!
//! The contracts a domain entity implements to take part in validation,
//! merge-patch, and replace-update.
//!
//! ## Operations
//!
//! | Capability      | Entity provides   | Framework provides                    |
//! |-----------------|-------------------|---------------------------------------|
//! | [`Validatable`] | `validate`        | —                                     |
//! | [`Mergeable`]   | `merge_fields`    | `merge`: short-circuit, stamp, check  |
//! | [`Updatable`]   | `update_fields`   | `update`: short-circuit, stamp, check |
//!
//! `merge` and `update` share one sequence:
//!
//! 1. A missing source returns the receiver itself as `Cow::Borrowed`.
//! 2. The entity combines its fields with the source's (`*_fields`).
//! 3. Identity and creation metadata come from the receiver, and the
//!    last-update timestamp is read from the context's clock.
//! 4. The combined value is validated under the *same* context, so merge
//!    and update never yield an unvalidated result.
//!
//! Neither the receiver nor the source is mutated; the result is always a
//! new value. Errors from nested calls are returned unchanged.
//!
//! The traits are generic over the context type so the same entity can be
//! validated under a plain [`PathContext`](conform_core::PathContext) and
//! merged under an [`EntityContext`](conform_core::EntityContext).

use std::borrow::Cow;

use async_trait::async_trait;
use conform_core::{Clocked, Context, EntityId, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};

/// Identity and lifecycle timestamps of a tracked entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Stable identifier, absent until the entity is first stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    /// When the entity was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    /// When the entity was last merged or updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Metadata {
    /// Metadata for an entity stored at `created_at`.
    pub fn new(id: EntityId, created_at: Timestamp) -> Self {
        Self {
            id: Some(id),
            created_at: Some(created_at),
            updated_at: Some(created_at),
        }
    }

    /// Metadata of a new version of `current`, written at `now`.
    pub fn carried_over(current: Option<&Metadata>, now: Timestamp) -> Self {
        Self {
            id: current.and_then(|m| m.id),
            created_at: current.and_then(|m| m.created_at),
            updated_at: Some(now),
        }
    }
}

/// An entity that can check its own constraints.
#[async_trait]
pub trait Validatable<C: Context>: Send + Sync {
    /// Check scalar fields, then nested entities and lists, failing at the
    /// first violation.
    async fn validate(&self, ctx: &C) -> Result<(), ValidationError>;
}

/// Access to an entity's [`Metadata`]. Untracked entities keep the defaults.
pub trait Tracked {
    /// The entity's metadata, or `None` for entities that carry none.
    fn metadata(&self) -> Option<&Metadata> {
        None
    }

    /// Replace the metadata after a merge or update. A no-op by default.
    fn set_metadata(&mut self, _metadata: Metadata) {}
}

/// Merge-patch: present source fields override, absent ones keep the current value.
#[async_trait]
pub trait Mergeable<C: Clocked>: Validatable<C> + Tracked + Clone {
    /// Combine fields. Scalars take the source's value when present; nested
    /// entities and lists recurse under child contexts.
    async fn merge_fields(&self, source: Self, ctx: &C) -> Result<Self, ValidationError>;

    /// Merge `source` into a new value. `None` returns `self` untouched.
    async fn merge<'a>(
        &'a self,
        source: Option<Self>,
        ctx: &'a C,
    ) -> Result<Cow<'a, Self>, ValidationError> {
        let Some(source) = source else {
            return Ok(Cow::Borrowed(self));
        };
        tracing::trace!(code = ctx.error_code(), "merge");
        let mut merged = self.merge_fields(source, ctx).await?;
        merged.set_metadata(Metadata::carried_over(self.metadata(), ctx.now()));
        merged.validate(ctx).await?;
        Ok(Cow::Owned(merged))
    }
}

/// Replace-update: every field is taken from the source, metadata excepted.
#[async_trait]
pub trait Updatable<C: Clocked>: Validatable<C> + Tracked + Clone {
    /// Combine fields. Scalars are replaced outright; nested entities and
    /// lists recurse under child contexts.
    async fn update_fields(&self, source: Self, ctx: &C) -> Result<Self, ValidationError>;

    /// Replace with `source`, keeping identity. `None` returns `self` untouched.
    async fn update<'a>(
        &'a self,
        source: Option<Self>,
        ctx: &'a C,
    ) -> Result<Cow<'a, Self>, ValidationError> {
        let Some(source) = source else {
            return Ok(Cow::Borrowed(self));
        };
        tracing::trace!(code = ctx.error_code(), "update");
        let mut updated = self.update_fields(source, ctx).await?;
        updated.set_metadata(Metadata::carried_over(self.metadata(), ctx.now()));
        updated.validate(ctx).await?;
        Ok(Cow::Owned(updated))
    }
}
