//! Profile fixture: a tracked entity with scalar fields, a nested entity,
//! a string list, and a list of tracked sub-entities.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use conform_core::{
    Clocked, Context, EntityContext, EntityId, FixedClock, Timestamp, ValidationError,
};
use conform_entity::{
    merge_list, merge_nested, merge_scalar, same_id, update_list, update_nested,
    validate_list, validate_nested, Mergeable, Metadata, Tracked, Updatable, Validatable,
};
use conform_facet::{
    bounded_string, integer_in_range, one_of, required_string, string_list, LengthBounds,
    NumericRange,
};

pub const KINDS: [&str; 2] = ["person", "organization"];

pub fn at(millis: i64) -> Timestamp {
    Timestamp::from_millis(millis).unwrap()
}

/// A merge/update context for `prefix` whose clock reads `millis`.
pub fn ctx_at(prefix: &str, millis: i64) -> EntityContext {
    EntityContext::new(prefix, Arc::new(FixedClock::new(at(millis))))
}

// ─── Norm ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Norm {
    pub meta: Metadata,
    pub attribute: Option<String>,
    pub value: Option<i64>,
}

impl Norm {
    pub fn new(id: Option<EntityId>, attribute: Option<&str>, value: Option<i64>) -> Self {
        Self {
            meta: Metadata {
                id,
                ..Metadata::default()
            },
            attribute: attribute.map(str::to_string),
            value,
        }
    }
}

impl Tracked for Norm {
    fn metadata(&self) -> Option<&Metadata> {
        Some(&self.meta)
    }

    fn set_metadata(&mut self, metadata: Metadata) {
        self.meta = metadata;
    }
}

#[async_trait]
impl<C: Context> Validatable<C> for Norm {
    async fn validate(&self, ctx: &C) -> Result<(), ValidationError> {
        required_string(ctx, "attribute", self.attribute.as_deref())?;
        integer_in_range(
            ctx,
            "value",
            self.value,
            &NumericRange::between(0.0, 100.0).nullable(),
        )?;
        Ok(())
    }
}

#[async_trait]
impl<C: Clocked> Mergeable<C> for Norm {
    async fn merge_fields(&self, source: Self, _ctx: &C) -> Result<Self, ValidationError> {
        Ok(Norm {
            meta: self.meta,
            attribute: merge_scalar(self.attribute.as_ref(), source.attribute),
            value: merge_scalar(self.value.as_ref(), source.value),
        })
    }
}

#[async_trait]
impl<C: Clocked> Updatable<C> for Norm {
    async fn update_fields(&self, source: Self, _ctx: &C) -> Result<Self, ValidationError> {
        Ok(Norm {
            meta: self.meta,
            ..source
        })
    }
}

// ─── Address ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
}

impl Address {
    pub fn in_city(city: &str) -> Self {
        Self {
            street: None,
            city: Some(city.to_string()),
        }
    }
}

impl Tracked for Address {}

#[async_trait]
impl<C: Context> Validatable<C> for Address {
    async fn validate(&self, ctx: &C) -> Result<(), ValidationError> {
        bounded_string(ctx, "city", self.city.as_deref(), &LengthBounds::between(1, 40), true)?;
        Ok(())
    }
}

#[async_trait]
impl<C: Clocked> Mergeable<C> for Address {
    async fn merge_fields(&self, source: Self, _ctx: &C) -> Result<Self, ValidationError> {
        Ok(Address {
            street: merge_scalar(self.street.as_ref(), source.street),
            city: merge_scalar(self.city.as_ref(), source.city),
        })
    }
}

#[async_trait]
impl<C: Clocked> Updatable<C> for Address {
    async fn update_fields(&self, source: Self, _ctx: &C) -> Result<Self, ValidationError> {
        Ok(source)
    }
}

// ─── Profile ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub meta: Metadata,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub tags: Option<Vec<String>>,
    pub address: Option<Address>,
    pub norms: Option<Vec<Norm>>,
}

impl Profile {
    /// A valid, already-stored profile created at t=1000.
    pub fn stored() -> Self {
        Self {
            meta: Metadata::new(EntityId::new(), at(1_000)),
            name: Some("Ada".into()),
            kind: Some("person".into()),
            tags: Some(vec!["math".into()]),
            address: Some(Address::in_city("London")),
            norms: Some(vec![
                Norm::new(Some(EntityId::new()), Some("height"), Some(70)),
                Norm::new(Some(EntityId::new()), Some("weight"), Some(60)),
            ]),
        }
    }

    /// A patch carrying only the given name.
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl Tracked for Profile {
    fn metadata(&self) -> Option<&Metadata> {
        Some(&self.meta)
    }

    fn set_metadata(&mut self, metadata: Metadata) {
        self.meta = metadata;
    }
}

#[async_trait]
impl<C: Context> Validatable<C> for Profile {
    async fn validate(&self, ctx: &C) -> Result<(), ValidationError> {
        required_string(ctx, "name", self.name.as_deref())?;
        let kind = required_string(ctx, "kind", self.kind.as_deref())?;
        one_of(ctx, "kind", kind.as_str(), &KINDS)?;
        let tags = self
            .tags
            .as_ref()
            .map(|tags| tags.iter().map(|t| Some(t.as_str())));
        string_list(ctx, "tags", tags)?;
        validate_nested(self.address.as_ref(), "address", ctx).await?;
        validate_list(self.norms.as_deref(), "norms", ctx, same_id).await
    }
}

#[async_trait]
impl<C: Clocked> Mergeable<C> for Profile {
    async fn merge_fields(&self, source: Self, ctx: &C) -> Result<Self, ValidationError> {
        let address = merge_nested(self.address.as_ref(), source.address, "address", ctx).await?;
        let norms = merge_list(self.norms.as_deref(), source.norms, "norms", ctx, same_id).await?;
        Ok(Profile {
            meta: self.meta,
            name: merge_scalar(self.name.as_ref(), source.name),
            kind: merge_scalar(self.kind.as_ref(), source.kind),
            tags: merge_scalar(self.tags.as_ref(), source.tags),
            address,
            norms,
        })
    }
}

#[async_trait]
impl<C: Clocked> Updatable<C> for Profile {
    async fn update_fields(&self, source: Self, ctx: &C) -> Result<Self, ValidationError> {
        let address = update_nested(self.address.as_ref(), source.address, "address", ctx).await?;
        let norms = update_list(self.norms.as_deref(), source.norms, "norms", ctx, same_id).await?;
        Ok(Profile {
            meta: self.meta,
            name: source.name,
            kind: source.kind,
            tags: source.tags,
            address,
            norms,
        })
    }
}
