//! # conform-entity — Validate, Merge, Update
//!
//! A capability framework for domain entities. An entity implements
//! [`Validatable`] and optionally [`Mergeable`] and [`Updatable`]; the
//! framework sequences the field-level work and guarantees the invariants
//! callers depend on:
//!
//! - A missing source is a no-op that hands back the receiver itself.
//! - Results are always validated before they are returned.
//! - Identity and creation metadata survive an update; the last-update
//!   timestamp comes from the injected clock.
//! - Receivers and sources are never mutated.
//! - The first failure anywhere aborts the call, addressed by its full path.
//!
//! ## Modules
//!
//! - [`capability`] — the traits and [`Metadata`].
//! - [`field`] — scalar and nested-entity helpers for implementations.
//! - [`reconcile`] — identity-keyed list merge, update, and validation.
//!
//! Composition is strictly sequential: fields and list elements are
//! visited in declared and positional order, never concurrently, so the
//! reported failure is the same on every run.

pub mod capability;
pub mod field;
pub mod reconcile;

pub use capability::{Mergeable, Metadata, Tracked, Updatable, Validatable};
pub use field::{merge_nested, merge_scalar, update_nested, validate_nested};
pub use reconcile::{ensure_distinct, merge_list, same_id, update_list, validate_list};
