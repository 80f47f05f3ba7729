//! # conform-core — Foundational Types for conform
//!
//! This crate is the leaf of the conform workspace. It defines the pieces
//! every validation and entity operation shares:
//!
//! 1. **The context contract.** [`Context`] carries the dotted/bracketed
//!    error-code prefix of the value currently being checked. Deriving a
//!    child context never mutates the parent, so the same structural
//!    location always yields the same code (`profile.norms[2].attribute`).
//!
//! 2. **One error kind.** Every failure is a [`ValidationError`]
//!    `{code, message, cause}`. There is no error subtype to match on;
//!    collaborators decide user-visible behaviour from the code and message.
//!
//! 3. **An injected clock.** Merge and update stamp metadata through the
//!    [`Clock`] carried by [`EntityContext`], never through a process-wide
//!    "now".
//!
//! ## Crate Policy
//!
//! - No dependencies on other `conform-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod context;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use context::{Clocked, Context, EntityContext, PathContext};
pub use error::{BoxError, ErrorBody, ValidationError};
pub use identity::EntityId;
pub use temporal::{Clock, FixedClock, SystemClock, Timestamp, TimestampError};
