//! # Path Contexts
//!
//! A context is an immutable carrier of the error-code prefix for the value
//! currently being validated. Recursive validation derives a child context
//! for every field (`prefix.field`) and list element (`prefix.field[i]`), so
//! a failure raised deep in the tree already carries its fully-qualified
//! code and is returned to the root unchanged.
//!
//! ## Contexts
//!
//! - [`PathContext`] — the prefix alone. Enough for validation.
//! - [`EntityContext`] — the prefix plus an injected [`Clock`]. Merge and
//!   update need a notion of "now" to stamp metadata.
//!
//! The capability framework is generic over the [`Context`] trait and never
//! depends on a concrete context type.

use std::fmt;
use std::sync::Arc;

use crate::error::ValidationError;
use crate::temporal::{Clock, SystemClock, Timestamp};

/// The addressing contract shared by all contexts.
pub trait Context: Clone + Send + Sync {
    /// The error code of the current location.
    fn error_code(&self) -> &str;

    /// Context for the field `name` below the current location.
    fn child(&self, name: &str) -> Self;

    /// Context for element `index` of the list at the current location.
    fn element(&self, index: usize) -> Self;

    /// Context for element `index` of the list field `name`.
    fn child_element(&self, name: &str, index: usize) -> Self {
        self.child(name).element(index)
    }

    /// Build an error addressed at exactly this location.
    fn fail(&self, message: impl Into<String>) -> ValidationError {
        ValidationError::new(self.error_code(), message)
    }

    /// Build an error addressed at this location from an underlying cause.
    fn fail_with<E>(&self, cause: E) -> ValidationError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let message = cause.to_string();
        ValidationError::with_cause(self.error_code(), message, cause)
    }
}

/// A context that can tell the current time.
pub trait Clocked: Context {
    /// The current time according to the injected clock.
    fn now(&self) -> Timestamp;
}

// ─── PathContext ─────────────────────────────────────────────────────

/// A context holding only the error-code prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathContext {
    code: String,
}

impl PathContext {
    /// Start a fresh validation run rooted at `prefix`.
    pub fn root(prefix: impl Into<String>) -> Self {
        Self {
            code: prefix.into(),
        }
    }
}

impl Context for PathContext {
    fn error_code(&self) -> &str {
        &self.code
    }

    fn child(&self, name: &str) -> Self {
        if self.code.is_empty() {
            return Self::root(name);
        }
        Self {
            code: format!("{}.{}", self.code, name),
        }
    }

    fn element(&self, index: usize) -> Self {
        Self {
            code: format!("{}[{}]", self.code, index),
        }
    }
}

impl fmt::Display for PathContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

// ─── EntityContext ───────────────────────────────────────────────────

/// A context for merge and update runs: the prefix plus an injected clock.
///
/// Cloning shares the clock; deriving a child only extends the prefix.
#[derive(Debug, Clone)]
pub struct EntityContext {
    path: PathContext,
    clock: Arc<dyn Clock>,
}

impl EntityContext {
    /// Create a context rooted at `prefix` that reads time from `clock`.
    pub fn new(prefix: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: PathContext::root(prefix),
            clock,
        }
    }

    /// Create a context rooted at `prefix` backed by the system clock.
    pub fn system(prefix: impl Into<String>) -> Self {
        Self::new(prefix, Arc::new(SystemClock))
    }

    /// The addressing part of this context.
    pub fn path(&self) -> &PathContext {
        &self.path
    }

    fn with_path(&self, path: PathContext) -> Self {
        Self {
            path,
            clock: Arc::clone(&self.clock),
        }
    }
}

impl Context for EntityContext {
    fn error_code(&self) -> &str {
        self.path.error_code()
    }

    fn child(&self, name: &str) -> Self {
        self.with_path(self.path.child(name))
    }

    fn element(&self, index: usize) -> Self {
        self.with_path(self.path.element(index))
    }
}

impl Clocked for EntityContext {
    fn now(&self) -> Timestamp {
        self.clock.now()
    }
}
