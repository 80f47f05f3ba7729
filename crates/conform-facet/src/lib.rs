//! # conform-facet — Single-Value Facet Validators
//!
//! Pure functions that check one value against one constraint facet and
//! return the normalized value. They know nothing about the surrounding
//! schema or entity tree; recursion is the caller's business.
//!
//! ## Two Layers
//!
//! - **Field-level** functions (`required_string`, `integer_in_range`,
//!   `string_list`, ...) take the *parent* context and a field name and fail
//!   at `ctx.child(field)` (or `ctx.child_element(field, i)` for list
//!   entries). Entity implementations call these.
//! - **Node-level** `check_*` functions take the context of the value itself.
//!   The schema validator calls these, since it has already derived the
//!   context of the node it is visiting.
//!
//! ## Normalization Rules
//!
//! - Strings are trimmed before any check.
//! - Blank-after-trim is treated as absent, unless the caller marks the
//!   field as required, in which case it fails with the literal value.
//! - Numeric bounds on non-integers tolerate [`NUMERIC_EPSILON`].

pub mod existence;
pub mod format;
pub mod json;
pub mod list;
pub mod number;
pub mod text;

pub use existence::{identifier, identifiers, ExistenceLookup, Expectation, LookupFn, NotFoundError};
pub use format::{date_time, email, formatted, locale, telephone, url, DateTimeFormat, Format};
pub use json::{json_eq, render, type_name};
pub use list::string_list;
pub use number::{
    check_range, format_number, integer_in_range, number_in_range, timestamp, Bound, NumericRange,
    Precision, NUMERIC_EPSILON,
};
pub use text::{
    bounded_string, check_enum, check_length, check_pattern, matches_pattern, normalize_string,
    one_of, optional_string, required_string, LengthBounds, Pattern,
};
