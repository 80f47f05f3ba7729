//! # Numeric Facets
//!
//! Range (`minimum`/`maximum`, each optionally exclusive), `multipleOf`, and
//! epoch-millisecond timestamps.
//!
//! Integer checks are exact. Number checks treat values within
//! [`NUMERIC_EPSILON`] of a bound as equal to it, so `0.30000000000000004`
//! satisfies `maximum: 0.3`. The tolerance is a fixed relaxation kept as a
//! named constant rather than derived from the operands.

use conform_core::{Context, Timestamp, ValidationError};

/// Slack applied to non-integer bound and `multipleOf` comparisons.
pub const NUMERIC_EPSILON: f64 = 1e-5;

/// How strictly a value is compared against its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// No slack. Used for integers.
    Exact,
    /// Values within [`NUMERIC_EPSILON`] of a bound count as equal to it.
    Tolerant,
}

impl Precision {
    fn epsilon(self) -> f64 {
        match self {
            Precision::Exact => 0.0,
            Precision::Tolerant => NUMERIC_EPSILON,
        }
    }
}

/// One end of a numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    /// The limit value.
    pub limit: f64,
    /// Whether the limit itself is excluded.
    pub exclusive: bool,
}

impl Bound {
    /// A bound that admits `limit`.
    pub fn inclusive(limit: f64) -> Self {
        Self {
            limit,
            exclusive: false,
        }
    }

    /// A bound that excludes `limit`.
    pub fn exclusive(limit: f64) -> Self {
        Self {
            limit,
            exclusive: true,
        }
    }
}

/// Constraint parameters for a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumericRange {
    /// Lower bound.
    pub min: Option<Bound>,
    /// Upper bound.
    pub max: Option<Bound>,
    /// Required step, strictly positive.
    pub multiple_of: Option<f64>,
    /// Whether a missing value is acceptable.
    pub nullable: bool,
}

impl NumericRange {
    /// Unconstrained, non-nullable range.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inclusive `[min, max]`.
    pub fn between(min: f64, max: f64) -> Self {
        Self::new().min(Bound::inclusive(min)).max(Bound::inclusive(max))
    }

    /// Set the lower bound.
    pub fn min(mut self, bound: Bound) -> Self {
        self.min = Some(bound);
        self
    }

    /// Set the upper bound.
    pub fn max(mut self, bound: Bound) -> Self {
        self.max = Some(bound);
        self
    }

    /// Require the value to be a multiple of `step`.
    pub fn step(mut self, step: f64) -> Self {
        self.multiple_of = Some(step);
        self
    }

    /// Accept a missing value.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Whether any value can satisfy both bounds.
    ///
    /// `minimum: 5, maximum: 3` can never be met, nor can `minimum: 3,
    /// maximum: 3` once either end is exclusive.
    pub fn is_satisfiable(&self) -> bool {
        match (self.min, self.max) {
            (Some(lo), Some(hi)) => {
                lo.limit < hi.limit || (lo.limit == hi.limit && !lo.exclusive && !hi.exclusive)
            }
            _ => true,
        }
    }
}

/// Render a number in locale-independent form, dropping a zero fraction.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Check `value` against `range` at an already-derived context.
///
/// Nullability is the caller's concern; this only sees present values.
pub fn check_range<C: Context>(
    at: &C,
    value: f64,
    range: &NumericRange,
    precision: Precision,
) -> Result<(), ValidationError> {
    let eps = precision.epsilon();
    let shown = format_number(value);

    if let Some(lo) = range.min {
        let limit = format_number(lo.limit);
        if lo.exclusive && value <= lo.limit + eps {
            return Err(at.fail(format!("value {shown} must be greater than {limit}")));
        }
        if !lo.exclusive && value < lo.limit - eps {
            return Err(at.fail(format!("value {shown} is less than minimum {limit}")));
        }
    }

    if let Some(hi) = range.max {
        let limit = format_number(hi.limit);
        if hi.exclusive && value >= hi.limit - eps {
            return Err(at.fail(format!("value {shown} must be less than {limit}")));
        }
        if !hi.exclusive && value > hi.limit + eps {
            return Err(at.fail(format!("value {shown} exceeds maximum {limit}")));
        }
    }

    if let Some(step) = range.multiple_of {
        let quotient = value / step;
        if (quotient - quotient.round()).abs() > eps {
            return Err(at.fail(format!(
                "value {shown} is not a multiple of {}",
                format_number(step)
            )));
        }
    }

    Ok(())
}

fn missing<C: Context>(at: &C) -> ValidationError {
    at.fail("value 'null' is not allowed")
}

/// Validate an integer field, failing at `ctx.child(field)`.
pub fn integer_in_range<C: Context>(
    ctx: &C,
    field: &str,
    value: Option<i64>,
    range: &NumericRange,
) -> Result<Option<i64>, ValidationError> {
    let at = ctx.child(field);
    match value {
        None if range.nullable => Ok(None),
        None => Err(missing(&at)),
        Some(v) => {
            check_range(&at, v as f64, range, Precision::Exact)?;
            Ok(Some(v))
        }
    }
}

/// Validate a floating-point field, failing at `ctx.child(field)`.
pub fn number_in_range<C: Context>(
    ctx: &C,
    field: &str,
    value: Option<f64>,
    range: &NumericRange,
) -> Result<Option<f64>, ValidationError> {
    let at = ctx.child(field);
    match value {
        None if range.nullable => Ok(None),
        None => Err(missing(&at)),
        Some(v) if !v.is_finite() => Err(at.fail(format!("value {v} is not a finite number"))),
        Some(v) => {
            check_range(&at, v, range, Precision::Tolerant)?;
            Ok(Some(v))
        }
    }
}

/// Validate an epoch-millisecond timestamp field.
pub fn timestamp<C: Context>(
    ctx: &C,
    field: &str,
    value: Option<i64>,
    nullable: bool,
) -> Result<Option<Timestamp>, ValidationError> {
    let at = ctx.child(field);
    match value {
        None if nullable => Ok(None),
        None => Err(missing(&at)),
        Some(millis) => Timestamp::from_millis(millis).map(Some).map_err(|e| at.fail_with(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conform_core::PathContext;

    fn ctx() -> PathContext {
        PathContext::root("norm")
    }

    #[test]
    fn test_inclusive_bounds_accept_endpoints() {
        let range = NumericRange::between(0.0, 10.0);
        assert_eq!(integer_in_range(&ctx(), "value", Some(0), &range).unwrap(), Some(0));
        assert_eq!(integer_in_range(&ctx(), "value", Some(10), &range).unwrap(), Some(10));
    }

    #[test]
    fn test_exclusive_minimum_rejects_endpoint() {
        let range = NumericRange::new()
            .min(Bound::exclusive(0.0))
            .max(Bound::inclusive(10.0));
        let err = integer_in_range(&ctx(), "value", Some(0), &range).unwrap_err();
        assert_eq!(err.code(), "norm.value");
        assert!(err.message().contains('0'));
        assert!(integer_in_range(&ctx(), "value", Some(1), &range).is_ok());
    }

    #[test]
    fn test_message_contains_value_and_bound() {
        let range = NumericRange::between(0.0, 10.0);
        let err = integer_in_range(&ctx(), "value", Some(11), &range).unwrap_err();
        assert_eq!(err.message(), "value 11 exceeds maximum 10");
    }

    #[test]
    fn test_integers_have_no_epsilon() {
        let at = ctx();
        let range = NumericRange::new().min(Bound::inclusive(1.0));
        assert!(check_range(&at, 0.999_999, &range, Precision::Exact).is_err());
    }

    #[test]
    fn test_numbers_tolerate_epsilon() {
        let range = NumericRange::between(0.0, 0.3);
        assert!(number_in_range(&ctx(), "ratio", Some(0.1 + 0.2), &range).is_ok());
        assert!(number_in_range(&ctx(), "ratio", Some(0.300_001), &range).is_ok());
        assert!(number_in_range(&ctx(), "ratio", Some(0.31), &range).is_err());
    }

    #[test]
    fn test_multiple_of_tolerant() {
        let range = NumericRange::new().step(0.1);
        assert!(number_in_range(&ctx(), "step", Some(0.3), &range).is_ok());
        let err = number_in_range(&ctx(), "step", Some(0.35), &range).unwrap_err();
        assert_eq!(err.message(), "value 0.35 is not a multiple of 0.1");
    }

    #[test]
    fn test_null_requires_nullable() {
        let range = NumericRange::new();
        let err = integer_in_range(&ctx(), "value", None, &range).unwrap_err();
        assert!(err.message().contains("'null'"));
        assert_eq!(integer_in_range(&ctx(), "value", None, &range.nullable()).unwrap(), None);
    }

    #[test]
    fn test_non_finite_rejected() {
        let range = NumericRange::new();
        assert!(number_in_range(&ctx(), "ratio", Some(f64::NAN), &range).is_err());
    }

    #[test]
    fn test_satisfiability() {
        assert!(NumericRange::between(0.0, 10.0).is_satisfiable());
        assert!(NumericRange::between(3.0, 3.0).is_satisfiable());
        assert!(!NumericRange::between(5.0, 3.0).is_satisfiable());
        let empty = NumericRange::new()
            .min(Bound::exclusive(3.0))
            .max(Bound::inclusive(3.0));
        assert!(!empty.is_satisfiable());
    }

    #[test]
    fn test_format_number_is_locale_independent() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(-2.5), "-2.5");
        assert_eq!(format_number(1234567.0), "1234567");
    }

    #[test]
    fn test_timestamp_rejects_negative() {
        let err = timestamp(&ctx(), "createdAt", Some(-1), false).unwrap_err();
        assert_eq!(err.code(), "norm.createdAt");
        assert!(err.message().contains("-1"));
    }

    #[test]
    fn test_timestamp_nullable() {
        assert_eq!(timestamp(&ctx(), "createdAt", None, true).unwrap(), None);
        assert!(timestamp(&ctx(), "createdAt", None, false).is_err());
        let ts = timestamp(&ctx(), "createdAt", Some(0), false).unwrap().unwrap();
        assert_eq!(ts.epoch_millis(), 0);
    }
}
