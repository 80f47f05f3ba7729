//! # Typed String Formats
//!
//! Email, URL, locale tag, telephone number, and date/time. Every format
//! follows the same shape: blank input is absent (`Ok(None)`) unless the
//! field is required, the value is trimmed, and a failure is addressed at
//! the field's own code.
//!
//! The schema validator reaches these through the `format` keyword via
//! [`Format::from_keyword`]; unknown keywords are not validated.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use conform_core::{Context, ValidationError};
use regex::Regex;

use crate::text::{normalize_string, required_string};

const EMAIL: &str = r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$";
const LOCALE: &str = r"^[A-Za-z]{2,3}(?:[-_][A-Za-z]{4})?(?:[-_](?:[A-Za-z]{2}|[0-9]{3}))?$";

/// Shortest and longest digit counts accepted for a telephone number.
const PHONE_MIN_DIGITS: usize = 6;
const PHONE_MAX_DIGITS: usize = 15;

type Compiled = Result<Regex, regex::Error>;

fn email_regex() -> &'static Compiled {
    static RE: OnceLock<Compiled> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL))
}

fn locale_regex() -> &'static Compiled {
    static RE: OnceLock<Compiled> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LOCALE))
}

fn matches<C: Context>(at: &C, compiled: &Compiled, value: &str) -> Result<bool, ValidationError> {
    match compiled {
        Ok(re) => Ok(re.is_match(value)),
        Err(e) => Err(at.fail_with(e.clone())),
    }
}

/// How a date/time string is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateTimeFormat {
    /// ISO 8601 calendar date, `YYYY-MM-DD`.
    Date,
    /// RFC 3339 date-time with offset.
    Rfc3339,
    /// A chrono `strftime` pattern, tried as date-time and then as date.
    Pattern(String),
}

impl DateTimeFormat {
    fn accepts(&self, value: &str) -> bool {
        match self {
            DateTimeFormat::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
            DateTimeFormat::Rfc3339 => DateTime::parse_from_rfc3339(value).is_ok(),
            DateTimeFormat::Pattern(p) => {
                NaiveDateTime::parse_from_str(value, p).is_ok()
                    || NaiveDate::parse_from_str(value, p).is_ok()
            }
        }
    }

    fn describe(&self) -> &str {
        match self {
            DateTimeFormat::Date => "YYYY-MM-DD",
            DateTimeFormat::Rfc3339 => "RFC 3339",
            DateTimeFormat::Pattern(p) => p,
        }
    }
}

/// A typed string format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Format {
    /// An email address with a dotted domain.
    Email,
    /// An absolute URL with a host.
    Url,
    /// A locale tag such as `en`, `en-US`, `zh_Hant_TW`, or `es-419`.
    Locale,
    /// A telephone number, international (`+...`) or national within `region`.
    Telephone {
        /// ISO 3166 alpha-2 region for numbers without a leading `+`.
        region: Option<String>,
    },
    /// A date or date-time.
    DateTime(DateTimeFormat),
}

impl Format {
    /// Map a schema `format` keyword to a format, if it is one we validate.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "email" => Some(Format::Email),
            "uri" | "url" => Some(Format::Url),
            "locale" => Some(Format::Locale),
            "telephone" | "phone" => Some(Format::Telephone { region: None }),
            "date" => Some(Format::DateTime(DateTimeFormat::Date)),
            "date-time" => Some(Format::DateTime(DateTimeFormat::Rfc3339)),
            _ => None,
        }
    }

    /// Check an already-trimmed `value` at an already-derived context.
    pub fn check<C: Context>(&self, at: &C, value: &str) -> Result<(), ValidationError> {
        let valid = match self {
            Format::Email => matches(at, email_regex(), value)?,
            Format::Url => url::Url::parse(value).is_ok_and(|u| u.has_host()),
            Format::Locale => matches(at, locale_regex(), value)?,
            Format::Telephone { region } => return check_telephone(at, value, region.as_deref()),
            Format::DateTime(fmt) => {
                if fmt.accepts(value) {
                    true
                } else {
                    return Err(at.fail(format!(
                        "value '{value}' is not a valid date/time ({})",
                        fmt.describe()
                    )));
                }
            }
        };
        if valid {
            Ok(())
        } else {
            Err(at.fail(format!("value '{value}' is not a valid {}", self.name())))
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Format::Email => "email address",
            Format::Url => "URL",
            Format::Locale => "locale",
            Format::Telephone { .. } => "telephone number",
            Format::DateTime(_) => "date/time",
        }
    }
}

fn check_telephone<C: Context>(
    at: &C,
    value: &str,
    region: Option<&str>,
) -> Result<(), ValidationError> {
    let (international, rest) = match value.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, value),
    };
    let mut digits = 0usize;
    for c in rest.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' | '(' | ')' | '.' => {}
            _ => {
                return Err(at.fail(format!(
                    "value '{value}' is not a valid telephone number"
                )))
            }
        }
    }
    if !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits) {
        return Err(at.fail(format!(
            "value '{value}' has {digits} digits, expected {PHONE_MIN_DIGITS} to {PHONE_MAX_DIGITS}"
        )));
    }
    if international {
        return Ok(());
    }
    match region {
        Some(r) if r.len() == 2 && r.chars().all(|c| c.is_ascii_alphabetic()) => Ok(()),
        Some(r) => Err(at.fail(format!("region '{r}' is not an ISO 3166 alpha-2 code"))),
        None => Err(at.fail(format!(
            "value '{value}' must be in international format (+<country code>...)"
        ))),
    }
}

/// Validate a string field against `format`.
pub fn formatted<C: Context>(
    ctx: &C,
    field: &str,
    value: Option<&str>,
    format: &Format,
    required: bool,
) -> Result<Option<String>, ValidationError> {
    let normalized = if required {
        Some(required_string(ctx, field, value)?)
    } else {
        normalize_string(value)
    };
    if let Some(s) = &normalized {
        format.check(&ctx.child(field), s)?;
    }
    Ok(normalized)
}

/// Validate an email field.
pub fn email<C: Context>(
    ctx: &C,
    field: &str,
    value: Option<&str>,
    required: bool,
) -> Result<Option<String>, ValidationError> {
    formatted(ctx, field, value, &Format::Email, required)
}

/// Validate a URL field.
pub fn url<C: Context>(
    ctx: &C,
    field: &str,
    value: Option<&str>,
    required: bool,
) -> Result<Option<String>, ValidationError> {
    formatted(ctx, field, value, &Format::Url, required)
}

/// Validate a locale tag field.
pub fn locale<C: Context>(
    ctx: &C,
    field: &str,
    value: Option<&str>,
    required: bool,
) -> Result<Option<String>, ValidationError> {
    formatted(ctx, field, value, &Format::Locale, required)
}

/// Validate a telephone field, optionally within `region`.
pub fn telephone<C: Context>(
    ctx: &C,
    field: &str,
    value: Option<&str>,
    region: Option<&str>,
    required: bool,
) -> Result<Option<String>, ValidationError> {
    let format = Format::Telephone {
        region: region.map(str::to_string),
    };
    formatted(ctx, field, value, &format, required)
}

/// Validate a date/time field with the given parser.
pub fn date_time<C: Context>(
    ctx: &C,
    field: &str,
    value: Option<&str>,
    format: DateTimeFormat,
    required: bool,
) -> Result<Option<String>, ValidationError> {
    formatted(ctx, field, value, &Format::DateTime(format), required)
}
