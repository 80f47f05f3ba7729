//! # Check-Schema and Validate Subcommands
//!
//! Both subcommands share one flow: load the inputs, run the library call
//! under the configured root prefix, and print either the normalized value
//! or the failure projected into an [`ErrorBody`].
//!
//! A rejected schema or document is not an operational error. It is
//! reported on stdout with exit code 2, while unreadable files propagate as
//! `anyhow` errors and end up as exit code 1 in `main`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use conform_core::{ErrorBody, PathContext, ValidationError};
use conform_schema::Schema;
use serde_json::Value;

use crate::document::load_document;

/// Default root prefix for schema files.
pub const SCHEMA_PREFIX: &str = "schema";

/// Default root prefix for documents, overridable with `CONFORM_PREFIX`.
pub const DOCUMENT_PREFIX: &str = "body";

/// Arguments for the `conform check-schema` subcommand.
#[derive(Args, Debug)]
pub struct CheckSchemaArgs {
    /// Schema file (JSON, or YAML by extension).
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Root prefix for error codes.
    #[arg(long, default_value = SCHEMA_PREFIX)]
    pub prefix: String,
}

/// Arguments for the `conform validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema file (JSON, or YAML by extension).
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Document to validate (JSON, or YAML by extension).
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,

    /// Root prefix for error codes.
    #[arg(long, env = "CONFORM_PREFIX", default_value = DOCUMENT_PREFIX)]
    pub prefix: String,

    /// Pretty-print JSON output.
    #[arg(long)]
    pub pretty: bool,
}

/// Runtime knobs shared by both subcommands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Root prefix every error code starts with.
    pub prefix: String,
    /// Pretty-print JSON written to stdout.
    pub pretty: bool,
}

impl ValidatorConfig {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            pretty: false,
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl From<&ValidateArgs> for ValidatorConfig {
    fn from(args: &ValidateArgs) -> Self {
        Self::new(args.prefix.as_str()).pretty(args.pretty)
    }
}

/// Result of a check, before it is written out.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Accepted. Carries the normalized document when there is one.
    Valid(Option<Value>),
    /// Rejected at the given location.
    Invalid(ErrorBody),
}

impl Outcome {
    fn rejected(error: &ValidationError, config: &ValidatorConfig) -> Self {
        Outcome::Invalid(ErrorBody::new(error, &config.prefix))
    }

    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Valid(_) => 0,
            Outcome::Invalid(_) => 2,
        }
    }

    /// Text written to stdout, if any.
    pub fn render(&self, pretty: bool) -> Result<Option<String>> {
        let rendered = match self {
            Outcome::Valid(None) => return Ok(None),
            Outcome::Valid(Some(value)) => to_json(value, pretty)?,
            Outcome::Invalid(body) => to_json(body, pretty)?,
        };
        Ok(Some(rendered))
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.context("failed to serialize output")
}

/// Check that the schema at `path` is well-formed.
pub fn check_schema(path: &Path, config: &ValidatorConfig) -> Result<Outcome> {
    let raw = load_document(path)?;
    Ok(match Schema::compile(&config.prefix, &raw) {
        Ok(_) => Outcome::Valid(None),
        Err(e) => Outcome::rejected(&e, config),
    })
}

/// Validate the document at `document` against the schema at `schema`.
///
/// A malformed schema is reported the same way as a non-conforming
/// document, under the schema prefix.
pub fn validate_document(schema: &Path, document: &Path, config: &ValidatorConfig) -> Result<Outcome> {
    let raw = load_document(schema)?;
    let compiled = match Schema::compile(SCHEMA_PREFIX, &raw) {
        Ok(compiled) => compiled,
        Err(e) => return Ok(Outcome::Invalid(ErrorBody::new(&e, SCHEMA_PREFIX))),
    };

    let value = load_document(document)?;
    let ctx = PathContext::root(config.prefix.as_str());
    Ok(match compiled.validate_with(&ctx, &value) {
        Ok(normalized) => Outcome::Valid(Some(normalized)),
        Err(e) => Outcome::rejected(&e, config),
    })
}

fn emit(outcome: &Outcome, pretty: bool) -> Result<u8> {
    if let Some(text) = outcome.render(pretty)? {
        println!("{text}");
    }
    Ok(outcome.exit_code())
}

/// Execute the check-schema subcommand.
///
/// Returns exit code: 0 when the schema is well-formed, 2 when it is not.
pub fn run_check_schema(args: &CheckSchemaArgs) -> Result<u8> {
    let config = ValidatorConfig::new(args.prefix.as_str());
    let outcome = check_schema(&args.schema, &config)?;
    match &outcome {
        Outcome::Valid(_) => println!("OK: {}", args.schema.display()),
        Outcome::Invalid(body) => tracing::info!(code = %body.code, "schema rejected"),
    }
    emit(&outcome, false)
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 with the normalized document on stdout, 2 with an
/// error body on stdout.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let config = ValidatorConfig::from(args);
    tracing::info!(
        schema = %args.schema.display(),
        document = %args.document.display(),
        prefix = %config.prefix,
        "validating document"
    );
    let outcome = validate_document(&args.schema, &args.document, &config)?;
    emit(&outcome, config.pretty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Outcome::Valid(None).exit_code(), 0);
        let body = ErrorBody {
            code: "body".into(),
            field: None,
            message: "m".into(),
        };
        assert_eq!(Outcome::Invalid(body).exit_code(), 2);
    }

    #[test]
    fn test_render_compact_and_pretty() {
        let outcome = Outcome::Valid(Some(json!({"a": 1})));
        assert_eq!(outcome.render(false).unwrap().as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(
            outcome.render(true).unwrap().as_deref(),
            Some("{\n  \"a\": 1\n}")
        );
        assert_eq!(Outcome::Valid(None).render(true).unwrap(), None);
    }

    #[test]
    fn test_config_from_args() {
        let args = ValidateArgs {
            schema: "s.json".into(),
            document: "d.json".into(),
            prefix: "request".into(),
            pretty: true,
        };
        assert_eq!(
            ValidatorConfig::from(&args),
            ValidatorConfig::new("request").pretty(true)
        );
    }
}
