//! # conform-cli — Command-Line Front End
//!
//! Provides the `conform` binary, a thin layer of file I/O over
//! `conform-schema`. Everything interesting happens in the library crates;
//! this crate loads files, picks the root prefix, and turns results into
//! exit codes and JSON on stdout.
//!
//! ## Subcommands
//!
//! - `conform check-schema` — report whether a schema file is well-formed.
//! - `conform validate` — validate a document against a schema and print
//!   the normalized document.
//!
//! ```bash
//! conform check-schema profile.schema.yaml
//! conform validate profile.schema.yaml profile.json --prefix body --pretty
//! ```
//!
//! ## Exit Codes
//!
//! | Code | Meaning                                   |
//! |------|-------------------------------------------|
//! | 0    | Valid; normalized output on stdout        |
//! | 1    | I/O or parse error, logged to stderr      |
//! | 2    | Validation failure; `ErrorBody` on stdout |

pub mod document;
pub mod validate;

pub use document::load_document;
pub use validate::{Outcome, ValidatorConfig};
