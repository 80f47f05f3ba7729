//! Loading schema and document files.
//!
//! `.yaml` and `.yml` files are read as YAML, everything else as JSON. Both
//! end up as a `serde_json::Value`, so YAML inputs follow JSON semantics
//! from here on.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Read and parse `path` according to its extension.
pub fn load_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let value = if is_yaml(path) {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON in {}", path.display()))?
    };

    tracing::debug!(path = %path.display(), "loaded document");
    Ok(value)
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_yaml_by_extension() {
        let file = write_temp(".yml", "type: string\nminLength: 2\n");
        let value = load_document(file.path()).unwrap();
        assert_eq!(value, serde_json::json!({"type": "string", "minLength": 2}));
    }

    #[test]
    fn test_json_by_default() {
        let file = write_temp(".json", r#"{"a": [1, 2]}"#);
        let value = load_document(file.path()).unwrap();
        assert_eq!(value, serde_json::json!({"a": [1, 2]}));
    }

    #[test]
    fn test_parse_error_names_file() {
        let file = write_temp(".json", "{not json");
        let err = load_document(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse JSON"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_document(Path::new("/nonexistent/conform/doc.json")).unwrap_err();
        assert!(err.to_string().starts_with("failed to read"));
    }
}
