pub mod components;
pub mod external;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod ref_resolve;
pub mod reference;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod spec;

use crate::error::ParseError;
use spec::OpenApiSpec;

/// Parse an OpenAPI spec from YAML.
pub fn from_yaml(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_yaml_ng::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Parse an OpenAPI spec from JSON.
pub fn from_json(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_json::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Parse a spec whose format is not known up front: JSON when the text
/// starts with `{`, YAML otherwise.
pub fn from_text(input: &str) -> Result<OpenApiSpec, ParseError> {
    if input.trim_start().starts_with('{') {
        from_json(input)
    } else {
        from_yaml(input)
    }
}

/// Build a spec from an already parsed JSON value.
pub fn from_value(value: serde_json::Value) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_json::from_value(value)?;
    validate_version(&spec)?;
    Ok(spec)
}

fn validate_version(spec: &OpenApiSpec) -> Result<(), ParseError> {
    if !spec.openapi.starts_with("3.") {
        return Err(ParseError::UnsupportedVersion(spec.openapi.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_detects_json() {
        let spec = from_text(r#"{"openapi": "3.0.1", "info": {"title": "T", "version": "1"}}"#)
            .unwrap();
        assert_eq!(spec.info.title, "T");
    }

    #[test]
    fn test_from_text_yaml() {
        let spec = from_text("openapi: 3.1.0\ninfo:\n  title: Y\n  version: '1'\n").unwrap();
        assert_eq!(spec.openapi, "3.1.0");
    }

    #[test]
    fn test_rejects_swagger_2() {
        let err = from_yaml("openapi: '2.0'\ninfo:\n  title: T\n  version: '1'\n").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedVersion(v) if v == "2.0"));
    }
}
