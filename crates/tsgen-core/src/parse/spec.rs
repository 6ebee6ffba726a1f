use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::components::Components;
use super::operation::PathItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An OpenAPI 3.0 or 3.1 document. Fields the generator never reads
/// (servers, security, tags) are ignored on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiSpec {
    pub openapi: String,
    pub info: Info,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, PathItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

impl OpenApiSpec {
    /// A 3.0 document with no paths or components.
    pub fn empty(title: &str) -> Self {
        Self {
            openapi: "3.0.1".to_string(),
            info: Info {
                title: title.to_string(),
                version: "1.0.0".to_string(),
                description: None,
            },
            paths: IndexMap::new(),
            components: None,
        }
    }
}
