use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::schema::SchemaOrRef;

/// A media type entry of a request or response. Only the schema is read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,
}

/// The payload schema of a content map: `application/json` when declared,
/// else the first entry.
pub fn payload_schema(content: &IndexMap<String, MediaType>) -> Option<&SchemaOrRef> {
    content
        .get("application/json")
        .or_else(|| content.values().next())
        .and_then(|mt| mt.schema.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_wins_over_declaration_order() {
        let mut content = IndexMap::new();
        content.insert(
            "text/plain".to_string(),
            MediaType {
                schema: Some(SchemaOrRef::component("Text")),
            },
        );
        content.insert(
            "application/json".to_string(),
            MediaType {
                schema: Some(SchemaOrRef::component("Json")),
            },
        );
        assert_eq!(
            payload_schema(&content).and_then(SchemaOrRef::ref_path),
            Some("#/components/schemas/Json")
        );
        content.shift_remove("application/json");
        assert_eq!(
            payload_schema(&content).and_then(SchemaOrRef::ref_path),
            Some("#/components/schemas/Text")
        );
    }
}
