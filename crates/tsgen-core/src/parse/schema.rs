use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A JSON Schema type keyword value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

/// The `type` field can be a single type or an array of types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(SchemaType),
    Multiple(Vec<SchemaType>),
}

/// A reference or inline schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Schema(Box<Schema>),
}

impl SchemaOrRef {
    /// Shorthand for a local component reference, mostly useful in tests.
    pub fn component(name: &str) -> Self {
        SchemaOrRef::Ref {
            ref_path: format!("#/components/schemas/{name}"),
        }
    }

    pub fn ref_path(&self) -> Option<&str> {
        match self {
            SchemaOrRef::Ref { ref_path } => Some(ref_path),
            SchemaOrRef::Schema(_) => None,
        }
    }
}

/// Discriminator for polymorphic schemas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discriminator {
    #[serde(rename = "propertyName")]
    pub property_name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub mapping: IndexMap<String, String>,
}

/// Type arguments applied to a referenced generic component.
///
/// Encoded as `x-type-arguments: { allOf: [...] }`, one entry per parameter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TypeArguments {
    #[serde(rename = "allOf", default)]
    pub all_of: Vec<SchemaOrRef>,
}

/// A JSON Schema object (OpenAPI 3.x superset) plus the backend extensions
/// the generator understands.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    // Object properties
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaOrRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<AdditionalProperties>,

    // Array items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaOrRef>>,

    // Composition
    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaOrRef>,

    #[serde(rename = "oneOf", default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaOrRef>,

    #[serde(rename = "anyOf", default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,

    // Enum values
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_json::Value>,

    #[serde(rename = "readOnly", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    // Backend extensions
    /// Fully qualified backend class of an inline schema (e.g. a streaming result).
    #[serde(rename = "x-class-name", skip_serializing_if = "Option::is_none")]
    pub x_class_name: Option<String>,

    /// Generic parameter names declared by a component schema.
    #[serde(
        rename = "x-type-parameters",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub x_type_parameters: Vec<String>,

    /// A use of a generic parameter inside a generic component.
    #[serde(rename = "x-type-variable", skip_serializing_if = "Option::is_none")]
    pub x_type_variable: Option<String>,

    #[serde(rename = "x-type-arguments", skip_serializing_if = "Option::is_none")]
    pub x_type_arguments: Option<TypeArguments>,
}

impl Schema {
    /// Whether the schema admits `null` via `nullable: true` or a 3.1 type array.
    pub fn is_nullable(&self) -> bool {
        if self.nullable == Some(true) {
            return true;
        }
        matches!(&self.schema_type, Some(TypeSet::Multiple(types)) if types.contains(&SchemaType::Null))
    }

    /// The single non-null type keyword, if there is exactly one.
    pub fn single_type(&self) -> Option<&SchemaType> {
        match &self.schema_type {
            Some(TypeSet::Single(t)) => Some(t),
            Some(TypeSet::Multiple(types)) => {
                let mut non_null = types.iter().filter(|t| **t != SchemaType::Null);
                let first = non_null.next();
                if non_null.next().is_some() { None } else { first }
            }
            None => None,
        }
    }

    /// A wrapper of the form `{anyOf: [{$ref}]}` (or `allOf`/`oneOf`) used to
    /// attach nullability or type arguments to a reference.
    pub fn wrapped_ref(&self) -> Option<&str> {
        if !self.properties.is_empty() {
            return None;
        }
        let members = [&self.all_of, &self.any_of, &self.one_of];
        let mut non_empty = members.iter().filter(|m| !m.is_empty());
        let only = non_empty.next()?;
        if non_empty.next().is_some() || only.len() != 1 {
            return None;
        }
        only[0].ref_path()
    }
}

/// `additionalProperties` can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<SchemaOrRef>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_ref_with_type_arguments() {
        let json = r##"{
            "nullable": true,
            "anyOf": [{"$ref": "#/components/schemas/com.example.Page"}],
            "x-type-arguments": {"allOf": [{"type": "string"}]}
        }"##;
        let schema: Schema = serde_json::from_str(json).unwrap();
        assert!(schema.is_nullable());
        assert_eq!(
            schema.wrapped_ref(),
            Some("#/components/schemas/com.example.Page")
        );
        assert_eq!(schema.x_type_arguments.unwrap().all_of.len(), 1);
    }

    #[test]
    fn test_single_type_skips_null() {
        let schema: Schema = serde_json::from_str(r#"{"type": ["string", "null"]}"#).unwrap();
        assert!(schema.is_nullable());
        assert_eq!(schema.single_type(), Some(&SchemaType::String));
    }

    #[test]
    fn test_multiple_refs_are_not_a_wrapper() {
        let schema = Schema {
            one_of: vec![SchemaOrRef::component("A"), SchemaOrRef::component("B")],
            ..Schema::default()
        };
        assert_eq!(schema.wrapped_ref(), None);
    }
}
