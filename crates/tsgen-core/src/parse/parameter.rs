use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::components::Components;
use super::reference::{MaybeRef, Referable};
use super::schema::SchemaOrRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

/// An operation parameter. Location only matters for validation; every
/// parameter becomes a positional argument of the generated method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub type ParameterOrRef = MaybeRef<Parameter>;

impl Referable for Parameter {
    const SECTION: &'static str = "parameters";

    fn section(components: &Components) -> &IndexMap<String, MaybeRef<Self>> {
        &components.parameters
    }
}
