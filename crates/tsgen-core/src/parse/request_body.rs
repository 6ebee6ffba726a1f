use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::components::Components;
use super::media_type::{self, MediaType};
use super::reference::{MaybeRef, Referable};
use super::schema::SchemaOrRef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
    #[serde(default)]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RequestBody {
    pub fn payload_schema(&self) -> Option<&SchemaOrRef> {
        media_type::payload_schema(&self.content)
    }
}

pub type RequestBodyOrRef = MaybeRef<RequestBody>;

impl Referable for RequestBody {
    const SECTION: &'static str = "requestBodies";

    fn section(components: &Components) -> &IndexMap<String, MaybeRef<Self>> {
        &components.request_bodies
    }
}
