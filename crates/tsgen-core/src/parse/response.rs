use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::components::Components;
use super::media_type::{self, MediaType};
use super::reference::{MaybeRef, Referable};
use super::schema::SchemaOrRef;

/// One entry of an operation's `responses`. A response without content
/// maps to `void`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

impl Response {
    pub fn payload_schema(&self) -> Option<&SchemaOrRef> {
        media_type::payload_schema(&self.content)
    }
}

pub type ResponseOrRef = MaybeRef<Response>;

impl Referable for Response {
    const SECTION: &'static str = "responses";

    fn section(components: &Components) -> &IndexMap<String, MaybeRef<Self>> {
        &components.responses
    }
}
