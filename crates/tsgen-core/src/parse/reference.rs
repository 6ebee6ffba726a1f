use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::components::Components;

/// A `$ref` to a reusable component, or the object written out in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaybeRef<T> {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Item(T),
}

impl<T> MaybeRef<T> {
    pub fn ref_path(&self) -> Option<&str> {
        match self {
            MaybeRef::Ref { ref_path } => Some(ref_path),
            MaybeRef::Item(_) => None,
        }
    }

    pub fn item(&self) -> Option<&T> {
        match self {
            MaybeRef::Item(item) => Some(item),
            MaybeRef::Ref { .. } => None,
        }
    }
}

/// Objects kept under a `components` section that other parts of the
/// document may point at.
pub trait Referable: Sized {
    /// The key under `components`, also the second segment of a `$ref`.
    const SECTION: &'static str;

    fn section(components: &Components) -> &IndexMap<String, MaybeRef<Self>>;
}
