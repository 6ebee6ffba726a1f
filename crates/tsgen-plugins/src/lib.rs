pub mod backbone;
pub mod endpoint_method;
pub mod model;
pub mod push;
pub mod signals;
pub mod subtypes;
pub mod transfer_types;
pub mod type_mapper;

use tsgen_core::PluginFactory;
use tsgen_core::config::DEFAULT_PLUGINS;
use tsgen_core::error::GenerateError;

pub use backbone::BackbonePlugin;
pub use model::ModelPlugin;
pub use push::PushPlugin;
pub use signals::SignalsPlugin;
pub use subtypes::SubtypesPlugin;
pub use transfer_types::TransferTypesPlugin;

/// Look up a built-in plugin by its configuration name.
pub fn builtin_plugin(name: &str) -> Option<PluginFactory> {
    let factory: PluginFactory = match name {
        "transfer-types" => TransferTypesPlugin::create,
        "backbone" => BackbonePlugin::create,
        "model" => ModelPlugin::create,
        "subtypes" => SubtypesPlugin::create,
        "push" => PushPlugin::create,
        "signals" => SignalsPlugin::create,
        _ => return None,
    };
    Some(factory)
}

/// Factories for `names`, in the given order.
pub fn plugins_by_name<S: AsRef<str>>(names: &[S]) -> Result<Vec<PluginFactory>, GenerateError> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            builtin_plugin(name).ok_or_else(|| GenerateError::UnknownPlugin(name.to_string()))
        })
        .collect()
}

/// The standard pipeline.
pub fn default_plugins() -> Vec<PluginFactory> {
    DEFAULT_PLUGINS.iter().filter_map(|name| builtin_plugin(name)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plugins_cover_every_builtin() {
        assert_eq!(default_plugins().len(), DEFAULT_PLUGINS.len());
    }

    #[test]
    fn test_unknown_plugin() {
        let err = plugins_by_name(&["backbone", "openapi-fetch"]).err().unwrap();
        assert!(matches!(err, GenerateError::UnknownPlugin(name) if name == "openapi-fetch"));
    }
}
