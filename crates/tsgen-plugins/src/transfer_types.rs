use tsgen_core::error::PluginError;
use tsgen_core::plugin::{Plugin, PluginContext, PluginLogger};
use tsgen_core::storage::{SharedStorage, TransferTarget};

pub const UUID: &str = "java.util.UUID";
pub const JSON_NODE: &str = "com.fasterxml.jackson.databind.JsonNode";
pub const OBJECT_NODE: &str = "com.fasterxml.jackson.databind.node.ObjectNode";
pub const ARRAY_NODE: &str = "com.fasterxml.jackson.databind.node.ArrayNode";
pub const MULTIPART_FILE: &str = "org.springframework.web.multipart.MultipartFile";
pub const ENDPOINT_SUBSCRIPTION: &str =
    "com.vaadin.hilla.runtime.transfertypes.EndpointSubscription";
pub const NUMBER_SIGNAL: &str = "com.vaadin.hilla.signals.NumberSignal";
pub const VALUE_SIGNAL: &str = "com.vaadin.hilla.signals.ValueSignal";
pub const LIST_SIGNAL: &str = "com.vaadin.hilla.signals.ListSignal";

/// Registers the schemas replaced by hand-written client types. Runs first
/// so that every later plugin sees the full registry.
pub struct TransferTypesPlugin {
    logger: PluginLogger,
}

impl TransferTypesPlugin {
    pub fn create(context: PluginContext) -> Box<dyn Plugin> {
        Box::new(Self {
            logger: context.logger.scoped(module_path!()),
        })
    }
}

impl Plugin for TransferTypesPlugin {
    fn path(&self) -> &str {
        module_path!()
    }

    fn execute(&mut self, storage: &mut SharedStorage) -> Result<(), PluginError> {
        let frontend = storage.settings.output.frontend_package.clone();
        let signals = storage.settings.output.signals_package.clone();
        let registry = &mut storage.transfer_types;

        registry.register(UUID, TransferTarget::global("string"));
        for node in [JSON_NODE, OBJECT_NODE, ARRAY_NODE] {
            registry.register(node, TransferTarget::global("unknown"));
        }
        registry.register(MULTIPART_FILE, TransferTarget::global("File"));
        registry.register(
            ENDPOINT_SUBSCRIPTION,
            TransferTarget::imported("EndpointSubscription", frontend.as_str()),
        );
        for (class, name) in [
            (NUMBER_SIGNAL, "NumberSignal"),
            (VALUE_SIGNAL, "ValueSignal"),
            (LIST_SIGNAL, "ListSignal"),
        ] {
            registry.register(class, TransferTarget::imported(name, signals.as_str()));
        }

        for (schema, target) in &storage.settings.transfer_types {
            if target.name.is_empty() {
                return Err(PluginError::Invalid(format!(
                    "transfer type for {schema} has an empty name"
                )));
            }
            registry.register(
                schema.as_str(),
                TransferTarget {
                    name: target.name.clone(),
                    module: target.module.clone(),
                },
            );
        }

        self.logger
            .debug(format!("{} transfer types registered", registry.len()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;
    use tsgen_core::config::{Settings, TransferTypeConfig};
    use tsgen_core::parse::ref_resolve::ReferenceResolver;
    use tsgen_core::parse::spec::OpenApiSpec;

    fn run(settings: Settings) -> SharedStorage {
        let api = Arc::new(OpenApiSpec::empty("Test"));
        let mut storage = SharedStorage::new(api.clone(), settings, PathBuf::from("out"));
        let mut plugin = TransferTypesPlugin::create(PluginContext {
            resolver: ReferenceResolver::new(api),
            logger: PluginLogger::new("test", "Test"),
        });
        plugin.execute(&mut storage).unwrap();
        storage
    }

    #[test]
    fn test_defaults() {
        let storage = run(Settings::default());
        let registry = &storage.transfer_types;
        assert_eq!(registry.get(UUID), Some(&TransferTarget::global("string")));
        assert_eq!(registry.get(MULTIPART_FILE), Some(&TransferTarget::global("File")));
        assert_eq!(
            registry.get(NUMBER_SIGNAL),
            Some(&TransferTarget::imported("NumberSignal", "@vaadin/hilla-react-signals"))
        );
        assert_eq!(
            registry.get(ENDPOINT_SUBSCRIPTION).and_then(|t| t.module.as_deref()),
            Some("@vaadin/hilla-frontend")
        );
    }

    #[test]
    fn test_configured_overrides_win() {
        let mut settings = Settings::default();
        settings.transfer_types.insert(
            UUID.to_string(),
            TransferTypeConfig {
                name: "Uuid".to_string(),
                module: Some("./types/uuid".to_string()),
            },
        );
        let storage = run(settings);
        assert_eq!(
            storage.transfer_types.get(UUID),
            Some(&TransferTarget::imported("Uuid", "./types/uuid"))
        );
    }
}
