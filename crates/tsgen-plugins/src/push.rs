use tsgen_core::ast::{Expr, FunctionDecl, Keyword, Statement, TypeExpr};
use tsgen_core::error::PluginError;
use tsgen_core::parse::ref_resolve::ReferenceResolver;
use tsgen_core::parse::schema::SchemaOrRef;
use tsgen_core::plugin::{Plugin, PluginContext, PluginLogger};
use tsgen_core::storage::{SharedStorage, TransferTypes};

use crate::backbone::CLIENT;
use crate::endpoint_method::{
    existing_method, first_type_argument, referenced_component, replace_method,
};
use crate::type_mapper::TypeMapper;

pub const SUBSCRIPTION: &str = "Subscription";

/// Rewrites methods that stream values into subscriptions.
pub struct PushPlugin {
    resolver: ReferenceResolver,
    logger: PluginLogger,
}

impl PushPlugin {
    pub fn create(context: PluginContext) -> Box<dyn Plugin> {
        Box::new(Self {
            resolver: context.resolver,
            logger: context.logger.scoped(module_path!()),
        })
    }

    fn is_push(&self, response: &SchemaOrRef, classes: &[String]) -> Result<bool, PluginError> {
        if let SchemaOrRef::Schema(s) = response {
            if s.x_class_name.as_ref().is_some_and(|c| classes.contains(c)) {
                return Ok(true);
            }
        }
        Ok(referenced_component(response)?.is_some_and(|c| classes.contains(&c)))
    }
}

/// The streamed item schema: `items`, else the first type argument.
fn item_schema(response: &SchemaOrRef) -> Option<&SchemaOrRef> {
    match response {
        SchemaOrRef::Schema(s) => s.items.as_deref().or_else(|| first_type_argument(response)),
        SchemaOrRef::Ref { .. } => None,
    }
}

impl Plugin for PushPlugin {
    fn path(&self) -> &str {
        module_path!()
    }

    fn execute(&mut self, storage: &mut SharedStorage) -> Result<(), PluginError> {
        let backbone = storage.require_backbone(self.path())?.clone();
        let classes = storage.settings.push_classes.clone();
        let frontend = storage.settings.output.frontend_package.clone();
        let client_module = storage.settings.output.client_module.clone();
        let SharedStorage {
            sources,
            transfer_types,
            ..
        } = &mut *storage;
        let transfer: &TransferTypes = transfer_types;

        let mut rewritten = 0;
        for endpoint in &backbone.endpoints {
            let Some(file) = sources.get_mut(&endpoint.file) else {
                continue;
            };
            for method in &endpoint.methods {
                let Some(response) = &method.response else {
                    continue;
                };
                if !self.is_push(response, &classes)? {
                    continue;
                }

                let existing = existing_method(file, &method.local)?;
                let item = {
                    let mut mapper = TypeMapper::new(&self.resolver, transfer, &mut file.dependencies);
                    match item_schema(response) {
                        Some(schema) => mapper.map_nullable(schema)?,
                        None => TypeExpr::Keyword(Keyword::Unknown),
                    }
                };
                let subscription = file
                    .dependencies
                    .import_named(&frontend, SUBSCRIPTION, true)?;
                let client = file
                    .dependencies
                    .import_default(&client_module, CLIENT, false)?;

                let call = Expr::ident(client).member("subscribe").call(vec![
                    Expr::str(endpoint.name.as_str()),
                    Expr::str(method.name.as_str()),
                    existing.params_object,
                ]);
                replace_method(
                    file,
                    FunctionDecl {
                        doc: existing.doc,
                        name: method.local.clone(),
                        is_async: false,
                        type_params: Vec::new(),
                        params: existing.params,
                        return_type: TypeExpr::generic(subscription, vec![item]),
                        body: vec![Statement::Return(call)],
                    },
                )?;
                self.logger
                    .debug(format!("{}.{} -> subscription", endpoint.name, method.name));
                rewritten += 1;
            }
        }

        self.logger.info(format!("{rewritten} push methods"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_schema_prefers_items() {
        let response: SchemaOrRef = serde_json::from_value(serde_json::json!({
            "type": "array",
            "items": {"type": "string"},
            "x-class-name": "reactor.core.publisher.Flux"
        }))
        .unwrap();
        let item = item_schema(&response).unwrap();
        assert!(matches!(item, SchemaOrRef::Schema(s) if s.single_type().is_some()));
    }

    #[test]
    fn test_item_schema_from_type_argument() {
        let response: SchemaOrRef = serde_json::from_value(serde_json::json!({
            "anyOf": [{"$ref": "#/components/schemas/com.vaadin.hilla.runtime.transfertypes.EndpointSubscription"}],
            "x-type-arguments": {"allOf": [{"$ref": "#/components/schemas/com.example.Message"}]}
        }))
        .unwrap();
        assert_eq!(
            item_schema(&response).and_then(SchemaOrRef::ref_path),
            Some("#/components/schemas/com.example.Message")
        );
    }

    #[test]
    fn test_no_item_for_bare_ref() {
        let response = SchemaOrRef::component("com.example.Message");
        assert!(item_schema(&response).is_none());
    }
}
