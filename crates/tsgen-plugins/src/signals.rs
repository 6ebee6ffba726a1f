use tsgen_core::ast::{Expr, FunctionDecl, Keyword, ObjectProp, Statement, TypeExpr};
use tsgen_core::error::PluginError;
use tsgen_core::parse::ref_resolve::ReferenceResolver;
use tsgen_core::parse::schema::SchemaOrRef;
use tsgen_core::plugin::{Plugin, PluginContext, PluginLogger};
use tsgen_core::storage::{ModelOutput, SharedStorage, TransferTypes};

use crate::backbone::CLIENT;
use crate::endpoint_method::{
    existing_method, first_type_argument, referenced_component, replace_method,
};
use crate::transfer_types::{LIST_SIGNAL, NUMBER_SIGNAL, VALUE_SIGNAL};
use crate::type_mapper::TypeMapper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalKind {
    Number,
    Value,
    List,
}

impl SignalKind {
    fn of(component: &str) -> Option<Self> {
        match component {
            NUMBER_SIGNAL => Some(Self::Number),
            VALUE_SIGNAL => Some(Self::Value),
            LIST_SIGNAL => Some(Self::List),
            _ => None,
        }
    }

    fn schema(self) -> &'static str {
        match self {
            Self::Number => NUMBER_SIGNAL,
            Self::Value => VALUE_SIGNAL,
            Self::List => LIST_SIGNAL,
        }
    }

    fn class_name(self) -> &'static str {
        match self {
            Self::Number => "NumberSignal",
            Self::Value => "ValueSignal",
            Self::List => "ListSignal",
        }
    }
}

/// Rewrites methods returning a signal into signal constructors bound to
/// the endpoint method.
pub struct SignalsPlugin {
    resolver: ReferenceResolver,
    logger: PluginLogger,
}

impl SignalsPlugin {
    pub fn create(context: PluginContext) -> Box<dyn Plugin> {
        Box::new(Self {
            resolver: context.resolver,
            logger: context.logger.scoped(module_path!()),
        })
    }
}

/// The initial value handed to a `ValueSignal`.
fn value_default(argument: Option<&SchemaOrRef>, models: Option<&ModelOutput>) -> Result<Expr, PluginError> {
    let Some(argument) = argument else {
        return Ok(Expr::Undefined);
    };
    if matches!(argument, SchemaOrRef::Schema(s) if s.is_nullable()) {
        return Ok(Expr::Undefined);
    }
    let empty = referenced_component(argument)?
        .and_then(|c| models?.models.get(&c))
        .map(|record| record.empty_value.clone());
    Ok(empty.unwrap_or(Expr::Undefined))
}

impl Plugin for SignalsPlugin {
    fn path(&self) -> &str {
        module_path!()
    }

    fn execute(&mut self, storage: &mut SharedStorage) -> Result<(), PluginError> {
        let backbone = storage.require_backbone(self.path())?.clone();
        let models = storage.plugin_storage.models.clone();
        let signals_package = storage.settings.output.signals_package.clone();
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
                let Some(kind) = referenced_component(response)?
                    .as_deref()
                    .and_then(SignalKind::of)
                else {
                    continue;
                };

                let existing = existing_method(file, &method.local)?;
                let argument = first_type_argument(response);
                let type_args = match kind {
                    SignalKind::Number => Vec::new(),
                    SignalKind::Value | SignalKind::List => {
                        let mut mapper =
                            TypeMapper::new(&self.resolver, transfer, &mut file.dependencies);
                        vec![match argument {
                            Some(schema) => mapper.map_nullable(schema)?,
                            None => TypeExpr::Keyword(Keyword::Unknown),
                        }]
                    }
                };

                let target = transfer.get(kind.schema());
                let name = target.map_or(kind.class_name(), |t| t.name.as_str());
                let module = target
                    .and_then(|t| t.module.as_deref())
                    .unwrap_or(signals_package.as_str());
                let signal = file.dependencies.import_named(module, name, false)?;
                let client = file
                    .dependencies
                    .import_default(&client_module, CLIENT, false)?;

                let mut args = Vec::new();
                match kind {
                    SignalKind::Number => args.push(Expr::Number(0.0)),
                    SignalKind::Value => args.push(value_default(argument, models.as_ref())?),
                    SignalKind::List => {}
                }
                let client_prop = if client == CLIENT {
                    ObjectProp::shorthand(CLIENT)
                } else {
                    ObjectProp::new(CLIENT, Expr::ident(client))
                };
                args.push(Expr::Object(vec![
                    client_prop,
                    ObjectProp::new("endpoint", Expr::str(endpoint.name.as_str())),
                    ObjectProp::new("method", Expr::str(method.name.as_str())),
                    ObjectProp::new("params", existing.params_object),
                ]));

                let construct = Expr::New {
                    callee: Box::new(Expr::ident(signal.as_str())),
                    type_args: type_args.clone(),
                    args,
                };
                replace_method(
                    file,
                    FunctionDecl {
                        doc: existing.doc,
                        name: method.local.clone(),
                        is_async: false,
                        type_params: Vec::new(),
                        params: existing.params,
                        return_type: TypeExpr::generic(signal, type_args),
                        body: vec![Statement::Return(construct)],
                    },
                )?;
                self.logger.debug(format!(
                    "{}.{} -> {}",
                    endpoint.name,
                    method.name,
                    kind.class_name()
                ));
                rewritten += 1;
            }
        }

        self.logger.info(format!("{rewritten} signal methods"));
        Ok(())
    }
}
