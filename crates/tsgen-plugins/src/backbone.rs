use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};

use tsgen_core::ast::{
    Declaration, Expr, FunctionDecl, Keyword, ObjectProp, Param, Statement, TypeExpr,
};
use tsgen_core::dependency::IdentifierScope;
use tsgen_core::error::PluginError;
use tsgen_core::naming::{
    endpoint_name, method_name, parameter_name, qualified_path,
};
use tsgen_core::parse::operation::{HttpMethod, Operation};
use tsgen_core::parse::ref_resolve::ReferenceResolver;
use tsgen_core::parse::response::ResponseOrRef;
use tsgen_core::parse::schema::SchemaOrRef;
use tsgen_core::plugin::{Plugin, PluginContext, PluginLogger};
use tsgen_core::storage::{
    BackboneOutput, EndpointRecord, MethodRecord, ParamRecord, SharedStorage,
};

use crate::type_mapper::TypeMapper;

pub const REQUEST_INIT: &str = "EndpointRequestInit";
pub const CLIENT: &str = "client";

/// Emits one module per endpoint with an async wrapper per method.
pub struct BackbonePlugin {
    resolver: ReferenceResolver,
    logger: PluginLogger,
}

struct MethodSource<'a> {
    http: HttpMethod,
    path: &'a str,
    op: &'a Operation,
    name: String,
}

impl BackbonePlugin {
    pub fn create(context: PluginContext) -> Box<dyn Plugin> {
        Box::new(Self {
            resolver: context.resolver,
            logger: context.logger.scoped(module_path!()),
        })
    }

    /// Operations grouped by endpoint, in document order.
    fn endpoints(&self) -> IndexMap<String, Vec<MethodSource<'_>>> {
        let mut endpoints: IndexMap<String, Vec<MethodSource<'_>>> = IndexMap::new();
        for (path, item) in &self.resolver.spec().paths {
            for (http, op) in item.operations() {
                let endpoint = endpoint_name(path, op);
                let name = method_name(&endpoint, http, path, op);
                endpoints.entry(endpoint).or_default().push(MethodSource {
                    http,
                    path,
                    op,
                    name,
                });
            }
        }
        endpoints
    }

    fn params(&self, source: &MethodSource<'_>) -> Result<Vec<ParamRecord>, PluginError> {
        let mut params = Vec::new();
        for param in &source.op.parameters {
            let p = self.resolver.resolve_item(param)?;
            let nullable = !p.required
                || p.schema
                    .as_ref()
                    .is_some_and(|s| matches!(s, SchemaOrRef::Schema(s) if s.is_nullable()));
            params.push(ParamRecord {
                name: p.name.clone(),
                schema: p.schema.clone(),
                nullable,
            });
        }

        let Some(body) = &source.op.request_body else {
            return Ok(params);
        };
        let body = self.resolver.resolve_item(body)?;
        let Some(schema) = body.payload_schema() else {
            return Ok(params);
        };
        match schema {
            SchemaOrRef::Schema(s) if !s.properties.is_empty() => {
                for (name, prop) in &s.properties {
                    let nullable = !s.required.contains(name)
                        || matches!(prop, SchemaOrRef::Schema(p) if p.is_nullable());
                    params.push(ParamRecord {
                        name: name.clone(),
                        schema: Some(prop.clone()),
                        nullable,
                    });
                }
            }
            other => params.push(ParamRecord {
                name: "body".to_string(),
                schema: Some(other.clone()),
                nullable: !body.required,
            }),
        }
        Ok(params)
    }

    /// The success payload: `200`, else the first `2xx`, else `default`.
    fn response(&self, op: &Operation) -> Result<Option<SchemaOrRef>, PluginError> {
        let chosen: Option<&ResponseOrRef> = op
            .responses
            .get("200")
            .or_else(|| {
                op.responses
                    .iter()
                    .find(|(code, _)| code.starts_with('2'))
                    .map(|(_, r)| r)
            })
            .or_else(|| op.responses.get("default"));
        let Some(response) = chosen else {
            return Ok(None);
        };
        let response = self.resolver.resolve_item(response)?;
        Ok(response.payload_schema().cloned())
    }
}

fn operation_doc(op: &Operation) -> Option<String> {
    let mut parts: Vec<String> = [&op.summary, &op.description]
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    parts.dedup();
    if op.deprecated == Some(true) {
        parts.push("@deprecated".to_string());
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

impl Plugin for BackbonePlugin {
    fn path(&self) -> &str {
        module_path!()
    }

    fn execute(&mut self, storage: &mut SharedStorage) -> Result<(), PluginError> {
        let plugin_path = self.path().to_string();
        let client_module = storage.settings.output.client_module.clone();
        let frontend = storage.settings.output.frontend_package.clone();
        let SharedStorage {
            sources,
            transfer_types,
            ..
        } = &mut *storage;

        let mut output = BackboneOutput::default();
        let mut referenced: IndexSet<String> = IndexSet::new();

        for (endpoint, methods) in self.endpoints() {
            let mut wire_names = HashSet::new();
            if let Some(twice) = methods.iter().find(|m| !wire_names.insert(m.name.as_str())) {
                return Err(PluginError::Invalid(format!(
                    "endpoint {endpoint} declares method {} more than once ({} {})",
                    twice.name,
                    twice.http.as_str(),
                    twice.path
                )));
            }

            let file_path = format!("{}.ts", qualified_path(&endpoint));
            let file = sources.get_or_create(&file_path, &plugin_path);

            // Methods keep their names ahead of any import.
            let locals = methods
                .iter()
                .map(|m| file.dependencies.declare(&m.name))
                .collect::<Result<Vec<_>, _>>()?;

            let mut records = Vec::new();
            for (source, local) in methods.iter().zip(locals) {
                let params = self.params(source)?;
                let response = self.response(source.op)?;

                let mut mapper =
                    TypeMapper::new(&self.resolver, transfer_types, &mut file.dependencies);
                let mut param_types = Vec::new();
                for param in &params {
                    let ty = match &param.schema {
                        Some(schema) => mapper.map(schema)?,
                        None => TypeExpr::Keyword(Keyword::Unknown),
                    };
                    param_types.push(if param.nullable { ty.or_undefined() } else { ty });
                }

                let (return_type, response_nullable) = match &response {
                    Some(schema) => {
                        let nullable = mapper.is_nullable(schema);
                        let ty = mapper.map(schema)?;
                        (if nullable { ty.or_undefined() } else { ty }, nullable)
                    }
                    None => (TypeExpr::Keyword(Keyword::Void), false),
                };
                referenced.extend(mapper.referenced);

                let request_init =
                    file.dependencies
                        .import_named(&frontend, REQUEST_INIT, true)?;
                let client = file
                    .dependencies
                    .import_default(&client_module, CLIENT, false)?;

                // Parameters live in the function scope and must not shadow
                // the client binding the body calls.
                let mut scope = IdentifierScope::new(file_path.as_str());
                scope.bind(&client, false)?;
                let mut ts_params = Vec::new();
                let mut call_params = Vec::new();
                for (param, ty) in params.iter().zip(param_types) {
                    let local_name = scope.bind(&parameter_name(&param.name), false)?;
                    call_params.push(if local_name == param.name {
                        ObjectProp::shorthand(local_name.clone())
                    } else {
                        ObjectProp::new(param.name.clone(), Expr::ident(local_name.clone()))
                    });
                    ts_params.push(Param {
                        name: local_name,
                        ty,
                        optional: false,
                    });
                }
                let init = scope.bind("init", false)?;
                ts_params.push(Param {
                    name: init.clone(),
                    ty: TypeExpr::named(request_init),
                    optional: true,
                });

                let call = Expr::ident(client).member("call").call(vec![
                    Expr::str(endpoint.as_str()),
                    Expr::str(source.name.as_str()),
                    Expr::Object(call_params),
                    Expr::ident(init),
                ]);
                file.declarations.push(Declaration::Function(FunctionDecl {
                    doc: operation_doc(source.op),
                    name: local.clone(),
                    is_async: true,
                    type_params: Vec::new(),
                    params: ts_params,
                    return_type: TypeExpr::generic("Promise", vec![return_type]),
                    body: vec![Statement::Return(call)],
                }));
                file.dependencies
                    .exports
                    .add_named(local.as_str(), source.name.as_str())?;

                self.logger.debug(format!(
                    "{} {} -> {endpoint}.{}",
                    source.http.as_str(),
                    source.path,
                    source.name
                ));
                records.push(MethodRecord {
                    name: source.name.clone(),
                    local,
                    params,
                    response,
                    response_nullable,
                });
            }

            output.endpoints.push(EndpointRecord {
                name: endpoint,
                file: file_path,
                methods: records,
            });
        }

        self.logger.info(format!(
            "{} endpoints, {} referenced schemas",
            output.endpoints.len(),
            referenced.len()
        ));
        output.referenced_schemas = referenced;
        storage.plugin_storage.backbone = Some(output);
        Ok(())
    }
}
