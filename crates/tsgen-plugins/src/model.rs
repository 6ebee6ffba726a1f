use std::collections::{HashMap, HashSet, VecDeque};

use tsgen_core::ast::{
    Declaration, EnumDecl, EnumMember, Expr, InterfaceDecl, ObjectProp, TypeAliasDecl,
};
use tsgen_core::error::PluginError;
use tsgen_core::naming::{is_valid_identifier, sanitize_identifier, simple_name};
use tsgen_core::parse::ref_resolve::{ReferenceResolver, component_name};
use tsgen_core::parse::schema::{Schema, SchemaOrRef, SchemaType};
use tsgen_core::plugin::{Plugin, PluginContext, PluginLogger};
use tsgen_core::storage::{ModelOutput, ModelRecord, SharedStorage, TransferTypes};

use crate::type_mapper::{TypeMapper, model_location};

/// Emits one module per component schema reachable from the endpoints.
pub struct ModelPlugin {
    resolver: ReferenceResolver,
    logger: PluginLogger,
}

/// A polymorphic base: a union of subtypes without properties of its own
/// beyond what the union carries.
pub fn is_union(schema: &Schema) -> bool {
    (!schema.one_of.is_empty() || !schema.any_of.is_empty())
        && schema.properties.is_empty()
        && schema.wrapped_ref().is_none()
}

fn is_object_like(schema: &Schema) -> bool {
    !schema.properties.is_empty()
        || !schema.all_of.is_empty()
        || (schema.single_type() == Some(&SchemaType::Object)
            && schema.additional_properties.is_none())
}

impl ModelPlugin {
    pub fn create(context: PluginContext) -> Box<dyn Plugin> {
        Box::new(Self {
            resolver: context.resolver,
            logger: context.logger.scoped(module_path!()),
        })
    }

    fn declaration(
        &self,
        component: &str,
        identifier: &str,
        mapper: &mut TypeMapper<'_>,
        transfer: &TransferTypes,
    ) -> Result<Declaration, PluginError> {
        let raw = self
            .resolver
            .spec()
            .components
            .as_ref()
            .and_then(|c| c.schemas.get(component))
            .filter(|s| matches!(s, SchemaOrRef::Ref { .. }));
        if let Some(alias) = raw {
            return Ok(Declaration::TypeAlias(TypeAliasDecl {
                doc: None,
                name: identifier.to_string(),
                type_params: Vec::new(),
                ty: mapper.map(alias)?,
            }));
        }

        let schema = self.resolver.component(component)?;
        let doc = schema.description.clone();
        let type_params = schema.x_type_parameters.clone();

        if !schema.enum_values.is_empty() && schema.enum_values.iter().all(|v| v.is_string()) {
            let members = schema
                .enum_values
                .iter()
                .filter_map(|v| v.as_str())
                .map(|v| EnumMember {
                    name: if is_valid_identifier(v) {
                        v.to_string()
                    } else {
                        sanitize_identifier(v)
                    },
                    value: v.to_string(),
                })
                .collect();
            return Ok(Declaration::Enum(EnumDecl {
                doc,
                name: identifier.to_string(),
                members,
            }));
        }

        if is_object_like(schema) && !is_union(schema) {
            return self.interface(schema, identifier, mapper, transfer);
        }

        Ok(Declaration::TypeAlias(TypeAliasDecl {
            doc,
            name: identifier.to_string(),
            type_params,
            ty: mapper.map_schema(schema)?,
        }))
    }

    fn interface(
        &self,
        schema: &Schema,
        identifier: &str,
        mapper: &mut TypeMapper<'_>,
        transfer: &TransferTypes,
    ) -> Result<Declaration, PluginError> {
        let mut extends = Vec::new();
        let mut inherited = HashSet::new();
        let mut property_sources: Vec<&Schema> = Vec::new();

        for member in &schema.all_of {
            match member {
                SchemaOrRef::Ref { ref_path } => {
                    let parent = component_name(ref_path)?;
                    if transfer.contains(&parent) {
                        extends.push(mapper.map(member)?);
                        continue;
                    }
                    let parent_schema = self.resolver.component(&parent)?;
                    if is_union(parent_schema) {
                        property_sources.push(parent_schema);
                    } else {
                        extends.push(mapper.map(member)?);
                        self.collect_inherited(&parent, &mut inherited, &mut HashSet::new())?;
                    }
                }
                SchemaOrRef::Schema(inline) => property_sources.push(inline),
            }
        }
        property_sources.push(schema);

        let mut members = Vec::new();
        let mut seen = HashSet::new();
        for source in property_sources {
            for (name, prop) in &source.properties {
                if inherited.contains(name) || !seen.insert(name.clone()) {
                    continue;
                }
                let required = source.required.contains(name) || schema.required.contains(name);
                members.push(mapper.property(name, prop, required)?);
            }
        }

        Ok(Declaration::Interface(InterfaceDecl {
            doc: schema.description.clone(),
            name: identifier.to_string(),
            type_params: schema.x_type_parameters.clone(),
            extends,
            members,
        }))
    }

    /// Property names a component provides to its subtypes, transitively.
    fn collect_inherited(
        &self,
        component: &str,
        out: &mut HashSet<String>,
        visited: &mut HashSet<String>,
    ) -> Result<(), PluginError> {
        if !visited.insert(component.to_string()) {
            return Ok(());
        }
        let schema = self.resolver.component(component)?;
        out.extend(schema.properties.keys().cloned());
        for member in &schema.all_of {
            match member {
                SchemaOrRef::Ref { ref_path } => {
                    let parent = component_name(ref_path)?;
                    if self.resolver.has_component(&parent) {
                        self.collect_inherited(&parent, out, visited)?;
                    }
                }
                SchemaOrRef::Schema(inline) => out.extend(inline.properties.keys().cloned()),
            }
        }
        Ok(())
    }

    /// An expression for an empty instance of `component`. Required,
    /// non-nullable properties get type defaults; cycles end in `undefined`.
    fn empty_value(
        &self,
        component: &str,
        transfer: &TransferTypes,
        visiting: &mut HashSet<String>,
    ) -> Result<Expr, PluginError> {
        if transfer.contains(component) || !visiting.insert(component.to_string()) {
            return Ok(Expr::Undefined);
        }
        let schema = self.resolver.component(component)?;
        let value = self.empty_for_schema(schema, transfer, visiting);
        visiting.remove(component);
        value
    }

    fn empty_for_schema(
        &self,
        schema: &Schema,
        transfer: &TransferTypes,
        visiting: &mut HashSet<String>,
    ) -> Result<Expr, PluginError> {
        if schema.x_type_variable.is_some() || !schema.enum_values.is_empty() {
            return Ok(Expr::Undefined);
        }
        if let Some(ref_path) = schema.wrapped_ref() {
            if schema.is_nullable() {
                return Ok(Expr::Undefined);
            }
            return self.empty_value(&component_name(ref_path)?, transfer, visiting);
        }
        if is_union(schema) {
            return Ok(Expr::Undefined);
        }
        match schema.single_type() {
            Some(SchemaType::String) => Ok(Expr::str("")),
            Some(SchemaType::Number) | Some(SchemaType::Integer) => Ok(Expr::Number(0.0)),
            Some(SchemaType::Boolean) => Ok(Expr::Bool(false)),
            Some(SchemaType::Array) => Ok(Expr::Array(Vec::new())),
            Some(SchemaType::Null) => Ok(Expr::Undefined),
            Some(SchemaType::Object) | None => {
                if !is_object_like(schema) && schema.additional_properties.is_none() {
                    return Ok(Expr::Undefined);
                }
                let mut props = Vec::new();
                self.required_defaults(schema, transfer, visiting, &mut props)?;
                Ok(Expr::Object(props))
            }
        }
    }

    fn required_defaults(
        &self,
        schema: &Schema,
        transfer: &TransferTypes,
        visiting: &mut HashSet<String>,
        out: &mut Vec<ObjectProp>,
    ) -> Result<(), PluginError> {
        for member in &schema.all_of {
            match member {
                SchemaOrRef::Ref { ref_path } => {
                    let parent = component_name(ref_path)?;
                    if let Expr::Object(inherited) = self.empty_value(&parent, transfer, visiting)? {
                        out.extend(inherited);
                    }
                }
                SchemaOrRef::Schema(inline) => {
                    self.required_defaults(inline, transfer, visiting, out)?;
                }
            }
        }
        for name in &schema.required {
            let Some(prop) = schema.properties.get(name) else {
                continue;
            };
            if out.iter().any(|p| &p.key == name) {
                continue;
            }
            let value = match prop {
                SchemaOrRef::Ref { ref_path } => {
                    self.empty_value(&component_name(ref_path)?, transfer, visiting)?
                }
                SchemaOrRef::Schema(s) if s.is_nullable() => continue,
                SchemaOrRef::Schema(s) => self.empty_for_schema(s, transfer, visiting)?,
            };
            out.push(ObjectProp::new(name.as_str(), value));
        }
        Ok(())
    }
}

impl Plugin for ModelPlugin {
    fn path(&self) -> &str {
        module_path!()
    }

    fn execute(&mut self, storage: &mut SharedStorage) -> Result<(), PluginError> {
        let plugin_path = self.path().to_string();
        let seeds = storage
            .require_backbone(&plugin_path)?
            .referenced_schemas
            .clone();
        let SharedStorage {
            sources,
            transfer_types,
            ..
        } = &mut *storage;
        let transfer: &TransferTypes = transfer_types;

        let mut queue: VecDeque<String> = seeds.into_iter().collect();
        let mut visited = HashSet::new();
        let mut owners: HashMap<String, String> = HashMap::new();
        let mut output = ModelOutput::default();

        while let Some(component) = queue.pop_front() {
            if !visited.insert(component.clone()) || transfer.contains(&component) {
                continue;
            }
            let (file_path, module) = model_location(&component);
            if let Some(owner) = owners.insert(file_path.clone(), component.clone()) {
                return Err(PluginError::Invalid(format!(
                    "schemas {owner} and {component} both map to {file_path}"
                )));
            }

            let file = sources.get_or_create(&file_path, &plugin_path);
            let identifier = file.dependencies.declare(&simple_name(&component))?;
            let mut mapper = TypeMapper::new(&self.resolver, transfer, &mut file.dependencies)
                .declaring(&component, &identifier);
            let declaration = self.declaration(&component, &identifier, &mut mapper, transfer)?;
            queue.extend(mapper.referenced);

            file.declarations.push(declaration);
            file.dependencies.exports.set_default(identifier.as_str());
            self.logger.debug(format!("{component} -> {file_path}"));

            output.models.insert(
                component,
                ModelRecord {
                    file: file_path,
                    module,
                    identifier,
                    empty_value: Expr::Undefined,
                },
            );
        }

        let names: Vec<String> = output.models.keys().cloned().collect();
        for name in names {
            let empty = self.empty_value(&name, transfer, &mut HashSet::new())?;
            if let Some(record) = output.models.get_mut(&name) {
                record.empty_value = empty;
            }
        }

        self.logger
            .info(format!("{} models generated", output.models.len()));
        storage.plugin_storage.models = Some(output);
        Ok(())
    }
}
