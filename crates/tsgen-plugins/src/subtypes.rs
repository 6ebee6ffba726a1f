use std::collections::{HashMap, HashSet};

use tsgen_core::ast::{Declaration, PropertySignature, TypeExpr};
use tsgen_core::error::PluginError;
use tsgen_core::naming::simple_name;
use tsgen_core::parse::ref_resolve::{ReferenceResolver, component_name};
use tsgen_core::parse::schema::{Schema, SchemaOrRef};
use tsgen_core::plugin::{Plugin, PluginContext, PluginLogger};
use tsgen_core::storage::{SharedStorage, TransferTypes};

use crate::model::is_union;
use crate::type_mapper::TypeMapper;

pub const DEFAULT_DISCRIMINATOR: &str = "@type";

/// Turns polymorphic bases into flat unions of their concrete subtypes and
/// pins each subtype's discriminator property to its literal tag.
pub struct SubtypesPlugin {
    resolver: ReferenceResolver,
    logger: PluginLogger,
}

impl SubtypesPlugin {
    pub fn create(context: PluginContext) -> Box<dyn Plugin> {
        Box::new(Self {
            resolver: context.resolver,
            logger: context.logger.scoped(module_path!()),
        })
    }

    /// Concrete members of a union, descending into members that are unions
    /// themselves. `false` when some member is not a reference.
    fn leaves(
        &self,
        schema: &Schema,
        transfer: &TransferTypes,
        visited: &mut HashSet<String>,
        out: &mut Vec<String>,
    ) -> Result<bool, PluginError> {
        for member in schema.one_of.iter().chain(&schema.any_of) {
            let SchemaOrRef::Ref { ref_path } = member else {
                return Ok(false);
            };
            let name = component_name(ref_path)?;
            if !visited.insert(name.clone()) {
                continue;
            }
            if !transfer.contains(&name) {
                let sub = self.resolver.component(&name)?;
                if is_union(sub) {
                    if !self.leaves(sub, transfer, visited, out)? {
                        return Ok(false);
                    }
                    continue;
                }
            }
            out.push(name);
        }
        Ok(true)
    }
}

/// Subtype component → tag, from the discriminator mapping.
fn tags(schema: &Schema) -> HashMap<String, String> {
    let mut tags = HashMap::new();
    if let Some(d) = &schema.discriminator {
        for (tag, target) in &d.mapping {
            let component = component_name(target).unwrap_or_else(|_| target.clone());
            tags.entry(component).or_insert_with(|| tag.clone());
        }
    }
    tags
}

impl Plugin for SubtypesPlugin {
    fn path(&self) -> &str {
        module_path!()
    }

    fn execute(&mut self, storage: &mut SharedStorage) -> Result<(), PluginError> {
        let models = storage.require_models(self.path())?.clone();
        let SharedStorage {
            sources,
            transfer_types,
            ..
        } = &mut *storage;
        let transfer: &TransferTypes = transfer_types;

        let mut unions = 0;
        for (component, record) in &models.models {
            let schema = self.resolver.component(component)?;
            if !is_union(schema) {
                continue;
            }
            let mut visited = HashSet::from([component.clone()]);
            let mut leaves = Vec::new();
            if !self.leaves(schema, transfer, &mut visited, &mut leaves)? {
                continue;
            }

            let Some(file) = sources.get_mut(&record.file) else {
                continue;
            };
            let ty = {
                let mut mapper = TypeMapper::new(&self.resolver, transfer, &mut file.dependencies)
                    .declaring(component, &record.identifier);
                let members = leaves
                    .iter()
                    .map(|leaf| mapper.reference(leaf, Vec::new()))
                    .collect::<Result<Vec<_>, _>>()?;
                TypeExpr::union(members)
            };
            if let Some(Declaration::TypeAlias(alias)) = file.declaration_mut(&record.identifier) {
                alias.ty = ty;
            }
            unions += 1;

            let property = schema
                .discriminator
                .as_ref()
                .map(|d| d.property_name.clone())
                .unwrap_or_else(|| DEFAULT_DISCRIMINATOR.to_string());
            let tags = tags(schema);
            for leaf in &leaves {
                let Some(leaf_record) = models.models.get(leaf) else {
                    continue;
                };
                let Some(leaf_file) = sources.get_mut(&leaf_record.file) else {
                    continue;
                };
                let Some(Declaration::Interface(interface)) =
                    leaf_file.declaration_mut(&leaf_record.identifier)
                else {
                    continue;
                };
                let tag = tags.get(leaf).cloned().unwrap_or_else(|| simple_name(leaf));
                match interface.members.iter_mut().find(|m| m.name == property) {
                    Some(member) => {
                        member.ty = TypeExpr::Literal(tag);
                        member.optional = false;
                    }
                    None => interface
                        .members
                        .insert(0, PropertySignature::new(property.as_str(), TypeExpr::Literal(tag))),
                }
            }
        }

        self.logger.info(format!("{unions} subtype unions"));
        Ok(())
    }
}
