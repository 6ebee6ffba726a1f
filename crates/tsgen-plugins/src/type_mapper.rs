use indexmap::IndexSet;

use tsgen_core::ast::{Keyword, PropertySignature, TypeExpr};
use tsgen_core::dependency::DependencyManager;
use tsgen_core::error::PluginError;
use tsgen_core::naming::{qualified_path, simple_name};
use tsgen_core::parse::ref_resolve::{ReferenceResolver, component_name};
use tsgen_core::parse::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType};
use tsgen_core::storage::TransferTypes;

/// Output file and root-relative module id of a component schema.
pub fn model_location(component: &str) -> (String, String) {
    let path = qualified_path(component);
    (format!("{path}.ts"), format!("./{path}"))
}

/// Maps schemas to type expressions for one output file, registering an
/// import for every named schema it meets.
///
/// Named schemas are referenced, never expanded, so cyclic graphs map in
/// finite steps.
pub struct TypeMapper<'a> {
    resolver: &'a ReferenceResolver,
    transfer_types: &'a TransferTypes,
    deps: &'a mut DependencyManager,
    /// The component declared in this file and its local name.
    own: Option<(String, String)>,
    /// Component schemas referenced so far, in order of first reference.
    pub referenced: IndexSet<String>,
}

impl<'a> TypeMapper<'a> {
    pub fn new(
        resolver: &'a ReferenceResolver,
        transfer_types: &'a TransferTypes,
        deps: &'a mut DependencyManager,
    ) -> Self {
        Self {
            resolver,
            transfer_types,
            deps,
            own: None,
            referenced: IndexSet::new(),
        }
    }

    /// Refer to `component` by `local` instead of importing it.
    pub fn declaring(mut self, component: &str, local: &str) -> Self {
        self.own = Some((component.to_string(), local.to_string()));
        self
    }

    /// Map a schema, appending `| undefined` when it is nullable.
    pub fn map_nullable(&mut self, schema: &SchemaOrRef) -> Result<TypeExpr, PluginError> {
        let ty = self.map(schema)?;
        Ok(if self.is_nullable(schema) {
            ty.or_undefined()
        } else {
            ty
        })
    }

    /// Nullability is only read from inline schemas; a `$ref` itself is
    /// never nullable.
    pub fn is_nullable(&self, schema: &SchemaOrRef) -> bool {
        match schema {
            SchemaOrRef::Schema(s) => s.is_nullable(),
            SchemaOrRef::Ref { .. } => false,
        }
    }

    pub fn map(&mut self, schema: &SchemaOrRef) -> Result<TypeExpr, PluginError> {
        match schema {
            SchemaOrRef::Ref { ref_path } => {
                let name = component_name(ref_path)?;
                self.reference(&name, Vec::new())
            }
            SchemaOrRef::Schema(s) => self.map_schema(s),
        }
    }

    pub fn map_schema(&mut self, schema: &Schema) -> Result<TypeExpr, PluginError> {
        if let Some(var) = &schema.x_type_variable {
            return Ok(TypeExpr::named(var.as_str()));
        }

        if let Some(ref_path) = schema.wrapped_ref() {
            let name = component_name(ref_path)?;
            let args = match &schema.x_type_arguments {
                Some(args) => args
                    .all_of
                    .iter()
                    .map(|arg| self.map_nullable(arg))
                    .collect::<Result<Vec<_>, _>>()?,
                None => Vec::new(),
            };
            return self.reference(&name, args);
        }

        if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
            let members = schema
                .one_of
                .iter()
                .chain(&schema.any_of)
                .filter(|m| !is_null_schema(m))
                .map(|m| self.map(m))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(TypeExpr::union(members));
        }

        if !schema.all_of.is_empty() {
            let mut parts = schema
                .all_of
                .iter()
                .map(|m| self.map(m))
                .collect::<Result<Vec<_>, _>>()?;
            if !schema.properties.is_empty() {
                parts.push(TypeExpr::Object(self.properties(schema)?));
            }
            return Ok(match parts.len() {
                1 => parts.remove(0),
                _ => TypeExpr::Intersection(parts),
            });
        }

        if !schema.enum_values.is_empty() {
            let literals = schema
                .enum_values
                .iter()
                .map(|v| match v {
                    serde_json::Value::String(s) => TypeExpr::Literal(s.clone()),
                    serde_json::Value::Number(_) => TypeExpr::Keyword(Keyword::Number),
                    serde_json::Value::Bool(_) => TypeExpr::Keyword(Keyword::Boolean),
                    _ => TypeExpr::Keyword(Keyword::Unknown),
                });
            return Ok(TypeExpr::union(literals));
        }

        match schema.single_type() {
            Some(SchemaType::String) => Ok(match schema.format.as_deref() {
                Some("binary") => TypeExpr::named("Blob"),
                _ => TypeExpr::Keyword(Keyword::String),
            }),
            Some(SchemaType::Number) | Some(SchemaType::Integer) => {
                Ok(TypeExpr::Keyword(Keyword::Number))
            }
            Some(SchemaType::Boolean) => Ok(TypeExpr::Keyword(Keyword::Boolean)),
            Some(SchemaType::Null) => Ok(TypeExpr::Keyword(Keyword::Null)),
            Some(SchemaType::Array) => {
                let item = match &schema.items {
                    Some(items) => self.map_nullable(items)?,
                    None => TypeExpr::Keyword(Keyword::Unknown),
                };
                Ok(TypeExpr::array(item))
            }
            Some(SchemaType::Object) | None => self.map_object(schema),
        }
    }

    fn map_object(&mut self, schema: &Schema) -> Result<TypeExpr, PluginError> {
        if !schema.properties.is_empty() {
            return Ok(TypeExpr::Object(self.properties(schema)?));
        }
        let value = match &schema.additional_properties {
            Some(AdditionalProperties::Schema(value)) => self.map_nullable(value)?,
            Some(AdditionalProperties::Bool(_)) => TypeExpr::Keyword(Keyword::Unknown),
            None if schema.single_type() == Some(&SchemaType::Object) => {
                TypeExpr::Keyword(Keyword::Unknown)
            }
            None => return Ok(TypeExpr::Keyword(Keyword::Unknown)),
        };
        Ok(TypeExpr::record(TypeExpr::Keyword(Keyword::String), value))
    }

    /// Property signatures of an object schema, in declared order.
    pub fn properties(&mut self, schema: &Schema) -> Result<Vec<PropertySignature>, PluginError> {
        schema
            .properties
            .iter()
            .map(|(name, prop)| self.property(name, prop, schema.required.contains(name)))
            .collect()
    }

    /// A property is optional when it is not required or is nullable.
    pub fn property(
        &mut self,
        name: &str,
        prop: &SchemaOrRef,
        required: bool,
    ) -> Result<PropertySignature, PluginError> {
        let ty = self.map(prop)?;
        let inline = match prop {
            SchemaOrRef::Schema(s) => Some(s.as_ref()),
            SchemaOrRef::Ref { .. } => None,
        };
        Ok(PropertySignature {
            doc: inline.and_then(|s| s.description.clone()),
            name: name.to_string(),
            optional: !required || self.is_nullable(prop),
            readonly: inline.is_some_and(|s| s.read_only == Some(true)),
            ty,
        })
    }

    /// The local type name for a component schema, importing it if needed.
    pub fn reference(
        &mut self,
        component: &str,
        mut args: Vec<TypeExpr>,
    ) -> Result<TypeExpr, PluginError> {
        if let Some(target) = self.transfer_types.get(component) {
            let local = match &target.module {
                Some(module) => self.deps.import_named(module, &target.name, true)?,
                None => target.name.clone(),
            };
            return Ok(TypeExpr::generic(local, args));
        }

        let schema = self.resolver.component(component)?;
        let declared = schema.x_type_parameters.len();
        if args.len() < declared {
            args.resize(declared, TypeExpr::Keyword(Keyword::Unknown));
        }

        if let Some((own, local)) = &self.own {
            if own == component {
                return Ok(TypeExpr::generic(local.as_str(), args));
            }
        }

        let (_, module) = model_location(component);
        let local = self
            .deps
            .import_default(&module, &simple_name(component), true)?;
        self.referenced.insert(component.to_string());
        Ok(TypeExpr::generic(local, args))
    }
}

fn is_null_schema(schema: &SchemaOrRef) -> bool {
    matches!(schema, SchemaOrRef::Schema(s) if s.single_type() == Some(&SchemaType::Null) && s.properties.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use tsgen_core::config::SuffixPolicy;
    use tsgen_core::parse;
    use tsgen_core::printer::print_type;
    use tsgen_core::storage::TransferTarget;

    const DOC: &str = r##"
openapi: 3.0.1
info: {title: T, version: "1"}
paths: {}
components:
  schemas:
    com.example.Account:
      type: object
      properties:
        children:
          $ref: "#/components/schemas/com.example.Account"
    com.example.Page:
      type: object
      x-type-parameters: [T]
      properties:
        items:
          type: array
          items: {x-type-variable: T}
    java.util.UUID:
      type: string
"##;

    fn fixture() -> (ReferenceResolver, TransferTypes, DependencyManager) {
        let spec = parse::from_yaml(DOC).unwrap();
        let resolver = ReferenceResolver::new(Arc::new(spec));
        let mut transfer = TransferTypes::default();
        transfer.register("java.util.UUID", TransferTarget::global("string"));
        let deps = DependencyManager::new("com/example/AccountEndpoint.ts", ".js", SuffixPolicy::FirstKeepsName);
        (resolver, transfer, deps)
    }

    fn schema(json: &str) -> SchemaOrRef {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_primitive_and_container_types() {
        let (resolver, transfer, mut deps) = fixture();
        let mut mapper = TypeMapper::new(&resolver, &transfer, &mut deps);
        let cases = [
            (r#"{"type": "string"}"#, "string"),
            (r#"{"type": "string", "format": "binary"}"#, "Blob"),
            (r#"{"type": "integer", "format": "int64"}"#, "number"),
            (r#"{"type": "array", "items": {"type": "boolean", "nullable": true}}"#, "Array<boolean | undefined>"),
            (r#"{"type": "object", "additionalProperties": {"type": "number"}}"#, "Record<string, number>"),
            (r#"{"enum": ["A", "B"]}"#, "\"A\" | \"B\""),
            (r#"{}"#, "unknown"),
        ];
        for (input, expected) in cases {
            let ty = mapper.map(&schema(input)).unwrap();
            assert_eq!(print_type(&ty), expected, "for {input}");
        }
        assert!(mapper.referenced.is_empty());
    }

    #[test]
    fn test_reference_imports_module() {
        let (resolver, transfer, mut deps) = fixture();
        let mut mapper = TypeMapper::new(&resolver, &transfer, &mut deps);
        let ty = mapper
            .map_nullable(&schema(
                r##"{"nullable": true, "anyOf": [{"$ref": "#/components/schemas/com.example.Account"}]}"##,
            ))
            .unwrap();
        assert_eq!(print_type(&ty), "Account | undefined");
        assert_eq!(mapper.referenced.len(), 1);
        assert_eq!(
            deps.imports.origin_of("Account"),
            Some(("./Account.js", "Account"))
        );
    }

    #[test]
    fn test_generic_arguments_and_defaults() {
        let (resolver, transfer, mut deps) = fixture();
        let mut mapper = TypeMapper::new(&resolver, &transfer, &mut deps);
        let with_args = mapper
            .map(&schema(
                r##"{"anyOf": [{"$ref": "#/components/schemas/com.example.Page"}], "x-type-arguments": {"allOf": [{"type": "string"}]}}"##,
            ))
            .unwrap();
        assert_eq!(print_type(&with_args), "Page<string>");
        let bare = mapper
            .map(&SchemaOrRef::component("com.example.Page"))
            .unwrap();
        assert_eq!(print_type(&bare), "Page<unknown>");
    }

    #[test]
    fn test_transfer_type_wins_over_structure() {
        let (resolver, transfer, mut deps) = fixture();
        let mut mapper = TypeMapper::new(&resolver, &transfer, &mut deps);
        let ty = mapper.map(&SchemaOrRef::component("java.util.UUID")).unwrap();
        assert_eq!(print_type(&ty), "string");
        assert!(mapper.referenced.is_empty());
        assert!(deps.imports.is_empty());
    }

    #[test]
    fn test_self_reference_is_not_imported() {
        let (resolver, transfer, _) = fixture();
        let mut deps = DependencyManager::new("com/example/Account.ts", ".js", SuffixPolicy::FirstKeepsName);
        let mut mapper =
            TypeMapper::new(&resolver, &transfer, &mut deps).declaring("com.example.Account", "Account");
        let ty = mapper.map(&SchemaOrRef::component("com.example.Account")).unwrap();
        assert_eq!(print_type(&ty), "Account");
        assert!(mapper.referenced.is_empty());
        assert!(deps.imports.is_empty());
    }
}
