use std::collections::HashSet;
use std::sync::Arc;

use super::components::Components;
use super::media_type::MediaType;
use super::operation::Operation;
use super::parameter::ParameterOrRef;
use super::reference::{MaybeRef, Referable};
use super::request_body::RequestBodyOrRef;
use super::response::ResponseOrRef;
use super::schema::{AdditionalProperties, Schema, SchemaOrRef};
use super::spec::OpenApiSpec;
use crate::error::ResolveError;

/// Resolves `$ref` pointers against a loaded document.
///
/// Resolution is a pure lookup: the document is shared immutably and never
/// rewritten. Cloning the resolver is cheap, so every plugin can own one.
#[derive(Debug, Clone)]
pub struct ReferenceResolver {
    spec: Arc<OpenApiSpec>,
}

impl ReferenceResolver {
    pub fn new(spec: Arc<OpenApiSpec>) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &OpenApiSpec {
        &self.spec
    }

    fn components(&self) -> Option<&Components> {
        self.spec.components.as_ref()
    }

    /// Follow a `$ref` if present, otherwise return the inline schema.
    pub fn resolve<'a>(&'a self, schema_or_ref: &'a SchemaOrRef) -> Result<&'a Schema, ResolveError> {
        match schema_or_ref {
            SchemaOrRef::Ref { ref_path } => {
                let name = component_name(ref_path)?;
                self.component(&name)
            }
            SchemaOrRef::Schema(schema) => Ok(schema),
        }
    }

    /// Look up a component schema by name, following component aliases
    /// (`A: {$ref: B}`).
    pub fn component(&self, name: &str) -> Result<&Schema, ResolveError> {
        let schemas = self
            .components()
            .map(|c| &c.schemas)
            .ok_or_else(|| ResolveError::RefTargetNotFound(name.to_string()))?;

        let mut current = name.to_string();
        let mut seen = HashSet::new();
        loop {
            if !seen.insert(current.clone()) {
                return Err(ResolveError::CircularRef(name.to_string()));
            }
            match schemas.get(&current) {
                Some(SchemaOrRef::Schema(schema)) => return Ok(schema),
                Some(SchemaOrRef::Ref { ref_path }) => current = component_name(ref_path)?,
                None => return Err(ResolveError::RefTargetNotFound(current)),
            }
        }
    }

    /// Whether a component schema of this name exists.
    pub fn has_component(&self, name: &str) -> bool {
        self.components()
            .is_some_and(|c| c.schemas.contains_key(name))
    }

    /// Names of all component schemas in document order.
    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components()
            .into_iter()
            .flat_map(|c| c.schemas.keys().map(String::as_str))
    }

    /// Resolve a parameter, request body or response, following chains of
    /// component references.
    pub fn resolve_item<'a, T: Referable>(
        &'a self,
        item: &'a MaybeRef<T>,
    ) -> Result<&'a T, ResolveError> {
        let mut current = item;
        let mut seen = HashSet::new();
        loop {
            let ref_path = match current {
                MaybeRef::Item(found) => return Ok(found),
                MaybeRef::Ref { ref_path } => ref_path,
            };
            if !seen.insert(ref_path.as_str()) {
                return Err(ResolveError::CircularRef(ref_path.clone()));
            }
            let name = parse_ref_name(ref_path, T::SECTION)?;
            current = self
                .components()
                .and_then(|c| T::section(c).get(&name))
                .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
        }
    }
}

/// Extract the component schema name from `#/components/schemas/{name}`.
pub fn component_name(ref_path: &str) -> Result<String, ResolveError> {
    parse_ref_name(ref_path, "schemas")
}

/// Parse a `$ref` path like `#/components/schemas/Foo` and extract the name,
/// undoing JSON pointer escapes.
fn parse_ref_name(ref_path: &str, expected_section: &str) -> Result<String, ResolveError> {
    let stripped = ref_path
        .strip_prefix("#/components/")
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    let (section, name) = stripped
        .split_once('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    if section != expected_section {
        return Err(ResolveError::InvalidRefFormat(format!(
            "expected section '{}', got '{}' in {}",
            expected_section, section, ref_path
        )));
    }
    Ok(name.replace("~1", "/").replace("~0", "~"))
}

/// Check that every `$ref` in the document points at an existing target.
///
/// Runs once before any plugin so that dangling references abort the run
/// instead of surfacing halfway through generation.
pub fn validate_references(spec: &OpenApiSpec) -> Result<(), ResolveError> {
    let resolver = ReferenceResolver::new(Arc::new(spec.clone()));
    let validator = Validator {
        resolver: &resolver,
    };

    for item in spec.paths.values() {
        for p in &item.parameters {
            validator.parameter(p)?;
        }
        for (_, op) in item.operations() {
            validator.operation(op)?;
        }
    }

    if let Some(components) = &spec.components {
        for (name, schema) in &components.schemas {
            validator.schema(schema)?;
            resolver.component(name)?;
        }
        for p in components.parameters.values() {
            validator.parameter(p)?;
        }
        for rb in components.request_bodies.values() {
            validator.request_body(rb)?;
        }
        for r in components.responses.values() {
            validator.response(r)?;
        }
    }
    Ok(())
}

struct Validator<'a> {
    resolver: &'a ReferenceResolver,
}

impl Validator<'_> {
    fn operation(&self, op: &Operation) -> Result<(), ResolveError> {
        for p in &op.parameters {
            self.parameter(p)?;
        }
        if let Some(body) = &op.request_body {
            self.request_body(body)?;
        }
        for resp in op.responses.values() {
            self.response(resp)?;
        }
        Ok(())
    }

    fn parameter(&self, param: &ParameterOrRef) -> Result<(), ResolveError> {
        let p = self.resolver.resolve_item(param)?;
        if let Some(schema) = &p.schema {
            self.schema(schema)?;
        }
        Ok(())
    }

    fn request_body(&self, body: &RequestBodyOrRef) -> Result<(), ResolveError> {
        let rb = self.resolver.resolve_item(body)?;
        rb.content.values().try_for_each(|mt| self.media_type(mt))
    }

    fn response(&self, resp: &ResponseOrRef) -> Result<(), ResolveError> {
        let r = self.resolver.resolve_item(resp)?;
        r.content.values().try_for_each(|mt| self.media_type(mt))
    }

    fn media_type(&self, mt: &MediaType) -> Result<(), ResolveError> {
        match &mt.schema {
            Some(schema) => self.schema(schema),
            None => Ok(()),
        }
    }

    fn schema(&self, schema_or_ref: &SchemaOrRef) -> Result<(), ResolveError> {
        let schema = match schema_or_ref {
            SchemaOrRef::Ref { .. } => {
                // Targets are validated on their own as components.
                self.resolver.resolve(schema_or_ref)?;
                return Ok(());
            }
            SchemaOrRef::Schema(schema) => schema,
        };

        for prop in schema.properties.values() {
            self.schema(prop)?;
        }
        if let Some(items) = &schema.items {
            self.schema(items)?;
        }
        for sub in schema
            .all_of
            .iter()
            .chain(&schema.one_of)
            .chain(&schema.any_of)
        {
            self.schema(sub)?;
        }
        if let Some(AdditionalProperties::Schema(s)) = &schema.additional_properties {
            self.schema(s)?;
        }
        if let Some(args) = &schema.x_type_arguments {
            for arg in &args.all_of {
                self.schema(arg)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::response::Response;

    fn spec_with(schemas: Vec<(&str, SchemaOrRef)>) -> OpenApiSpec {
        let mut spec = OpenApiSpec::empty("Test");
        let mut components = Components::default();
        for (name, schema) in schemas {
            components.schemas.insert(name.to_string(), schema);
        }
        spec.components = Some(components);
        spec
    }

    #[test]
    fn test_resolve_inline_returns_input() {
        let resolver = ReferenceResolver::new(Arc::new(OpenApiSpec::empty("Test")));
        let inline = SchemaOrRef::Schema(Box::new(Schema {
            description: Some("inline".to_string()),
            ..Schema::default()
        }));
        let resolved = resolver.resolve(&inline).unwrap();
        assert_eq!(resolved.description.as_deref(), Some("inline"));
    }

    #[test]
    fn test_resolve_follows_alias_chain() {
        let spec = spec_with(vec![
            ("A", SchemaOrRef::component("B")),
            (
                "B",
                SchemaOrRef::Schema(Box::new(Schema {
                    title: Some("B".to_string()),
                    ..Schema::default()
                })),
            ),
        ]);
        let resolver = ReferenceResolver::new(Arc::new(spec));
        let binding = SchemaOrRef::component("A");
        let resolved = resolver.resolve(&binding).unwrap();
        assert_eq!(resolved.title.as_deref(), Some("B"));
    }

    #[test]
    fn test_alias_cycle_is_an_error() {
        let spec = spec_with(vec![
            ("A", SchemaOrRef::component("B")),
            ("B", SchemaOrRef::component("A")),
        ]);
        let resolver = ReferenceResolver::new(Arc::new(spec));
        assert!(matches!(
            resolver.component("A"),
            Err(ResolveError::CircularRef(_))
        ));
    }

    #[test]
    fn test_missing_target() {
        let resolver = ReferenceResolver::new(Arc::new(spec_with(vec![])));
        let err = resolver.resolve(&SchemaOrRef::component("Nope")).unwrap_err();
        assert!(matches!(err, ResolveError::RefTargetNotFound(name) if name == "Nope"));
    }

    #[test]
    fn test_pointer_escapes() {
        assert_eq!(
            component_name("#/components/schemas/a~1b~0c").unwrap(),
            "a/b~c"
        );
        assert!(component_name("#/definitions/Foo").is_err());
    }

    #[test]
    fn test_validate_reports_dangling_property_ref() {
        let spec = spec_with(vec![(
            "Account",
            SchemaOrRef::Schema(Box::new(Schema {
                properties: [("group".to_string(), SchemaOrRef::component("Group"))]
                    .into_iter()
                    .collect(),
                ..Schema::default()
            })),
        )]);
        let err = validate_references(&spec).unwrap_err();
        assert!(matches!(err, ResolveError::RefTargetNotFound(name) if name == "Group"));
    }

    #[test]
    fn test_resolve_item_follows_component_refs() {
        let mut spec = spec_with(vec![]);
        let components = spec.components.get_or_insert_with(Components::default);
        components.responses.insert(
            "Empty".to_string(),
            MaybeRef::Item(Response {
                description: "nothing".to_string(),
                ..Response::default()
            }),
        );
        components.responses.insert(
            "NoContent".to_string(),
            MaybeRef::Ref {
                ref_path: "#/components/responses/Empty".to_string(),
            },
        );
        let resolver = ReferenceResolver::new(Arc::new(spec));
        let response: ResponseOrRef = MaybeRef::Ref {
            ref_path: "#/components/responses/NoContent".to_string(),
        };
        assert_eq!(resolver.resolve_item(&response).unwrap().description, "nothing");

        let wrong_section: ResponseOrRef = MaybeRef::Ref {
            ref_path: "#/components/schemas/Empty".to_string(),
        };
        assert!(matches!(
            resolver.resolve_item(&wrong_section),
            Err(ResolveError::InvalidRefFormat(_))
        ));
    }
}
