//! Shared by the plugins that replace a backbone wrapper with another shape.

use tsgen_core::ast::{Declaration, Expr, FunctionDecl, Param, Statement};
use tsgen_core::error::PluginError;
use tsgen_core::parse::ref_resolve::component_name;
use tsgen_core::parse::schema::SchemaOrRef;
use tsgen_core::storage::SourceFile;

/// The parts of a backbone wrapper a replacement keeps.
pub struct ExistingMethod {
    pub doc: Option<String>,
    /// Declared parameters without the trailing request init.
    pub params: Vec<Param>,
    /// The `{ ... }` parameter object passed to the client.
    pub params_object: Expr,
}

pub fn existing_method(file: &SourceFile, local: &str) -> Result<ExistingMethod, PluginError> {
    let Some(Declaration::Function(f)) = file.declaration(local) else {
        return Err(PluginError::Invalid(format!(
            "no endpoint function {local} in {}",
            file.path
        )));
    };
    let params_object = f
        .body
        .iter()
        .find_map(|Statement::Return(expr)| match expr {
            Expr::Call { args, .. } => args.iter().find(|a| matches!(a, Expr::Object(_))).cloned(),
            _ => None,
        })
        .unwrap_or(Expr::Object(Vec::new()));
    Ok(ExistingMethod {
        doc: f.doc.clone(),
        params: f.params.iter().filter(|p| !p.optional).cloned().collect(),
        params_object,
    })
}

/// Swap the function named `replacement.name` for `replacement`.
pub fn replace_method(file: &mut SourceFile, replacement: FunctionDecl) -> Result<(), PluginError> {
    let path = file.path.clone();
    match file.declaration_mut(&replacement.name) {
        Some(slot) if matches!(slot, Declaration::Function(_)) => {
            *slot = Declaration::Function(replacement);
            Ok(())
        }
        _ => Err(PluginError::Invalid(format!(
            "no endpoint function {} in {path}",
            replacement.name
        ))),
    }
}

/// The component a schema refers to, directly or through a wrapper.
pub fn referenced_component(schema: &SchemaOrRef) -> Result<Option<String>, PluginError> {
    let ref_path = match schema {
        SchemaOrRef::Ref { ref_path } => Some(ref_path.as_str()),
        SchemaOrRef::Schema(s) => s.wrapped_ref(),
    };
    Ok(ref_path.map(component_name).transpose()?)
}

/// First `x-type-arguments` entry of a wrapped reference.
pub fn first_type_argument(schema: &SchemaOrRef) -> Option<&SchemaOrRef> {
    match schema {
        SchemaOrRef::Schema(s) => s.x_type_arguments.as_ref()?.all_of.first(),
        SchemaOrRef::Ref { .. } => None,
    }
}
