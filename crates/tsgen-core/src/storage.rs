use std::path::PathBuf;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::ast::{Declaration, Expr};
use crate::config::{Settings, SuffixPolicy};
use crate::dependency::DependencyManager;
use crate::error::PluginError;
use crate::parse::ref_resolve::ReferenceResolver;
use crate::parse::schema::SchemaOrRef;
use crate::parse::spec::OpenApiSpec;

/// One output module under construction.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path relative to the output root, e.g. `com/example/Account.ts`.
    pub path: String,
    /// Path of the plugin that created the file.
    pub origin: String,
    pub dependencies: DependencyManager,
    pub declarations: Vec<Declaration>,
}

impl SourceFile {
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name() == name)
    }

    pub fn declaration_mut(&mut self, name: &str) -> Option<&mut Declaration> {
        self.declarations.iter_mut().find(|d| d.name() == name)
    }
}

/// All output modules of a run, in creation order.
#[derive(Debug, Clone)]
pub struct Sources {
    files: IndexMap<String, SourceFile>,
    extension: String,
    policy: SuffixPolicy,
}

impl Sources {
    pub fn new(extension: impl Into<String>, policy: SuffixPolicy) -> Self {
        Self {
            files: IndexMap::new(),
            extension: extension.into(),
            policy,
        }
    }

    /// The file at `path`, created empty on first use.
    pub fn get_or_create(&mut self, path: &str, origin: &str) -> &mut SourceFile {
        let (extension, policy) = (&self.extension, self.policy);
        self.files
            .entry(path.to_string())
            .or_insert_with(|| SourceFile {
                path: path.to_string(),
                origin: origin.to_string(),
                dependencies: DependencyManager::new(path, extension, policy),
                declarations: Vec::new(),
            })
    }

    pub fn get(&self, path: &str) -> Option<&SourceFile> {
        self.files.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut SourceFile> {
        self.files.get_mut(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// The client type substituted for a backend schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferTarget {
    /// Identifier in the client code, or a type keyword such as `string`.
    pub name: String,
    /// Module to import `name` from; `None` for globals and keywords.
    pub module: Option<String>,
}

impl TransferTarget {
    pub fn global(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: None,
        }
    }

    pub fn imported(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: Some(module.into()),
        }
    }
}

/// Schema name → transfer target.
#[derive(Debug, Clone, Default)]
pub struct TransferTypes {
    entries: IndexMap<String, TransferTarget>,
}

impl TransferTypes {
    pub fn register(&mut self, schema: impl Into<String>, target: TransferTarget) {
        self.entries.insert(schema.into(), target);
    }

    pub fn get(&self, schema: &str) -> Option<&TransferTarget> {
        self.entries.get(schema)
    }

    pub fn contains(&self, schema: &str) -> bool {
        self.entries.contains_key(schema)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TransferTarget)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A parameter of an endpoint method, in declared order.
#[derive(Debug, Clone)]
pub struct ParamRecord {
    pub name: String,
    pub schema: Option<SchemaOrRef>,
    pub nullable: bool,
}

#[derive(Debug, Clone)]
pub struct MethodRecord {
    /// Method name on the wire.
    pub name: String,
    /// Name of the generated function in the endpoint file.
    pub local: String,
    pub params: Vec<ParamRecord>,
    pub response: Option<SchemaOrRef>,
    pub response_nullable: bool,
}

#[derive(Debug, Clone)]
pub struct EndpointRecord {
    pub name: String,
    pub file: String,
    pub methods: Vec<MethodRecord>,
}

/// Written by the backbone plugin.
#[derive(Debug, Clone, Default)]
pub struct BackboneOutput {
    pub endpoints: Vec<EndpointRecord>,
    /// Component schemas referenced from endpoint signatures, in order of
    /// first reference.
    pub referenced_schemas: IndexSet<String>,
}

#[derive(Debug, Clone)]
pub struct ModelRecord {
    pub file: String,
    /// Root-relative module id, e.g. `./com/example/Account`.
    pub module: String,
    pub identifier: String,
    /// Expression building an empty instance of the model.
    pub empty_value: Expr,
}

/// Written by the model plugin.
#[derive(Debug, Clone, Default)]
pub struct ModelOutput {
    /// Component name → generated model.
    pub models: IndexMap<String, ModelRecord>,
}

/// Typed slots plugins use to hand results to later plugins.
///
/// A slot is written by exactly one plugin and may only be read by plugins
/// that run after it.
#[derive(Debug, Clone, Default)]
pub struct PluginStorage {
    pub backbone: Option<BackboneOutput>,
    pub models: Option<ModelOutput>,
}

/// Mutable state of one generation run.
#[derive(Debug, Clone)]
pub struct SharedStorage {
    pub api: Arc<OpenApiSpec>,
    pub resolver: ReferenceResolver,
    pub sources: Sources,
    pub plugin_storage: PluginStorage,
    pub transfer_types: TransferTypes,
    pub settings: Settings,
    pub output_dir: PathBuf,
}

impl SharedStorage {
    pub fn new(api: Arc<OpenApiSpec>, settings: Settings, output_dir: PathBuf) -> Self {
        Self {
            resolver: ReferenceResolver::new(Arc::clone(&api)),
            sources: Sources::new(&settings.output.extension, settings.suffix_policy),
            api,
            plugin_storage: PluginStorage::default(),
            transfer_types: TransferTypes::default(),
            settings,
            output_dir,
        }
    }

    pub fn require_backbone(&self, reader: &str) -> Result<&BackboneOutput, PluginError> {
        self.plugin_storage
            .backbone
            .as_ref()
            .ok_or_else(|| PluginError::MissingSlot {
                slot: "backbone",
                reader: reader.to_string(),
            })
    }

    pub fn require_models(&self, reader: &str) -> Result<&ModelOutput, PluginError> {
        self.plugin_storage
            .models
            .as_ref()
            .ok_or_else(|| PluginError::MissingSlot {
                slot: "models",
                reader: reader.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> SharedStorage {
        SharedStorage::new(
            Arc::new(OpenApiSpec::empty("Test")),
            Settings::default(),
            PathBuf::from("out"),
        )
    }

    #[test]
    fn test_get_or_create_keeps_first_origin() {
        let mut s = storage();
        s.sources.get_or_create("A.ts", "backbone");
        let file = s.sources.get_or_create("A.ts", "model");
        assert_eq!(file.origin, "backbone");
        assert_eq!(s.sources.len(), 1);
    }

    #[test]
    fn test_missing_slot_names_reader() {
        let s = storage();
        let err = s.require_backbone("tsgen_plugins::model").unwrap_err();
        assert!(matches!(
            err,
            PluginError::MissingSlot { slot: "backbone", ref reader } if reader == "tsgen_plugins::model"
        ));
    }
}
