//! Per-file bookkeeping of imports, exports and top-level names.

pub mod export_manager;
pub mod import_manager;
pub mod path_processor;
pub mod scope;

use std::collections::HashSet;

pub use export_manager::ExportManager;
pub use import_manager::{ImportBinding, ImportManager};
pub use path_processor::PathProcessor;
pub use scope::IdentifierScope;

use crate::config::SuffixPolicy;
use crate::error::DependencyError;

#[derive(Debug, Clone)]
pub struct DependencyManager {
    pub paths: PathProcessor,
    pub imports: ImportManager,
    pub exports: ExportManager,
    scope: IdentifierScope,
    policy: SuffixPolicy,
}

impl DependencyManager {
    pub fn new(file_path: &str, extension: &str, policy: SuffixPolicy) -> Self {
        Self {
            paths: PathProcessor::new(file_path, extension),
            imports: ImportManager::new(),
            exports: ExportManager::new(),
            scope: IdentifierScope::new(file_path),
            policy,
        }
    }

    /// Register a default import of `module` and return the local name to
    /// use for it. `module` is a package name or an id relative to the
    /// output root (`./com/example/Account`).
    pub fn import_default(
        &mut self,
        module: &str,
        id: &str,
        is_type: bool,
    ) -> Result<String, DependencyError> {
        let specifier = self.paths.process(module);
        if let Some(local) = self.imports.existing_default(&specifier, is_type) {
            return Ok(local);
        }
        let local = self.bind_import(id)?;
        self.imports.add_default(
            &specifier,
            id,
            ImportBinding {
                local: local.clone(),
                is_type,
            },
        );
        Ok(local)
    }

    /// Register a named import `id` of `module`.
    pub fn import_named(
        &mut self,
        module: &str,
        id: &str,
        is_type: bool,
    ) -> Result<String, DependencyError> {
        let specifier = self.paths.process(module);
        if let Some(local) = self.imports.existing_named(&specifier, id, is_type) {
            return Ok(local);
        }
        let local = self.bind_import(id)?;
        self.imports.add_named(
            &specifier,
            id,
            ImportBinding {
                local: local.clone(),
                is_type,
            },
        );
        Ok(local)
    }

    /// Bind a top-level declaration name in this file.
    pub fn declare(&mut self, id: &str) -> Result<String, DependencyError> {
        self.scope.bind(id, false)
    }

    pub fn is_bound(&self, id: &str) -> bool {
        self.scope.is_taken(id)
    }

    fn bind_import(&mut self, id: &str) -> Result<String, DependencyError> {
        let force = self.policy == SuffixPolicy::AlwaysSuffix;
        self.scope.bind(id, force)
    }

    pub fn render_imports(&self, used: &HashSet<String>) -> Vec<String> {
        self.imports.render(used)
    }

    pub fn render_exports(&self) -> Vec<String> {
        self.exports.render()
    }
}
