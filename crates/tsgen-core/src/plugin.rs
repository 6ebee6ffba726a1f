use std::fmt::Display;

use crate::error::PluginError;
use crate::parse::ref_resolve::ReferenceResolver;
use crate::storage::SharedStorage;

/// A generation pass. Plugins run one after another over the same storage.
pub trait Plugin {
    /// Identity used in logs and error reports.
    fn path(&self) -> &str;

    fn execute(&mut self, storage: &mut SharedStorage) -> Result<(), PluginError>;
}

/// What every plugin receives at construction.
#[derive(Debug, Clone)]
pub struct PluginContext {
    pub resolver: ReferenceResolver,
    pub logger: PluginLogger,
}

pub type PluginFactory = fn(PluginContext) -> Box<dyn Plugin>;

/// Logger handed to plugins. Messages carry the document title and go to
/// the plugin's own log target once [`PluginLogger::scoped`] is applied.
#[derive(Debug, Clone)]
pub struct PluginLogger {
    target: String,
    run: String,
}

impl PluginLogger {
    pub fn new(target: impl Into<String>, run: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            run: run.into(),
        }
    }

    /// The same logger writing under `target`, usually `module_path!()`.
    pub fn scoped(&self, target: &str) -> Self {
        Self {
            target: target.to_string(),
            run: self.run.clone(),
        }
    }

    pub fn debug(&self, message: impl Display) {
        log::debug!(target: self.target.as_str(), "[{}] {}", self.run, message);
    }

    pub fn info(&self, message: impl Display) {
        log::info!(target: self.target.as_str(), "[{}] {}", self.run, message);
    }
}
