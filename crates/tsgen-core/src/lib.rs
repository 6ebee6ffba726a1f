pub mod ast;
pub mod config;
pub mod dependency;
pub mod emit;
pub mod error;
pub mod generator;
pub mod naming;
pub mod parse;
pub mod plugin;
pub mod printer;
pub mod storage;

pub use generator::{DocumentSource, Generator, GeneratorOptions, load_document};
pub use plugin::{Plugin, PluginContext, PluginFactory, PluginLogger};
pub use storage::SharedStorage;

/// A generated file with path, content and the plugin that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
    pub module: String,
}
