use std::path::PathBuf;
use std::sync::Arc;

use crate::GeneratedFile;
use crate::config::Settings;
use crate::emit::emit;
use crate::error::GenerateError;
use crate::parse;
use crate::parse::external::bundle_file;
use crate::parse::ref_resolve::validate_references;
use crate::parse::spec::OpenApiSpec;
use crate::plugin::{PluginContext, PluginFactory, PluginLogger};
use crate::storage::SharedStorage;

/// Where the input document comes from.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// JSON or YAML text.
    Text(String),
    /// A file on disk; references to other files are bundled.
    Path(PathBuf),
    /// An already parsed document.
    Parsed(serde_json::Value),
}

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Where the caller will write the files; only used for reporting.
    pub output_dir: PathBuf,
    pub settings: Settings,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("generated"),
            settings: Settings::default(),
        }
    }
}

/// Runs an ordered list of plugins over a document and emits the result.
#[derive(Debug, Clone)]
pub struct Generator {
    plugins: Vec<PluginFactory>,
    options: GeneratorOptions,
}

impl Generator {
    pub fn new(plugins: Vec<PluginFactory>, options: GeneratorOptions) -> Self {
        Self { plugins, options }
    }

    /// Generate all files for one document. Any plugin failure aborts the
    /// run and no files are returned.
    pub fn process(&self, source: DocumentSource) -> Result<Vec<GeneratedFile>, GenerateError> {
        let api = load_document(source)?;
        log::info!(
            "generating client for {} ({} paths)",
            api.info.title,
            api.paths.len()
        );

        let logger = PluginLogger::new(module_path!(), api.info.title.clone());
        let mut storage = SharedStorage::new(
            Arc::new(api),
            self.options.settings.clone(),
            self.options.output_dir.clone(),
        );

        for factory in &self.plugins {
            let mut plugin = factory(PluginContext {
                resolver: storage.resolver.clone(),
                logger: logger.clone(),
            });
            let path = plugin.path().to_string();
            log::debug!("executing plugin {path}");
            plugin
                .execute(&mut storage)
                .map_err(|source| GenerateError::Plugin {
                    plugin: path,
                    source,
                })?;
        }

        let files = emit(&storage.sources);
        for file in &files {
            log::debug!(
                "emitted {} from {}",
                self.options.output_dir.join(&file.path).display(),
                file.module
            );
        }
        Ok(files)
    }
}

/// Load, bundle and validate a document without running any plugin.
pub fn load_document(source: DocumentSource) -> Result<OpenApiSpec, GenerateError> {
    let spec = match source {
        DocumentSource::Text(text) => parse::from_text(&text)?,
        DocumentSource::Path(path) => {
            log::debug!("loading {}", path.display());
            parse::from_value(bundle_file(&path)?)?
        }
        DocumentSource::Parsed(value) => parse::from_value(value)?,
    };
    validate_references(&spec)?;
    Ok(spec)
}
