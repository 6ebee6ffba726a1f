use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ConfigError;

/// Top-level project configuration loaded from `.tsgen.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TsgenConfig {
    pub input: String,
    pub output: String,
    /// Plugin names in execution order.
    pub plugins: Vec<String>,
    pub naming: NamingConfig,
    pub output_options: OutputOptions,
    /// Schema name → client type, layered over the built-in transfer types.
    pub transfer_types: IndexMap<String, TransferTypeConfig>,
    /// Backend classes whose responses are streamed to a subscription.
    pub push_classes: Vec<String>,
}

impl Default for TsgenConfig {
    fn default() -> Self {
        Self {
            input: "openapi.json".to_string(),
            output: "frontend/generated".to_string(),
            plugins: DEFAULT_PLUGINS.iter().map(|p| p.to_string()).collect(),
            naming: NamingConfig::default(),
            output_options: OutputOptions::default(),
            transfer_types: IndexMap::new(),
            push_classes: DEFAULT_PUSH_CLASSES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Built-in plugin order. Transfer types must come first, backbone before
/// everything that reads endpoint records.
pub const DEFAULT_PLUGINS: &[&str] = &[
    "transfer-types",
    "backbone",
    "model",
    "subtypes",
    "push",
    "signals",
];

pub const DEFAULT_PUSH_CLASSES: &[&str] = &[
    "reactor.core.publisher.Flux",
    "com.vaadin.hilla.runtime.transfertypes.EndpointSubscription",
];

/// Identifier collision handling.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub collision_suffix: SuffixPolicy,
}

/// How colliding bindings in one file are renamed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuffixPolicy {
    /// The first registrant keeps the bare name; later ones get `_1`, `_2`, …
    #[default]
    FirstKeepsName,
    /// Every import binding is suffixed, starting at `_1`.
    AlwaysSuffix,
}

/// Output module conventions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// Extension appended to relative import specifiers.
    pub extension: String,
    /// Package providing the endpoint runtime types.
    pub frontend_package: String,
    /// Package providing the signal channel types.
    pub signals_package: String,
    /// Root-relative module exporting the default client instance.
    pub client_module: String,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            extension: ".js".to_string(),
            frontend_package: "@vaadin/hilla-frontend".to_string(),
            signals_package: "@vaadin/hilla-react-signals".to_string(),
            client_module: "./connect-client.default".to_string(),
        }
    }
}

/// A configured transfer type: the client identifier and, unless it is a
/// global, the module it is imported from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransferTypeConfig {
    pub name: String,
    #[serde(default)]
    pub module: Option<String>,
}

/// The part of the configuration a generation run sees.
#[derive(Debug, Clone)]
pub struct Settings {
    pub suffix_policy: SuffixPolicy,
    pub output: OutputOptions,
    pub transfer_types: IndexMap<String, TransferTypeConfig>,
    pub push_classes: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(&TsgenConfig::default())
    }
}

impl From<&TsgenConfig> for Settings {
    fn from(config: &TsgenConfig) -> Self {
        Self {
            suffix_policy: config.naming.collision_suffix,
            output: config.output_options.clone(),
            transfer_types: config.transfer_types.clone(),
            push_classes: config.push_classes.clone(),
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".tsgen.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<TsgenConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: TsgenConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# tsgen configuration
input: openapi.json
output: frontend/generated

# Plugins run in this order; later plugins read what earlier ones stored.
plugins:
  - transfer-types
  - backbone
  - model
  - subtypes
  - push
  - signals

naming:
  collision_suffix: first_keeps_name  # first_keeps_name | always_suffix

output_options:
  extension: .js
  frontend_package: "@vaadin/hilla-frontend"
  signals_package: "@vaadin/hilla-react-signals"
  client_module: ./connect-client.default

transfer_types: {}
  # java.time.LocalDate:
  #   name: string
  # com.example.Money:
  #   name: Money
  #   module: ./money

push_classes:
  - reactor.core.publisher.Flux
  - com.vaadin.hilla.runtime.transfertypes.EndpointSubscription
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TsgenConfig::default();
        assert_eq!(config.input, "openapi.json");
        assert_eq!(config.output, "frontend/generated");
        assert_eq!(config.plugins, DEFAULT_PLUGINS);
        assert_eq!(config.naming.collision_suffix, SuffixPolicy::FirstKeepsName);
        assert_eq!(config.output_options.extension, ".js");
        assert!(config.transfer_types.is_empty());
        assert_eq!(config.push_classes.len(), 2);
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
input: api.yaml
output: out
plugins: [transfer-types, backbone, model]
naming:
  collision_suffix: always_suffix
output_options:
  extension: ""
  client_module: ./client
transfer_types:
  java.time.LocalDate:
    name: string
  com.example.Money:
    name: Money
    module: ./money
"#;
        let config: TsgenConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.input, "api.yaml");
        assert_eq!(config.plugins, vec!["transfer-types", "backbone", "model"]);
        assert_eq!(config.naming.collision_suffix, SuffixPolicy::AlwaysSuffix);
        assert_eq!(config.output_options.extension, "");
        assert_eq!(config.output_options.client_module, "./client");
        // Untouched nested fields keep their defaults
        assert_eq!(config.output_options.frontend_package, "@vaadin/hilla-frontend");
        assert_eq!(config.transfer_types.len(), 2);
        assert_eq!(
            config.transfer_types["com.example.Money"].module.as_deref(),
            Some("./money")
        );
        assert_eq!(config.transfer_types["java.time.LocalDate"].module, None);
    }

    #[test]
    fn test_default_content_parses_to_defaults() {
        let config: TsgenConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        let defaults = TsgenConfig::default();
        assert_eq!(config.plugins, defaults.plugins);
        assert_eq!(config.push_classes, defaults.push_classes);
        assert_eq!(config.output_options.client_module, defaults.output_options.client_module);
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(loaded.is_none());
    }
}
