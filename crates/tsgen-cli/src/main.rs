use std::collections::{BTreeSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use indexmap::IndexMap;

use tsgen_core::config::{self, CONFIG_FILE_NAME, Settings, TsgenConfig};
use tsgen_core::naming::{endpoint_name, method_name};
use tsgen_core::parse::ref_resolve::component_name;
use tsgen_core::parse::schema::{Schema, SchemaOrRef};
use tsgen_core::parse::spec::OpenApiSpec;
use tsgen_core::{DocumentSource, GeneratedFile, Generator, GeneratorOptions, load_document};
use tsgen_plugins::plugins_by_name;

#[derive(Parser)]
#[command(name = "tsgen", about = "OpenAPI 3.x to TypeScript client generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the TypeScript client
    Generate {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate an OpenAPI document and its references
    Validate {
        /// Path to the OpenAPI document
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List the endpoints, methods and reachable schemas of a document
    Inspect {
        /// Path to the OpenAPI document
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Write a default .tsgen.yaml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { input, output } => cmd_generate(input, output),

        Commands::Validate { input } => cmd_validate(input),

        Commands::Inspect { input, format } => cmd_inspect(input, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "tsgen", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load `.tsgen.yaml` from the current directory, if present.
fn try_load_config() -> Result<Option<TsgenConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).with_context(|| format!("invalid {CONFIG_FILE_NAME}"))
}

fn load_spec(path: &Path) -> Result<OpenApiSpec> {
    load_document(DocumentSource::Path(path.to_path_buf()))
        .with_context(|| format!("failed to load {}", path.display()))
}

/// Write generated files under `base`, creating directories as needed.
fn write_files(base: &Path, files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        let path = base.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("  wrote {}", path.display());
    }
    Ok(())
}

fn cmd_generate(input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let output_dir = output.unwrap_or_else(|| PathBuf::from(&cfg.output));

    let plugins = plugins_by_name(cfg.plugins.as_slice())?;
    let options = GeneratorOptions {
        output_dir: output_dir.clone(),
        settings: Settings::from(&cfg),
    };
    eprintln!("Generating {} → {}", input.display(), output_dir.display());
    log::debug!("plugins: {}", cfg.plugins.join(", "));

    let files = Generator::new(plugins, options)
        .process(DocumentSource::Path(input.clone()))
        .with_context(|| format!("failed to generate from {}", input.display()))?;

    fs::create_dir_all(&output_dir).with_context(|| {
        format!("failed to create output directory {}", output_dir.display())
    })?;
    write_files(&output_dir, &files)?;

    eprintln!("Generated {} files in {}", files.len(), output_dir.display());
    Ok(())
}

fn cmd_validate(input: PathBuf) -> Result<()> {
    let spec = load_spec(&input)?;

    eprintln!("Valid OpenAPI {} document: {}", spec.openapi, spec.info.title);
    eprintln!("  Version: {}", spec.info.version);
    eprintln!("  Paths: {}", spec.paths.len());
    let operations: usize = spec.paths.values().map(|p| p.operations().count()).sum();
    eprintln!("  Operations: {operations}");
    if let Some(components) = &spec.components {
        eprintln!("  Schemas: {}", components.schemas.len());
    }

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: PathBuf, format: InspectFormat) -> Result<()> {
    let spec = load_spec(&input)?;
    let summary = build_inspect_summary(&spec)?;

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{yaml}");
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{json}");
        }
    }

    Ok(())
}

fn schema_kind(schema: &Schema) -> &'static str {
    if !schema.enum_values.is_empty() {
        "enum"
    } else if (!schema.one_of.is_empty() || !schema.any_of.is_empty())
        && schema.properties.is_empty()
    {
        "union"
    } else if !schema.properties.is_empty() || !schema.all_of.is_empty() {
        "object"
    } else {
        "alias"
    }
}

/// Every `$ref` target below `value`.
fn collect_refs(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                match (key.as_str(), child) {
                    ("$ref", serde_json::Value::String(r)) => out.push(r.clone()),
                    _ => collect_refs(child, out),
                }
            }
        }
        serde_json::Value::Array(items) => items.iter().for_each(|i| collect_refs(i, out)),
        _ => {}
    }
}

/// Component schemas reachable from the operations, in discovery order.
fn reachable_schemas(spec: &OpenApiSpec) -> Result<Vec<String>> {
    let mut queue = VecDeque::new();
    for item in spec.paths.values() {
        for (_, op) in item.operations() {
            let mut refs = Vec::new();
            collect_refs(&serde_json::to_value(op)?, &mut refs);
            queue.extend(refs);
        }
    }

    let schemas = spec.components.as_ref().map(|c| &c.schemas);
    let mut seen = BTreeSet::new();
    let mut order = Vec::new();
    while let Some(ref_path) = queue.pop_front() {
        if !ref_path.starts_with("#/components/schemas/") {
            continue;
        }
        let name = component_name(&ref_path)?;
        if !seen.insert(name.clone()) {
            continue;
        }
        if let Some(schema) = schemas.and_then(|s| s.get(&name)) {
            let mut refs = Vec::new();
            collect_refs(&serde_json::to_value(schema)?, &mut refs);
            queue.extend(refs);
        }
        order.push(name);
    }
    Ok(order)
}

fn build_inspect_summary(spec: &OpenApiSpec) -> Result<serde_json::Value> {
    let mut endpoints: IndexMap<String, Vec<serde_json::Value>> = IndexMap::new();
    for (path, item) in &spec.paths {
        for (http, op) in item.operations() {
            let endpoint = endpoint_name(path, op);
            let method = method_name(&endpoint, http, path, op);
            endpoints.entry(endpoint).or_default().push(serde_json::json!({
                "name": method,
                "http": http.as_str(),
                "path": path,
            }));
        }
    }
    let endpoints: Vec<serde_json::Value> = endpoints
        .into_iter()
        .map(|(name, methods)| serde_json::json!({ "name": name, "methods": methods }))
        .collect();

    let schemas: Vec<serde_json::Value> = reachable_schemas(spec)?
        .into_iter()
        .map(|name| {
            let kind = match spec.components.as_ref().and_then(|c| c.schemas.get(&name)) {
                Some(SchemaOrRef::Schema(s)) => schema_kind(s),
                Some(SchemaOrRef::Ref { .. }) => "alias",
                None => "missing",
            };
            serde_json::json!({ "name": name, "kind": kind })
        })
        .collect();

    Ok(serde_json::json!({
        "info": {
            "title": spec.info.title,
            "version": spec.info.version,
        },
        "endpoints": endpoints,
        "schemas": schemas,
    }))
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsgen_core::parse;

    const EVENTS: &str = include_str!("../../tsgen-core/tests/fixtures/events.yaml");
    const PETSTORE: &str = include_str!("../../tsgen-core/tests/fixtures/petstore.yaml");

    #[test]
    fn test_write_files_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![GeneratedFile {
            path: "com/example/Account.ts".to_string(),
            content: "export default Account;\n".to_string(),
            module: "test".to_string(),
        }];
        write_files(dir.path(), &files).unwrap();
        let written = fs::read_to_string(dir.path().join("com/example/Account.ts")).unwrap();
        assert_eq!(written, "export default Account;\n");
    }

    #[test]
    fn test_inspect_summary() {
        let spec = parse::from_yaml(PETSTORE).unwrap();
        let summary = build_inspect_summary(&spec).unwrap();
        assert_eq!(summary["info"]["title"], "Petstore");
        assert_eq!(summary["endpoints"][0]["name"], "Pets");
        let methods: Vec<&str> = summary["endpoints"][0]["methods"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["name"].as_str().unwrap())
            .collect();
        assert_eq!(methods, vec!["listPets", "createPet", "delete"]);
        assert_eq!(summary["schemas"][0], serde_json::json!({"name": "Pet", "kind": "object"}));
        assert_eq!(
            summary["schemas"][1],
            serde_json::json!({"name": "PetStatus", "kind": "enum"})
        );
    }

    #[test]
    fn test_reachable_schemas_follow_unions() {
        let spec = parse::from_yaml(EVENTS).unwrap();
        assert_eq!(
            reachable_schemas(&spec).unwrap(),
            vec![
                "com.example.BaseEvent",
                "com.example.AddEvent",
                "com.example.UpdateEvent",
                "com.example.DeleteEvent"
            ]
        );
    }

    #[test]
    fn test_generate_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("openapi.yaml");
        fs::write(&input, EVENTS).unwrap();
        let output = dir.path().join("generated");
        cmd_generate(Some(input), Some(output.clone())).unwrap();
        assert!(output.join("EventEndpoint.ts").exists());
        assert!(output.join("com/example/BaseEvent.ts").exists());
    }
}
