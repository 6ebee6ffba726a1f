use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{GenerateError, ParseError, ResolveError};

/// Load a document from disk and pull every schema it references in other
/// files into its own `components.schemas`, rewriting those `$ref`s to local
/// pointers.
pub fn bundle_file(path: &Path) -> Result<Value, GenerateError> {
    let root_path = canonical(path)?;
    let mut root = read_document(&root_path)?;

    let mut taken = Map::new();
    if let Some(schemas) = root.pointer("/components/schemas").and_then(Value::as_object) {
        taken = schemas.clone();
    }

    let mut bundler = Bundler {
        documents: HashMap::new(),
        imported: HashMap::new(),
        taken,
        added: Vec::new(),
    };
    let base = parent_dir(&root_path);
    bundler.rewrite(&mut root, &base, None)?;

    if !bundler.added.is_empty() {
        let schemas = schemas_mut(&mut root)?;
        for (name, schema) in bundler.added {
            log::debug!("bundled external schema {name}");
            schemas.insert(name, schema);
        }
    }
    Ok(root)
}

struct Bundler {
    documents: HashMap<PathBuf, Value>,
    /// (file, pointer) → local component name.
    imported: HashMap<(PathBuf, String), String>,
    /// Component names already in use, with their values.
    taken: Map<String, Value>,
    added: Vec<(String, Value)>,
}

impl Bundler {
    /// Walk `value`, rewriting external `$ref`s. `current` is the external
    /// file the value came from; local pointers inside it refer to that file.
    fn rewrite(
        &mut self,
        value: &mut Value,
        base: &Path,
        current: Option<&Path>,
    ) -> Result<(), GenerateError> {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(ref_path)) = map.get("$ref").cloned() {
                    let target = match ref_path.split_once('#') {
                        Some(("", fragment)) => {
                            current.map(|file| (file.to_path_buf(), fragment.to_string()))
                        }
                        Some((file, fragment)) => {
                            Some((canonical(&base.join(file))?, fragment.to_string()))
                        }
                        None => Some((canonical(&base.join(&ref_path))?, String::new())),
                    };
                    if let Some((file, pointer)) = target {
                        let name = self.import(file, pointer)?;
                        map.insert("$ref".to_string(), Value::String(local_ref(&name)));
                    }
                }
                for (key, child) in map.iter_mut() {
                    if key != "$ref" {
                        self.rewrite(child, base, current)?;
                    }
                }
                Ok(())
            }
            Value::Array(items) => items
                .iter_mut()
                .try_for_each(|item| self.rewrite(item, base, current)),
            _ => Ok(()),
        }
    }

    fn import(&mut self, file: PathBuf, pointer: String) -> Result<String, GenerateError> {
        let key = (file.clone(), pointer.clone());
        if let Some(name) = self.imported.get(&key) {
            return Ok(name.clone());
        }

        if !self.documents.contains_key(&file) {
            let document = read_document(&file)?;
            self.documents.insert(file.clone(), document);
        }
        let mut schema = self
            .documents
            .get(&file)
            .and_then(|doc| doc.pointer(&pointer))
            .cloned()
            .ok_or_else(|| {
                ResolveError::RefTargetNotFound(format!("{}#{}", file.display(), pointer))
            })?;

        let natural = natural_name(&file, &pointer);
        let name = self.free_name(&natural, &schema);
        self.imported.insert(key, name.clone());
        self.taken.insert(name.clone(), schema.clone());

        let base = parent_dir(&file);
        self.rewrite(&mut schema, &base, Some(&file))?;
        self.added.push((name.clone(), schema));
        Ok(name)
    }

    /// The natural name when free or already holding an identical schema,
    /// else the first free `name_N`.
    fn free_name(&self, natural: &str, schema: &Value) -> String {
        match self.taken.get(natural) {
            None => return natural.to_string(),
            Some(existing) if existing == schema && !self.is_added(natural) => {
                return natural.to_string();
            }
            Some(_) => {}
        }
        let mut n = 1u32;
        loop {
            let candidate = format!("{natural}_{n}");
            if !self.taken.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn is_added(&self, name: &str) -> bool {
        self.added.iter().any(|(added, _)| added == name)
            || self.imported.values().any(|imported| imported == name)
    }
}

fn natural_name(file: &Path, pointer: &str) -> String {
    pointer
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .or_else(|| {
            file.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "External".to_string())
}

fn local_ref(name: &str) -> String {
    format!(
        "#/components/schemas/{}",
        name.replace('~', "~0").replace('/', "~1")
    )
}

fn schemas_mut(root: &mut Value) -> Result<&mut Map<String, Value>, GenerateError> {
    let not_an_object = || ParseError::MissingField("components.schemas".to_string());
    let root = root.as_object_mut().ok_or_else(not_an_object)?;
    let components = root
        .entry("components")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(not_an_object)?;
    let schemas = components
        .entry("schemas")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(not_an_object)?;
    Ok(schemas)
}

fn canonical(path: &Path) -> Result<PathBuf, GenerateError> {
    fs::canonicalize(path).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Read a JSON or YAML document from disk, chosen by extension.
pub fn read_document(path: &Path) -> Result<Value, GenerateError> {
    let content = fs::read_to_string(path).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let value = if is_json {
        serde_json::from_str(&content).map_err(ParseError::from)?
    } else {
        serde_yaml_ng::from_str(&content).map_err(ParseError::from)?
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_bundles_external_schema() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "shared/common.yaml",
            "components:\n  schemas:\n    Money:\n      type: object\n      properties:\n        currency:\n          $ref: '#/components/schemas/Currency'\n    Currency:\n      type: string\n",
        );
        let root = write(
            dir.path(),
            "api.yaml",
            "openapi: 3.0.1\ninfo:\n  title: T\n  version: '1'\npaths: {}\ncomponents:\n  schemas:\n    Order:\n      type: object\n      properties:\n        total:\n          $ref: 'shared/common.yaml#/components/schemas/Money'\n",
        );

        let bundled = bundle_file(&root).unwrap();
        assert_eq!(
            bundled.pointer("/components/schemas/Order/properties/total/$ref"),
            Some(&Value::String("#/components/schemas/Money".to_string()))
        );
        assert_eq!(
            bundled.pointer("/components/schemas/Money/properties/currency/$ref"),
            Some(&Value::String("#/components/schemas/Currency".to_string()))
        );
        assert_eq!(
            bundled.pointer("/components/schemas/Currency/type"),
            Some(&Value::String("string".to_string()))
        );
    }

    #[test]
    fn test_conflicting_name_gets_suffix() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "money.json", r#"{"type": "number"}"#);
        let root = write(
            dir.path(),
            "api.yaml",
            "openapi: 3.0.1\ninfo:\n  title: T\n  version: '1'\ncomponents:\n  schemas:\n    money:\n      type: string\n    Price:\n      $ref: money.json\n",
        );

        let bundled = bundle_file(&root).unwrap();
        assert_eq!(
            bundled.pointer("/components/schemas/Price/$ref"),
            Some(&Value::String("#/components/schemas/money_1".to_string()))
        );
        assert!(bundled.pointer("/components/schemas/money_1").is_some());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let root = write(
            dir.path(),
            "api.yaml",
            "openapi: 3.0.1\ninfo:\n  title: T\n  version: '1'\ncomponents:\n  schemas:\n    A:\n      $ref: 'missing.yaml#/A'\n",
        );
        let err = bundle_file(&root).unwrap_err();
        match err {
            GenerateError::Io { path, .. } => assert!(path.ends_with("missing.yaml")),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
