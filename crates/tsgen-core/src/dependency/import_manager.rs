use std::cmp::Ordering;
use std::collections::HashSet;

use indexmap::IndexMap;

use crate::printer::quote;

/// A bound import: the local name and whether only types flow through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub local: String,
    pub is_type: bool,
}

#[derive(Debug, Clone, Default)]
struct ModuleImports {
    default: Option<(String, ImportBinding)>,
    /// Imported name → binding.
    named: IndexMap<String, ImportBinding>,
}

/// Import records of one file, keyed by processed module specifier.
#[derive(Debug, Clone, Default)]
pub struct ImportManager {
    modules: IndexMap<String, ModuleImports>,
}

impl ImportManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The binding already registered for this default import, upgraded to a
    /// value import when `is_type` is false.
    pub fn existing_default(&mut self, specifier: &str, is_type: bool) -> Option<String> {
        let (_, binding) = self.modules.get_mut(specifier)?.default.as_mut()?;
        binding.is_type &= is_type;
        Some(binding.local.clone())
    }

    pub fn existing_named(&mut self, specifier: &str, id: &str, is_type: bool) -> Option<String> {
        let binding = self.modules.get_mut(specifier)?.named.get_mut(id)?;
        binding.is_type &= is_type;
        Some(binding.local.clone())
    }

    pub fn add_default(&mut self, specifier: &str, id: &str, binding: ImportBinding) {
        self.modules.entry(specifier.to_string()).or_default().default =
            Some((id.to_string(), binding));
    }

    pub fn add_named(&mut self, specifier: &str, id: &str, binding: ImportBinding) {
        self.modules
            .entry(specifier.to_string())
            .or_default()
            .named
            .insert(id.to_string(), binding);
    }

    /// Look up which module and imported name a local binding came from.
    pub fn origin_of(&self, local: &str) -> Option<(&str, &str)> {
        self.modules.iter().find_map(|(specifier, imports)| {
            let default = imports
                .default
                .as_ref()
                .filter(|(_, b)| b.local == local)
                .map(|(id, _)| id.as_str());
            let named = imports
                .named
                .iter()
                .find(|(_, b)| b.local == local)
                .map(|(id, _)| id.as_str());
            default.or(named).map(|id| (specifier.as_str(), id))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Import statements for the bindings in `used`, ordered packages first,
    /// then relative modules, each group collated; per module the default
    /// import precedes the named one.
    pub fn render(&self, used: &HashSet<String>) -> Vec<String> {
        let mut specifiers: Vec<&String> = self.modules.keys().collect();
        specifiers.sort_by(|a, b| compare_specifiers(a, b));

        let mut lines = Vec::new();
        for specifier in specifiers {
            let imports = &self.modules[specifier.as_str()];
            let from = quote(specifier);

            if let Some((_, binding)) = &imports.default {
                if used.contains(&binding.local) {
                    let kw = if binding.is_type { "import type" } else { "import" };
                    lines.push(format!("{kw} {} from {from};", binding.local));
                }
            }

            let mut named: Vec<(&String, &ImportBinding)> = imports
                .named
                .iter()
                .filter(|(_, b)| used.contains(&b.local))
                .collect();
            if named.is_empty() {
                continue;
            }
            named.sort_by(|(a, _), (b, _)| collate(a, b));
            let all_types = named.iter().all(|(_, b)| b.is_type);
            let specs = named
                .iter()
                .map(|(id, b)| {
                    let prefix = if b.is_type && !all_types { "type " } else { "" };
                    if **id == b.local {
                        format!("{prefix}{id}")
                    } else {
                        format!("{prefix}{id} as {}", b.local)
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
            let kw = if all_types { "import type" } else { "import" };
            lines.push(format!("{kw} {{ {specs} }} from {from};"));
        }
        lines
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

fn compare_specifiers(a: &str, b: &str) -> Ordering {
    is_relative(a)
        .cmp(&is_relative(b))
        .then_with(|| collate(a, b))
}

/// Case-insensitive ordering with lowercase sorting before uppercase when
/// two strings differ only in case.
pub fn collate(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    primary.then_with(|| {
        a.chars()
            .zip(b.chars())
            .find(|(x, y)| x != y)
            .map(|(x, y)| match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => x.cmp(&y),
            })
            .unwrap_or_else(|| a.len().cmp(&b.len()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn used(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn binding(local: &str, is_type: bool) -> ImportBinding {
        ImportBinding {
            local: local.to_string(),
            is_type,
        }
    }

    #[test]
    fn test_collation() {
        let mut items = vec!["b", "B", "a", "A", "_x", "Ab"];
        items.sort_by(|a, b| collate(a, b));
        assert_eq!(items, vec!["_x", "a", "A", "Ab", "b", "B"]);
    }

    #[test]
    fn test_packages_before_relative() {
        let mut m = ImportManager::new();
        m.add_default("./connect-client.default.js", "client", binding("client", false));
        m.add_named("@vaadin/hilla-frontend", "EndpointRequestInit", binding("EndpointRequestInit", true));
        m.add_default("../Account.js", "Account", binding("Account", true));
        let lines = m.render(&used(&["client", "EndpointRequestInit", "Account"]));
        assert_eq!(
            lines,
            vec![
                "import type { EndpointRequestInit } from \"@vaadin/hilla-frontend\";",
                "import type Account from \"../Account.js\";",
                "import client from \"./connect-client.default.js\";",
            ]
        );
    }

    #[test]
    fn test_default_before_named_and_aliases() {
        let mut m = ImportManager::new();
        m.add_named("./a.js", "Zed", binding("Zed", false));
        m.add_named("./a.js", "Item", binding("Item_1", true));
        m.add_default("./a.js", "A", binding("A", false));
        let lines = m.render(&used(&["Zed", "Item_1", "A"]));
        assert_eq!(
            lines,
            vec![
                "import A from \"./a.js\";",
                "import { type Item as Item_1, Zed } from \"./a.js\";",
            ]
        );
    }

    #[test]
    fn test_unused_imports_are_pruned() {
        let mut m = ImportManager::new();
        m.add_default("./Group.js", "Group", binding("Group", true));
        assert!(m.render(&used(&[])).is_empty());
    }

    #[test]
    fn test_value_import_upgrades_type_import() {
        let mut m = ImportManager::new();
        m.add_default("./Status.js", "Status", binding("Status", true));
        assert_eq!(m.existing_default("./Status.js", false).as_deref(), Some("Status"));
        assert_eq!(
            m.render(&used(&["Status"])),
            vec!["import Status from \"./Status.js\";"]
        );
    }
}
