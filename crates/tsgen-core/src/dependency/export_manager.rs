use crate::error::DependencyError;

/// Exports of one file: named exports in registration order plus an
/// optional default export.
#[derive(Debug, Clone, Default)]
pub struct ExportManager {
    /// (local binding, exported name)
    named: Vec<(String, String)>,
    default: Option<String>,
}

impl ExportManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Export `local` as `exported`. Exporting a different binding under a
    /// name already in use is an error.
    pub fn add_named(
        &mut self,
        local: impl Into<String>,
        exported: impl Into<String>,
    ) -> Result<(), DependencyError> {
        let (local, exported) = (local.into(), exported.into());
        match self.named.iter().find(|(_, e)| *e == exported) {
            Some((existing, _)) if *existing == local => Ok(()),
            Some((existing, _)) => Err(DependencyError::DuplicateExport {
                exported,
                existing: existing.clone(),
                local,
            }),
            None => {
                self.named.push((local, exported));
                Ok(())
            }
        }
    }

    pub fn set_default(&mut self, local: impl Into<String>) {
        self.default = Some(local.into());
    }

    pub fn default_export(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Exported name for a local binding, if any.
    pub fn exported_name(&self, local: &str) -> Option<&str> {
        self.named
            .iter()
            .find(|(l, _)| l == local)
            .map(|(_, e)| e.as_str())
    }

    /// Local bindings that are exported.
    pub fn locals(&self) -> impl Iterator<Item = &str> {
        self.named
            .iter()
            .map(|(l, _)| l.as_str())
            .chain(self.default.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.default.is_none()
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.named.is_empty() {
            let specs = self
                .named
                .iter()
                .map(|(local, exported)| {
                    if local == exported {
                        local.clone()
                    } else {
                        format!("{local} as {exported}")
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!("export {{ {specs} }};"));
        }
        if let Some(default) = &self.default {
            lines.push(format!("export default {default};"));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_with_alias() {
        let mut e = ExportManager::new();
        e.add_named("firstMethod", "firstMethod").unwrap();
        e.add_named("delete_1", "delete").unwrap();
        assert_eq!(e.render(), vec!["export { firstMethod, delete_1 as delete };"]);
        assert_eq!(e.exported_name("delete_1"), Some("delete"));
    }

    #[test]
    fn test_default_export() {
        let mut e = ExportManager::new();
        e.set_default("Account");
        assert_eq!(e.render(), vec!["export default Account;"]);
    }

    #[test]
    fn test_exported_name_is_taken_once() {
        let mut e = ExportManager::new();
        e.add_named("m", "m").unwrap();
        e.add_named("m", "m").unwrap();
        let err = e.add_named("m_1", "m").unwrap_err();
        assert!(matches!(
            err,
            DependencyError::DuplicateExport { ref exported, ref existing, .. }
                if exported == "m" && existing == "m"
        ));
        assert_eq!(e.render(), vec!["export { m };"]);
    }
}
