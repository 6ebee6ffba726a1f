/// Turns module ids into import specifiers as seen from one output file.
///
/// Ids starting with `./` are relative to the output root; they are rewritten
/// relative to the importing file and receive the configured extension.
/// Anything else is a package specifier and passes through.
#[derive(Debug, Clone)]
pub struct PathProcessor {
    /// Directory segments of the importing file, relative to the output root.
    dir: Vec<String>,
    extension: String,
}

impl PathProcessor {
    pub fn new(file_path: &str, extension: impl Into<String>) -> Self {
        let mut dir: Vec<String> = file_path
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .map(str::to_string)
            .collect();
        dir.pop();
        Self {
            dir,
            extension: extension.into(),
        }
    }

    pub fn process(&self, module: &str) -> String {
        if let Some(rooted) = module.strip_prefix("./") {
            let target: Vec<&str> = rooted.split('/').filter(|s| !s.is_empty()).collect();
            let specifier = self.relative_to_file(&target);
            return self.with_extension(specifier);
        }
        if module.starts_with("../") {
            return self.with_extension(module.to_string());
        }
        module.to_string()
    }

    fn relative_to_file(&self, target: &[&str]) -> String {
        let (target_dir, file) = match target.split_last() {
            Some((file, dir)) => (dir, *file),
            None => (&[][..], ""),
        };
        let common = self
            .dir
            .iter()
            .zip(target_dir.iter())
            .take_while(|(a, b)| a.as_str() == **b)
            .count();

        let ups = self.dir.len() - common;
        let mut parts: Vec<&str> = Vec::new();
        if ups == 0 {
            parts.push(".");
        } else {
            parts.extend(std::iter::repeat_n("..", ups));
        }
        parts.extend(&target_dir[common..]);
        parts.push(file);
        parts.join("/")
    }

    fn with_extension(&self, specifier: String) -> String {
        if self.extension.is_empty() || specifier.ends_with(&self.extension) {
            specifier
        } else {
            format!("{specifier}{}", self.extension)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_module() {
        let p = PathProcessor::new("com/example/Account.ts", ".js");
        assert_eq!(p.process("./com/example/Group"), "./Group.js");
    }

    #[test]
    fn test_root_module_from_nested_file() {
        let p = PathProcessor::new("com/example/AccountEndpoint.ts", ".js");
        assert_eq!(p.process("./connect-client.default"), "../../connect-client.default.js");
        assert_eq!(p.process("./com/other/Item"), "../other/Item.js");
    }

    #[test]
    fn test_root_file_keeps_dot_prefix() {
        let p = PathProcessor::new("FooBarEndpoint.ts", ".js");
        assert_eq!(p.process("./connect-client.default"), "./connect-client.default.js");
        assert_eq!(p.process("./com/example/Account"), "./com/example/Account.js");
    }

    #[test]
    fn test_packages_and_existing_extension() {
        let p = PathProcessor::new("A.ts", ".js");
        assert_eq!(p.process("@vaadin/hilla-frontend"), "@vaadin/hilla-frontend");
        assert_eq!(p.process("./client.js"), "./client.js");
        let bare = PathProcessor::new("A.ts", "");
        assert_eq!(bare.process("./client"), "./client");
    }
}
