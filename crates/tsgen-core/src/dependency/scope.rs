use std::collections::HashSet;

use crate::error::DependencyError;
use crate::naming::is_reserved;

/// Names bound at the top level of one output file.
#[derive(Debug, Clone)]
pub struct IdentifierScope {
    file: String,
    taken: HashSet<String>,
}

impl IdentifierScope {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            taken: HashSet::new(),
        }
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Bind `name`, or the first free `name_N` when it is taken, reserved,
    /// or `force_suffix` is set. Suffixes are handed out in order of request.
    pub fn bind(&mut self, name: &str, force_suffix: bool) -> Result<String, DependencyError> {
        if !force_suffix && !is_reserved(name) && self.taken.insert(name.to_string()) {
            return Ok(name.to_string());
        }
        for n in 1..=u32::MAX {
            let candidate = format!("{name}_{n}");
            if self.taken.insert(candidate.clone()) {
                return Ok(candidate);
            }
        }
        Err(DependencyError::IdentifierExhausted(
            name.to_string(),
            self.file.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_keeps_name() {
        let mut scope = IdentifierScope::new("A.ts");
        assert_eq!(scope.bind("Account", false).unwrap(), "Account");
        assert_eq!(scope.bind("Account", false).unwrap(), "Account_1");
        assert_eq!(scope.bind("Account", false).unwrap(), "Account_2");
    }

    #[test]
    fn test_reserved_word_is_suffixed() {
        let mut scope = IdentifierScope::new("A.ts");
        assert_eq!(scope.bind("delete", false).unwrap(), "delete_1");
        assert!(!scope.is_taken("delete"));
    }

    #[test]
    fn test_forced_suffix_skips_taken() {
        let mut scope = IdentifierScope::new("A.ts");
        scope.bind("client_1", false).unwrap();
        assert_eq!(scope.bind("client", true).unwrap(), "client_2");
    }
}
