use heck::{ToLowerCamelCase, ToPascalCase};

use crate::parse::operation::{HttpMethod, Operation};

/// TypeScript reserved and strict-mode words that can never be a bare binding.
pub const RESERVED_WORDS: &[&str] = &[
    "arguments",
    "await",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "eval",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    "yield",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Whether `name` can be written unquoted as a TypeScript identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// The endpoint class an operation belongs to: its first tag, otherwise the
/// first literal path segment.
pub fn endpoint_name(path: &str, op: &Operation) -> String {
    if let Some(tag) = op.tags.first() {
        return tag.clone();
    }
    path.split('/')
        .find(|s| !s.is_empty() && !s.starts_with('{'))
        .map(|s| sanitize_identifier(s).to_pascal_case())
        .unwrap_or_else(|| "Endpoint".to_string())
}

/// The method name passed on the wire. Backend-style operation ids
/// (`{Endpoint}_{method}_{VERB}`) are reduced to `{method}`.
pub fn method_name(endpoint: &str, method: HttpMethod, path: &str, op: &Operation) -> String {
    if let Some(id) = &op.operation_id {
        let mut name = id.as_str();
        if let Some(rest) = name.strip_prefix(endpoint).and_then(|r| r.strip_prefix('_')) {
            name = rest;
        }
        if let Some(rest) = name
            .strip_suffix(method.as_str())
            .and_then(|r| r.strip_suffix('_'))
        {
            name = rest;
        }
        if !name.is_empty() {
            return name.to_string();
        }
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [.., first, last] if !last.starts_with('{') && *first == endpoint => last.to_string(),
        _ => route_to_name(method.as_str(), path),
    }
}

/// `com.example.Outer$Inner` → `com/example/Outer/Inner`.
pub fn qualified_path(name: &str) -> String {
    name.split(['.', '$'])
        .filter(|s| !s.is_empty())
        .map(|s| s.replace('/', "_"))
        .collect::<Vec<_>>()
        .join("/")
}

/// The last segment of a qualified name, made into a usable identifier.
pub fn simple_name(name: &str) -> String {
    let last = name
        .rsplit(['.', '$'])
        .find(|s| !s.is_empty())
        .unwrap_or(name);
    sanitize_identifier(last)
}

/// A camelCase parameter or property name usable as an identifier.
pub fn parameter_name(name: &str) -> String {
    if is_valid_identifier(name) {
        name.to_string()
    } else {
        let camel = sanitize_identifier(name).to_lower_camel_case();
        if is_valid_identifier(&camel) {
            camel
        } else {
            format!("_{camel}")
        }
    }
}

/// Derive a camelCase operation name from HTTP method + path.
///
/// Examples:
/// - `GET /users` → `listUsers`
/// - `POST /users` → `createUsers`
/// - `GET /users/{userId}` → `getUser`
/// - `DELETE /users/{userId}` → `deleteUser`
pub fn route_to_name(method: &str, path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let mut resource_parts: Vec<String> = Vec::new();
    let mut ends_with_param = false;

    for seg in &segments {
        if seg.starts_with('{') && seg.ends_with('}') {
            ends_with_param = true;
        } else {
            resource_parts.push(seg.to_string());
            ends_with_param = false;
        }
    }

    let method_upper = method.to_uppercase();
    let prefix = match method_upper.as_str() {
        "GET" if ends_with_param => "get",
        "GET" => "list",
        "POST" => "create",
        "PUT" => "update",
        "DELETE" => "delete",
        "PATCH" => "patch",
        "OPTIONS" => "options",
        "HEAD" => "head",
        "TRACE" => "trace",
        other => other,
    };

    if resource_parts.is_empty() {
        return prefix.to_string();
    }

    let mut pascal_parts = String::new();
    for (i, part) in resource_parts.iter().enumerate() {
        let is_last = i == resource_parts.len() - 1;
        let word = if is_last && ends_with_param {
            singularize(part)
        } else {
            part.to_string()
        };
        pascal_parts.push_str(&sanitize_identifier(&word).to_pascal_case());
    }

    format!("{prefix}{pascal_parts}")
}

/// Naive singularization: strips trailing 's' if present.
fn singularize(word: &str) -> String {
    if word.ends_with("ies") && word.len() > 3 {
        format!("{}y", &word[..word.len() - 3])
    } else if word.ends_with("ses") || word.ends_with("xes") || word.ends_with("zes") {
        word[..word.len() - 2].to_string()
    } else if word.ends_with('s') && !word.ends_with("ss") && word.len() > 1 {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// Sanitize a string to be a valid identifier.
pub fn sanitize_identifier(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_was_separator = false;

    for (i, ch) in name.chars().enumerate() {
        if ch.is_alphanumeric() || ch == '_' || ch == '$' {
            if i == 0 && ch.is_ascii_digit() {
                result.push('_');
            }
            if prev_was_separator && !result.is_empty() {
                result.push('_');
            }
            result.push(ch);
            prev_was_separator = false;
        } else {
            prev_was_separator = true;
        }
    }

    if result.is_empty() {
        return "unnamed".to_string();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(id: Option<&str>, tags: &[&str]) -> Operation {
        Operation {
            operation_id: id.map(str::to_string),
            summary: None,
            description: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            parameters: Vec::new(),
            request_body: None,
            responses: Default::default(),
            deprecated: None,
        }
    }

    #[test]
    fn test_backend_operation_id() {
        let o = op(Some("FooBarEndpoint_firstMethod_POST"), &["FooBarEndpoint"]);
        let endpoint = endpoint_name("/FooBarEndpoint/firstMethod", &o);
        assert_eq!(endpoint, "FooBarEndpoint");
        assert_eq!(
            method_name(&endpoint, HttpMethod::Post, "/FooBarEndpoint/firstMethod", &o),
            "firstMethod"
        );
    }

    #[test]
    fn test_plain_operation_id_kept_verbatim() {
        let o = op(Some("listPets"), &["Pets"]);
        assert_eq!(method_name("Pets", HttpMethod::Get, "/pets", &o), "listPets");
    }

    #[test]
    fn test_untagged_operation_uses_path() {
        let o = op(None, &[]);
        let endpoint = endpoint_name("/UserEndpoint/delete", &o);
        assert_eq!(endpoint, "UserEndpoint");
        assert_eq!(
            method_name(&endpoint, HttpMethod::Post, "/UserEndpoint/delete", &o),
            "delete"
        );
    }

    #[test]
    fn test_qualified_path() {
        assert_eq!(qualified_path("com.example.Outer$Inner"), "com/example/Outer/Inner");
        assert_eq!(qualified_path("Account"), "Account");
        assert_eq!(simple_name("com.example.Outer$Inner"), "Inner");
    }

    #[test]
    fn test_identifiers() {
        assert!(is_valid_identifier("$value_1"));
        assert!(!is_valid_identifier("@type"));
        assert!(!is_valid_identifier("1st"));
        assert!(is_reserved("delete"));
        assert!(!is_reserved("remove"));
        assert_eq!(parameter_name("page-size"), "pageSize");
    }

    #[test]
    fn test_route_to_name_list() {
        assert_eq!(route_to_name("GET", "/users"), "listUsers");
    }

    #[test]
    fn test_route_to_name_get_single() {
        assert_eq!(route_to_name("GET", "/users/{userId}"), "getUser");
    }

    #[test]
    fn test_route_to_name_nested_single() {
        assert_eq!(
            route_to_name("GET", "/users/{userId}/messages/{messageId}"),
            "getUsersMessage"
        );
    }
}
