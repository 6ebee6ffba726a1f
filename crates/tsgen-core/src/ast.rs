//! A small TypeScript syntax tree. Plugins build and amend it; the printer
//! turns it into text once the whole run is over.

use std::collections::HashSet;

/// Built-in type keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    String,
    Number,
    Boolean,
    Unknown,
    Void,
    Undefined,
    Null,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::String => "string",
            Keyword::Number => "number",
            Keyword::Boolean => "boolean",
            Keyword::Unknown => "unknown",
            Keyword::Void => "void",
            Keyword::Undefined => "undefined",
            Keyword::Null => "null",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Keyword(Keyword),
    /// A named type, optionally with type arguments: `Page<T>`.
    Ref { name: String, args: Vec<TypeExpr> },
    Array(Box<TypeExpr>),
    Record(Box<TypeExpr>, Box<TypeExpr>),
    Union(Vec<TypeExpr>),
    Intersection(Vec<TypeExpr>),
    /// A string literal type.
    Literal(String),
    Object(Vec<PropertySignature>),
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Ref {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Ref {
            name: name.into(),
            args,
        }
    }

    pub fn array(item: TypeExpr) -> Self {
        TypeExpr::Array(Box::new(item))
    }

    pub fn record(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Record(Box::new(key), Box::new(value))
    }

    /// Union of `members`, flattening nested unions and dropping duplicates.
    /// A single member is returned as is.
    pub fn union(members: impl IntoIterator<Item = TypeExpr>) -> Self {
        let mut flat: Vec<TypeExpr> = Vec::new();
        for member in members {
            let parts = match member {
                TypeExpr::Union(inner) => inner,
                other => vec![other],
            };
            for part in parts {
                if !flat.contains(&part) {
                    flat.push(part);
                }
            }
        }
        match flat.len() {
            0 => TypeExpr::Keyword(Keyword::Unknown),
            1 => flat.remove(0),
            _ => TypeExpr::Union(flat),
        }
    }

    /// `T | undefined`.
    pub fn or_undefined(self) -> Self {
        TypeExpr::union([self, TypeExpr::Keyword(Keyword::Undefined)])
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeExpr::Keyword(Keyword::Void))
    }

    fn collect_identifiers(&self, out: &mut HashSet<String>) {
        match self {
            TypeExpr::Keyword(_) | TypeExpr::Literal(_) => {}
            TypeExpr::Ref { name, args } => {
                out.insert(root_identifier(name).to_string());
                args.iter().for_each(|a| a.collect_identifiers(out));
            }
            TypeExpr::Array(item) => item.collect_identifiers(out),
            TypeExpr::Record(k, v) => {
                k.collect_identifiers(out);
                v.collect_identifiers(out);
            }
            TypeExpr::Union(members) | TypeExpr::Intersection(members) => {
                members.iter().for_each(|m| m.collect_identifiers(out));
            }
            TypeExpr::Object(props) => {
                props.iter().for_each(|p| p.ty.collect_identifiers(out));
            }
        }
    }
}

/// A property in an interface body or object type literal.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySignature {
    pub doc: Option<String>,
    pub name: String,
    pub optional: bool,
    pub readonly: bool,
    pub ty: TypeExpr,
}

impl PropertySignature {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            doc: None,
            name: name.into(),
            optional: false,
            readonly: false,
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeExpr,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    Str(String),
    Number(f64),
    Bool(bool),
    Undefined,
    Call {
        callee: Box<Expr>,
        type_args: Vec<TypeExpr>,
        args: Vec<Expr>,
    },
    New {
        callee: Box<Expr>,
        type_args: Vec<TypeExpr>,
        args: Vec<Expr>,
    },
    Member(Box<Expr>, String),
    Object(Vec<ObjectProp>),
    Array(Vec<Expr>),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn str(value: impl Into<String>) -> Self {
        Expr::Str(value.into())
    }

    pub fn member(self, property: impl Into<String>) -> Self {
        Expr::Member(Box::new(self), property.into())
    }

    pub fn call(self, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(self),
            type_args: Vec::new(),
            args,
        }
    }

    fn collect_identifiers(&self, out: &mut HashSet<String>) {
        match self {
            Expr::Ident(name) => {
                out.insert(name.clone());
            }
            Expr::Str(_) | Expr::Number(_) | Expr::Bool(_) | Expr::Undefined => {}
            Expr::Call {
                callee,
                type_args,
                args,
            }
            | Expr::New {
                callee,
                type_args,
                args,
            } => {
                callee.collect_identifiers(out);
                type_args.iter().for_each(|t| t.collect_identifiers(out));
                args.iter().for_each(|a| a.collect_identifiers(out));
            }
            Expr::Member(object, _) => object.collect_identifiers(out),
            Expr::Object(props) => {
                for prop in props {
                    match &prop.value {
                        Some(value) => value.collect_identifiers(out),
                        None => {
                            out.insert(prop.key.clone());
                        }
                    }
                }
            }
            Expr::Array(items) => items.iter().for_each(|i| i.collect_identifiers(out)),
        }
    }
}

/// `key: value`, or the shorthand `key` when `value` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProp {
    pub key: String,
    pub value: Option<Expr>,
}

impl ObjectProp {
    pub fn shorthand(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    pub fn new(key: impl Into<String>, value: Expr) -> Self {
        Self {
            key: key.into(),
            value: Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Return(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub doc: Option<String>,
    pub name: String,
    pub is_async: bool,
    pub type_params: Vec<String>,
    pub params: Vec<Param>,
    pub return_type: TypeExpr,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub doc: Option<String>,
    pub name: String,
    pub type_params: Vec<String>,
    pub extends: Vec<TypeExpr>,
    pub members: Vec<PropertySignature>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
    pub doc: Option<String>,
    pub name: String,
    pub type_params: Vec<String>,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub doc: Option<String>,
    pub name: String,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Function(FunctionDecl),
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
    Enum(EnumDecl),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Function(f) => &f.name,
            Declaration::Interface(i) => &i.name,
            Declaration::TypeAlias(t) => &t.name,
            Declaration::Enum(e) => &e.name,
        }
    }

    /// Identifiers this declaration refers to, used to drop unused imports.
    /// Over-approximates: parameter names and type parameters are included.
    pub fn referenced_identifiers(&self, out: &mut HashSet<String>) {
        match self {
            Declaration::Function(f) => {
                for p in &f.params {
                    p.ty.collect_identifiers(out);
                }
                f.return_type.collect_identifiers(out);
                for Statement::Return(expr) in &f.body {
                    expr.collect_identifiers(out);
                }
            }
            Declaration::Interface(i) => {
                i.extends.iter().for_each(|e| e.collect_identifiers(out));
                i.members.iter().for_each(|m| m.ty.collect_identifiers(out));
            }
            Declaration::TypeAlias(t) => t.ty.collect_identifiers(out),
            Declaration::Enum(_) => {}
        }
    }
}

/// `Foo.Bar` refers to the binding `Foo`.
fn root_identifier(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_flattens_and_dedups() {
        let u = TypeExpr::union([
            TypeExpr::named("A"),
            TypeExpr::union([TypeExpr::named("B"), TypeExpr::named("A")]),
        ]);
        assert_eq!(u, TypeExpr::Union(vec![TypeExpr::named("A"), TypeExpr::named("B")]));
    }

    #[test]
    fn test_or_undefined_is_idempotent() {
        let t = TypeExpr::Keyword(Keyword::String).or_undefined().or_undefined();
        assert_eq!(
            t,
            TypeExpr::Union(vec![
                TypeExpr::Keyword(Keyword::String),
                TypeExpr::Keyword(Keyword::Undefined)
            ])
        );
    }

    #[test]
    fn test_referenced_identifiers() {
        let decl = Declaration::Function(FunctionDecl {
            doc: None,
            name: "load".to_string(),
            is_async: true,
            type_params: Vec::new(),
            params: vec![Param {
                name: "id".to_string(),
                ty: TypeExpr::named("Id"),
                optional: false,
            }],
            return_type: TypeExpr::generic("Promise", vec![TypeExpr::named("Account.Nested")]),
            body: vec![Statement::Return(
                Expr::ident("client")
                    .member("call")
                    .call(vec![Expr::Object(vec![ObjectProp::shorthand("id")])]),
            )],
        });
        let mut ids = HashSet::new();
        decl.referenced_identifiers(&mut ids);
        for expected in ["Id", "Promise", "Account", "client", "id"] {
            assert!(ids.contains(expected), "missing {expected}");
        }
        assert!(!ids.contains("call"));
    }
}
