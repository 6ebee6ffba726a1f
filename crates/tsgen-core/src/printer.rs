//! Renders the syntax tree as TypeScript source text.

use crate::ast::{
    Declaration, EnumDecl, Expr, FunctionDecl, InterfaceDecl, ObjectProp, Param,
    PropertySignature, Statement, TypeAliasDecl, TypeExpr,
};
use crate::naming::is_valid_identifier;

const INDENT: &str = "    ";

pub fn print_type(ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Keyword(k) => k.as_str().to_string(),
        TypeExpr::Ref { name, args } if args.is_empty() => name.clone(),
        TypeExpr::Ref { name, args } => format!("{name}<{}>", print_type_list(args)),
        TypeExpr::Array(item) => format!("Array<{}>", print_type(item)),
        TypeExpr::Record(k, v) => format!("Record<{}, {}>", print_type(k), print_type(v)),
        TypeExpr::Union(members) => members
            .iter()
            .map(print_type)
            .collect::<Vec<_>>()
            .join(" | "),
        TypeExpr::Intersection(members) => members
            .iter()
            .map(|m| match m {
                TypeExpr::Union(_) => format!("({})", print_type(m)),
                _ => print_type(m),
            })
            .collect::<Vec<_>>()
            .join(" & "),
        TypeExpr::Literal(value) => quote(value),
        TypeExpr::Object(props) if props.is_empty() => "{}".to_string(),
        TypeExpr::Object(props) => {
            let body = props
                .iter()
                .map(|p| property_signature(p).trim_end_matches(';').to_string())
                .collect::<Vec<_>>()
                .join("; ");
            format!("{{ {body} }}")
        }
    }
}

fn print_type_list(types: &[TypeExpr]) -> String {
    types.iter().map(print_type).collect::<Vec<_>>().join(", ")
}

pub fn print_expr(expr: &Expr) -> String {
    match expr {
        Expr::Ident(name) => name.clone(),
        Expr::Str(value) => quote(value),
        Expr::Number(n) => n.to_string(),
        Expr::Bool(b) => b.to_string(),
        Expr::Undefined => "undefined".to_string(),
        Expr::Call {
            callee,
            type_args,
            args,
        } => format!("{}{}({})", print_expr(callee), type_args_suffix(type_args), print_args(args)),
        Expr::New {
            callee,
            type_args,
            args,
        } => format!(
            "new {}{}({})",
            print_expr(callee),
            type_args_suffix(type_args),
            print_args(args)
        ),
        Expr::Member(object, property) => format!("{}.{property}", print_expr(object)),
        Expr::Object(props) if props.is_empty() => "{}".to_string(),
        Expr::Object(props) => {
            let body = props.iter().map(object_prop).collect::<Vec<_>>().join(", ");
            format!("{{ {body} }}")
        }
        Expr::Array(items) => format!("[{}]", print_args(items)),
    }
}

fn type_args_suffix(type_args: &[TypeExpr]) -> String {
    if type_args.is_empty() {
        String::new()
    } else {
        format!("<{}>", print_type_list(type_args))
    }
}

fn print_args(args: &[Expr]) -> String {
    args.iter().map(print_expr).collect::<Vec<_>>().join(", ")
}

fn object_prop(prop: &ObjectProp) -> String {
    match &prop.value {
        None => prop.key.clone(),
        Some(value) => format!("{}: {}", property_key(&prop.key), print_expr(value)),
    }
}

/// Print one declaration, without a trailing newline.
pub fn print_declaration(decl: &Declaration) -> String {
    match decl {
        Declaration::Function(f) => function(f),
        Declaration::Interface(i) => interface(i),
        Declaration::TypeAlias(t) => type_alias(t),
        Declaration::Enum(e) => enumeration(e),
    }
}

fn function(f: &FunctionDecl) -> String {
    let mut out = jsdoc(f.doc.as_deref(), "");
    if f.is_async {
        out.push_str("async ");
    }
    let params = f.params.iter().map(param).collect::<Vec<_>>().join(", ");
    out.push_str(&format!(
        "function {}{}({params}): {} {{\n",
        f.name,
        type_params(&f.type_params),
        print_type(&f.return_type)
    ));
    for stmt in &f.body {
        match stmt {
            Statement::Return(expr) => {
                out.push_str(&format!("{INDENT}return {};\n", print_expr(expr)));
            }
        }
    }
    out.push('}');
    out
}

fn param(p: &Param) -> String {
    let marker = if p.optional { "?" } else { "" };
    format!("{}{marker}: {}", p.name, print_type(&p.ty))
}

fn interface(i: &InterfaceDecl) -> String {
    let mut out = jsdoc(i.doc.as_deref(), "");
    out.push_str(&format!("interface {}{}", i.name, type_params(&i.type_params)));
    if !i.extends.is_empty() {
        out.push_str(&format!(" extends {}", print_type_list(&i.extends)));
    }
    if i.members.is_empty() {
        out.push_str(" {\n}");
        return out;
    }
    out.push_str(" {\n");
    for member in &i.members {
        out.push_str(&jsdoc(member.doc.as_deref(), INDENT));
        out.push_str(INDENT);
        out.push_str(&property_signature(member));
        out.push('\n');
    }
    out.push('}');
    out
}

fn property_signature(p: &PropertySignature) -> String {
    let readonly = if p.readonly { "readonly " } else { "" };
    let marker = if p.optional { "?" } else { "" };
    format!(
        "{readonly}{}{marker}: {};",
        property_key(&p.name),
        print_type(&p.ty)
    )
}

fn type_alias(t: &TypeAliasDecl) -> String {
    let mut out = jsdoc(t.doc.as_deref(), "");
    out.push_str(&format!(
        "type {}{} = {};",
        t.name,
        type_params(&t.type_params),
        print_type(&t.ty)
    ));
    out
}

fn enumeration(e: &EnumDecl) -> String {
    let mut out = jsdoc(e.doc.as_deref(), "");
    out.push_str(&format!("enum {} {{\n", e.name));
    let last = e.members.len().saturating_sub(1);
    for (i, member) in e.members.iter().enumerate() {
        let sep = if i == last { "" } else { "," };
        out.push_str(&format!(
            "{INDENT}{} = {}{sep}\n",
            property_key(&member.name),
            quote(&member.value)
        ));
    }
    out.push('}');
    out
}

fn type_params(params: &[String]) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!("<{}>", params.join(", "))
    }
}

/// A `/** ... */` block for `doc`, each line prefixed by `indent`.
fn jsdoc(doc: Option<&str>, indent: &str) -> String {
    let Some(doc) = doc.map(str::trim).filter(|d| !d.is_empty()) else {
        return String::new();
    };
    let mut out = format!("{indent}/**\n");
    for line in doc.lines() {
        let line = line.trim_end().replace("*/", "*\\/");
        if line.is_empty() {
            out.push_str(&format!("{indent} *\n"));
        } else {
            out.push_str(&format!("{indent} * {line}\n"));
        }
    }
    out.push_str(&format!("{indent} */\n"));
    out
}

fn property_key(key: &str) -> String {
    if is_valid_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

/// A double-quoted string literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{EnumMember, Keyword};

    #[test]
    fn test_print_nested_types() {
        let ty = TypeExpr::Intersection(vec![
            TypeExpr::union([TypeExpr::named("A"), TypeExpr::named("B")]),
            TypeExpr::record(
                TypeExpr::Keyword(Keyword::String),
                TypeExpr::array(TypeExpr::Keyword(Keyword::Number)),
            ),
        ]);
        assert_eq!(print_type(&ty), "(A | B) & Record<string, Array<number>>");
    }

    #[test]
    fn test_print_interface_with_docs() {
        let mut id = PropertySignature::new("@type", TypeExpr::Literal("user".to_string()));
        id.readonly = true;
        let mut name = PropertySignature::new("name", TypeExpr::Keyword(Keyword::String));
        name.optional = true;
        name.doc = Some("Display name */ here".to_string());
        let decl = Declaration::Interface(InterfaceDecl {
            doc: Some("A user.\n\nSecond paragraph.".to_string()),
            name: "User".to_string(),
            type_params: Vec::new(),
            extends: vec![TypeExpr::named("Base")],
            members: vec![id, name],
        });
        let expected = "/**
 * A user.
 *
 * Second paragraph.
 */
interface User extends Base {
    readonly \"@type\": \"user\";
    /**
     * Display name *\\/ here
     */
    name?: string;
}";
        assert_eq!(print_declaration(&decl), expected);
    }

    #[test]
    fn test_print_enum() {
        let decl = Declaration::Enum(EnumDecl {
            doc: None,
            name: "Status".to_string(),
            members: vec![
                EnumMember {
                    name: "ACTIVE".to_string(),
                    value: "ACTIVE".to_string(),
                },
                EnumMember {
                    name: "INACTIVE".to_string(),
                    value: "INACTIVE".to_string(),
                },
            ],
        });
        assert_eq!(
            print_declaration(&decl),
            "enum Status {\n    ACTIVE = \"ACTIVE\",\n    INACTIVE = \"INACTIVE\"\n}"
        );
    }

    #[test]
    fn test_print_new_expression() {
        let expr = Expr::New {
            callee: Box::new(Expr::ident("NumberSignal")),
            type_args: Vec::new(),
            args: vec![
                Expr::Number(0.0),
                Expr::Object(vec![
                    ObjectProp::shorthand("client"),
                    ObjectProp::new("endpoint", Expr::str("CounterService")),
                    ObjectProp::new("params", Expr::Object(Vec::new())),
                ]),
            ],
        };
        assert_eq!(
            print_expr(&expr),
            "new NumberSignal(0, { client, endpoint: \"CounterService\", params: {} })"
        );
    }
}
