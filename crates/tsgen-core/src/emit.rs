use std::collections::HashSet;

use crate::GeneratedFile;
use crate::printer::print_declaration;
use crate::storage::{SourceFile, Sources};

/// Render every non-empty source file, in creation order.
pub fn emit(sources: &Sources) -> Vec<GeneratedFile> {
    sources
        .iter()
        .filter(|file| {
            let empty = file.declarations.is_empty() && file.dependencies.exports.is_empty();
            if empty {
                log::debug!("skipping empty file {}", file.path);
            }
            !empty
        })
        .map(|file| GeneratedFile {
            path: file.path.clone(),
            content: render_source_file(file),
            module: file.origin.clone(),
        })
        .collect()
}

/// Imports, then declarations, then exports, separated by blank lines.
/// Imports nothing refers to are left out.
pub fn render_source_file(file: &SourceFile) -> String {
    let mut used = HashSet::new();
    for decl in &file.declarations {
        decl.referenced_identifiers(&mut used);
    }
    used.extend(file.dependencies.exports.locals().map(str::to_string));

    let mut sections: Vec<String> = Vec::new();

    let imports = file.dependencies.render_imports(&used);
    if !imports.is_empty() {
        sections.push(imports.join("\n"));
    }
    sections.extend(file.declarations.iter().map(print_declaration));
    let exports = file.dependencies.render_exports();
    if !exports.is_empty() {
        sections.push(exports.join("\n"));
    }

    let mut out = sections.join("\n\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Declaration, Keyword, PropertySignature, TypeAliasDecl, TypeExpr};
    use crate::config::SuffixPolicy;

    #[test]
    fn test_render_prunes_and_orders_sections() {
        let mut sources = Sources::new(".js", SuffixPolicy::FirstKeepsName);
        let file = sources.get_or_create("com/example/Page.ts", "test");
        let item = file
            .dependencies
            .import_default("./com/example/Item", "Item", true)
            .unwrap();
        file.dependencies
            .import_default("./com/example/Unused", "Unused", true)
            .unwrap();
        file.declarations.push(Declaration::TypeAlias(TypeAliasDecl {
            doc: None,
            name: "Page".to_string(),
            type_params: Vec::new(),
            ty: TypeExpr::Object(vec![
                PropertySignature::new("items", TypeExpr::array(TypeExpr::named(item))),
                PropertySignature::new("total", TypeExpr::Keyword(Keyword::Number)),
            ]),
        }));
        file.dependencies.exports.set_default("Page");

        let files = emit(&sources);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].module, "test");
        insta::assert_snapshot!(files[0].content, @r#"
        import type Item from "./Item.js";

        type Page = { items: Array<Item>; total: number };

        export default Page;
        "#);
    }

    #[test]
    fn test_empty_files_are_skipped() {
        let mut sources = Sources::new(".js", SuffixPolicy::FirstKeepsName);
        sources.get_or_create("Empty.ts", "test");
        assert!(emit(&sources).is_empty());
    }
}
