//! Import insertion.

use std::path::{Path, PathBuf};

use crate::diagnostic::EngineError;
use crate::source::{module_specifier, normalize_specifier, string_value, NodeKind, SourceFile, SyntaxNode, TextEdit};

/// The module an import refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleRef {
    /// A package specifier used verbatim: `react-redux`.
    Package(String),
    /// A project file, turned into a relative specifier from the importing file.
    File(PathBuf),
}

impl ModuleRef {
    pub fn package(name: impl Into<String>) -> Self {
        Self::Package(name.into())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Normalized specifier as written in a file at `from`.
    pub fn specifier_from(&self, from: &Path) -> String {
        match self {
            Self::Package(name) => name.clone(),
            Self::File(path) => module_specifier(from, path),
        }
    }
}

fn import_source(import: &SyntaxNode, src: &str) -> Option<String> {
    import
        .child_by_field("source")
        .or_else(|| import.child_of_kind(NodeKind::String))
        .map(|s| normalize_specifier(&string_value(s, src)))
}

/// Value imports of `specifier`; `import type` and namespace imports are
/// never extended.
fn value_imports<'f>(file: &'f SourceFile, specifier: &str) -> Vec<&'f SyntaxNode> {
    let src = file.text();
    file.statements()
        .filter(|s| s.kind() == NodeKind::ImportStatement)
        .filter(|s| !s.has_token("type"))
        .filter(|s| import_source(s, src).as_deref() == Some(specifier))
        .filter(|s| {
            s.child_of_kind(NodeKind::ImportClause)
                .map(|c| c.child_of_kind(NodeKind::NamespaceImport).is_none())
                .unwrap_or(false)
        })
        .collect()
}

fn imported_names<'s>(import: &SyntaxNode, src: &'s str) -> Vec<&'s str> {
    import
        .child_of_kind(NodeKind::ImportClause)
        .and_then(|c| c.child_of_kind(NodeKind::NamedImports))
        .map(|named| {
            named
                .children_of_kind(NodeKind::ImportSpecifier)
                .filter_map(|spec| spec.child_by_field("alias").or_else(|| spec.child_by_field("name")))
                .map(|n| n.text(src))
                .collect()
        })
        .unwrap_or_default()
}

fn default_name<'s>(import: &SyntaxNode, src: &'s str) -> Option<&'s str> {
    import
        .child_of_kind(NodeKind::ImportClause)?
        .child_of_kind(NodeKind::Identifier)
        .map(|n| n.text(src))
}

/// Edit adding a new import declaration below the last import, or at the top.
fn new_import(file: &SourceFile, text: String) -> TextEdit {
    let last = file
        .statements()
        .filter(|s| s.kind() == NodeKind::ImportStatement)
        .last();
    match last {
        Some(import) => TextEdit::insert(file.line_end_inclusive(import.end_byte()), format!("{text}\n")),
        None if file.text().trim().is_empty() => TextEdit::insert(0, format!("{text}\n")),
        None => TextEdit::insert(0, format!("{text}\n\n")),
    }
}

/// Imports `name` from `module` unless it is already imported from there.
///
/// An existing value import of the same (normalized) specifier is extended,
/// so adding several names to one module in any order converges on a single
/// declaration.
pub fn add_named_import_if_absent(file: &mut SourceFile, module: &ModuleRef, name: &str) -> Result<(), EngineError> {
    let src = file.text();
    let specifier = normalize_specifier(&module.specifier_from(file.path()));
    let imports = value_imports(file, &specifier);
    if imports.iter().any(|i| imported_names(i, src).contains(&name)) {
        return Ok(());
    }

    let edit = match imports.first() {
        Some(import) => {
            let clause = import
                .child_of_kind(NodeKind::ImportClause)
                .ok_or_else(|| EngineError::malformed(file.path(), "import has no clause"))?;
            match clause.child_of_kind(NodeKind::NamedImports) {
                Some(named) => match named.children_of_kind(NodeKind::ImportSpecifier).last() {
                    Some(last) => TextEdit::insert(last.end_byte(), format!(", {name}")),
                    None => TextEdit::replace(named.range(), format!("{{ {name} }}")),
                },
                None => TextEdit::insert(clause.end_byte(), format!(", {{ {name} }}")),
            }
        }
        None => new_import(file, format!("import {{ {name} }} from '{specifier}';")),
    };
    tracing::debug!(path = %file.path().display(), module = %specifier, name, "adding import");
    file.apply(vec![edit])
}

/// Imports `name` as the default export of `module` unless already imported.
pub fn add_default_import_if_absent(file: &mut SourceFile, module: &ModuleRef, name: &str) -> Result<(), EngineError> {
    let src = file.text();
    let specifier = normalize_specifier(&module.specifier_from(file.path()));
    let imports = value_imports(file, &specifier);
    if imports.iter().any(|i| default_name(i, src) == Some(name)) {
        return Ok(());
    }

    let edit = match imports.iter().find(|i| default_name(i, src).is_none()) {
        Some(import) => {
            let clause = import
                .child_of_kind(NodeKind::ImportClause)
                .ok_or_else(|| EngineError::malformed(file.path(), "import has no clause"))?;
            TextEdit::insert(clause.start_byte(), format!("{name}, "))
        }
        None => new_import(file, format!("import {name} from '{specifier}';")),
    };
    tracing::debug!(path = %file.path().display(), module = %specifier, name, "adding default import");
    file.apply(vec![edit])
}

/// Re-exports everything from `module` (`export * from './fetchTasks';`)
/// unless the file already does. New re-exports go at the end of the file.
pub fn add_reexport_if_absent(file: &mut SourceFile, module: &ModuleRef) -> Result<(), EngineError> {
    let src = file.text();
    let specifier = normalize_specifier(&module.specifier_from(file.path()));
    let present = file
        .statements()
        .filter(|s| s.kind() == NodeKind::ExportStatement && s.has_token("*"))
        .any(|s| import_source(s, src).as_deref() == Some(specifier.as_str()));
    if present {
        return Ok(());
    }

    let text = format!("export * from '{specifier}';\n");
    let edit = if src.is_empty() || src.ends_with('\n') {
        TextEdit::insert(src.len(), text)
    } else {
        TextEdit::insert(src.len(), format!("\n{text}"))
    };
    tracing::debug!(path = %file.path().display(), module = %specifier, "adding re-export");
    file.apply(vec![edit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::normalize;
    use crate::source::Origin;

    fn file(text: &str) -> SourceFile {
        SourceFile::parse("src/views/Home/index.tsx", text, Origin::Loaded).unwrap()
    }

    #[test]
    fn test_new_import_goes_below_existing_imports() {
        let mut f = file("import React from 'react';\n\nexport const a = 1;\n");
        add_named_import_if_absent(&mut f, &ModuleRef::package("react-redux"), "connect").unwrap();
        assert_eq!(
            f.text(),
            "import React from 'react';\nimport { connect } from 'react-redux';\n\nexport const a = 1;\n"
        );
    }

    #[test]
    fn test_existing_import_is_extended() {
        let mut f = file("import React, { useState } from 'react';\n");
        add_named_import_if_absent(&mut f, &ModuleRef::package("react"), "useEffect").unwrap();
        add_named_import_if_absent(&mut f, &ModuleRef::package("react"), "useState").unwrap();
        assert_eq!(f.text(), "import React, { useState, useEffect } from 'react';\n");

        let mut g = file("import React from 'react';\n");
        add_named_import_if_absent(&mut g, &ModuleRef::package("react"), "useState").unwrap();
        assert_eq!(g.text(), "import React, { useState } from 'react';\n");
    }

    #[test]
    fn test_file_specifiers_are_normalized() {
        let mut f = file("import { HomeProps } from './props.ts';\n");
        add_named_import_if_absent(&mut f, &ModuleRef::file("src/views/Home/props.ts"), "HomeStateProps").unwrap();
        assert_eq!(f.text(), "import { HomeProps, HomeStateProps } from './props.ts';\n");
    }

    #[test]
    fn test_type_only_imports_are_not_extended() {
        let mut f = file("import type { A } from './props';\n");
        add_named_import_if_absent(&mut f, &ModuleRef::file("src/views/Home/props.ts"), "B").unwrap();
        assert_eq!(f.text(), "import type { A } from './props';\nimport { B } from './props';\n");
    }

    #[test]
    fn test_call_order_converges() {
        let module = ModuleRef::file("src/store/reducers/index.ts");
        let mut a = file("export const x = 1;\n");
        add_named_import_if_absent(&mut a, &module, "RootState").unwrap();
        add_named_import_if_absent(&mut a, &module, "AppDispatch").unwrap();
        let mut b = file("export const x = 1;\n");
        add_named_import_if_absent(&mut b, &module, "AppDispatch").unwrap();
        add_named_import_if_absent(&mut b, &module, "RootState").unwrap();

        assert_eq!(normalize(&a).unwrap(), normalize(&b).unwrap());
        assert_eq!(a.text().matches("from '../../store/reducers'").count(), 1);
    }

    #[test]
    fn test_default_import() {
        let mut f = file("import { useState } from 'react';\n");
        add_default_import_if_absent(&mut f, &ModuleRef::package("react"), "React").unwrap();
        add_default_import_if_absent(&mut f, &ModuleRef::package("react"), "React").unwrap();
        assert_eq!(f.text(), "import React, { useState } from 'react';\n");

        let mut g = SourceFile::parse("src/views/Home/nav.tsx", "", Origin::Created).unwrap();
        add_default_import_if_absent(&mut g, &ModuleRef::file("src/views/Home/index.tsx"), "Home").unwrap();
        assert_eq!(g.text(), "import Home from '.';\n");
    }

    #[test]
    fn test_reexports_are_appended_once() {
        let mut f = SourceFile::parse("src/store/thunks/index.ts", "export * from './fetchTasks';", Origin::Loaded).unwrap();
        add_reexport_if_absent(&mut f, &ModuleRef::file("src/store/thunks/saveTask.ts")).unwrap();
        add_reexport_if_absent(&mut f, &ModuleRef::file("src/store/thunks/fetchTasks.ts")).unwrap();
        assert_eq!(f.text(), "export * from './fetchTasks';\nexport * from './saveTask';\n");
    }
}
