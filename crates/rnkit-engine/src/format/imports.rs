//! Import organizer.
//!
//! Top-level import declarations are re-rendered in canonical form and
//! sorted: external modules first, then relative modules, each group ordered
//! by module specifier and then by the first imported name. Anything found
//! between two imports (comments, stray statements) is moved below the block
//! in its original order.

use std::cmp::Ordering;

use crate::source::{squash_whitespace, string_value, NodeKind, SourceFile, SyntaxNode};

/// Longest single-line import before named specifiers are broken one per line.
const MAX_IMPORT_WIDTH: usize = 80;

/// One import declaration in canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub source: String,
    pub type_only: bool,
    pub default: Option<String>,
    pub namespace: Option<String>,
    pub named: Vec<String>,
    /// Original text for declarations that cannot be re-rendered safely.
    pub verbatim: Option<String>,
}

impl ImportDecl {
    /// Reads an `import_statement` node.
    pub fn from_node(node: &SyntaxNode, src: &str) -> Self {
        let source = node
            .child_by_field("source")
            .or_else(|| node.child_of_kind(NodeKind::String))
            .map(|s| string_value(s, src))
            .unwrap_or_default();

        let mut decl = ImportDecl {
            source,
            type_only: node.has_token("type"),
            default: None,
            namespace: None,
            named: Vec::new(),
            verbatim: None,
        };

        let unusual = node.named_children().any(|c| {
            !matches!(c.kind(), NodeKind::ImportClause | NodeKind::String)
        });

        if let Some(clause) = node.child_of_kind(NodeKind::ImportClause) {
            for part in clause.named_children() {
                match part.kind() {
                    NodeKind::Identifier => decl.default = Some(part.text(src).to_string()),
                    NodeKind::NamespaceImport => decl.namespace = Some(squash_whitespace(part.text(src))),
                    NodeKind::NamedImports => {
                        if part.child_of_kind(NodeKind::Comment).is_some() {
                            decl.verbatim = Some(node.text(src).trim().to_string());
                        }
                        for spec in part.children_of_kind(NodeKind::ImportSpecifier) {
                            let text = squash_whitespace(spec.text(src));
                            if !decl.named.contains(&text) {
                                decl.named.push(text);
                            }
                        }
                    }
                    _ => decl.verbatim = Some(node.text(src).trim().to_string()),
                }
            }
        }

        if unusual {
            decl.verbatim = Some(node.text(src).trim().to_string());
        }

        decl.named.sort_by(|a, b| specifier_key(a).cmp(specifier_key(b)).then(a.cmp(b)));
        decl
    }

    /// True for module specifiers that point into the project.
    pub fn is_relative(&self) -> bool {
        self.source.starts_with('.')
    }

    /// Name used to break ties between declarations of the same module.
    fn first_name(&self) -> &str {
        self.default
            .as_deref()
            .or(self.namespace.as_deref())
            .or(self.named.first().map(|n| specifier_key(n)))
            .unwrap_or("")
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.is_relative()
            .cmp(&other.is_relative())
            .then_with(|| self.source.cmp(&other.source))
            .then_with(|| self.first_name().cmp(other.first_name()))
            .then_with(|| self.type_only.cmp(&other.type_only))
            .then_with(|| self.render().cmp(&other.render()))
    }

    /// Canonical text of the declaration.
    pub fn render(&self) -> String {
        if let Some(text) = &self.verbatim {
            return text.clone();
        }

        let quote = if self.source.contains('\'') { '"' } else { '\'' };
        let source = format!("{quote}{}{quote}", self.source);
        let keyword = if self.type_only { "import type" } else { "import" };

        let mut head = Vec::new();
        if let Some(default) = &self.default {
            head.push(default.clone());
        }
        if let Some(namespace) = &self.namespace {
            head.push(namespace.clone());
        }

        if head.is_empty() && self.named.is_empty() {
            return format!("{keyword} {source};");
        }

        let mut parts = head.clone();
        if !self.named.is_empty() {
            parts.push(format!("{{ {} }}", self.named.join(", ")));
        }
        let single = format!("{keyword} {} from {source};", parts.join(", "));
        if single.len() <= MAX_IMPORT_WIDTH || self.named.is_empty() {
            return single;
        }

        let mut out = String::from(keyword);
        out.push(' ');
        if !head.is_empty() {
            out.push_str(&head.join(", "));
            out.push_str(", ");
        }
        out.push_str("{\n");
        for name in &self.named {
            out.push_str("  ");
            out.push_str(name);
            out.push_str(",\n");
        }
        out.push_str(&format!("}} from {source};"));
        out
    }
}

/// `type Foo as Bar` → `Foo`
fn specifier_key(spec: &str) -> &str {
    let spec = spec.strip_prefix("type ").unwrap_or(spec);
    spec.split(" as ").next().unwrap_or(spec).trim()
}

/// Returns the file text with its import block organized.
pub fn organize(file: &SourceFile) -> String {
    let src = file.text();
    let imports: Vec<&SyntaxNode> = file
        .root()
        .children()
        .iter()
        .filter(|n| n.kind() == NodeKind::ImportStatement)
        .collect();

    let (first, last) = match (imports.first(), imports.last()) {
        (Some(first), Some(last)) => (first.start_byte(), last.end_byte()),
        _ => return src.to_string(),
    };

    // Content sitting between imports keeps its order but moves below the block.
    let mut interleaved = Vec::new();
    for pair in imports.windows(2) {
        let gap = src[pair[0].end_byte()..pair[1].start_byte()].trim();
        if !gap.is_empty() {
            interleaved.push(gap.to_string());
        }
    }

    let mut decls: Vec<ImportDecl> = imports.iter().map(|n| ImportDecl::from_node(n, src)).collect();
    decls.sort_by(|a, b| a.compare(b));

    let mut block = String::new();
    let mut previous_relative = None;
    for decl in &decls {
        if let Some(prev) = previous_relative {
            block.push('\n');
            if prev != decl.is_relative() {
                block.push('\n');
            }
        }
        block.push_str(&decl.render());
        previous_relative = Some(decl.is_relative());
    }

    let mut out = String::with_capacity(src.len());
    out.push_str(&src[..first]);
    out.push_str(&block);
    out.push('\n');
    for item in &interleaved {
        out.push('\n');
        out.push_str(item);
        out.push('\n');
    }
    let rest = src[last..].trim_start_matches([' ', '\t', '\r', '\n']);
    if !rest.is_empty() {
        out.push('\n');
        out.push_str(rest);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Origin;

    fn organized(text: &str) -> String {
        let file = SourceFile::parse("src/a.tsx", text, Origin::Loaded).unwrap();
        organize(&file)
    }

    #[test]
    fn test_external_before_relative_sorted() {
        let text = "import { B } from './b';\nimport React from 'react';\nimport { A } from '../a';\nimport { View } from \"react-native\";\n\nexport const x = 1;\n";
        assert_eq!(
            organized(text),
            "import React from 'react';\nimport { View } from 'react-native';\n\nimport { A } from '../a';\nimport { B } from './b';\n\nexport const x = 1;\n"
        );
    }

    #[test]
    fn test_named_specifiers_are_sorted() {
        let text = "import { useState, Component, FC } from 'react';\n";
        assert_eq!(organized(text), "import { Component, FC, useState } from 'react';\n");
    }

    #[test]
    fn test_order_of_same_name_imports_ignores_input_order() {
        let expected = "import { A } from './a';\nimport type { A } from './a';\n";
        assert_eq!(organized("import type { A } from './a';\nimport { A } from './a';\n"), expected);
        assert_eq!(organized("import { A } from './a';\nimport type { A } from './a';\n"), expected);
    }

    #[test]
    fn test_ties_broken_by_imported_name() {
        let text = "import { View } from 'react';\nimport React from 'react';\n";
        assert_eq!(organized(text), "import React from 'react';\nimport { View } from 'react';\n");
    }

    #[test]
    fn test_long_imports_break_lines() {
        let text = "import { aaaaaaaaaaaa, bbbbbbbbbbbbbb, cccccccccccccc, dddddddddddddd, eeeeeeeeeeee } from 'module';\n";
        assert_eq!(
            organized(text),
            "import {\n  aaaaaaaaaaaa,\n  bbbbbbbbbbbbbb,\n  cccccccccccccc,\n  dddddddddddddd,\n  eeeeeeeeeeee,\n} from 'module';\n"
        );
    }

    #[test]
    fn test_interleaved_content_moves_below() {
        let text = "import a from 'a';\n// note\nimport b from 'b';\nconst x = a + b;\n";
        assert_eq!(
            organized(text),
            "import a from 'a';\nimport b from 'b';\n\n// note\n\nconst x = a + b;\n"
        );
    }

    #[test]
    fn test_side_effect_and_type_imports() {
        let text = "import './setup';\nimport type { Theme } from './theme';\n";
        assert_eq!(organized(text), "import './setup';\nimport type { Theme } from './theme';\n");
    }
}
