//! Lookups of top-level declarations by name.

use crate::source::{NodeKind, SourceFile, SyntaxNode};

/// The declaration carried by a top-level statement: the statement itself, or
/// the `declaration` of an `export` statement.
pub fn declaration_of(statement: &SyntaxNode) -> Option<&SyntaxNode> {
    match statement.kind() {
        NodeKind::ExportStatement => statement
            .child_by_field("declaration")
            .or_else(|| statement.child_by_field("value")),
        _ => Some(statement),
    }
}

/// True when `statement` is `export default ...`.
pub fn is_default_export(statement: &SyntaxNode) -> bool {
    statement.kind() == NodeKind::ExportStatement && statement.has_token("default")
}

/// Top-level statements paired with the declaration they carry.
pub fn top_level_declarations(file: &SourceFile) -> impl Iterator<Item = (&SyntaxNode, &SyntaxNode)> {
    file.statements()
        .filter_map(|stmt| declaration_of(stmt).map(|decl| (stmt, decl)))
}

/// Name of a class, function, interface or type alias declaration.
pub fn declared_name<'s>(node: &SyntaxNode, src: &'s str) -> Option<&'s str> {
    node.child_by_field("name").map(|n| n.text(src))
}

fn find_named<'f>(file: &'f SourceFile, kinds: &[NodeKind], name: &str) -> Option<&'f SyntaxNode> {
    top_level_declarations(file)
        .map(|(_, decl)| decl)
        .find(|decl| kinds.contains(&decl.kind()) && declared_name(decl, file.text()) == Some(name))
}

/// A top-level class declaration, exported or not.
pub fn find_class<'f>(file: &'f SourceFile, name: &str) -> Option<&'f SyntaxNode> {
    find_named(file, &[NodeKind::ClassDeclaration], name)
}

/// A top-level function declaration, exported or not.
pub fn find_function<'f>(file: &'f SourceFile, name: &str) -> Option<&'f SyntaxNode> {
    find_named(file, &[NodeKind::FunctionDeclaration, NodeKind::FunctionExpression], name)
}

pub fn find_interface<'f>(file: &'f SourceFile, name: &str) -> Option<&'f SyntaxNode> {
    find_named(file, &[NodeKind::InterfaceDeclaration], name)
}

pub fn find_type_alias<'f>(file: &'f SourceFile, name: &str) -> Option<&'f SyntaxNode> {
    find_named(file, &[NodeKind::TypeAliasDeclaration], name)
}

/// The top-level statement holding the named declaration.
pub fn statement_declaring<'f>(file: &'f SourceFile, name: &str) -> Option<&'f SyntaxNode> {
    let src = file.text();
    top_level_declarations(file)
        .find(|(_, decl)| match decl.kind() {
            NodeKind::LexicalDeclaration | NodeKind::VariableDeclaration => decl
                .children_of_kind(NodeKind::VariableDeclarator)
                .any(|d| declared_name(d, src) == Some(name)),
            _ => declared_name(decl, src) == Some(name),
        })
        .map(|(stmt, _)| stmt)
}

/// A top-level `const name = ...` declarator.
pub fn find_variable<'f>(file: &'f SourceFile, name: &str) -> Option<&'f SyntaxNode> {
    let src = file.text();
    top_level_declarations(file)
        .map(|(_, decl)| decl)
        .filter(|decl| matches!(decl.kind(), NodeKind::LexicalDeclaration | NodeKind::VariableDeclaration))
        .flat_map(|decl| decl.children_of_kind(NodeKind::VariableDeclarator))
        .find(|d| declared_name(d, src) == Some(name))
}

/// Object literal initializing a top-level variable, looking through `as` and
/// `satisfies` wrappers.
pub fn find_variable_object<'f>(file: &'f SourceFile, name: &str) -> Option<&'f SyntaxNode> {
    let mut value = find_variable(file, name)?.child_by_field("value")?;
    loop {
        match value.kind() {
            NodeKind::Object => return Some(value),
            NodeKind::ParenthesizedExpression => value = value.significant_children().next()?,
            NodeKind::Other("as_expression") | NodeKind::Other("satisfies_expression") => {
                value = value.significant_children().next()?
            }
            _ => return None,
        }
    }
}

/// Tag name of a JSX element or self-closing element.
pub fn jsx_tag_name<'s>(element: &SyntaxNode, src: &'s str) -> Option<&'s str> {
    let opening = match element.kind() {
        NodeKind::JsxElement => element.child_by_field("open_tag")?,
        NodeKind::JsxSelfClosingElement | NodeKind::JsxOpeningElement => element,
        _ => return None,
    };
    opening.child_by_field("name").map(|n| n.text(src))
}

/// First JSX element with the given tag under `scope`.
pub fn find_jsx_element<'n>(scope: &'n SyntaxNode, src: &str, tag: &str) -> Option<&'n SyntaxNode> {
    scope.find_first(|n| n.kind().is_jsx_element() && jsx_tag_name(n, src) == Some(tag))
}

/// Method of a class by name (`constructor`, `render`).
pub fn find_method<'n>(class: &'n SyntaxNode, src: &str, name: &str) -> Option<&'n SyntaxNode> {
    class
        .child_by_field("body")?
        .children_of_kind(NodeKind::MethodDefinition)
        .find(|m| declared_name(m, src) == Some(name))
}

/// The constructor of a class declaration.
pub fn find_constructor<'n>(class: &'n SyntaxNode, src: &str) -> Option<&'n SyntaxNode> {
    find_method(class, src, "constructor")
}

/// A `name = ...` field of a class body.
pub fn find_class_field<'n>(class: &'n SyntaxNode, src: &str, name: &str) -> Option<&'n SyntaxNode> {
    class
        .child_by_field("body")?
        .children_of_kind(NodeKind::PublicFieldDefinition)
        .find(|f| declared_name(f, src) == Some(name))
}
