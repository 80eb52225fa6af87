//! Interface fields and heritage.

use crate::diagnostic::EngineError;
use crate::locate::{find_interface, find_type_alias};
use crate::model::FieldSpec;
use crate::source::{squash_whitespace, NodeKind, NodeRef, SourceFile, SyntaxNode, TextEdit};

use super::{append_statement, not_found, INDENT};

/// Renders `export interface Name extends A, B { ... }`.
pub fn render_interface(name: &str, extends: &[String], fields: &[FieldSpec]) -> String {
    let heritage = if extends.is_empty() {
        String::new()
    } else {
        format!(" extends {}", extends.join(", "))
    };
    if fields.is_empty() {
        return format!("export interface {name}{heritage} {{}}\n");
    }
    let mut out = format!("export interface {name}{heritage} {{\n");
    for field in fields {
        out.push_str(&format!("{INDENT}{};\n", field.signature()));
    }
    out.push_str("}\n");
    out
}

/// An interface, or a type alias of an object type, with its `{ ... }` body.
fn find_shape<'f>(file: &'f SourceFile, name: &str) -> Result<Option<(&'f SyntaxNode, &'f SyntaxNode)>, EngineError> {
    if let Some(interface) = find_interface(file, name) {
        let body = interface
            .child_by_field("body")
            .ok_or_else(|| EngineError::malformed(file.path(), format!("interface {name} has no body")))?;
        return Ok(Some((interface, body)));
    }
    Ok(find_type_alias(file, name).and_then(|alias| {
        alias
            .child_by_field("value")
            .filter(|v| v.kind() == NodeKind::ObjectType)
            .map(|body| (alias, body))
    }))
}

/// Makes the interface `name` declare `fields`. A type alias of an object
/// type is edited the same way.
///
/// Existing properties named in `fields` get their type and optionality
/// replaced in place; new fields are appended in input order. With
/// `remove_unlisted`, properties not named in `fields` are deleted. A missing
/// interface is created at the end of the file.
pub fn set_interface_fields(
    file: &mut SourceFile,
    name: &str,
    fields: &[FieldSpec],
    remove_unlisted: bool,
) -> Result<NodeRef, EngineError> {
    let edits = match find_shape(file, name)? {
        Some((declaration, body)) => field_edits(file, declaration, body, fields, remove_unlisted),
        None => {
            tracing::debug!(path = %file.path().display(), interface = name, "creating interface");
            vec![append_statement(file, &render_interface(name, &[], fields))]
        }
    };
    file.apply(edits)?;

    let (declaration, _) = find_shape(file, name)?.ok_or_else(|| not_found(file, format!("interface {name}")))?;
    Ok(file.node_ref(declaration))
}

fn property_name<'s>(property: &SyntaxNode, src: &'s str) -> &'s str {
    property.child_by_field("name").map(|n| n.text(src)).unwrap_or("")
}

fn desired_signature(property: &SyntaxNode, field: &FieldSpec) -> String {
    if property.has_token("readonly") {
        format!("readonly {}", field.signature())
    } else {
        field.signature()
    }
}

fn field_edits(
    file: &SourceFile,
    declaration: &SyntaxNode,
    body: &SyntaxNode,
    fields: &[FieldSpec],
    remove_unlisted: bool,
) -> Vec<TextEdit> {
    let src = file.text();
    let properties: Vec<&SyntaxNode> = body.children_of_kind(NodeKind::PropertySignature).collect();

    let mut edits = Vec::new();
    let mut kept = Vec::new();
    for property in &properties {
        let name = property_name(property, src);
        match fields.iter().find(|f| f.name == name) {
            Some(field) => {
                let desired = desired_signature(property, field);
                if squash_whitespace(property.text(src)) != desired {
                    edits.push(TextEdit::replace(property.range(), desired.clone()));
                }
                kept.push(desired);
            }
            None if remove_unlisted => edits.push(TextEdit::delete(removal_range(file, property))),
            None => kept.push(property.text(src).to_string()),
        }
    }

    let mut added: Vec<&FieldSpec> = Vec::new();
    for field in fields {
        let exists = properties.iter().any(|p| property_name(p, src) == field.name);
        if !exists && !added.iter().any(|a| a.name == field.name) {
            added.push(field);
        }
    }
    if added.is_empty() {
        return edits;
    }

    let close = body.end_byte() - 1;
    if body.text(src).contains('\n') && file.starts_line(close) {
        let indent = properties
            .first()
            .map(|p| file.indent_at(p.start_byte()).to_string())
            .unwrap_or_else(|| format!("{}{INDENT}", file.indent_at(declaration.start_byte())));
        let lines: String = added
            .iter()
            .map(|f| format!("{indent}{};\n", f.signature()))
            .collect();
        edits.push(TextEdit::insert(file.line_start(close), lines));
        return edits;
    }

    // Single-line body: rewrite it one member per line.
    let base = file.indent_at(declaration.start_byte());
    let mut out = String::from("{\n");
    for member in kept.iter().cloned().chain(added.iter().map(|f| f.signature())) {
        out.push_str(&format!("{base}{INDENT}{member};\n"));
    }
    out.push_str(base);
    out.push('}');
    vec![TextEdit::replace(body.range(), out)]
}

/// Range deleting a property with its separator and, when it sits alone on
/// its line, the whole line.
fn removal_range(file: &SourceFile, property: &SyntaxNode) -> std::ops::Range<usize> {
    let src = file.text();
    let mut end = property.end_byte();
    if src[end..].starts_with([';', ',']) {
        end += 1;
    }
    file.full_line_range(property.start_byte()..end)
}

/// Adds `names` to the interface's `extends` list, skipping those already there.
pub fn extend_interface_heritage(file: &mut SourceFile, name: &str, names: &[String]) -> Result<(), EngineError> {
    let src = file.text();
    let interface = find_interface(file, name).ok_or_else(|| not_found(file, format!("interface {name}")))?;
    let clause = interface.child_of_kind(NodeKind::ExtendsTypeClause);

    let existing: Vec<&str> = clause
        .map(|c| c.significant_children().map(|t| t.text(src)).collect())
        .unwrap_or_default();
    let mut added: Vec<&str> = Vec::new();
    for candidate in names {
        if !existing.contains(&candidate.as_str()) && !added.contains(&candidate.as_str()) {
            added.push(candidate);
        }
    }
    if added.is_empty() {
        return Ok(());
    }

    let edit = match clause {
        Some(clause) => TextEdit::insert(clause.end_byte(), format!(", {}", added.join(", "))),
        None => {
            let anchor = interface
                .child_by_field("type_parameters")
                .or_else(|| interface.child_by_field("name"))
                .ok_or_else(|| EngineError::malformed(file.path(), format!("interface {name} has no name")))?;
            TextEdit::insert(anchor.end_byte(), format!(" extends {}", added.join(", ")))
        }
    };
    file.apply(vec![edit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Origin;

    fn file(text: &str) -> SourceFile {
        SourceFile::parse("src/views/Home/props.ts", text, Origin::Loaded).unwrap()
    }

    fn fields() -> Vec<FieldSpec> {
        vec![FieldSpec::new("title", "string"), FieldSpec::new("count", "number").optional()]
    }

    #[test]
    fn test_creates_missing_interface() {
        let mut f = file("");
        set_interface_fields(&mut f, "HomeProps", &fields(), false).unwrap();
        assert_eq!(f.text(), "export interface HomeProps {\n  title: string;\n  count?: number;\n}\n");
    }

    #[test]
    fn test_replaces_in_place_and_appends() {
        let mut f = file("export interface HomeProps {\n  count: string;\n  other: boolean;\n}\n");
        set_interface_fields(&mut f, "HomeProps", &fields(), false).unwrap();
        assert_eq!(
            f.text(),
            "export interface HomeProps {\n  count?: number;\n  other: boolean;\n  title: string;\n}\n"
        );
    }

    #[test]
    fn test_remove_unlisted() {
        let mut f = file("export interface HomeProps {\n  count: number;\n  other: boolean;\n}\n");
        set_interface_fields(&mut f, "HomeProps", &[FieldSpec::new("count", "number")], true).unwrap();
        assert_eq!(f.text(), "export interface HomeProps {\n  count: number;\n}\n");
    }

    #[test]
    fn test_single_line_body_is_expanded() {
        let mut f = file("export interface HomeProps {}\n");
        set_interface_fields(&mut f, "HomeProps", &fields(), false).unwrap();
        assert_eq!(f.text(), "export interface HomeProps {\n  title: string;\n  count?: number;\n}\n");
    }

    #[test]
    fn test_set_fields_is_idempotent() {
        let mut f = file("export interface HomeProps {\n  a: string;\n}\n");
        set_interface_fields(&mut f, "HomeProps", &fields(), false).unwrap();
        let once = f.text().to_string();
        set_interface_fields(&mut f, "HomeProps", &fields(), false).unwrap();
        assert_eq!(f.text(), once);
    }

    #[test]
    fn test_object_type_alias_is_edited_like_an_interface() {
        let mut f = file("export type HomeNavigatorParamList = {};\n");
        set_interface_fields(&mut f, "HomeNavigatorParamList", &[FieldSpec::new("Home", "undefined")], false).unwrap();
        assert_eq!(f.text(), "export type HomeNavigatorParamList = {\n  Home: undefined;\n};\n");
    }

    #[test]
    fn test_extend_heritage() {
        let mut f = file("export interface HomeProps {\n  a: string;\n}\n");
        extend_interface_heritage(&mut f, "HomeProps", &["HomeStateProps".to_string()]).unwrap();
        extend_interface_heritage(
            &mut f,
            "HomeProps",
            &["HomeStateProps".to_string(), "HomeDispatchProps".to_string()],
        )
        .unwrap();
        assert!(f
            .text()
            .starts_with("export interface HomeProps extends HomeStateProps, HomeDispatchProps {"));
    }

    #[test]
    fn test_extend_missing_interface_is_not_found() {
        let mut f = file("export const a = 1;\n");
        let err = extend_interface_heritage(&mut f, "HomeProps", &["A".to_string()]).unwrap_err();
        assert!(err.is_not_found());
    }
}
