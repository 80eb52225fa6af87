//! Object literal merging.

use crate::diagnostic::EngineError;
use crate::model::ObjectProperty;
use crate::source::{string_value, NodeKind, NodeRef, SourceFile, SyntaxNode, TextEdit};

use super::INDENT;

/// Keys of an object literal, in source order. Spread elements have no key.
pub fn object_keys(object: &SyntaxNode, src: &str) -> Vec<String> {
    object
        .significant_children()
        .filter_map(|member| match member.kind() {
            NodeKind::Pair => member.child_by_field("key").map(|key| match key.kind() {
                NodeKind::String => string_value(key, src),
                _ => key.text(src).to_string(),
            }),
            NodeKind::ShorthandPropertyIdentifier => Some(member.text(src).to_string()),
            NodeKind::MethodDefinition => member.child_by_field("name").map(|n| n.text(src).to_string()),
            _ => None,
        })
        .collect()
}

/// Renders a multi-line object literal whose closing brace sits at `indent`.
pub fn render_object(properties: &[ObjectProperty], indent: &str) -> String {
    if properties.is_empty() {
        return "{}".to_string();
    }
    let mut out = String::from("{\n");
    for property in properties {
        out.push_str(&format!("{indent}{INDENT}{},\n", property.render()));
    }
    out.push_str(indent);
    out.push('}');
    out
}

/// Adds the properties whose key is not yet present. Existing initializers
/// are never overwritten. Returns a handle to the merged object.
pub fn merge_object_literal_properties(
    file: &mut SourceFile,
    object: &NodeRef,
    properties: &[ObjectProperty],
) -> Result<NodeRef, EngineError> {
    let node = file.resolve(object)?;
    if node.kind() != NodeKind::Object {
        return Err(EngineError::malformed(
            file.path(),
            format!("expected an object literal, found {}", node.raw_kind()),
        ));
    }
    let start = node.start_byte();
    let edits = object_merge_edits(file, node, properties);
    file.apply(edits)?;

    let merged = file
        .root()
        .find_first(|n| n.kind() == NodeKind::Object && n.start_byte() == start)
        .ok_or_else(|| EngineError::malformed(file.path(), "object literal lost after merge"))?;
    Ok(file.node_ref(merged))
}

/// Edits adding the missing `properties` to `object`.
///
/// A multi-line object gets the new properties before its closing brace; a
/// single-line or empty one is rewritten one property per line.
pub(crate) fn object_merge_edits(file: &SourceFile, object: &SyntaxNode, properties: &[ObjectProperty]) -> Vec<TextEdit> {
    let src = file.text();
    let keys = object_keys(object, src);

    let mut missing: Vec<&ObjectProperty> = Vec::new();
    for property in properties {
        if !keys.contains(&property.key) && !missing.iter().any(|m| m.key == property.key) {
            missing.push(property);
        }
    }
    if missing.is_empty() {
        return Vec::new();
    }
    tracing::debug!(
        path = %file.path().display(),
        added = missing.len(),
        "merging object properties"
    );

    let members: Vec<&SyntaxNode> = object.named_children().collect();
    let close = object.end_byte() - 1;
    let layout_is_multiline = object.text(src).contains('\n')
        && file.starts_line(close)
        && members.first().map(|m| file.starts_line(m.start_byte())).unwrap_or(false);

    if layout_is_multiline {
        let indent = members
            .first()
            .map(|m| file.indent_at(m.start_byte()).to_string())
            .unwrap_or_default();
        let mut edits = Vec::new();
        if let Some(last) = object.significant_children().last() {
            if !src[last.end_byte()..close].contains(',') {
                edits.push(TextEdit::insert(last.end_byte(), ","));
            }
        }
        let lines: String = missing
            .iter()
            .map(|p| format!("{indent}{},\n", p.render()))
            .collect();
        edits.push(TextEdit::insert(file.line_start(close), lines));
        return edits;
    }

    let base = file.indent_at(object.start_byte());
    let mut out = String::from("{\n");
    for member in &members {
        let separator = if member.kind() == NodeKind::Comment { "" } else { "," };
        out.push_str(&format!("{base}{INDENT}{}{separator}\n", member.text(src).trim()));
    }
    for property in &missing {
        out.push_str(&format!("{base}{INDENT}{},\n", property.render()));
    }
    out.push_str(base);
    out.push('}');
    vec![TextEdit::replace(object.range(), out)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::find_variable_object;
    use crate::source::Origin;

    fn merge(text: &str, properties: &[ObjectProperty]) -> String {
        let mut file = SourceFile::parse("src/a.ts", text, Origin::Loaded).unwrap();
        let object = find_variable_object(&file, "a").unwrap();
        let handle = file.node_ref(object);
        merge_object_literal_properties(&mut file, &handle, properties).unwrap();
        file.text().to_string()
    }

    #[test]
    fn test_merge_into_multiline_object() {
        let out = merge(
            "const a = {\n  x: 1,\n  y: 2\n};\n",
            &[ObjectProperty::new("y", "5"), ObjectProperty::new("z", "3")],
        );
        assert_eq!(out, "const a = {\n  x: 1,\n  y: 2,\n  z: 3,\n};\n");
    }

    #[test]
    fn test_merge_into_single_line_object() {
        let out = merge("const a = { fetchTasks };\n", &[ObjectProperty::shorthand("addTask")]);
        assert_eq!(out, "const a = {\n  fetchTasks,\n  addTask,\n};\n");
    }

    #[test]
    fn test_merge_into_empty_object() {
        let out = merge("const a = {};\n", &[ObjectProperty::new("x", "''")]);
        assert_eq!(out, "const a = {\n  x: '',\n};\n");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let properties = [ObjectProperty::new("x", "1"), ObjectProperty::new("z", "3")];
        let once = merge("const a = {\n  x: 1,\n};\n", &properties);
        assert_eq!(merge(&once, &properties), once);
    }

    #[test]
    fn test_existing_initializer_is_kept() {
        let out = merge("const a = { 'x': 1 };\n", &[ObjectProperty::new("x", "2")]);
        assert_eq!(out, "const a = { 'x': 1 };\n");
    }

    #[test]
    fn test_render_object() {
        assert_eq!(render_object(&[], ""), "{}");
        assert_eq!(
            render_object(&[ObjectProperty::new("a", "1")], "  "),
            "{\n    a: 1,\n  }"
        );
    }
}
