//! Class component mutators: constructor, state initializer, base type arguments.

use crate::diagnostic::EngineError;
use crate::locate::{find_class, find_class_field, find_constructor};
use crate::model::{FieldSpec, ObjectProperty};
use crate::source::{squash_whitespace, NodeKind, SourceFile, SyntaxNode, TextEdit};

use super::object::object_merge_edits;
use super::{block_insert, nested_indent, not_found, INDENT};

/// Ensures the class has a constructor taking exactly `props: T` and
/// forwarding it with a single `super(props)`. A missing constructor is
/// inserted as the first class member.
pub fn set_or_insert_constructor(file: &mut SourceFile, class_name: &str, props_type: &str) -> Result<(), EngineError> {
    let src = file.text();
    let class = find_class(file, class_name).ok_or_else(|| not_found(file, format!("class {class_name}")))?;

    let edits = match find_constructor(class, src) {
        Some(constructor) => constructor_edits(file, constructor, props_type)?,
        None => {
            let body = class
                .child_by_field("body")
                .ok_or_else(|| EngineError::malformed(file.path(), format!("class {class_name} has no body")))?;
            let indent = nested_indent(file, class);
            vec![TextEdit::insert(
                body.start_byte() + 1,
                format!("\n{indent}constructor(props: {props_type}) {{\n{indent}{INDENT}super(props);\n{indent}}}\n"),
            )]
        }
    };
    file.apply(edits)
}

fn constructor_edits(file: &SourceFile, constructor: &SyntaxNode, props_type: &str) -> Result<Vec<TextEdit>, EngineError> {
    let src = file.text();
    let mut edits = Vec::new();

    let params = constructor
        .child_by_field("parameters")
        .ok_or_else(|| EngineError::malformed(file.path(), "constructor has no parameter list"))?;
    let desired = format!("(props: {props_type})");
    if squash_whitespace(params.text(src)) != desired {
        edits.push(TextEdit::replace(params.range(), desired));
    }

    let body = constructor
        .child_by_field("body")
        .ok_or_else(|| EngineError::malformed(file.path(), "constructor has no body"))?;
    match super_call(body) {
        Some(call) => {
            if let Some(args) = call.child_by_field("arguments") {
                if squash_whitespace(args.text(src)) != "(props)" {
                    edits.push(TextEdit::replace(args.range(), "(props)"));
                }
            }
        }
        None => {
            let indent = nested_indent(file, constructor);
            edits.push(block_insert(file, body, None, &format!("{indent}super(props);\n")));
        }
    }
    Ok(edits)
}

/// The `super(...)` call statement at the top level of a constructor body.
fn super_statement(body: &SyntaxNode) -> Option<&SyntaxNode> {
    body.children_of_kind(NodeKind::ExpressionStatement).find(|stmt| {
        stmt.child_of_kind(NodeKind::CallExpression)
            .and_then(|c| c.child_by_field("function"))
            .map(|f| f.kind() == NodeKind::Super)
            .unwrap_or(false)
    })
}

fn super_call(body: &SyntaxNode) -> Option<&SyntaxNode> {
    super_statement(body)?.child_of_kind(NodeKind::CallExpression)
}

/// The object assigned by `this.state = {...}` in a constructor body.
fn this_state_object<'a>(body: &'a SyntaxNode, src: &str) -> Option<&'a SyntaxNode> {
    body.children_of_kind(NodeKind::ExpressionStatement).find_map(|stmt| {
        let assignment = stmt.child_of_kind(NodeKind::AssignmentExpression)?;
        let left = assignment.child_by_field("left")?;
        let right = assignment.child_by_field("right")?;
        (squash_whitespace(left.text(src)) == "this.state" && right.kind() == NodeKind::Object).then_some(right)
    })
}

/// Ensures the class state initializer holds every field with an initial
/// value. Merges into `this.state = {...}` in the constructor or a
/// `state = {...}` field; otherwise adds `this.state` after `super(props)`.
///
/// Required fields without an initial value are a caller error.
pub fn set_class_state_initializer(file: &mut SourceFile, class_name: &str, fields: &[FieldSpec]) -> Result<(), EngineError> {
    if let Some(field) = fields.iter().find(|f| !f.optional && f.initial_value.is_none()) {
        return Err(EngineError::MissingInitialValue {
            field: field.name.clone(),
        });
    }
    let properties: Vec<ObjectProperty> = fields
        .iter()
        .filter_map(|f| f.initial_value.as_ref().map(|v| ObjectProperty::new(&f.name, v)))
        .collect();
    if properties.is_empty() {
        return Ok(());
    }

    let src = file.text();
    let class = find_class(file, class_name).ok_or_else(|| not_found(file, format!("class {class_name}")))?;
    let constructor = find_constructor(class, src);
    let constructor_body = constructor.and_then(|c| c.child_by_field("body"));

    if let Some(object) = constructor_body.and_then(|b| this_state_object(b, src)) {
        let edits = object_merge_edits(file, object, &properties);
        return file.apply(edits);
    }

    let state_field = find_class_field(class, src, "state")
        .and_then(|f| f.child_by_field("value"))
        .filter(|v| v.kind() == NodeKind::Object);
    if let Some(object) = state_field {
        let edits = object_merge_edits(file, object, &properties);
        return file.apply(edits);
    }

    let (Some(constructor), Some(body)) = (constructor, constructor_body) else {
        return Err(not_found(file, format!("constructor of class {class_name}")));
    };
    let indent = nested_indent(file, constructor);
    let mut lines = format!("{indent}this.state = {{\n");
    for property in &properties {
        lines.push_str(&format!("{indent}{INDENT}{},\n", property.render()));
    }
    lines.push_str(&format!("{indent}}};\n"));

    let edit = block_insert(file, body, super_statement(body), &lines);
    file.apply(vec![edit])
}

/// Sets the base class type argument at `position` (0 = props, 1 = state),
/// filling skipped positions with `{}`.
pub fn set_heritage_type_argument(
    file: &mut SourceFile,
    class_name: &str,
    position: usize,
    type_name: &str,
) -> Result<(), EngineError> {
    let src = file.text();
    let class = find_class(file, class_name).ok_or_else(|| not_found(file, format!("class {class_name}")))?;
    let extends = class
        .child_of_kind(NodeKind::ClassHeritage)
        .and_then(|h| h.child_of_kind(NodeKind::ExtendsClause))
        .ok_or_else(|| EngineError::malformed(file.path(), format!("class {class_name} has no base class")))?;

    let edit = match extends.child_by_field("type_arguments") {
        Some(args) => {
            let items: Vec<&SyntaxNode> = args.significant_children().collect();
            match items.get(position) {
                Some(item) if item.text(src) == type_name => None,
                Some(item) => Some(TextEdit::replace(item.range(), type_name)),
                None => {
                    let mut tail = String::new();
                    for _ in items.len()..position {
                        tail.push_str(", {}");
                    }
                    tail.push_str(&format!(", {type_name}"));
                    Some(TextEdit::insert(args.end_byte() - 1, tail))
                }
            }
        }
        None => {
            let base = extends
                .child_by_field("value")
                .ok_or_else(|| EngineError::malformed(file.path(), "base class has no name"))?;
            let mut list = vec!["{}"; position];
            list.push(type_name);
            Some(TextEdit::insert(base.end_byte(), format!("<{}>", list.join(", "))))
        }
    };
    file.apply(edit.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Origin;

    fn file(text: &str) -> SourceFile {
        SourceFile::parse("src/views/Home/index.tsx", text, Origin::Loaded).unwrap()
    }

    const BARE: &str = "export default class Home extends Component<HomeProps> {\n  render() {\n    return null;\n  }\n}\n";

    #[test]
    fn test_inserts_constructor_first() {
        let mut f = file(BARE);
        set_or_insert_constructor(&mut f, "Home", "HomeProps").unwrap();
        assert_eq!(
            f.text(),
            "export default class Home extends Component<HomeProps> {\n  constructor(props: HomeProps) {\n    super(props);\n  }\n\n  render() {\n    return null;\n  }\n}\n"
        );
    }

    #[test]
    fn test_constructor_is_not_duplicated() {
        let mut f = file(BARE);
        set_or_insert_constructor(&mut f, "Home", "HomeProps").unwrap();
        let once = f.text().to_string();
        set_or_insert_constructor(&mut f, "Home", "HomeProps").unwrap();
        assert_eq!(f.text(), once);
        assert_eq!(f.text().matches("super(props)").count(), 1);
    }

    #[test]
    fn test_existing_constructor_is_fixed() {
        let mut f = file(
            "export class Home extends Component {\n  constructor(p) {\n    this.x = 1;\n  }\n}\n",
        );
        set_or_insert_constructor(&mut f, "Home", "HomeProps").unwrap();
        assert_eq!(
            f.text(),
            "export class Home extends Component {\n  constructor(props: HomeProps) {\n    super(props);\n    this.x = 1;\n  }\n}\n"
        );
    }

    #[test]
    fn test_state_initializer_inserted_after_super() {
        let mut f = file(BARE);
        set_or_insert_constructor(&mut f, "Home", "HomeProps").unwrap();
        let fields = [
            FieldSpec::new("title", "string").with_initial("''"),
            FieldSpec::new("note", "string").optional(),
        ];
        set_class_state_initializer(&mut f, "Home", &fields).unwrap();
        assert!(f
            .text()
            .contains("    super(props);\n    this.state = {\n      title: '',\n    };\n  }\n"));

        let more = [FieldSpec::new("count", "number").with_initial("0")];
        set_class_state_initializer(&mut f, "Home", &more).unwrap();
        assert!(f.text().contains("      title: '',\n      count: 0,\n    };"));
    }

    #[test]
    fn test_state_initializer_requires_initial_values() {
        let mut f = file(BARE);
        let err = set_class_state_initializer(&mut f, "Home", &[FieldSpec::new("title", "string")]).unwrap_err();
        assert!(matches!(err, EngineError::MissingInitialValue { field } if field == "title"));
    }

    #[test]
    fn test_state_field_is_merged() {
        let mut f = file("export class Home extends Component {\n  state = { a: 1 };\n}\n");
        set_class_state_initializer(&mut f, "Home", &[FieldSpec::new("b", "number").with_initial("2")]).unwrap();
        assert!(f.text().contains("state = {\n    a: 1,\n    b: 2,\n  };"));
    }

    #[test]
    fn test_heritage_type_arguments() {
        let mut f = file(BARE);
        set_heritage_type_argument(&mut f, "Home", 1, "HomeState").unwrap();
        assert!(f.text().contains("extends Component<HomeProps, HomeState>"));
        set_heritage_type_argument(&mut f, "Home", 1, "HomeState").unwrap();
        assert!(f.text().contains("extends Component<HomeProps, HomeState>"));

        let mut g = file("export class Home extends Component {\n}\n");
        set_heritage_type_argument(&mut g, "Home", 1, "HomeState").unwrap();
        assert!(g.text().contains("extends Component<{}, HomeState>"));
    }
}
