//! Reducer constructs: action-type unions, dispatch blocks, root reducer.

use crate::model::{ActionTypeMember, ActionTypeUnion};
use crate::source::{string_value, NodeKind, SourceFile, SyntaxNode};

use super::declarations::find_type_alias;

/// One clause of a dispatch block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseClause {
    /// Tested value without quotes; `None` for the default clause.
    pub test: Option<String>,
    pub text: String,
}

impl CaseClause {
    pub fn is_default(&self) -> bool {
        self.test.is_none()
    }
}

/// The `switch (action.type)` block of a reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchBlock {
    pub clauses: Vec<CaseClause>,
}

impl DispatchBlock {
    /// Non-default clauses, in order.
    pub fn cases(&self) -> impl Iterator<Item = &CaseClause> {
        self.clauses.iter().filter(|c| !c.is_default())
    }

    pub fn default_count(&self) -> usize {
        self.clauses.iter().filter(|c| c.is_default()).count()
    }
}

/// Reads a type alias whose value is a union of tagged object shapes, or the
/// placeholder `any`.
pub fn find_action_type_union(file: &SourceFile, name: &str) -> Option<ActionTypeUnion> {
    let src = file.text();
    let alias = find_type_alias(file, name)?;
    let value = alias.child_by_field("value")?;

    if is_sentinel(value, src) {
        return Some(ActionTypeUnion {
            name: name.to_string(),
            is_sentinel: true,
            members: Vec::new(),
        });
    }

    let members = union_members(value)
        .into_iter()
        .map(|m| read_member(m, src))
        .collect();
    Some(ActionTypeUnion {
        name: name.to_string(),
        is_sentinel: false,
        members,
    })
}

/// True for the `any` placeholder.
pub fn is_sentinel(value: &SyntaxNode, src: &str) -> bool {
    value.kind() == NodeKind::PredefinedType && value.text(src) == "any"
}

/// Flattens a (left-nested) union type into its members, in source order.
pub fn union_members(value: &SyntaxNode) -> Vec<&SyntaxNode> {
    if value.kind() != NodeKind::UnionType {
        return vec![value];
    }
    let mut members = Vec::new();
    for child in value.significant_children() {
        if child.kind() == NodeKind::UnionType {
            members.extend(union_members(child));
        } else {
            members.push(child);
        }
    }
    members
}

fn read_member(member: &SyntaxNode, src: &str) -> ActionTypeMember {
    let mut out = ActionTypeMember {
        tag: None,
        payload_type: None,
        text: member.text(src).to_string(),
    };
    if member.kind() != NodeKind::ObjectType {
        return out;
    }
    for property in member.children_of_kind(NodeKind::PropertySignature) {
        let name = property.child_by_field("name").map(|n| n.text(src));
        let type_node = property
            .child_by_field("type")
            .and_then(|t| t.significant_children().next());
        match (name, type_node) {
            (Some("type"), Some(t)) if t.kind() == NodeKind::LiteralType => {
                out.tag = t.child_of_kind(NodeKind::String).map(|s| string_value(s, src));
            }
            (Some("payload"), Some(t)) => out.payload_type = Some(t.text(src).to_string()),
            _ => {}
        }
    }
    out
}

/// Tag an action-type member denotes, for deduplication of raw member text.
///
/// Only a `type` key of the member's own object literal type counts; keys of
/// nested payload types and names merely containing `type` are skipped.
pub fn member_tag(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let is_ident = |b: u8| b.is_ascii_alphanumeric() || b == b'_' || b == b'$';
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 1;
            } else if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'\'' | b'"' | b'`' => quote = Some(b),
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b't' if depth == 1
                && text[i..].starts_with("type")
                && (i == 0 || !is_ident(bytes[i - 1]))
                && !bytes.get(i + 4).is_some_and(|c| is_ident(*c)) =>
            {
                if let Some(tag) = quoted_value(&text[i + 4..]) {
                    return Some(tag);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// `: 'value'` at the start of `text`, returning `value`.
fn quoted_value(text: &str) -> Option<String> {
    let after = text.trim_start().strip_prefix(':')?.trim_start();
    let quote = after.chars().next().filter(|c| matches!(c, '\'' | '"'))?;
    let rest = &after[1..];
    rest.find(quote).map(|end| rest[..end].to_string())
}

/// The first `switch` statement of the file, which in a generated reducer is
/// its dispatch block.
pub fn dispatch_switch(file: &SourceFile) -> Option<&SyntaxNode> {
    file.root().find_first(|n| n.kind() == NodeKind::SwitchStatement)
}

pub fn find_dispatch_block(file: &SourceFile) -> Option<DispatchBlock> {
    let src = file.text();
    let body = dispatch_switch(file)?.child_by_field("body")?;
    let clauses = body
        .significant_children()
        .filter_map(|clause| match clause.kind() {
            NodeKind::SwitchCase => Some(CaseClause {
                test: clause.child_by_field("value").map(|v| case_test(v, src)),
                text: clause.text(src).to_string(),
            }),
            NodeKind::SwitchDefault => Some(CaseClause {
                test: None,
                text: clause.text(src).to_string(),
            }),
            _ => None,
        })
        .collect();
    Some(DispatchBlock { clauses })
}

/// Tested value of a `case`: string contents, or the expression text.
pub fn case_test(value: &SyntaxNode, src: &str) -> String {
    if value.kind() == NodeKind::String {
        string_value(value, src)
    } else {
        value.text(src).to_string()
    }
}

/// The object passed to `combineReducers({...})`.
pub fn find_combine_reducers_object(file: &SourceFile) -> Option<&SyntaxNode> {
    let src = file.text();
    file.root()
        .find_first(|n| {
            n.kind() == NodeKind::CallExpression
                && n.child_by_field("function").map(|f| f.text(src)) == Some("combineReducers")
        })?
        .child_by_field("arguments")?
        .significant_children()
        .next()
        .filter(|a| a.kind() == NodeKind::Object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Origin;

    fn file(text: &str) -> SourceFile {
        SourceFile::parse("src/store/reducers/task/actions.ts", text, Origin::Loaded).unwrap()
    }

    #[test]
    fn test_sentinel_union() {
        let f = file("export type TaskActionTypes = any;\n");
        let union = find_action_type_union(&f, "TaskActionTypes").unwrap();
        assert!(union.is_sentinel);
        assert!(union.members.is_empty());
    }

    #[test]
    fn test_union_members_in_order() {
        let f = file(
            "export type TaskActionTypes =\n  | { type: 'TASK/SET_STATE_1'; payload: string }\n  | { type: 'TASK/SET_STATE_2'; payload: number }\n  | { type: 'TASK/RESET' };\n",
        );
        let union = find_action_type_union(&f, "TaskActionTypes").unwrap();
        assert!(!union.is_sentinel);
        let tags: Vec<_> = union.tags().collect();
        assert_eq!(tags, vec!["TASK/SET_STATE_1", "TASK/SET_STATE_2", "TASK/RESET"]);
        assert_eq!(union.members[1].payload_type.as_deref(), Some("number"));
        assert_eq!(union.members[2].payload_type, None);
    }

    #[test]
    fn test_single_member_union() {
        let f = file("export type A = { type: 'X' };\n");
        let union = find_action_type_union(&f, "A").unwrap();
        assert_eq!(union.members.len(), 1);
        assert_eq!(union.members[0].tag.as_deref(), Some("X"));
    }

    #[test]
    fn test_member_tag_from_text() {
        assert_eq!(member_tag("{ type: 'TASK/X'; payload: string }").as_deref(), Some("TASK/X"));
        assert_eq!(member_tag("{type:\"Y\"}").as_deref(), Some("Y"));
        assert_eq!(member_tag("Foo"), None);
    }

    #[test]
    fn test_member_tag_ignores_other_type_words() {
        assert_eq!(member_tag("{ payload: datatype; type: 'X' }").as_deref(), Some("X"));
        assert_eq!(member_tag("{ subtype: 'S'; type: 'T' }").as_deref(), Some("T"));
        assert_eq!(member_tag("{ payload: { type: 'INNER' }; type: 'OUTER' }").as_deref(), Some("OUTER"));
        assert_eq!(member_tag("{ payload: { type: 'INNER' } }"), None);
        assert_eq!(member_tag("{ note: 'type: \\'Q\\''; type: 'R' }").as_deref(), Some("R"));
    }

    #[test]
    fn test_dispatch_block() {
        let f = SourceFile::parse(
            "src/store/reducers/task/index.ts",
            "export default function taskReducer(state = initialState, action: TaskActionTypes): TaskState {\n  switch (action.type) {\n    case 'TASK/A':\n      return state;\n    default:\n      return state;\n  }\n}\n",
            Origin::Loaded,
        )
        .unwrap();
        let block = find_dispatch_block(&f).unwrap();
        assert_eq!(block.cases().count(), 1);
        assert_eq!(block.default_count(), 1);
        assert_eq!(block.clauses[0].test.as_deref(), Some("TASK/A"));
    }

    #[test]
    fn test_combine_reducers_object() {
        let f = SourceFile::parse(
            "src/store/reducers/index.ts",
            "const rootReducer = combineReducers({\n  task: taskReducer,\n});\n",
            Origin::Loaded,
        )
        .unwrap();
        assert!(find_combine_reducers_object(&f).is_some());
    }
}
