//! State hook extraction for function and arrow components.

use crate::model::StateHook;
use crate::source::{NodeKind, SyntaxNode};

use super::component::ComponentNodes;

const STATE_HOOKS: &[&str] = &["useState", "React.useState"];

/// `useState` bindings declared directly in the component body, in
/// declaration order.
pub fn find_state_hooks(nodes: &ComponentNodes<'_>, src: &str) -> Vec<StateHook> {
    state_hook_declarations(nodes, src)
        .into_iter()
        .filter_map(|stmt| read_hook(stmt, src))
        .collect()
}

/// The `const [x, setX] = useState(...)` statements of a component body.
pub fn state_hook_declarations<'a>(nodes: &ComponentNodes<'a>, src: &str) -> Vec<&'a SyntaxNode> {
    let Some(body) = nodes.body() else {
        return Vec::new();
    };
    body.significant_children()
        .filter(|stmt| matches!(stmt.kind(), NodeKind::LexicalDeclaration | NodeKind::VariableDeclaration))
        .filter(|stmt| read_hook(stmt, src).is_some())
        .collect()
}

fn read_hook(statement: &SyntaxNode, src: &str) -> Option<StateHook> {
    let declarator = statement.child_of_kind(NodeKind::VariableDeclarator)?;
    let pattern = declarator
        .child_by_field("name")
        .filter(|n| n.kind() == NodeKind::ArrayPattern)?;
    let call = declarator
        .child_by_field("value")
        .filter(|v| v.kind() == NodeKind::CallExpression)?;

    let callee = call.child_by_field("function")?.text(src);
    if !STATE_HOOKS.contains(&callee) {
        return None;
    }

    let mut bindings = pattern.significant_children().map(|n| n.text(src).to_string());
    let name = bindings.next()?;
    let setter = bindings.next();

    let initial_value = call
        .child_by_field("arguments")
        .and_then(|args| args.significant_children().next())
        .map(|arg| arg.text(src).to_string());

    let type_argument = call.child_by_field("type_arguments").map(|t| {
        let text = t.text(src);
        text.strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .unwrap_or(text)
            .trim()
            .to_string()
    });

    Some(StateHook {
        name,
        setter,
        initial_value,
        type_argument,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::component_nodes;
    use crate::source::{Origin, SourceFile};

    #[test]
    fn test_hooks_in_declaration_order() {
        let src = "export default function Home() {\n  const [title, setTitle] = useState<string>('');\n  const other = 1;\n  const [count, setCount] = React.useState(0);\n  const [open] = useState(false);\n  return null;\n}\n";
        let file = SourceFile::parse("src/views/Home/index.tsx", src, Origin::Loaded).unwrap();
        let nodes = component_nodes(&file).unwrap().unwrap();
        let hooks = find_state_hooks(&nodes, src);

        let names: Vec<_> = hooks.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["title", "count", "open"]);
        assert_eq!(hooks[0].setter.as_deref(), Some("setTitle"));
        assert_eq!(hooks[0].initial_value.as_deref(), Some("''"));
        assert_eq!(hooks[0].type_argument.as_deref(), Some("string"));
        assert_eq!(hooks[1].initial_value.as_deref(), Some("0"));
        assert_eq!(hooks[2].setter, None);
    }

    #[test]
    fn test_nested_hooks_are_ignored() {
        let src = "export const Home = () => {\n  const inner = () => {\n    const [x, setX] = useState(1);\n  };\n  return null;\n};\n";
        let file = SourceFile::parse("src/views/Home/index.tsx", src, Origin::Loaded).unwrap();
        let nodes = component_nodes(&file).unwrap().unwrap();
        assert!(find_state_hooks(&nodes, src).is_empty());
    }
}
