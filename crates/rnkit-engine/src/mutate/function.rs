//! Function and arrow component mutators.

use crate::diagnostic::EngineError;
use crate::locate::{component_nodes, find_state_hooks, state_hook_declarations, ComponentNodes};
use crate::model::{ComponentKind, StateHook};
use crate::source::{SourceFile, TextEdit};

use super::{block_insert, nested_indent, not_found};

/// `const [title, setTitle] = useState<string>('');`
pub fn render_state_hook(hook: &StateHook) -> String {
    let bindings = match &hook.setter {
        Some(setter) => format!("{}, {setter}", hook.name),
        None => hook.name.clone(),
    };
    let type_argument = hook
        .type_argument
        .as_ref()
        .map(|t| format!("<{t}>"))
        .unwrap_or_default();
    let initial = hook.initial_value.as_deref().unwrap_or("");
    format!("const [{bindings}] = useState{type_argument}({initial});")
}

fn function_component<'f>(file: &'f SourceFile, operation: &str) -> Result<ComponentNodes<'f>, EngineError> {
    let nodes = component_nodes(file)?.ok_or_else(|| not_found(file, "a component"))?;
    if nodes.kind == ComponentKind::Class {
        return Err(EngineError::malformed(
            file.path(),
            format!("{} is a class component; cannot {operation}", nodes.name),
        ));
    }
    Ok(nodes)
}

/// Adds `useState` bindings for hooks not yet declared, after the existing
/// ones. Existing hooks keep their order.
pub fn insert_state_hooks(file: &mut SourceFile, hooks: &[StateHook]) -> Result<(), EngineError> {
    let src = file.text();
    let nodes = function_component(file, "add state hooks")?;
    let body = nodes.body().ok_or_else(|| {
        EngineError::malformed(file.path(), format!("{} has an expression body", nodes.name))
    })?;

    let existing = find_state_hooks(&nodes, src);
    let mut added: Vec<&StateHook> = Vec::new();
    for hook in hooks {
        let declared = existing.iter().any(|h| h.name == hook.name);
        if !declared && !added.iter().any(|a| a.name == hook.name) {
            added.push(hook);
        }
    }
    if added.is_empty() {
        return Ok(());
    }

    let indent = body
        .significant_children()
        .next()
        .map(|s| file.indent_at(s.start_byte()).to_string())
        .unwrap_or_else(|| nested_indent(file, nodes.statement));
    let lines: String = added
        .iter()
        .map(|h| format!("{indent}{}\n", render_state_hook(h)))
        .collect();

    let last_hook = state_hook_declarations(&nodes, src).last().copied();
    let edit = block_insert(file, body, last_hook, &lines);
    file.apply(vec![edit])
}

/// Declares the first parameter of a function or arrow component as
/// `props: T`, or retypes an existing first parameter.
pub fn set_first_parameter_type(file: &mut SourceFile, type_name: &str) -> Result<(), EngineError> {
    let src = file.text();
    let nodes = function_component(file, "type its parameters")?;
    let function = nodes
        .function
        .ok_or_else(|| not_found(file, format!("function of {}", nodes.name)))?;

    let edit = match nodes.parameters() {
        Some(params) => match params.significant_children().next() {
            None => Some(TextEdit::replace(params.range(), format!("(props: {type_name})"))),
            Some(param) => match param.child_by_field("type").and_then(|a| a.significant_children().next()) {
                Some(current) if current.text(src) == type_name => None,
                Some(current) => Some(TextEdit::replace(current.range(), type_name)),
                None => {
                    let pattern = param.child_by_field("pattern").unwrap_or(param);
                    Some(TextEdit::insert(pattern.end_byte(), format!(": {type_name}")))
                }
            },
        },
        None => {
            let param = function
                .child_by_field("parameter")
                .ok_or_else(|| EngineError::malformed(file.path(), "component has no parameter list"))?;
            Some(TextEdit::replace(param.range(), format!("({}: {type_name})", param.text(src))))
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

    fn hook(name: &str, setter: &str, type_text: &str, initial: &str) -> StateHook {
        StateHook {
            name: name.to_string(),
            setter: Some(setter.to_string()),
            initial_value: Some(initial.to_string()),
            type_argument: Some(type_text.to_string()),
        }
    }

    #[test]
    fn test_render_state_hook() {
        assert_eq!(
            render_state_hook(&hook("title", "setTitle", "string", "''")),
            "const [title, setTitle] = useState<string>('');"
        );
    }

    #[test]
    fn test_hooks_appended_after_existing() {
        let mut f = file(
            "export default function Home() {\n  const [a, setA] = useState(1);\n  const x = 2;\n  return null;\n}\n",
        );
        insert_state_hooks(&mut f, &[hook("a", "setA", "number", "1"), hook("b", "setB", "string", "''")]).unwrap();
        assert_eq!(
            f.text(),
            "export default function Home() {\n  const [a, setA] = useState(1);\n  const [b, setB] = useState<string>('');\n  const x = 2;\n  return null;\n}\n"
        );
    }

    #[test]
    fn test_hooks_inserted_at_top_of_body() {
        let mut f = file("export const Home = () => {\n  return null;\n};\n");
        insert_state_hooks(&mut f, &[hook("b", "setB", "string", "''")]).unwrap();
        let once = f.text().to_string();
        assert_eq!(
            once,
            "export const Home = () => {\n  const [b, setB] = useState<string>('');\n  return null;\n};\n"
        );
        insert_state_hooks(&mut f, &[hook("b", "setB", "string", "''")]).unwrap();
        assert_eq!(f.text(), once);
    }

    #[test]
    fn test_hooks_rejected_for_classes() {
        let mut f = file("export class Home extends Component {\n  render() { return null; }\n}\n");
        let err = insert_state_hooks(&mut f, &[hook("b", "setB", "string", "''")]).unwrap_err();
        assert!(matches!(err, EngineError::Malformed { .. }));
    }

    #[test]
    fn test_first_parameter_type() {
        let mut f = file("export default function Home() {\n  return null;\n}\n");
        set_first_parameter_type(&mut f, "HomeProps").unwrap();
        assert!(f.text().contains("function Home(props: HomeProps)"));

        let mut g = file("export const Home = (props) => null;\n");
        set_first_parameter_type(&mut g, "HomeProps").unwrap();
        assert!(g.text().contains("(props: HomeProps) => null"));
        set_first_parameter_type(&mut g, "HomeProps").unwrap();
        assert!(g.text().contains("(props: HomeProps) => null"));

        let mut h = file("export const Home = ({ title }: OldProps) => null;\n");
        set_first_parameter_type(&mut h, "HomeProps").unwrap();
        assert!(h.text().contains("({ title }: HomeProps) => null"));
    }
}
