//! Decorator and higher-order wrapper calls around a component.

use crate::model::{ArgumentKind, CallArgument, CallSite, ComponentKind, DecoratorOrHocCall};
use crate::source::{NodeKind, SourceFile, SyntaxNode};

use super::component::{call_chain, ComponentNodes};

/// Nodes of a located decorator or wrapper call.
#[derive(Debug, Clone, Copy)]
pub struct CallNodes<'a> {
    pub site: CallSite,
    /// The `@...` decorator node, for decorators.
    pub decorator: Option<&'a SyntaxNode>,
    /// The call holding the configuration arguments: `connect(a, b)`.
    pub call: &'a SyntaxNode,
}

impl<'a> CallNodes<'a> {
    pub fn arguments(&self) -> Option<&'a SyntaxNode> {
        self.call.child_by_field("arguments")
    }

    pub fn argument_nodes(&self) -> Vec<&'a SyntaxNode> {
        self.arguments()
            .map(|a| a.significant_children().collect())
            .unwrap_or_default()
    }

    pub fn type_arguments(&self) -> Option<&'a SyntaxNode> {
        self.call
            .child_by_field("type_arguments")
            .or_else(|| self.call.child_of_kind(NodeKind::TypeArguments))
    }
}

/// Finds the decorator (class components) or wrapping call (function and
/// arrow components) whose callee is `callee`.
pub fn find_decorator_or_hoc(file: &SourceFile, nodes: &ComponentNodes<'_>, callee: &str) -> Option<DecoratorOrHocCall> {
    let src = file.text();
    let found = decorator_or_hoc_nodes(nodes, src, callee)?;

    let arguments = found
        .argument_nodes()
        .into_iter()
        .map(|arg| CallArgument {
            text: arg.text(src).to_string(),
            kind: classify_argument(arg),
        })
        .collect();

    let type_arguments = found
        .type_arguments()
        .map(|t| t.significant_children().map(|a| a.text(src).to_string()).collect())
        .unwrap_or_default();

    Some(DecoratorOrHocCall {
        callee: callee.to_string(),
        site: found.site,
        arguments,
        type_arguments,
    })
}

/// Node-level variant of [`find_decorator_or_hoc`].
pub fn decorator_or_hoc_nodes<'a>(nodes: &ComponentNodes<'a>, src: &str, callee: &str) -> Option<CallNodes<'a>> {
    match nodes.kind {
        ComponentKind::Class => {
            let decorators = nodes
                .export
                .children_by_field("decorator")
                .chain(nodes.declaration.children_by_field("decorator"));
            for decorator in decorators {
                let Some(call) = decorator.child_of_kind(NodeKind::CallExpression) else {
                    continue;
                };
                if call.child_by_field("function").map(|f| f.text(src)) == Some(callee) {
                    return Some(CallNodes {
                        site: CallSite::Decorator,
                        decorator: Some(decorator),
                        call,
                    });
                }
            }
            None
        }
        ComponentKind::Function | ComponentKind::ArrowFunction => {
            // `connect(a, b)(Home)`: the curried inner call holds the arguments.
            call_chain(nodes.wrapper?).into_iter().find_map(|outer| {
                let inner = outer
                    .child_by_field("function")
                    .filter(|f| f.kind() == NodeKind::CallExpression)?;
                (inner.child_by_field("function")?.text(src) == callee).then_some(CallNodes {
                    site: CallSite::Hoc,
                    decorator: None,
                    call: inner,
                })
            })
        }
    }
}

/// Classifies a call argument by shape.
pub fn classify_argument(node: &SyntaxNode) -> ArgumentKind {
    match node.kind() {
        NodeKind::Null => ArgumentKind::Null,
        NodeKind::Other("undefined") => ArgumentKind::Null,
        NodeKind::Object => ArgumentKind::ObjectLiteral,
        NodeKind::Identifier => ArgumentKind::Identifier,
        NodeKind::ArrowFunction => {
            if arrow_returned_object(node).is_some() {
                ArgumentKind::ArrowReturningObject
            } else {
                ArgumentKind::Other
            }
        }
        _ => ArgumentKind::Other,
    }
}

/// The object literal an arrow function returns as its expression body:
/// `(state) => ({ ... })`.
pub fn arrow_returned_object(arrow: &SyntaxNode) -> Option<&SyntaxNode> {
    let mut body = arrow.child_by_field("body")?;
    while body.kind() == NodeKind::ParenthesizedExpression {
        body = body.significant_children().next()?;
    }
    (body.kind() == NodeKind::Object).then_some(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::component_nodes;
    use crate::source::Origin;

    fn locate(text: &str) -> Option<DecoratorOrHocCall> {
        let file = SourceFile::parse("src/views/Home/index.tsx", text, Origin::Loaded).unwrap();
        let nodes = component_nodes(&file).unwrap().unwrap();
        find_decorator_or_hoc(&file, &nodes, "connect")
    }

    #[test]
    fn test_class_decorator() {
        let call = locate(
            "@connect<HomeStateProps, HomeDispatchProps>(\n  (state: RootState) => ({ tasks: state.task.tasks }),\n  { fetchTasks },\n)\nexport default class Home extends Component<HomeProps> {\n  render() {\n    return null;\n  }\n}\n",
        )
        .unwrap();
        assert_eq!(call.site, CallSite::Decorator);
        assert_eq!(call.arguments.len(), 2);
        assert_eq!(call.arguments[0].kind, ArgumentKind::ArrowReturningObject);
        assert_eq!(call.arguments[1].kind, ArgumentKind::ObjectLiteral);
        assert_eq!(call.type_arguments, vec!["HomeStateProps", "HomeDispatchProps"]);
    }

    #[test]
    fn test_other_decorators_do_not_match() {
        let call = locate("@observer\nexport default class Home extends Component {\n  render() { return null; }\n}\n");
        assert!(call.is_none());
    }

    #[test]
    fn test_function_hoc() {
        let call = locate(
            "function Home(props: HomeProps) {\n  return null;\n}\n\nexport default connect(null, { fetchTasks })(Home);\n",
        )
        .unwrap();
        assert_eq!(call.site, CallSite::Hoc);
        assert_eq!(call.arguments[0].kind, ArgumentKind::Null);
        assert_eq!(call.arguments[1].text, "{ fetchTasks }");
        assert!(call.type_arguments.is_empty());
    }

    #[test]
    fn test_arrow_hoc_through_memo() {
        let call = locate("export const Home = connect(mapState)(memo((props: HomeProps) => null));\n").unwrap();
        assert_eq!(call.arguments.len(), 1);
        assert_eq!(call.arguments[0].kind, ArgumentKind::Identifier);
    }

    #[test]
    fn test_unwrapped_component_has_no_call() {
        assert!(locate("export const Home = () => null;\n").is_none());
    }
}
