//! Component classification.
//!
//! A view file has at most one principal component. Classification runs in a
//! fixed order and the first match wins:
//!
//! ```text
//!   1. exported class extending Component / PureComponent
//!   2. exported function declaration
//!      exported call wrapping an identifier that names a function declaration
//!   3. exported variable initialized by an arrow function (or a call wrapping one)
//! ```

use crate::diagnostic::EngineError;
use crate::model::{ComponentInfo, ComponentKind, ExportStyle};
use crate::source::{NodeKind, SourceFile, SyntaxNode};

use super::declarations::{declared_name, find_function, is_default_export};

/// Heritage clauses that denote a component base class.
const COMPONENT_BASES: &[&str] = &[
    "Component",
    "PureComponent",
    "React.Component",
    "React.PureComponent",
];

/// Nodes of a located component, borrowed from its file.
#[derive(Debug, Clone)]
pub struct ComponentNodes<'a> {
    pub kind: ComponentKind,
    pub name: &'a str,
    /// The class declaration, function declaration or variable declarator.
    pub declaration: &'a SyntaxNode,
    /// The function or arrow holding the component body (not set for classes).
    pub function: Option<&'a SyntaxNode>,
    /// Top-level statement holding the declaration.
    pub statement: &'a SyntaxNode,
    /// Top-level `export` statement exposing the component.
    pub export: &'a SyntaxNode,
    /// Outermost call wrapping the component.
    pub wrapper: Option<&'a SyntaxNode>,
    pub export_style: ExportStyle,
}

impl<'a> ComponentNodes<'a> {
    /// The `extends Component<P, S>` clause of a class component.
    pub fn extends_clause(&self) -> Option<&'a SyntaxNode> {
        self.declaration
            .child_of_kind(NodeKind::ClassHeritage)?
            .child_of_kind(NodeKind::ExtendsClause)
    }

    /// Formal parameters of a function or arrow component.
    pub fn parameters(&self) -> Option<&'a SyntaxNode> {
        self.function?.child_by_field("parameters")
    }

    /// Statement block body of a function or arrow component.
    pub fn body(&self) -> Option<&'a SyntaxNode> {
        self.function?
            .child_by_field("body")
            .filter(|b| b.kind() == NodeKind::StatementBlock)
    }
}

/// Classifies the principal component of `file`.
///
/// Returns `Ok(None)` when the file holds no component. A component base
/// class whose type-argument list cannot be read is [`EngineError::Malformed`].
pub fn find_component(file: &SourceFile) -> Result<Option<ComponentInfo>, EngineError> {
    let Some(nodes) = component_nodes(file)? else {
        return Ok(None);
    };
    let src = file.text();

    let (props_type, state_type) = match nodes.kind {
        ComponentKind::Class => {
            let args = class_type_arguments(&nodes, file)?;
            (args.first().cloned().flatten(), args.get(1).cloned().flatten())
        }
        _ => (first_parameter_type(&nodes, src), None),
    };

    let info = ComponentInfo {
        name: nodes.name.to_string(),
        kind: nodes.kind,
        props_type,
        state_type,
        export: nodes.export_style.clone(),
        wrapped_by: nodes
            .wrapper
            .and_then(|w| w.child_by_field("function"))
            .map(|f| f.text(src).to_string()),
    };
    tracing::debug!(
        path = %file.path().display(),
        name = %info.name,
        kind = info.kind.label(),
        "component located"
    );
    Ok(Some(info))
}

/// Like [`find_component`] but returns the underlying nodes.
pub fn component_nodes(file: &SourceFile) -> Result<Option<ComponentNodes<'_>>, EngineError> {
    Ok(find_class_component(file)?
        .or_else(|| find_function_component(file))
        .or_else(|| find_arrow_component(file)))
}

fn export_style(statement: &SyntaxNode, name: &str) -> ExportStyle {
    if is_default_export(statement) {
        ExportStyle::Default
    } else {
        ExportStyle::Named(name.to_string())
    }
}

fn find_class_component(file: &SourceFile) -> Result<Option<ComponentNodes<'_>>, EngineError> {
    let src = file.text();
    for statement in file.statements() {
        if statement.kind() != NodeKind::ExportStatement {
            continue;
        }
        let Some(class) = statement
            .child_by_field("declaration")
            .or_else(|| statement.child_by_field("value"))
            .filter(|d| d.kind() == NodeKind::ClassDeclaration || d.raw_kind() == "class")
        else {
            continue;
        };
        let Some(name) = declared_name(class, src) else {
            continue;
        };

        let nodes = ComponentNodes {
            kind: ComponentKind::Class,
            name,
            declaration: class,
            function: None,
            statement,
            export: statement,
            wrapper: None,
            export_style: export_style(statement, name),
        };

        let Some(extends) = nodes.extends_clause() else {
            continue;
        };
        let Some(base) = extends.child_by_field("value") else {
            continue;
        };
        if !COMPONENT_BASES.contains(&base.text(src)) {
            continue;
        }
        if let Some(args) = extends.child_by_field("type_arguments") {
            if args.significant_children().next().is_none() {
                return Err(EngineError::malformed(
                    file.path(),
                    format!("type arguments of {name}'s base class cannot be read"),
                ));
            }
        }
        return Ok(Some(nodes));
    }
    Ok(None)
}

fn find_function_component(file: &SourceFile) -> Option<ComponentNodes<'_>> {
    let src = file.text();

    for statement in file.statements() {
        if statement.kind() != NodeKind::ExportStatement {
            continue;
        }
        let Some(function) = statement
            .child_by_field("declaration")
            .or_else(|| statement.child_by_field("value"))
            .filter(|d| matches!(d.kind(), NodeKind::FunctionDeclaration | NodeKind::FunctionExpression))
        else {
            continue;
        };
        let Some(name) = declared_name(function, src) else {
            continue;
        };
        return Some(ComponentNodes {
            kind: ComponentKind::Function,
            name,
            declaration: function,
            function: Some(function),
            statement,
            export: statement,
            wrapper: None,
            export_style: export_style(statement, name),
        });
    }

    // Wrapped function: `export default memo(Home)` over `function Home() {}`.
    for (export, exported_name, value) in exported_values(file) {
        let Some((target, wrapper)) = unwrap_calls(value) else {
            continue;
        };
        if target.kind() != NodeKind::Identifier {
            continue;
        }
        let name = target.text(src);
        let Some(function) = find_function(file, name) else {
            continue;
        };
        let statement = file
            .statements()
            .find(|s| s.range().contains(&function.start_byte()))
            .unwrap_or(export);
        return Some(ComponentNodes {
            kind: ComponentKind::Function,
            name,
            declaration: function,
            function: Some(function),
            statement,
            export,
            wrapper: Some(wrapper),
            export_style: match exported_name {
                Some(exported) => ExportStyle::Named(exported.to_string()),
                None => ExportStyle::Default,
            },
        });
    }
    None
}

fn find_arrow_component(file: &SourceFile) -> Option<ComponentNodes<'_>> {
    let src = file.text();
    for statement in file.statements() {
        if statement.kind() != NodeKind::ExportStatement {
            continue;
        }
        let Some(declaration) = statement
            .child_by_field("declaration")
            .filter(|d| d.kind() == NodeKind::LexicalDeclaration)
        else {
            continue;
        };
        for declarator in declaration.children_of_kind(NodeKind::VariableDeclarator) {
            let (Some(name), Some(value)) = (declared_name(declarator, src), declarator.child_by_field("value")) else {
                continue;
            };
            let (function, wrapper) = match value.kind() {
                NodeKind::ArrowFunction => (value, None),
                NodeKind::CallExpression => match unwrap_calls(value) {
                    Some((target, wrapper)) if target.kind() == NodeKind::ArrowFunction => (target, Some(wrapper)),
                    _ => continue,
                },
                _ => continue,
            };
            return Some(ComponentNodes {
                kind: ComponentKind::ArrowFunction,
                name,
                declaration: declarator,
                function: Some(function),
                statement,
                export: statement,
                wrapper,
                export_style: ExportStyle::Named(name.to_string()),
            });
        }
    }
    None
}

/// Exported call expressions: `export default f(X)` and `export const A = f(X)`.
/// Yields the export statement, the exported variable name (`None` for a
/// default export) and the call.
fn exported_values(file: &SourceFile) -> Vec<(&SyntaxNode, Option<&str>, &SyntaxNode)> {
    let src = file.text();
    let mut out = Vec::new();
    for statement in file.statements() {
        if statement.kind() != NodeKind::ExportStatement {
            continue;
        }
        if let Some(value) = statement.child_by_field("value") {
            if value.kind() == NodeKind::CallExpression {
                out.push((statement, None, value));
            }
            continue;
        }
        let Some(declaration) = statement
            .child_by_field("declaration")
            .filter(|d| d.kind() == NodeKind::LexicalDeclaration)
        else {
            continue;
        };
        for declarator in declaration.children_of_kind(NodeKind::VariableDeclarator) {
            if let (Some(name), Some(value)) = (declared_name(declarator, src), declarator.child_by_field("value")) {
                if value.kind() == NodeKind::CallExpression {
                    out.push((statement, Some(name), value));
                }
            }
        }
    }
    out
}

/// Follows the first argument of nested wrapping calls
/// (`connect(a)(memo(Home))` → `Home`). Returns the wrapped expression and the
/// outermost call.
pub fn unwrap_calls(call: &SyntaxNode) -> Option<(&SyntaxNode, &SyntaxNode)> {
    let mut current = call;
    while current.kind() == NodeKind::CallExpression {
        current = current
            .child_by_field("arguments")?
            .significant_children()
            .next()?;
    }
    Some((current, call))
}

/// The chain of calls from `call` down to the wrapped component, outermost first.
pub fn call_chain(call: &SyntaxNode) -> Vec<&SyntaxNode> {
    let mut chain = Vec::new();
    let mut current = Some(call);
    while let Some(node) = current.filter(|n| n.kind() == NodeKind::CallExpression) {
        chain.push(node);
        current = node
            .child_by_field("arguments")
            .and_then(|a| a.significant_children().next());
    }
    chain
}

/// Type arguments of a class component's base, by position. `None` entries
/// are arguments that are not plain type names (`{}`, `Partial<X>`).
fn class_type_arguments(nodes: &ComponentNodes<'_>, file: &SourceFile) -> Result<Vec<Option<String>>, EngineError> {
    let src = file.text();
    let Some(args) = nodes.extends_clause().and_then(|e| e.child_by_field("type_arguments")) else {
        return Ok(Vec::new());
    };
    Ok(args
        .significant_children()
        .map(|arg| (arg.kind() == NodeKind::TypeIdentifier).then(|| arg.text(src).to_string()))
        .collect())
}

/// Declared type name of the first parameter of a function component.
fn first_parameter_type(nodes: &ComponentNodes<'_>, src: &str) -> Option<String> {
    let param = nodes.parameters()?.significant_children().next()?;
    let annotation = param.child_by_field("type")?;
    let type_node = annotation.significant_children().next()?;
    (type_node.kind() == NodeKind::TypeIdentifier).then(|| type_node.text(src).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Origin;

    fn locate(text: &str) -> Option<ComponentInfo> {
        let file = SourceFile::parse("src/views/Home/index.tsx", text, Origin::Loaded).unwrap();
        find_component(&file).unwrap()
    }

    #[test]
    fn test_class_component() {
        let info = locate(
            "import React, { Component } from 'react';\n\nexport default class Home extends Component<HomeProps, HomeState> {\n  render() {\n    return <View />;\n  }\n}\n",
        )
        .unwrap();
        assert_eq!(info.name, "Home");
        assert_eq!(info.kind, ComponentKind::Class);
        assert_eq!(info.props_type.as_deref(), Some("HomeProps"));
        assert_eq!(info.state_type.as_deref(), Some("HomeState"));
        assert_eq!(info.export, ExportStyle::Default);
    }

    #[test]
    fn test_class_component_without_type_arguments() {
        let info = locate("export class Home extends React.PureComponent {\n  render() { return null; }\n}\n").unwrap();
        assert_eq!(info.kind, ComponentKind::Class);
        assert_eq!(info.props_type, None);
        assert_eq!(info.export, ExportStyle::Named("Home".to_string()));
    }

    #[test]
    fn test_non_component_class_is_skipped() {
        assert!(locate("export class Store extends Base {}\n").is_none());
    }

    #[test]
    fn test_function_component() {
        let info = locate("export default function Home(props: HomeProps) {\n  return <View />;\n}\n").unwrap();
        assert_eq!(info.kind, ComponentKind::Function);
        assert_eq!(info.props_type.as_deref(), Some("HomeProps"));
        assert_eq!(info.state_type, None);
    }

    #[test]
    fn test_wrapped_function_component() {
        let info = locate(
            "function Home(props: HomeProps) {\n  return <View />;\n}\n\nexport default connect(mapState, null)(Home);\n",
        )
        .unwrap();
        assert_eq!(info.kind, ComponentKind::Function);
        assert_eq!(info.name, "Home");
        assert_eq!(info.wrapped_by.as_deref(), Some("connect(mapState, null)"));
        assert_eq!(info.export, ExportStyle::Default);
    }

    #[test]
    fn test_arrow_component() {
        let info = locate("export const Home = ({ title }: HomeProps) => {\n  return <Text>{title}</Text>;\n};\n").unwrap();
        assert_eq!(info.kind, ComponentKind::ArrowFunction);
        assert_eq!(info.props_type.as_deref(), Some("HomeProps"));
    }

    #[test]
    fn test_wrapped_arrow_component() {
        let info = locate("export const Home = memo((props: HomeProps) => <View />);\n").unwrap();
        assert_eq!(info.kind, ComponentKind::ArrowFunction);
        assert_eq!(info.wrapped_by.as_deref(), Some("memo"));
    }

    #[test]
    fn test_class_wins_over_function() {
        let info = locate(
            "export function helper() { return 1; }\nexport class Home extends Component<HomeProps> {\n  render() { return null; }\n}\n",
        )
        .unwrap();
        assert_eq!(info.kind, ComponentKind::Class);
        assert_eq!(info.state_type, None);
    }

    #[test]
    fn test_untyped_parameter_has_no_props() {
        let info = locate("export const Home = (props) => null;\n").unwrap();
        assert_eq!(info.props_type, None);
    }

    #[test]
    fn test_no_component() {
        assert!(locate("export const x = 1;\n").is_none());
    }
}
