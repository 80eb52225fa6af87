//! Decorator and higher-order wrapper calls.
//!
//! A component is configured through at most one call per callee: a class
//! decorator (`@connect<S, D>(mapState, actions)`) or a curried wrapper
//! around a function component (`connect(mapState, actions)(Home)`). When no
//! such call exists it is synthesized from [`WrapperArgs::build`]; otherwise
//! [`WrapperArgs::merge`] decides how the existing arguments change, so
//! repeated runs accumulate onto one call instead of nesting wrappers.

use crate::diagnostic::EngineError;
use crate::locate::{arrow_returned_object, component_nodes, decorator_or_hoc_nodes, find_decorator_or_hoc, CallNodes, ComponentNodes};
use crate::model::{ArgumentKind, CallSite, ComponentKind, DecoratorOrHocCall, ExportStyle, ObjectProperty};
use crate::source::{NodeKind, SourceFile, SyntaxNode, TextEdit};

use super::object::object_merge_edits;
use super::{append_statement, not_found, INDENT};

/// Arguments of a freshly synthesized call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrapperCall {
    pub arguments: Vec<String>,
    pub type_arguments: Vec<String>,
}

impl WrapperCall {
    /// `callee<T, U>(\n  a,\n  b,\n)` with continuation lines at `indent`.
    fn render(&self, callee: &str, indent: &str) -> String {
        let type_arguments = if self.type_arguments.is_empty() {
            String::new()
        } else {
            format!("<{}>", self.type_arguments.join(", "))
        };
        if self.arguments.is_empty() {
            return format!("{callee}{type_arguments}()");
        }
        let mut out = format!("{callee}{type_arguments}(\n");
        for argument in &self.arguments {
            out.push_str(&format!("{indent}{INDENT}{argument},\n"));
        }
        out.push_str(indent);
        out.push(')');
        out
    }
}

/// One change to an existing call's arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentChange {
    Replace { position: usize, text: String },
    /// Adds an argument after the last one.
    Append { text: String },
    /// Adds properties to the object literal at `position`, or to the object
    /// an arrow at `position` returns.
    MergeProperties { position: usize, properties: Vec<ObjectProperty> },
    SetTypeArgument { position: usize, text: String },
}

/// Builds and merges the arguments of a decorator or wrapper call.
pub trait WrapperArgs {
    /// Arguments for a call that does not exist yet.
    fn build(&self) -> WrapperCall;

    /// Changes to bring an existing call in line. An `Err` carries the reason
    /// the existing call cannot be merged into.
    fn merge(&self, existing: &DecoratorOrHocCall) -> Result<Vec<ArgumentChange>, String>;
}

/// Positional `(mapState, actions)` arguments of a store-connecting call.
///
/// Position 0 is an arrow from the root state to an object of state props
/// (or `null`), position 1 an object of action creators. Calls with more
/// than two arguments are not understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperArgs {
    pub state_mapper: Vec<ObjectProperty>,
    pub action_mapper: Vec<ObjectProperty>,
    /// Parameter of the state-mapping arrow: `state: RootState`.
    pub state_param: String,
    pub state_type: String,
    pub dispatch_type: String,
}

/// Number of positional arguments a mapper call carries.
const MAPPER_POSITIONS: usize = 2;

fn inline_object(properties: &[ObjectProperty]) -> String {
    if properties.is_empty() {
        return "{}".to_string();
    }
    let body: Vec<String> = properties.iter().map(|p| p.render()).collect();
    format!("{{ {} }}", body.join(", "))
}

impl MapperArgs {
    fn state_arrow(&self) -> String {
        format!("({}) => ({})", self.state_param, inline_object(&self.state_mapper))
    }
}

impl WrapperArgs for MapperArgs {
    fn build(&self) -> WrapperCall {
        let state = if self.state_mapper.is_empty() {
            "null".to_string()
        } else {
            self.state_arrow()
        };
        WrapperCall {
            arguments: vec![state, inline_object(&self.action_mapper)],
            type_arguments: vec![self.state_type.clone(), self.dispatch_type.clone()],
        }
    }

    fn merge(&self, existing: &DecoratorOrHocCall) -> Result<Vec<ArgumentChange>, String> {
        let arguments = &existing.arguments;
        if arguments.len() > MAPPER_POSITIONS {
            return Err(format!(
                "{}(...) has {} arguments; only (state mapper, action mapper) can be merged",
                existing.callee,
                arguments.len()
            ));
        }

        let mut changes = Vec::new();
        let mut length = arguments.len();

        if !self.state_mapper.is_empty() {
            match arguments.first() {
                Some(arg) => match arg.kind {
                    ArgumentKind::ArrowReturningObject => changes.push(ArgumentChange::MergeProperties {
                        position: 0,
                        properties: self.state_mapper.clone(),
                    }),
                    ArgumentKind::Null => changes.push(ArgumentChange::Replace {
                        position: 0,
                        text: self.state_arrow(),
                    }),
                    _ => return Err(format!("state mapper `{}` is not an arrow returning an object", arg.text)),
                },
                None => {
                    changes.push(ArgumentChange::Append { text: self.state_arrow() });
                    length += 1;
                }
            }
        }

        if !self.action_mapper.is_empty() {
            match arguments.get(1) {
                Some(arg) => match arg.kind {
                    ArgumentKind::ObjectLiteral => changes.push(ArgumentChange::MergeProperties {
                        position: 1,
                        properties: self.action_mapper.clone(),
                    }),
                    ArgumentKind::Null => changes.push(ArgumentChange::Replace {
                        position: 1,
                        text: inline_object(&self.action_mapper),
                    }),
                    _ => return Err(format!("action mapper `{}` is not an object literal", arg.text)),
                },
                None => {
                    if length == 0 {
                        changes.push(ArgumentChange::Append { text: "null".to_string() });
                    }
                    changes.push(ArgumentChange::Append {
                        text: inline_object(&self.action_mapper),
                    });
                }
            }
        }

        if existing.site == CallSite::Decorator || !existing.type_arguments.is_empty() {
            for (position, wanted) in [&self.state_type, &self.dispatch_type].into_iter().enumerate() {
                let current = existing.type_arguments.get(position).map(String::as_str);
                if current.is_none() || current == Some("{}") {
                    changes.push(ArgumentChange::SetTypeArgument {
                        position,
                        text: wanted.clone(),
                    });
                }
            }
        }
        Ok(changes)
    }
}

/// Makes the component of `file` carry exactly one `callee` call configured
/// by `args`: synthesized when absent, merged into when present.
pub fn set_or_merge_decorator_or_hoc(file: &mut SourceFile, callee: &str, args: &impl WrapperArgs) -> Result<(), EngineError> {
    let src = file.text();
    let nodes = component_nodes(file)?.ok_or_else(|| not_found(file, "a component"))?;

    let edits = match decorator_or_hoc_nodes(&nodes, src, callee) {
        None => {
            tracing::debug!(path = %file.path().display(), callee, kind = nodes.kind.label(), "synthesizing call");
            synthesize(file, &nodes, callee, &args.build())?
        }
        Some(call) => {
            let existing = find_decorator_or_hoc(file, &nodes, callee)
                .ok_or_else(|| not_found(file, format!("{callee}(...) call")))?;
            let changes = args
                .merge(&existing)
                .map_err(|reason| EngineError::malformed(file.path(), reason))?;
            tracing::debug!(path = %file.path().display(), callee, changes = changes.len(), "merging call");
            merge_edits(file, &call, &changes)?
        }
    };
    file.apply(edits)
}

fn synthesize(file: &SourceFile, nodes: &ComponentNodes<'_>, callee: &str, call: &WrapperCall) -> Result<Vec<TextEdit>, EngineError> {
    let src = file.text();
    if nodes.kind == ComponentKind::Class {
        let indent = file.indent_at(nodes.export.start_byte());
        let decorator = format!("@{}\n{indent}", call.render(callee, indent));
        return Ok(vec![TextEdit::insert(nodes.export.start_byte(), decorator)]);
    }

    let indent = file.indent_at(nodes.statement.start_byte());
    let wrapped = match (nodes.wrapper, nodes.kind) {
        (Some(wrapper), _) => wrapper,
        (None, ComponentKind::ArrowFunction) => nodes
            .function
            .ok_or_else(|| not_found(file, format!("arrow function of {}", nodes.name)))?,
        (None, _) => return function_export_edits(file, nodes, &call.render(callee, "")),
    };
    Ok(vec![TextEdit::replace(
        wrapped.range(),
        format!("{}({})", call.render(callee, indent), wrapped.text(src)),
    )])
}

/// Moves the export of a directly exported function component onto a new
/// wrapping statement at the end of the file.
fn function_export_edits(file: &SourceFile, nodes: &ComponentNodes<'_>, call: &str) -> Result<Vec<TextEdit>, EngineError> {
    let declaration = nodes.declaration;
    let mut edits = vec![TextEdit::delete(nodes.statement.start_byte()..declaration.start_byte())];
    match &nodes.export_style {
        ExportStyle::Default => {
            edits.push(append_statement(file, &format!("export default {call}({});\n", nodes.name)));
        }
        ExportStyle::Named(name) => {
            let inner = format!("{name}Component");
            let ident = declaration
                .child_by_field("name")
                .ok_or_else(|| EngineError::malformed(file.path(), "function component has no name"))?;
            edits.push(TextEdit::replace(ident.range(), inner.clone()));
            edits.push(append_statement(file, &format!("export const {name} = {call}({inner});\n")));
        }
    }
    Ok(edits)
}

fn argument_at<'a>(file: &SourceFile, arguments: &[&'a SyntaxNode], position: usize) -> Result<&'a SyntaxNode, EngineError> {
    arguments
        .get(position)
        .copied()
        .ok_or_else(|| EngineError::malformed(file.path(), format!("call has no argument at position {position}")))
}

fn merge_edits(file: &SourceFile, call: &CallNodes<'_>, changes: &[ArgumentChange]) -> Result<Vec<TextEdit>, EngineError> {
    let arguments = call.argument_nodes();
    let mut edits = Vec::new();
    let mut appended: Vec<&str> = Vec::new();
    let mut type_changes: Vec<(usize, &str)> = Vec::new();

    for change in changes {
        match change {
            ArgumentChange::Replace { position, text } => {
                let argument = argument_at(file, &arguments, *position)?;
                edits.push(TextEdit::replace(argument.range(), text.clone()));
            }
            ArgumentChange::MergeProperties { position, properties } => {
                let argument = argument_at(file, &arguments, *position)?;
                let object = match argument.kind() {
                    NodeKind::Object => Some(argument),
                    _ => arrow_returned_object(argument),
                }
                .ok_or_else(|| {
                    EngineError::malformed(file.path(), format!("argument {position} is not an object literal"))
                })?;
                edits.extend(object_merge_edits(file, object, properties));
            }
            ArgumentChange::Append { text } => appended.push(text.as_str()),
            ArgumentChange::SetTypeArgument { position, text } => type_changes.push((*position, text.as_str())),
        }
    }

    if !appended.is_empty() {
        edits.extend(append_edits(file, call, &arguments, &appended)?);
    }
    if !type_changes.is_empty() {
        edits.extend(type_argument_edits(file, call, &mut type_changes)?);
    }
    Ok(edits)
}

fn append_edits(file: &SourceFile, call: &CallNodes<'_>, arguments: &[&SyntaxNode], appended: &[&str]) -> Result<Vec<TextEdit>, EngineError> {
    let src = file.text();
    let list = call
        .arguments()
        .ok_or_else(|| EngineError::malformed(file.path(), "call has no argument list"))?;
    let close = list.end_byte() - 1;

    let Some(last) = arguments.last() else {
        return Ok(vec![TextEdit::insert(close, appended.join(", "))]);
    };
    if !file.starts_line(close) {
        return Ok(vec![TextEdit::insert(last.end_byte(), format!(", {}", appended.join(", ")))]);
    }

    let indent = file.indent_at(last.start_byte());
    let mut edits = Vec::new();
    if !src[last.end_byte()..close].contains(',') {
        edits.push(TextEdit::insert(last.end_byte(), ","));
    }
    let lines: String = appended.iter().map(|a| format!("{indent}{a},\n")).collect();
    edits.push(TextEdit::insert(file.line_start(close), lines));
    Ok(edits)
}

fn type_argument_edits(file: &SourceFile, call: &CallNodes<'_>, changes: &mut [(usize, &str)]) -> Result<Vec<TextEdit>, EngineError> {
    let src = file.text();
    changes.sort_by_key(|(position, _)| *position);
    let highest = changes.last().map(|(p, _)| *p).unwrap_or(0);

    let Some(list) = call.type_arguments() else {
        let function = call
            .call
            .child_by_field("function")
            .ok_or_else(|| EngineError::malformed(file.path(), "call has no callee"))?;
        let mut items = vec!["{}"; highest + 1];
        for &(position, text) in changes.iter() {
            items[position] = text;
        }
        return Ok(vec![TextEdit::insert(function.end_byte(), format!("<{}>", items.join(", ")))]);
    };

    let existing: Vec<&SyntaxNode> = list.significant_children().collect();
    let mut edits = Vec::new();
    let mut tail: Vec<&str> = (existing.len()..=highest).map(|_| "{}").collect();
    for &(position, text) in changes.iter() {
        match existing.get(position) {
            Some(item) if item.text(src) == text => {}
            Some(item) => edits.push(TextEdit::replace(item.range(), text)),
            None => tail[position - existing.len()] = text,
        }
    }
    if !tail.is_empty() {
        let joined: String = tail.iter().map(|t| format!(", {t}")).collect();
        edits.push(TextEdit::insert(list.end_byte() - 1, joined));
    }
    Ok(edits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Origin;

    fn file(text: &str) -> SourceFile {
        SourceFile::parse("src/views/Home/index.tsx", text, Origin::Loaded).unwrap()
    }

    fn mapper(state: &[(&str, &str)], actions: &[&str]) -> MapperArgs {
        MapperArgs {
            state_mapper: state.iter().map(|(k, v)| ObjectProperty::new(*k, *v)).collect(),
            action_mapper: actions.iter().map(|a| ObjectProperty::shorthand(*a)).collect(),
            state_param: "state: RootState".to_string(),
            state_type: "HomeStateProps".to_string(),
            dispatch_type: "HomeDispatchProps".to_string(),
        }
    }

    fn located(f: &SourceFile) -> DecoratorOrHocCall {
        let nodes = component_nodes(f).unwrap().unwrap();
        find_decorator_or_hoc(f, &nodes, "connect").unwrap()
    }

    const CLASS: &str = "export default class Home extends Component<HomeProps> {\n  render() {\n    return null;\n  }\n}\n";

    #[test]
    fn test_decorator_is_synthesized_then_merged() {
        let mut f = file(CLASS);
        set_or_merge_decorator_or_hoc(&mut f, "connect", &mapper(&[("tasks", "state.task.tasks")], &["fetchTasks"])).unwrap();
        assert!(f.text().starts_with(
            "@connect<HomeStateProps, HomeDispatchProps>(\n  (state: RootState) => ({ tasks: state.task.tasks }),\n  { fetchTasks },\n)\nexport default class Home"
        ));
        let call = located(&f);
        assert_eq!(call.arguments.len(), 2);
        assert_eq!(call.type_arguments.len(), 2);

        set_or_merge_decorator_or_hoc(&mut f, "connect", &mapper(&[("title", "state.task.title")], &["fetchTasks"])).unwrap();
        assert_eq!(f.text().matches("@connect").count(), 1);
        assert!(f.text().contains(
            "  (state: RootState) => ({\n    tasks: state.task.tasks,\n    title: state.task.title,\n  }),\n  { fetchTasks },\n"
        ));
    }

    #[test]
    fn test_action_mapper_lands_in_second_position() {
        let mut f = file(
            "@connect<HomeStateProps, HomeDispatchProps>((state: RootState) => ({ a: state.x.a }))\nexport class Home extends Component {\n  render() { return null; }\n}\n",
        );
        set_or_merge_decorator_or_hoc(&mut f, "connect", &mapper(&[], &["fetchTasks"])).unwrap();
        let call = located(&f);
        assert_eq!(call.arguments[0].text, "(state: RootState) => ({ a: state.x.a })");
        assert_eq!(call.arguments[1].text, "{ fetchTasks }");
    }

    #[test]
    fn test_default_function_gets_hoc_export() {
        let mut f = file("export default function Home(props: HomeProps) {\n  return null;\n}\n");
        let args = mapper(&[("tasks", "state.task.tasks")], &["fetchTasks"]);
        set_or_merge_decorator_or_hoc(&mut f, "connect", &args).unwrap();
        let once = f.text().to_string();
        assert_eq!(
            once,
            "function Home(props: HomeProps) {\n  return null;\n}\n\nexport default connect<HomeStateProps, HomeDispatchProps>(\n  (state: RootState) => ({ tasks: state.task.tasks }),\n  { fetchTasks },\n)(Home);\n"
        );
        set_or_merge_decorator_or_hoc(&mut f, "connect", &args).unwrap();
        assert_eq!(f.text(), once);
    }

    #[test]
    fn test_named_function_is_renamed_behind_export() {
        let mut f = file("export function Home(props: HomeProps) {\n  return null;\n}\n");
        set_or_merge_decorator_or_hoc(&mut f, "connect", &mapper(&[], &["fetchTasks"])).unwrap();
        assert!(f.text().starts_with("function HomeComponent(props: HomeProps) {"));
        assert!(f.text().contains("export const Home = connect<HomeStateProps, HomeDispatchProps>(\n  null,\n  { fetchTasks },\n)(HomeComponent);\n"));
    }

    #[test]
    fn test_arrow_is_wrapped_in_place_and_null_replaced() {
        let mut f = file("export const Home = (props: HomeProps) => null;\n");
        set_or_merge_decorator_or_hoc(&mut f, "connect", &mapper(&[], &["fetchTasks"])).unwrap();
        assert_eq!(
            f.text(),
            "export const Home = connect<HomeStateProps, HomeDispatchProps>(\n  null,\n  { fetchTasks },\n)((props: HomeProps) => null);\n"
        );
        set_or_merge_decorator_or_hoc(&mut f, "connect", &mapper(&[("tasks", "state.task.tasks")], &[])).unwrap();
        assert!(f.text().contains("  (state: RootState) => ({ tasks: state.task.tasks }),\n  { fetchTasks },\n"));
    }

    #[test]
    fn test_third_argument_is_not_merged() {
        let mut f = file("function Home() {\n  return null;\n}\n\nexport default connect(a, b, c)(Home);\n");
        let err = set_or_merge_decorator_or_hoc(&mut f, "connect", &mapper(&[("x", "1")], &[])).unwrap_err();
        assert!(matches!(err, EngineError::Malformed { .. }));
    }

    #[test]
    fn test_merge_plan_for_empty_call() {
        let existing = DecoratorOrHocCall {
            callee: "connect".to_string(),
            site: CallSite::Hoc,
            arguments: Vec::new(),
            type_arguments: Vec::new(),
        };
        let changes = mapper(&[], &["fetchTasks"]).merge(&existing).unwrap();
        assert_eq!(
            changes,
            vec![
                ArgumentChange::Append { text: "null".to_string() },
                ArgumentChange::Append { text: "{ fetchTasks }".to_string() },
            ]
        );
    }
}
