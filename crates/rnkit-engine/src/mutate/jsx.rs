//! JSX mutators: wrapping a render output, registering child elements.

use crate::diagnostic::EngineError;
use crate::locate::{find_jsx_element, jsx_tag_name};
use crate::source::{string_value, NodeKind, NodeRef, SourceFile, SyntaxNode, TextEdit};

use super::{not_found, reindent, INDENT};

/// A JSX element to register under a parent, deduplicated by tag and `name`
/// attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsxChild {
    pub tag: String,
    pub name: Option<String>,
    /// Full element text: `<Stack.Screen name="Home" component={Home} />`.
    pub text: String,
}

fn unwrap_parens(mut node: &SyntaxNode) -> Option<&SyntaxNode> {
    while node.kind() == NodeKind::ParenthesizedExpression {
        node = node.significant_children().next()?;
    }
    Some(node)
}

fn open_tag(wrapper: &str, attributes: &str) -> String {
    if attributes.trim().is_empty() {
        format!("<{wrapper}>")
    } else {
        format!("<{wrapper} {}>", attributes.trim())
    }
}

/// `text` as `//` comment lines at `indent`, with its common indentation removed.
fn comment_block(text: &str, indent: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let first = lines.iter().position(|l| !l.trim().is_empty()).unwrap_or(lines.len());
    let last = lines.iter().rposition(|l| !l.trim().is_empty()).map(|i| i + 1).unwrap_or(first);
    let lines = &lines[first..last];
    let common = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out = format!("{indent}// Previous render body:\n");
    for line in lines {
        if line.trim().is_empty() {
            out.push_str(&format!("{indent}//\n"));
        } else {
            out.push_str(&format!("{indent}// {}\n", line.get(common..).unwrap_or(line.trim_start()).trim_end()));
        }
    }
    out
}

/// `return (\n  <Wrapper>\n    jsx\n  </Wrapper>\n);` with the first line unindented.
fn wrapped_return(file: &SourceFile, jsx: &SyntaxNode, indent: &str, wrapper: &str, attributes: &str) -> String {
    let inner = reindent(file, jsx, &format!("{indent}{INDENT}{INDENT}"));
    format!(
        "return (\n{indent}{INDENT}{}\n{indent}{INDENT}{INDENT}{inner}\n{indent}{INDENT}</{wrapper}>\n{indent});",
        open_tag(wrapper, attributes)
    )
}

/// Wraps the JSX returned by a function, arrow or `render` method in
/// `<wrapper attributes>...</wrapper>`.
///
/// The statements before the `return` are kept; the original body is left
/// above the new `return` as a comment. A function whose output is already
/// rooted at `wrapper` is left unchanged.
pub fn replace_returned_jsx_with_wrapper(
    file: &mut SourceFile,
    function: &NodeRef,
    wrapper: &str,
    attributes: &str,
) -> Result<(), EngineError> {
    let src = file.text();
    let node = file.resolve(function)?;
    if !node.kind().is_function_like() {
        return Err(EngineError::malformed(
            file.path(),
            format!("expected a function, found {}", node.raw_kind()),
        ));
    }
    let body = node
        .child_by_field("body")
        .ok_or_else(|| EngineError::malformed(file.path(), "function has no body"))?;

    let edit = if body.kind() == NodeKind::StatementBlock {
        // Early returns nested in branches are not the render output.
        let ret = body
            .children_of_kind(NodeKind::ReturnStatement)
            .last()
            .ok_or_else(|| EngineError::malformed(file.path(), "function body has no top-level return"))?;
        let jsx = ret
            .significant_children()
            .next()
            .and_then(unwrap_parens)
            .filter(|n| n.kind().is_jsx_element())
            .ok_or_else(|| EngineError::malformed(file.path(), "render output is not a JSX element"))?;
        if jsx_tag_name(jsx, src) == Some(wrapper) {
            return Ok(());
        }

        let indent = file.indent_at(ret.start_byte());
        let original = &src[body.start_byte() + 1..body.end_byte() - 1];
        let comment = comment_block(original, indent);
        let replacement = format!(
            "{}{indent}{}",
            comment.trim_start(),
            wrapped_return(file, jsx, indent, wrapper, attributes)
        );
        TextEdit::replace(ret.range(), replacement)
    } else {
        let jsx = unwrap_parens(body)
            .filter(|n| n.kind().is_jsx_element())
            .ok_or_else(|| EngineError::malformed(file.path(), "render output is not a JSX element"))?;
        if jsx_tag_name(jsx, src) == Some(wrapper) {
            return Ok(());
        }

        let base = file.indent_at(node.start_byte());
        let indent = format!("{base}{INDENT}");
        let comment = comment_block(jsx.text(src), &indent);
        let block = format!(
            "{{\n{comment}{indent}{}\n{base}}}",
            wrapped_return(file, jsx, &indent, wrapper, attributes)
        );
        TextEdit::replace(body.range(), block)
    };

    tracing::debug!(path = %file.path().display(), wrapper, "wrapping render output");
    file.apply(vec![edit])
}

fn name_attribute(element: &SyntaxNode, src: &str) -> Option<String> {
    let opening = match element.kind() {
        NodeKind::JsxElement => element.child_by_field("open_tag")?,
        _ => element,
    };
    opening.children_of_kind(NodeKind::JsxAttribute).find_map(|attr| {
        let mut parts = attr.significant_children();
        let key = parts.next()?;
        if key.text(src) != "name" {
            return None;
        }
        let value = parts.next()?;
        Some(match value.kind() {
            NodeKind::String => string_value(value, src),
            _ => value.text(src).to_string(),
        })
    })
}

/// Adds `child` as the last child of the first `<parent_tag>` element unless
/// an element with the same tag and `name` is already there. A self-closing
/// parent is opened up.
pub fn insert_jsx_child_if_absent(file: &mut SourceFile, parent_tag: &str, child: &JsxChild) -> Result<(), EngineError> {
    let src = file.text();
    let parent = find_jsx_element(file.root(), src, parent_tag)
        .ok_or_else(|| not_found(file, format!("<{parent_tag}> element")))?;

    let present = parent.descendants().any(|n| {
        n.kind().is_jsx_element()
            && jsx_tag_name(n, src) == Some(child.tag.as_str())
            && (child.name.is_none() || name_attribute(n, src) == child.name)
    });
    if present {
        return Ok(());
    }

    let base = file.indent_at(parent.start_byte());
    let edit = match parent.kind() {
        NodeKind::JsxElement => {
            let close = parent
                .child_by_field("close_tag")
                .ok_or_else(|| EngineError::malformed(file.path(), format!("<{parent_tag}> has no closing tag")))?;
            let indent = parent
                .named_children()
                .find(|c| c.kind().is_jsx_element() && file.starts_line(c.start_byte()))
                .map(|c| file.indent_at(c.start_byte()).to_string())
                .unwrap_or_else(|| format!("{base}{INDENT}"));
            if file.starts_line(close.start_byte()) {
                TextEdit::insert(file.line_start(close.start_byte()), format!("{indent}{}\n", child.text))
            } else {
                TextEdit::insert(close.start_byte(), format!("\n{indent}{}\n{base}", child.text))
            }
        }
        _ => {
            let text = parent.text(src);
            let head = text.strip_suffix("/>").unwrap_or(text).trim_end();
            TextEdit::replace(
                parent.range(),
                format!("{head}>\n{base}{INDENT}{}\n{base}</{parent_tag}>", child.text),
            )
        }
    };
    file.apply(vec![edit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::find_function;
    use crate::source::Origin;

    fn file(text: &str) -> SourceFile {
        SourceFile::parse("src/views/Home/index.tsx", text, Origin::Loaded).unwrap()
    }

    fn wrap(f: &mut SourceFile, name: &str) {
        let function = find_function(f, name).unwrap();
        let handle = f.node_ref(function);
        replace_returned_jsx_with_wrapper(f, &handle, "ThemeProvider", "theme={theme}").unwrap();
    }

    #[test]
    fn test_wraps_returned_jsx_and_keeps_body_as_comment() {
        let mut f = file("export default function Home() {\n  const a = 1;\n  return <Text>hi</Text>;\n}\n");
        wrap(&mut f, "Home");
        assert_eq!(
            f.text(),
            "export default function Home() {\n  const a = 1;\n  // Previous render body:\n  // const a = 1;\n  // return <Text>hi</Text>;\n  return (\n    <ThemeProvider theme={theme}>\n      <Text>hi</Text>\n    </ThemeProvider>\n  );\n}\n"
        );
    }

    #[test]
    fn test_wrapping_twice_is_a_noop() {
        let mut f = file("export default function Home() {\n  return (\n    <View>\n      <Text>hi</Text>\n    </View>\n  );\n}\n");
        wrap(&mut f, "Home");
        let once = f.text().to_string();
        assert!(once.contains("    <ThemeProvider theme={theme}>\n      <View>\n        <Text>hi</Text>\n      </View>\n    </ThemeProvider>\n"));
        wrap(&mut f, "Home");
        assert_eq!(f.text(), once);
    }

    #[test]
    fn test_expression_bodied_arrow_becomes_block() {
        let mut f = file("export const Home = () => <Text>hi</Text>;\n");
        let arrow = f.root().find_first(|n| n.kind() == NodeKind::ArrowFunction).unwrap();
        let handle = f.node_ref(arrow);
        replace_returned_jsx_with_wrapper(&mut f, &handle, "SafeAreaView", "").unwrap();
        assert_eq!(
            f.text(),
            "export const Home = () => {\n  // Previous render body:\n  // <Text>hi</Text>\n  return (\n    <SafeAreaView>\n      <Text>hi</Text>\n    </SafeAreaView>\n  );\n};\n"
        );
    }

    #[test]
    fn test_final_return_is_wrapped_not_early_return() {
        let mut f = file(
            "export default function Home(p) {\n  if (p.loading) {\n    return <Spinner />;\n  }\n  return <View />;\n}\n",
        );
        wrap(&mut f, "Home");
        let text = f.text();
        assert!(text.starts_with("export default function Home(p) {\n  if (p.loading) {\n    return <Spinner />;\n  }\n"));
        assert!(text.ends_with("  return (\n    <ThemeProvider theme={theme}>\n      <View />\n    </ThemeProvider>\n  );\n}\n"));
        assert_eq!(text.matches("<ThemeProvider").count(), 1);
    }

    #[test]
    fn test_body_without_top_level_return_is_malformed() {
        let mut f = file("export function Home(p) {\n  if (p.ready) {\n    return <View />;\n  }\n}\n");
        let function = find_function(&f, "Home").unwrap();
        let handle = f.node_ref(function);
        let err = replace_returned_jsx_with_wrapper(&mut f, &handle, "View", "").unwrap_err();
        assert!(matches!(err, EngineError::Malformed { .. }));
    }

    #[test]
    fn test_non_jsx_output_is_malformed() {
        let mut f = file("export function Home() {\n  return null;\n}\n");
        let function = find_function(&f, "Home").unwrap();
        let handle = f.node_ref(function);
        let err = replace_returned_jsx_with_wrapper(&mut f, &handle, "View", "").unwrap_err();
        assert!(matches!(err, EngineError::Malformed { .. }));
    }

    const NAV: &str = "export default function AppNavigator() {\n  return (\n    <Stack.Navigator>\n      <Stack.Screen name=\"Home\" component={Home} />\n    </Stack.Navigator>\n  );\n}\n";

    fn screen(name: &str) -> JsxChild {
        JsxChild {
            tag: "Stack.Screen".to_string(),
            name: Some(name.to_string()),
            text: format!("<Stack.Screen name=\"{name}\" component={{{name}}} />"),
        }
    }

    #[test]
    fn test_inserts_child_before_closing_tag() {
        let mut f = file(NAV);
        insert_jsx_child_if_absent(&mut f, "Stack.Navigator", &screen("Settings")).unwrap();
        assert!(f.text().contains(
            "      <Stack.Screen name=\"Home\" component={Home} />\n      <Stack.Screen name=\"Settings\" component={Settings} />\n    </Stack.Navigator>"
        ));
    }

    #[test]
    fn test_existing_child_is_not_duplicated() {
        let mut f = file(NAV);
        insert_jsx_child_if_absent(&mut f, "Stack.Navigator", &screen("Home")).unwrap();
        assert_eq!(f.text(), NAV);
    }

    #[test]
    fn test_self_closing_parent_is_opened() {
        let mut f = file("export const Nav = () => (\n  <Stack.Navigator />\n);\n");
        insert_jsx_child_if_absent(&mut f, "Stack.Navigator", &screen("Home")).unwrap();
        assert!(f.text().contains(
            "  <Stack.Navigator>\n    <Stack.Screen name=\"Home\" component={Home} />\n  </Stack.Navigator>"
        ));
    }
}
