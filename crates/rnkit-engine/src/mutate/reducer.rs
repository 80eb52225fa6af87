//! Reducer mutators: action-type unions and dispatch blocks.

use crate::diagnostic::EngineError;
use crate::locate::{case_test, dispatch_switch, find_type_alias, is_sentinel, member_tag, union_members};
use crate::source::{squash_whitespace, NodeKind, SourceFile, SyntaxNode, TextEdit};

use super::{not_found, reindent, INDENT};

/// A `case` clause to add to a dispatch block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCase {
    /// Tested action tag, without quotes.
    pub test: String,
    /// Clause body, one statement per line, unindented.
    pub body: String,
}

impl NewCase {
    pub fn new(test: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            test: test.into(),
            body: body.into(),
        }
    }

    fn render(&self, indent: &str) -> String {
        let mut out = format!("{indent}case '{}':\n", self.test);
        for line in self.body.lines() {
            if line.trim().is_empty() {
                out.push('\n');
            } else {
                out.push_str(&format!("{indent}{INDENT}{line}\n"));
            }
        }
        out
    }
}

/// `export type Name = any;` for no members, otherwise one member per line.
pub fn render_union(name: &str, members: &[String]) -> String {
    if members.is_empty() {
        return format!("export type {name} = any;\n");
    }
    let mut out = format!("export type {name} =");
    for member in members {
        out.push_str(&format!("\n{INDENT}| {member}"));
    }
    out.push_str(";\n");
    out
}

fn same_member(a: &str, b: &str) -> bool {
    match (member_tag(a), member_tag(b)) {
        (Some(x), Some(y)) => x == y,
        _ => squash_whitespace(a) == squash_whitespace(b),
    }
}

/// Appends members to the union aliased as `alias`.
///
/// A placeholder `any` body is replaced wholesale, never unioned. Members
/// whose action tag (or text) is already present are skipped.
pub fn append_union_member(file: &mut SourceFile, alias: &str, members: &[String]) -> Result<(), EngineError> {
    let src = file.text();
    let declaration = find_type_alias(file, alias).ok_or_else(|| not_found(file, format!("type {alias}")))?;
    let value = declaration
        .child_by_field("value")
        .ok_or_else(|| EngineError::malformed(file.path(), format!("type {alias} has no body")))?;
    let sentinel = is_sentinel(value, src);

    let existing: Vec<&str> = if sentinel {
        Vec::new()
    } else {
        union_members(value).into_iter().map(|m| m.text(src)).collect()
    };
    let mut added: Vec<&str> = Vec::new();
    for member in members {
        let member = member.trim();
        if !existing.iter().chain(added.iter()).any(|e| same_member(e, member)) {
            added.push(member);
        }
    }
    if added.is_empty() {
        return Ok(());
    }
    tracing::debug!(path = %file.path().display(), alias, added = added.len(), sentinel, "extending union");

    let lines: String = added.iter().map(|m| format!("\n{INDENT}| {m}")).collect();
    let edit = if sentinel && added.len() == 1 {
        TextEdit::replace(value.range(), added[0])
    } else if sentinel || value.kind() != NodeKind::UnionType {
        // Rewrite from just after `=` so the union is laid out one member per line.
        let equals = equals_token_end(declaration, value);
        let head = if sentinel {
            String::new()
        } else {
            format!("\n{INDENT}| {}", value.text(src))
        };
        TextEdit::replace(equals..value.end_byte(), format!("{head}{lines}"))
    } else {
        TextEdit::insert(value.end_byte(), lines)
    };
    file.apply(vec![edit])
}

fn equals_token_end(declaration: &SyntaxNode, value: &SyntaxNode) -> usize {
    declaration
        .children()
        .iter()
        .find(|c| !c.is_named() && c.raw_kind() == "=")
        .map(|c| c.end_byte())
        .unwrap_or(value.start_byte())
}

/// Adds `cases` to the dispatch block and keeps its single `default` clause
/// last. Existing clauses are left byte-for-byte as they are; cases whose
/// tag is already handled are skipped.
///
/// A dispatch block without exactly one `default` clause is malformed.
pub fn insert_case_clauses_before_default(file: &mut SourceFile, cases: &[NewCase]) -> Result<(), EngineError> {
    let src = file.text();
    let switch = dispatch_switch(file).ok_or_else(|| not_found(file, "dispatch block"))?;
    let body = switch
        .child_by_field("body")
        .ok_or_else(|| EngineError::malformed(file.path(), "dispatch block has no body"))?;

    let defaults: Vec<&SyntaxNode> = body.children_of_kind(NodeKind::SwitchDefault).collect();
    let [default] = defaults.as_slice() else {
        return Err(EngineError::malformed(
            file.path(),
            format!("dispatch block must have exactly one default clause, found {}", defaults.len()),
        ));
    };

    let handled: Vec<String> = body
        .children_of_kind(NodeKind::SwitchCase)
        .filter_map(|c| c.child_by_field("value"))
        .map(|v| case_test(v, src))
        .collect();
    let mut added: Vec<&NewCase> = Vec::new();
    for case in cases {
        if !handled.contains(&case.test) && !added.iter().any(|a| a.test == case.test) {
            added.push(case);
        }
    }
    if added.is_empty() {
        return Ok(());
    }

    let indent = file.indent_at(default.start_byte()).to_string();
    let rendered: String = added.iter().map(|c| c.render(&indent)).collect();
    let last = body.significant_children().last().unwrap_or(*default);

    let edits = if std::ptr::eq(last, *default) {
        if file.starts_line(default.start_byte()) {
            vec![TextEdit::insert(file.line_start(default.start_byte()), rendered)]
        } else {
            vec![TextEdit::insert(default.start_byte(), format!("\n{rendered}{indent}"))]
        }
    } else {
        let moved = format!("{indent}{}\n", reindent(file, default, &indent));
        vec![
            TextEdit::delete(file.full_line_range(default.range())),
            TextEdit::insert(file.line_end_inclusive(last.end_byte()), format!("{rendered}{moved}")),
        ]
    };
    tracing::debug!(path = %file.path().display(), added = added.len(), "inserting case clauses");
    file.apply(edits)
}
