//! Mutators.
//!
//! Each mutator re-locates its target by name (or resolves a [`NodeRef`]),
//! computes a batch of [`TextEdit`]s against the current text and applies it
//! with [`SourceFile::apply`]. Text outside the edited spans is never touched.
//!
//! Every mutator is idempotent: if the file already satisfies the requested
//! postcondition (checked by name or value, not by text) the batch is empty
//! and the file is left as is.
//!
//! [`NodeRef`]: crate::source::NodeRef

mod class;
mod function;
mod imports;
mod interface;
mod jsx;
mod object;
mod reducer;
mod wrapper;

pub use class::{set_class_state_initializer, set_heritage_type_argument, set_or_insert_constructor};
pub use function::{insert_state_hooks, render_state_hook, set_first_parameter_type};
pub use imports::{add_default_import_if_absent, add_named_import_if_absent, add_reexport_if_absent, ModuleRef};
pub use interface::{extend_interface_heritage, render_interface, set_interface_fields};
pub use jsx::{insert_jsx_child_if_absent, replace_returned_jsx_with_wrapper, JsxChild};
pub use object::{merge_object_literal_properties, object_keys, render_object};
pub use reducer::{append_union_member, insert_case_clauses_before_default, render_union, NewCase};
pub use wrapper::{set_or_merge_decorator_or_hoc, ArgumentChange, MapperArgs, WrapperArgs, WrapperCall};

use crate::diagnostic::EngineError;
use crate::source::{SourceFile, SyntaxNode, TextEdit};

/// One level of indentation in generated code.
pub const INDENT: &str = "  ";

pub(crate) fn not_found(file: &SourceFile, what: impl Into<String>) -> EngineError {
    EngineError::DeclarationNotFound {
        what: what.into(),
        path: file.path().to_path_buf(),
    }
}

/// Indentation one level deeper than the line holding `node`.
pub(crate) fn nested_indent(file: &SourceFile, node: &SyntaxNode) -> String {
    format!("{}{}", file.indent_at(node.start_byte()), INDENT)
}

/// Edit appending a top-level statement at the end of the file.
pub(crate) fn append_statement(file: &SourceFile, text: &str) -> TextEdit {
    let src = file.text();
    let separator = if src.trim().is_empty() {
        ""
    } else if src.ends_with('\n') {
        "\n"
    } else {
        "\n\n"
    };
    TextEdit::insert(src.len(), format!("{separator}{text}"))
}

/// Edit inserting `lines` (indented, newline-terminated) into a statement
/// block: on the line after `after`, or at the top of the block.
pub(crate) fn block_insert(file: &SourceFile, block: &SyntaxNode, after: Option<&SyntaxNode>, lines: &str) -> TextEdit {
    if let Some(statement) = after {
        return TextEdit::insert(file.line_end_inclusive(statement.end_byte()), lines);
    }
    let open = block.start_byte() + 1;
    if file.ends_line(open) {
        TextEdit::insert(file.line_end_inclusive(open), lines)
    } else if file.text()[open..].trim_start().starts_with('}') {
        // `{}`: open the block and put the brace back on its own line.
        let close = open + file.text()[open..].find('}').unwrap_or(0);
        TextEdit::replace(open..close, format!("\n{lines}{}", file.indent_at(block.start_byte())))
    } else {
        TextEdit::insert(open, format!("\n{lines}"))
    }
}

/// Re-indents a multi-line node so its first line sits at `indent`.
pub(crate) fn reindent(file: &SourceFile, node: &SyntaxNode, indent: &str) -> String {
    let original = file.indent_at(node.start_byte());
    let text = file.node_text(node);
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i == 0 {
            out.push_str(line);
            continue;
        }
        out.push('\n');
        if line.trim().is_empty() {
            continue;
        }
        match line.strip_prefix(original) {
            Some(rest) => {
                out.push_str(indent);
                out.push_str(rest);
            }
            None => {
                out.push_str(indent);
                out.push_str(line.trim_start());
            }
        }
    }
    out
}
