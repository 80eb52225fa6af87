//! Source model: parsed files, the owned syntax tree, and the edit session.

mod file;
pub mod parser;
mod project;
mod syntax;

pub use file::{NodeRef, Origin, SourceFile, TextEdit};
pub use parser::{Dialect, SourceParser};
pub use project::{module_specifier, normalize_path, normalize_specifier, Project};
pub use syntax::{squash_whitespace, string_value, Descendants, NodeKind, Position, SyntaxNode};
