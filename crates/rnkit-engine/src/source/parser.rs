//! TypeScript/TSX parser using tree-sitter.

use std::path::Path;
use tree_sitter::Parser;

use crate::diagnostic::EngineError;
use super::syntax::SyntaxNode;

/// Grammar used for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    TypeScript,
    Tsx,
}

impl Dialect {
    /// Picks the grammar from a file extension.
    pub fn for_path(path: &Path) -> Result<Self, EngineError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "tsx" | "jsx" => Ok(Self::Tsx),
            "ts" | "mts" | "js" | "mjs" | "cjs" => Ok(Self::TypeScript),
            _ => Err(EngineError::UnsupportedExtension {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// TypeScript parser.
pub struct SourceParser {
    parser: Parser,
}

impl SourceParser {
    /// Creates a new parser for the given dialect.
    pub fn new(dialect: Dialect) -> Result<Self, EngineError> {
        let language: tree_sitter::Language = match dialect {
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        };
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|_| EngineError::ParserInitFailed)?;
        Ok(Self { parser })
    }

    /// Parses a source text into an owned tree. Text with syntax errors is
    /// rejected with the position of the first error.
    pub fn parse(&mut self, source: &str, path: &Path) -> Result<SyntaxNode, EngineError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| EngineError::io(path, "parser returned no tree"))?;

        let mut cursor = tree.walk();
        let root = SyntaxNode::from_cursor(&mut cursor);

        if let Some(error) = root.first_error() {
            let message = if error.is_missing() {
                format!("missing '{}'", error.raw_kind())
            } else {
                let snippet: String = error.text(source).chars().take(40).collect();
                format!("unexpected '{}'", snippet.trim())
            };
            let span = error.span(path);
            return Err(EngineError::SyntaxError {
                message,
                file: span.file,
                line: span.start_line,
                column: span.start_col,
            });
        }

        Ok(root)
    }
}
