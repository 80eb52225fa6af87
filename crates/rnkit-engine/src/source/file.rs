//! One parsed source file and the edits applied to it.

use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::diagnostic::EngineError;
use super::parser::{Dialect, SourceParser};
use super::syntax::{NodeKind, SyntaxNode};

/// Where a tracked file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Read from disk.
    Loaded,
    /// Created during this session; does not exist on disk yet.
    Created,
}

/// A replacement of a byte range in a file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            range: at..at,
            replacement: text.into(),
        }
    }

    pub fn delete(range: Range<usize>) -> Self {
        Self {
            range,
            replacement: String::new(),
        }
    }
}

/// Handle to a node at a specific revision of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    kind: NodeKind,
    range: Range<usize>,
    revision: u64,
}

impl NodeRef {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }
}

/// An in-memory source file with its syntax tree.
#[derive(Debug)]
pub struct SourceFile {
    path: PathBuf,
    text: String,
    dialect: Dialect,
    root: SyntaxNode,
    origin: Origin,
    dirty: bool,
    revision: u64,
}

impl SourceFile {
    /// Parses `text` as the content of `path`.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>, origin: Origin) -> Result<Self, EngineError> {
        let path = path.into();
        let text = text.into();
        let dialect = Dialect::for_path(&path)?;
        let root = SourceParser::new(dialect)?.parse(&text, &path)?;
        Ok(Self {
            path,
            text,
            dialect,
            root,
            origin,
            dirty: origin == Origin::Created,
            revision: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// True when the text differs from what is on disk.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Text of a node of this file.
    pub fn node_text(&self, node: &SyntaxNode) -> &str {
        node.text(&self.text)
    }

    /// Captures a handle to `node` at the current revision.
    pub fn node_ref(&self, node: &SyntaxNode) -> NodeRef {
        NodeRef {
            kind: node.kind(),
            range: node.range(),
            revision: self.revision,
        }
    }

    /// Resolves a handle captured with [`node_ref`](Self::node_ref).
    pub fn resolve(&self, node: &NodeRef) -> Result<&SyntaxNode, EngineError> {
        if node.revision != self.revision {
            return Err(EngineError::StaleReference {
                path: self.path.clone(),
                expected: node.revision,
                actual: self.revision,
            });
        }
        self.root.find_exact(node.kind, &node.range).ok_or_else(|| {
            EngineError::malformed(&self.path, format!("no {:?} node at {:?}", node.kind, node.range))
        })
    }

    /// Top-level statements, with comments skipped.
    pub fn statements(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.root.significant_children()
    }

    /// Applies a batch of non-overlapping edits and reparses. On failure the
    /// file is left unchanged. An empty batch is a no-op.
    pub fn apply(&mut self, mut edits: Vec<TextEdit>) -> Result<(), EngineError> {
        if edits.is_empty() {
            return Ok(());
        }

        edits.sort_by(|a, b| a.range.start.cmp(&b.range.start).then(a.range.end.cmp(&b.range.end)));
        for pair in edits.windows(2) {
            let (first, second) = (&pair[0], &pair[1]);
            if second.range.start < first.range.end {
                return Err(EngineError::ConflictingEdits {
                    path: self.path.clone(),
                    first_start: first.range.start,
                    first_end: first.range.end,
                    second_start: second.range.start,
                    second_end: second.range.end,
                });
            }
        }

        let mut text = self.text.clone();
        for edit in edits.iter().rev() {
            if edit.range.end > text.len() || !text.is_char_boundary(edit.range.start) || !text.is_char_boundary(edit.range.end) {
                return Err(EngineError::malformed(&self.path, format!("edit range {:?} is out of bounds", edit.range)));
            }
            text.replace_range(edit.range.clone(), &edit.replacement);
        }

        self.replace_text(text)
    }

    /// Replaces the whole text, reparsing it.
    pub fn replace_text(&mut self, text: String) -> Result<(), EngineError> {
        if text == self.text {
            return Ok(());
        }
        let root = SourceParser::new(self.dialect)?
            .parse(&text, &self.path)
            .map_err(|err| match err {
                EngineError::SyntaxError { message, line, column, .. } => EngineError::malformed(
                    &self.path,
                    format!("edit produced invalid source ({message} at {}:{})", line + 1, column + 1),
                ),
                other => other,
            })?;

        self.text = text;
        self.root = root;
        self.dirty = true;
        self.revision += 1;
        tracing::debug!(path = %self.path.display(), revision = self.revision, "file edited");
        Ok(())
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
        self.origin = Origin::Loaded;
    }

    // =========================================================================
    // Layout helpers
    // =========================================================================

    /// Byte offset of the start of the line containing `offset`.
    pub fn line_start(&self, offset: usize) -> usize {
        self.text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    /// Byte offset just past the newline ending the line containing `offset`
    /// (or the end of the text).
    pub fn line_end_inclusive(&self, offset: usize) -> usize {
        self.text[offset..]
            .find('\n')
            .map(|i| offset + i + 1)
            .unwrap_or(self.text.len())
    }

    /// Leading whitespace of the line containing `offset`.
    pub fn indent_at(&self, offset: usize) -> &str {
        let start = self.line_start(offset);
        let line = &self.text[start..];
        let len = line.len() - line.trim_start_matches([' ', '\t']).len();
        &line[..len]
    }

    /// True when only whitespace precedes `offset` on its line.
    pub fn starts_line(&self, offset: usize) -> bool {
        self.text[self.line_start(offset)..offset].trim().is_empty()
    }

    /// True when only whitespace follows `offset` on its line.
    pub fn ends_line(&self, offset: usize) -> bool {
        let end = self.line_end_inclusive(offset);
        self.text[offset..end].trim().is_empty()
    }

    /// Range covering `range` plus, when the node sits alone on its lines,
    /// the surrounding indentation and line break.
    pub fn full_line_range(&self, range: Range<usize>) -> Range<usize> {
        if self.starts_line(range.start) && self.ends_line(range.end) {
            self.line_start(range.start)..self.line_end_inclusive(range.end)
        } else {
            range
        }
    }
}
