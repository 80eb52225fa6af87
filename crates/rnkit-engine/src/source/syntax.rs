//! Owned, typed syntax tree.
//!
//! The tree-sitter tree is converted into [`SyntaxNode`]s right after parsing so
//! that queries work on plain data with an explicit [`NodeKind`] discriminant.
//! Every node keeps its byte range into the file text; node text is always
//! sliced from the text the tree was built from.

use std::ops::Range;
use std::path::Path;

use tree_sitter::TreeCursor;

use crate::diagnostic::Span;

/// Node kinds the locators and mutators care about. Everything else is kept
/// as [`NodeKind::Other`] with the grammar's raw kind name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    Comment,
    Error,

    // Modules
    ImportStatement,
    ImportClause,
    NamedImports,
    ImportSpecifier,
    NamespaceImport,
    ExportStatement,

    // Declarations
    ClassDeclaration,
    ClassHeritage,
    ExtendsClause,
    ClassBody,
    MethodDefinition,
    PublicFieldDefinition,
    Decorator,
    FunctionDeclaration,
    FunctionExpression,
    LexicalDeclaration,
    VariableDeclaration,
    VariableDeclarator,
    InterfaceDeclaration,
    InterfaceBody,
    ExtendsTypeClause,
    TypeAliasDeclaration,

    // Types
    TypeAnnotation,
    TypeArguments,
    TypeIdentifier,
    PredefinedType,
    UnionType,
    ObjectType,
    LiteralType,
    GenericType,
    PropertySignature,

    // Statements
    StatementBlock,
    ReturnStatement,
    ExpressionStatement,
    SwitchStatement,
    SwitchBody,
    SwitchCase,
    SwitchDefault,

    // Expressions
    Identifier,
    PropertyIdentifier,
    ShorthandPropertyIdentifier,
    CallExpression,
    Arguments,
    MemberExpression,
    ArrowFunction,
    FormalParameters,
    RequiredParameter,
    OptionalParameter,
    AssignmentExpression,
    ParenthesizedExpression,
    Object,
    Pair,
    SpreadElement,
    ArrayPattern,
    String,
    TemplateString,
    Null,
    Super,
    This,

    // JSX
    JsxElement,
    JsxSelfClosingElement,
    JsxOpeningElement,
    JsxClosingElement,
    JsxAttribute,
    JsxExpression,
    JsxText,

    Other(&'static str),
}

impl NodeKind {
    /// Maps a tree-sitter kind name onto a [`NodeKind`].
    pub fn from_raw(raw: &'static str) -> Self {
        match raw {
            "program" => Self::Program,
            "comment" => Self::Comment,
            "ERROR" => Self::Error,
            "import_statement" => Self::ImportStatement,
            "import_clause" => Self::ImportClause,
            "named_imports" => Self::NamedImports,
            "import_specifier" => Self::ImportSpecifier,
            "namespace_import" => Self::NamespaceImport,
            "export_statement" => Self::ExportStatement,
            "class_declaration" => Self::ClassDeclaration,
            "class_heritage" => Self::ClassHeritage,
            "extends_clause" => Self::ExtendsClause,
            "class_body" => Self::ClassBody,
            "method_definition" => Self::MethodDefinition,
            "public_field_definition" | "field_definition" => Self::PublicFieldDefinition,
            "decorator" => Self::Decorator,
            "function_declaration" => Self::FunctionDeclaration,
            "function_expression" | "function" => Self::FunctionExpression,
            "lexical_declaration" => Self::LexicalDeclaration,
            "variable_declaration" => Self::VariableDeclaration,
            "variable_declarator" => Self::VariableDeclarator,
            "interface_declaration" => Self::InterfaceDeclaration,
            "interface_body" => Self::InterfaceBody,
            "extends_type_clause" => Self::ExtendsTypeClause,
            "type_alias_declaration" => Self::TypeAliasDeclaration,
            "type_annotation" => Self::TypeAnnotation,
            "type_arguments" => Self::TypeArguments,
            "type_identifier" => Self::TypeIdentifier,
            "predefined_type" => Self::PredefinedType,
            "union_type" => Self::UnionType,
            "object_type" => Self::ObjectType,
            "literal_type" => Self::LiteralType,
            "generic_type" => Self::GenericType,
            "property_signature" => Self::PropertySignature,
            "statement_block" => Self::StatementBlock,
            "return_statement" => Self::ReturnStatement,
            "expression_statement" => Self::ExpressionStatement,
            "switch_statement" => Self::SwitchStatement,
            "switch_body" => Self::SwitchBody,
            "switch_case" => Self::SwitchCase,
            "switch_default" => Self::SwitchDefault,
            "identifier" => Self::Identifier,
            "property_identifier" => Self::PropertyIdentifier,
            "shorthand_property_identifier" => Self::ShorthandPropertyIdentifier,
            "call_expression" => Self::CallExpression,
            "arguments" => Self::Arguments,
            "member_expression" => Self::MemberExpression,
            "arrow_function" => Self::ArrowFunction,
            "formal_parameters" => Self::FormalParameters,
            "required_parameter" => Self::RequiredParameter,
            "optional_parameter" => Self::OptionalParameter,
            "assignment_expression" => Self::AssignmentExpression,
            "parenthesized_expression" => Self::ParenthesizedExpression,
            "object" => Self::Object,
            "pair" => Self::Pair,
            "spread_element" => Self::SpreadElement,
            "array_pattern" => Self::ArrayPattern,
            "string" => Self::String,
            "template_string" => Self::TemplateString,
            "null" => Self::Null,
            "super" => Self::Super,
            "this" => Self::This,
            "jsx_element" => Self::JsxElement,
            "jsx_self_closing_element" => Self::JsxSelfClosingElement,
            "jsx_opening_element" => Self::JsxOpeningElement,
            "jsx_closing_element" => Self::JsxClosingElement,
            "jsx_attribute" => Self::JsxAttribute,
            "jsx_expression" => Self::JsxExpression,
            "jsx_text" => Self::JsxText,
            other => Self::Other(other),
        }
    }

    /// True for kinds that introduce a function scope.
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            Self::FunctionDeclaration | Self::FunctionExpression | Self::ArrowFunction | Self::MethodDefinition
        )
    }

    /// True for the two JSX element forms a render function can return.
    pub fn is_jsx_element(self) -> bool {
        matches!(self, Self::JsxElement | Self::JsxSelfClosingElement)
    }
}

/// A zero-based row/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

/// One node of the owned syntax tree.
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    kind: NodeKind,
    raw_kind: &'static str,
    field: Option<&'static str>,
    named: bool,
    missing: bool,
    range: Range<usize>,
    start: Position,
    end: Position,
    children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Builds the owned subtree rooted at the cursor's current node.
    pub(crate) fn from_cursor(cursor: &mut TreeCursor) -> Self {
        let node = cursor.node();
        let field = cursor.field_name();
        let mut children = Vec::new();

        if cursor.goto_first_child() {
            loop {
                children.push(Self::from_cursor(cursor));
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
            cursor.goto_parent();
        }

        let kind = if node.is_error() {
            NodeKind::Error
        } else if !node.is_named() {
            NodeKind::Other(node.kind())
        } else {
            NodeKind::from_raw(node.kind())
        };

        Self {
            kind,
            raw_kind: node.kind(),
            field,
            named: node.is_named(),
            missing: node.is_missing(),
            range: node.start_byte()..node.end_byte(),
            start: Position {
                row: node.start_position().row,
                column: node.start_position().column,
            },
            end: Position {
                row: node.end_position().row,
                column: node.end_position().column,
            },
            children,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The grammar's kind name, including anonymous tokens such as `"{"`.
    pub fn raw_kind(&self) -> &'static str {
        self.raw_kind
    }

    /// The field name this node occupies in its parent, if any.
    pub fn field(&self) -> Option<&'static str> {
        self.field
    }

    pub fn is_named(&self) -> bool {
        self.named
    }

    pub fn is_missing(&self) -> bool {
        self.missing
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn start_byte(&self) -> usize {
        self.range.start
    }

    pub fn end_byte(&self) -> usize {
        self.range.end
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Span of this node inside `file`.
    pub fn span(&self, file: &Path) -> Span {
        Span::new(
            file.to_path_buf(),
            self.start.row,
            self.start.column,
            self.end.row,
            self.end.column,
        )
    }

    /// The node's source text.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.range.clone()).unwrap_or("")
    }

    pub fn children(&self) -> &[SyntaxNode] {
        &self.children
    }

    /// Named children, skipping punctuation and keywords.
    pub fn named_children(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter(|c| c.named)
    }

    /// Named children that are not comments.
    pub fn significant_children(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.named_children().filter(|c| c.kind != NodeKind::Comment)
    }

    pub fn child_by_field(&self, field: &str) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.field == Some(field))
    }

    pub fn children_by_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a SyntaxNode> + 'a {
        self.children.iter().filter(move |c| c.field == Some(field))
    }

    pub fn child_of_kind(&self, kind: NodeKind) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    pub fn children_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    /// True if an anonymous token with this text is a direct child (`"?"`, `"default"`).
    pub fn has_token(&self, token: &str) -> bool {
        self.children.iter().any(|c| !c.named && c.raw_kind == token)
    }

    /// Depth-first, pre-order iterator over all strict descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// First descendant (pre-order) matching the predicate.
    pub fn find_first<P>(&self, predicate: P) -> Option<&SyntaxNode>
    where
        P: Fn(&SyntaxNode) -> bool,
    {
        self.descendants().find(|n| predicate(*n))
    }

    /// All descendants (pre-order) matching the predicate.
    pub fn find_all<P>(&self, predicate: P) -> Vec<&SyntaxNode>
    where
        P: Fn(&SyntaxNode) -> bool,
    {
        self.descendants().filter(|n| predicate(*n)).collect()
    }

    /// First node in the subtree (self included) that is an error or missing token.
    pub fn first_error(&self) -> Option<&SyntaxNode> {
        if self.kind == NodeKind::Error || self.missing {
            return Some(self);
        }
        self.descendants()
            .find(|n| n.kind == NodeKind::Error || n.missing)
    }

    /// The node with exactly this kind and byte range, self included.
    pub fn find_exact(&self, kind: NodeKind, range: &Range<usize>) -> Option<&SyntaxNode> {
        if self.kind == kind && &self.range == range {
            return Some(self);
        }
        if self.range.start > range.start || self.range.end < range.end {
            return None;
        }
        self.children.iter().find_map(|c| c.find_exact(kind, range))
    }
}

/// Iterator returned by [`SyntaxNode::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Text of a string literal node without its quotes.
pub fn string_value(node: &SyntaxNode, source: &str) -> String {
    let text = node.text(source);
    let trimmed = text
        .strip_prefix(['\'', '"', '`'])
        .and_then(|t| t.strip_suffix(['\'', '"', '`']))
        .unwrap_or(text);
    trimmed.to_string()
}

/// Collapses all runs of whitespace into single spaces.
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
