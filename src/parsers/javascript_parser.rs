//! Filepath: src/parsers/javascript_parser.rs
//! ------------------------------------------------------------------
//! JavaScript / TypeScript front end built on Tree-sitter 0.25.x.
//! Goals:
//!   - Pick the grammar by extension (JS+JSX, TS, TSX).
//!   - Reject trees containing ERROR or MISSING nodes.
//!   - Lower the concrete tree into the closed `SyntaxTree` union,
//!     keeping only call expressions and function-like nodes.
//!
//! Notes:
//!   - A fresh `tree_sitter::Parser` is created per parse; parsers
//!     are not `Sync` and parsing dominates the cost anyway.
//!   - Tagged templates (tag`...`) are call_expression nodes in the
//!     grammar but not calls; they are lowered as transparent.
//!   - `new Foo()` is a new_expression and never a call.
//! ------------------------------------------------------------------

use std::path::Path;

use tree_sitter::{Language, Node, Parser, TreeCursor};

use crate::core::error::ParseFailure;
use crate::core::source::{ParsedSource, SourceParser};
use crate::core::syntax::{Callee, FunctionForm, NodeKind, SourceRange, SyntaxNode, SyntaxTree};
use crate::core::language::LanguageFamily;

/// Grammar variant within the structural family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Plain JavaScript (the grammar includes JSX)
    JavaScript,
    /// TypeScript without JSX
    TypeScript,
    /// TypeScript with JSX
    Tsx,
}

impl Dialect {
    /// Choose the dialect from a file extension; unknown → JavaScript.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "ts" | "mts" | "cts" => Dialect::TypeScript,
            "tsx" => Dialect::Tsx,
            _ => Dialect::JavaScript,
        }
    }

    /// Tree-sitter language handle for this dialect.
    fn language(self) -> Language {
        match self {
            Dialect::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Parses JavaScript-family sources into lowered syntax trees.
#[derive(Debug, Default, Clone, Copy)]
pub struct JavaScriptParser;

impl JavaScriptParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse `source` with the grammar for `dialect` and lower it.
    pub fn parse_tree(&self, source: &str, dialect: Dialect) -> Result<SyntaxTree, ParseFailure> {
        // Create a parser instance and set the language.
        let mut parser = Parser::new();
        parser
            .set_language(&dialect.language())
            .map_err(|e| ParseFailure::Grammar(e.to_string()))?;

        // Parse the source; no tree means the parser gave up.
        let tree = parser.parse(source, None).ok_or(ParseFailure::NoTree)?;
        let root = tree.root_node();

        // Any error recovery makes the file unusable.
        if root.has_error() {
            let (line, column) = first_error_position(root);
            return Err(ParseFailure::Syntax { line, column });
        }

        // Use the same bytes slice for all utf8_text calls.
        let bytes = source.as_bytes();

        // Lower children of the program node in source order.
        let mut children = Vec::new();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            lower(child, bytes, &mut children);
        }

        Ok(SyntaxTree::new(SyntaxNode::new(
            NodeKind::Program,
            range_of(root),
            children,
        )))
    }
}

impl SourceParser for JavaScriptParser {
    fn family(&self) -> LanguageFamily {
        LanguageFamily::Structural
    }

    fn parse(&self, path: &Path, text: &str) -> Result<ParsedSource, ParseFailure> {
        let tree = self.parse_tree(text, Dialect::from_path(path))?;
        Ok(ParsedSource::Structural(tree))
    }
}

/// Lower `node` into `out`. Kept nodes become new entries with their
/// own lowered children; transparent nodes hoist their descendants.
fn lower(node: Node, bytes: &[u8], out: &mut Vec<SyntaxNode>) {
    let kind = classify(node, bytes);

    // Lower named children either into this node or into `out`.
    let mut children = Vec::new();
    {
        let target = if kind.is_some() { &mut children } else { &mut *out };
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            lower(child, bytes, target);
        }
    }

    if let Some(kind) = kind {
        out.push(SyntaxNode::new(kind, range_of(node), children));
    }
}

/// Map a concrete node to a kept kind, or None when transparent.
fn classify(node: Node, bytes: &[u8]) -> Option<NodeKind> {
    match node.kind() {
        "call_expression" => {
            // Tagged templates carry a template_string as arguments.
            let args = node.child_by_field_name("arguments");
            if args.is_some_and(|a| a.kind() == "template_string") {
                return None;
            }
            let callee = node
                .child_by_field_name("function")
                .map(|f| callee_of(f, bytes))
                .unwrap_or(Callee::Expression);
            Some(NodeKind::Call { callee })
        }
        "function_declaration" | "generator_function_declaration" => Some(NodeKind::Function {
            form: FunctionForm::Declaration,
            name: field_text(node, "name", bytes),
        }),
        // Older grammars name function expressions plain `function`.
        "function_expression" | "function" | "generator_function" => Some(NodeKind::Function {
            form: FunctionForm::Expression,
            name: field_text(node, "name", bytes),
        }),
        "arrow_function" => Some(NodeKind::Function {
            form: FunctionForm::Arrow,
            name: None,
        }),
        "method_definition" => {
            // Only plain and private identifiers name a method; string,
            // numeric and computed keys are anonymous.
            let name = node
                .child_by_field_name("name")
                .filter(|k| matches!(k.kind(), "property_identifier" | "private_property_identifier"))
                .and_then(|k| k.utf8_text(bytes).ok())
                .map(str::to_string);
            Some(NodeKind::Function {
                form: FunctionForm::Method,
                name,
            })
        }
        _ => None,
    }
}

/// Resolve the callee of a call expression.
fn callee_of(function: Node, bytes: &[u8]) -> Callee {
    match function.kind() {
        "identifier" => function
            .utf8_text(bytes)
            .map(|s| Callee::Identifier(s.to_string()))
            .unwrap_or(Callee::Expression),
        "member_expression" => function
            .child_by_field_name("property")
            .filter(|p| matches!(p.kind(), "property_identifier" | "private_property_identifier"))
            .and_then(|p| p.utf8_text(bytes).ok())
            .map(|s| Callee::Member {
                property: s.to_string(),
            })
            .unwrap_or(Callee::Expression),
        "subscript_expression" => Callee::Computed,
        _ => Callee::Expression,
    }
}

/// Text of a named field, if present and valid UTF-8.
fn field_text(node: Node, field: &str, bytes: &[u8]) -> Option<String> {
    node.child_by_field_name(field)
        .and_then(|n| n.utf8_text(bytes).ok())
        .map(str::to_string)
}

/// Convert tree-sitter points (0-based rows) into a 1-based range.
fn range_of(node: Node) -> SourceRange {
    let start = node.start_position();
    let end = node.end_position();
    SourceRange {
        start_line: start.row + 1,
        start_column: start.column,
        end_line: end.row + 1,
        end_column: end.column,
    }
}

/// Position (1-based line, 0-based column) of the first ERROR or
/// MISSING node in document order.
fn first_error_position(root: Node) -> (usize, usize) {
    let mut cursor = root.walk();
    find_error(&mut cursor)
        .map(|n| (n.start_position().row + 1, n.start_position().column))
        .unwrap_or((1, 0))
}

fn find_error<'t>(cursor: &mut TreeCursor<'t>) -> Option<Node<'t>> {
    loop {
        let node = cursor.node();

        if node.is_error() || node.is_missing() {
            return Some(node);
        }

        // Only descend into subtrees that contain an error.
        if node.has_error() && cursor.goto_first_child() {
            if let Some(found) = find_error(cursor) {
                return Some(found);
            }
            cursor.goto_parent();
        }

        if !cursor.goto_next_sibling() {
            return None;
        }
    }
}
