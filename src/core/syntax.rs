//! Filepath: src/core/syntax.rs
//! Lowered syntax tree for the structural language family.
//!
//! Parser front ends lower their concrete trees into this small
//! tagged union that keeps only call expressions and function-like
//! constructs. Every other node is transparent: its relevant
//! descendants are hoisted into the nearest kept ancestor, so the
//! pre-order of this tree is the pre-order of the concrete tree
//! restricted to the kept nodes.
//!
//! Traversal goes through [`Visitor`]; there is no reflective
//! "walk every field" access.

/// 1-based lines, 0-based byte columns; end is exclusive on the column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRange
{
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl SourceRange
{
    /// True when `line` lies between the start and end lines
    pub fn contains_line(
        &self,
        line: usize,
    ) -> bool
    {
        self.start_line <= line && line <= self.end_line
    }
}

/// What a call expression invokes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callee
{
    /// `name(...)`
    Identifier(String),

    /// `obj.name(...)`
    Member
    {
        property: String,
    },

    /// `obj[expr](...)`; the property is not statically known
    Computed,

    /// Anything else, e.g. `(a || b)(...)` or `f()()`
    Expression,
}

impl Callee
{
    /// Identifier a target name is compared against, if any
    pub fn name(&self) -> Option<&str>
    {
        match self
        {
            Callee::Identifier(name) => Some(name),
            Callee::Member { property } => Some(property),
            Callee::Computed | Callee::Expression => None,
        }
    }
}

/// Syntactic form of a function-like node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionForm
{
    Declaration,
    Expression,
    Arrow,
    Method,
}

/// Closed set of node kinds the analyzer cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind
{
    /// Root of a file
    Program,

    /// Call expression
    Call
    {
        callee: Callee,
    },

    /// Function declaration/expression, arrow function or method
    Function
    {
        form: FunctionForm,
        name: Option<String>,
    },
}

/// One kept node with its range and kept children in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode
{
    kind: NodeKind,
    range: SourceRange,
    children: Vec<SyntaxNode>,
}

impl SyntaxNode
{
    pub fn new(
        kind: NodeKind,
        range: SourceRange,
        children: Vec<SyntaxNode>,
    ) -> Self
    {
        Self { kind, range, children }
    }

    pub fn kind(&self) -> &NodeKind
    {
        &self.kind
    }

    pub fn range(&self) -> SourceRange
    {
        self.range
    }
}

/// Receives every node of a tree in pre-order
pub trait Visitor
{
    fn visit(
        &mut self,
        node: &SyntaxNode,
    );
}

/// A lowered file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree
{
    root: SyntaxNode,
}

impl SyntaxTree
{
    pub fn new(root: SyntaxNode) -> Self
    {
        Self { root }
    }

    /// Depth-first pre-order walk (outer before inner, then siblings
    /// left to right). Uses an explicit stack so deeply nested
    /// callbacks cannot overflow the call stack.
    pub fn walk<V: Visitor>(
        &self,
        visitor: &mut V,
    )
    {
        let mut stack: Vec<&SyntaxNode> = vec![&self.root];

        while let Some(node) = stack.pop()
        {
            visitor.visit(node);

            // Push in reverse so the leftmost child is visited first
            stack.extend(
                node.children
                    .iter()
                    .rev(),
            );
        }
    }
}
