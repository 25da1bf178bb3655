//! Owned syntax tree produced by lowering a tree-sitter parse.
//!
//! Children are a mix of single nodes and statement sequences. Traversals
//! must handle both shapes: use [`Node::child_sequences`] to iterate every
//! element reachable from a node.

use std::path::PathBuf;

/// A tree element: one node, or an ordered sequence of elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Node(Node),
    Seq(Vec<Element>),
}

/// Node kinds the analysis cares about. Everything else is `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Namespace,
    /// Class, interface, trait or enum declaration.
    ClassLike,
    /// Class method. `stmts` on the node is `None` for abstract and interface methods.
    Method { name: String },
    Function { name: String },
    /// Closures and arrow functions.
    Closure,
    /// Call of a named function. Dynamic calls (`$f()`) have no name.
    Call { name: Option<String> },
    /// Any other grammar node, tagged with its tree-sitter kind.
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    /// 1-indexed start line.
    pub line: usize,
    pub children: Vec<Element>,
    /// Body statements for function-like nodes and braced blocks.
    pub stmts: Option<Vec<Element>>,
}

impl Node {
    pub fn new(kind: NodeKind, line: usize) -> Self {
        Self {
            kind,
            line,
            children: Vec::new(),
            stmts: None,
        }
    }

    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }

    pub fn with_stmts(mut self, stmts: Vec<Element>) -> Self {
        self.stmts = Some(stmts);
        self
    }

    /// Every element list owned by this node: children first, then body.
    pub fn child_sequences(&self) -> impl Iterator<Item = &[Element]> {
        std::iter::once(self.children.as_slice()).chain(self.stmts.as_deref())
    }

    /// Whether this node opens a new function scope.
    pub fn is_function_like(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Method { .. } | NodeKind::Function { .. } | NodeKind::Closure
        )
    }
}

impl From<Node> for Element {
    fn from(node: Node) -> Self {
        Element::Node(node)
    }
}

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub path: PathBuf,
    pub root: Node,
}

impl SyntaxTree {
    /// Top-level elements of the file.
    pub fn nodes(&self) -> &[Element] {
        &self.root.children
    }
}
