//! Lowering from the tree-sitter CST to [`SyntaxTree`].

use super::tree::{Element, Node, NodeKind, SyntaxTree};
use super::ParsedFile;

pub(super) fn lower_file(parsed: &ParsedFile) -> SyntaxTree {
    let root = parsed.tree.root_node();
    let node = Node::new(NodeKind::File, 1).with_children(lower_children(parsed, root, None));
    SyntaxTree {
        path: parsed.path.clone(),
        root: node,
    }
}

/// Lower the named children of `node`, leaving out `skip` and comments.
fn lower_children(
    parsed: &ParsedFile,
    node: tree_sitter::Node,
    skip: Option<tree_sitter::Node>,
) -> Vec<Element> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .filter(|child| skip.map_or(true, |s| s.id() != child.id()))
        .map(|child| lower(parsed, child))
        .collect()
}

fn lower(parsed: &ParsedFile, node: tree_sitter::Node) -> Element {
    let line = node.start_position().row + 1;
    let name = || parsed.field_text(node, "name").map(str::to_string);

    match node.kind() {
        "compound_statement" | "declaration_list" | "enum_declaration_list" => {
            Element::Seq(lower_children(parsed, node, None))
        }
        "namespace_definition" => with_body(parsed, node, NodeKind::Namespace, line),
        "class_declaration" | "interface_declaration" | "trait_declaration"
        | "enum_declaration" => Node::new(NodeKind::ClassLike, line)
            .with_children(lower_children(parsed, node, None))
            .into(),
        "method_declaration" => with_body(
            parsed,
            node,
            NodeKind::Method {
                name: name().unwrap_or_default(),
            },
            line,
        ),
        "function_definition" => with_body(
            parsed,
            node,
            NodeKind::Function {
                name: name().unwrap_or_default(),
            },
            line,
        ),
        "anonymous_function" | "anonymous_function_creation_expression" | "arrow_function" => {
            with_body(parsed, node, NodeKind::Closure, line)
        }
        "function_call_expression" => {
            let callee = node
                .child_by_field_name("function")
                .filter(|f| matches!(f.kind(), "name" | "qualified_name"))
                .map(|f| parsed.node_text(f).trim_start_matches('\\').to_string());
            Node::new(NodeKind::Call { name: callee }, line)
                .with_children(lower_children(parsed, node, None))
                .into()
        }
        other => Node::new(NodeKind::Other(other.to_string()), line)
            .with_children(lower_children(parsed, node, None))
            .into(),
    }
}

/// Lower a node whose `body` field becomes its statement list.
///
/// A missing body (abstract method, `namespace Foo;`) leaves `stmts` unset.
fn with_body(parsed: &ParsedFile, node: tree_sitter::Node, kind: NodeKind, line: usize) -> Element {
    let body = node.child_by_field_name("body");
    let mut lowered = Node::new(kind, line).with_children(lower_children(parsed, node, body));

    if let Some(body) = body {
        let stmts = match lower(parsed, body) {
            Element::Seq(items) => items,
            // arrow function bodies are a single expression
            single => vec![single],
        };
        lowered = lowered.with_stmts(stmts);
    }

    lowered.into()
}
