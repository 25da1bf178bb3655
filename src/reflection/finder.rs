//! Search for a named function call within a statement list.

use crate::syntax::{Element, Node, NodeKind};

/// Finds calls to a named function inside a body.
///
/// Nested function scopes (closures, inner functions, methods of anonymous
/// classes) are not searched: a call there belongs to the inner scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionCallFinder;

impl FunctionCallFinder {
    pub fn new() -> Self {
        Self
    }

    /// Return the first call to `target` in `stmts`, depth-first.
    ///
    /// Function names are case-insensitive.
    pub fn find_call<'a>(&self, target: &str, stmts: &'a [Element]) -> Option<&'a Node> {
        for element in stmts {
            let found = match element {
                Element::Seq(items) => self.find_call(target, items),
                Element::Node(node) => self.find_in_node(target, node),
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    fn find_in_node<'a>(&self, target: &str, node: &'a Node) -> Option<&'a Node> {
        match &node.kind {
            NodeKind::Call { name: Some(name) } if name.eq_ignore_ascii_case(target) => {
                return Some(node);
            }
            NodeKind::ClassLike => return None,
            _ if node.is_function_like() => return None,
            _ => {}
        }

        node.child_sequences()
            .find_map(|seq| self.find_call(target, seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, line: usize) -> Element {
        Node::new(
            NodeKind::Call {
                name: Some(name.to_string()),
            },
            line,
        )
        .into()
    }

    fn other(kind: &str, line: usize, children: Vec<Element>) -> Element {
        Node::new(NodeKind::Other(kind.to_string()), line)
            .with_children(children)
            .into()
    }

    #[test]
    fn test_finds_direct_call() {
        let stmts = vec![other("expression_statement", 2, vec![call("func_get_args", 2)])];
        let found = FunctionCallFinder::new().find_call("func_get_args", &stmts);
        assert_eq!(found.map(|n| n.line), Some(2));
    }

    #[test]
    fn test_finds_call_nested_in_conditional_block() {
        let stmts = vec![other(
            "if_statement",
            3,
            vec![Element::Seq(vec![other(
                "expression_statement",
                4,
                vec![call("FUNC_GET_ARGS", 4)],
            )])],
        )];
        assert!(FunctionCallFinder::new()
            .find_call("func_get_args", &stmts)
            .is_some());
    }

    #[test]
    fn test_finds_call_in_arguments() {
        let outer = Node::new(
            NodeKind::Call {
                name: Some("count".to_string()),
            },
            5,
        )
        .with_children(vec![other("arguments", 5, vec![call("func_get_args", 5)])]);
        let stmts = vec![Element::Node(outer)];
        let found = FunctionCallFinder::new().find_call("func_get_args", &stmts);
        assert!(matches!(found.map(|n| &n.kind), Some(NodeKind::Call { name: Some(n) }) if n == "func_get_args"));
    }

    #[test]
    fn test_skips_closures_and_inner_functions() {
        let closure = Node::new(NodeKind::Closure, 2).with_stmts(vec![call("func_get_args", 3)]);
        let inner = Node::new(
            NodeKind::Function {
                name: "inner".to_string(),
            },
            5,
        )
        .with_stmts(vec![call("func_get_args", 6)]);
        let stmts = vec![Element::Node(closure), Element::Node(inner)];
        assert!(FunctionCallFinder::new()
            .find_call("func_get_args", &stmts)
            .is_none());
    }

    #[test]
    fn test_no_match() {
        let stmts = vec![call("strlen", 1), Element::Seq(vec![])];
        assert!(FunctionCallFinder::new()
            .find_call("func_get_args", &stmts)
            .is_none());
    }
}
