//! Shared tree-sitter helpers used by every language variant

use tree_sitter::{Node, Tree, TreeCursor};

/// A named declaration found in a syntax tree
#[derive(Debug, Clone, Copy)]
pub struct Symbol<'t> {
    /// Node whose text is the declaration's source
    pub node: Node<'t>,
    /// Identifier node holding the declared name
    pub name: Node<'t>,
}

/// A syntactic call whose callee names, or is a method on, an identifier
#[derive(Debug, Clone, Copy)]
pub struct CallSite<'t> {
    pub call: Node<'t>,
    /// The whole callee expression, e.g. `foo` or `foo.bar`
    pub callee: Node<'t>,
    /// Identifier compared against the searched symbol: the callee itself
    /// for direct calls, the receiver for method calls
    pub target: Node<'t>,
}

/// Lazy pre-order traversal over every node of a tree
pub struct Preorder<'t> {
    cursor: TreeCursor<'t>,
    done: bool,
}

impl<'t> Preorder<'t> {
    pub fn new(tree: &'t Tree) -> Self {
        Self {
            cursor: tree.walk(),
            done: false,
        }
    }
}

impl<'t> Iterator for Preorder<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let node = self.cursor.node();
        if self.cursor.goto_first_child() {
            return Some(node);
        }
        loop {
            if self.cursor.goto_next_sibling() {
                return Some(node);
            }
            if !self.cursor.goto_parent() {
                self.done = true;
                return Some(node);
            }
        }
    }
}

/// True if any ancestor of `node` has one of the given kinds
pub fn has_ancestor(node: &Node, kinds: &[&str]) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if kinds.contains(&parent.kind()) {
            return true;
        }
        current = parent.parent();
    }
    false
}

/// Text of a node, empty if it does not fall on UTF-8 boundaries
pub fn text<'s>(node: &Node, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// 1-based line and 0-based column of a node's start
pub fn position(node: &Node) -> (u32, u32) {
    let point = node.start_position();
    (point.row as u32 + 1, point.column as u32)
}

/// First node that is an error or a missing token, if any
pub fn first_error(tree: &Tree) -> Option<Node<'_>> {
    if !tree.root_node().has_error() {
        return None;
    }
    Preorder::new(tree).find(|n| n.is_error() || n.is_missing())
}
