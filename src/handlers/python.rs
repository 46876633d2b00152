//! Python: module-level classes and functions, call sites by name

use super::syntax::{has_ancestor, CallSite, Preorder, Symbol};
use crate::entry::EntryKind;
use tree_sitter::{Node, Tree};

/// Definitions inside these are members of something else, not the module
const NESTING_SCOPES: &[&str] = &["function_definition", "class_definition", "lambda"];

pub(super) fn definitions<'t>(tree: &'t Tree, kind: EntryKind) -> impl Iterator<Item = Symbol<'t>> + 't {
    let wanted = match kind {
        EntryKind::Class => "class_definition",
        _ => "function_definition",
    };

    Preorder::new(tree)
        .filter(move |node| node.kind() == wanted && !has_ancestor(node, NESTING_SCOPES))
        .filter_map(|node| {
            Some(Symbol {
                node: with_decorators(node),
                name: node.child_by_field_name("name")?,
            })
        })
}

fn with_decorators(node: Node<'_>) -> Node<'_> {
    match node.parent() {
        Some(parent) if parent.kind() == "decorated_definition" => parent,
        _ => node,
    }
}

pub(super) fn call_sites(tree: &Tree) -> impl Iterator<Item = CallSite<'_>> {
    Preorder::new(tree)
        .filter(|node| node.kind() == "call")
        .filter_map(|call| {
            let callee = call.child_by_field_name("function")?;
            let target = match callee.kind() {
                "identifier" => callee,
                "attribute" => callee
                    .child_by_field_name("object")
                    .filter(|object| object.kind() == "identifier")?,
                _ => return None,
            };
            Some(CallSite { call, callee, target })
        })
}
