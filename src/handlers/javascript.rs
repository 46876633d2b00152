//! JavaScript and TypeScript: top-level classes, function declarations and
//! functions bound to variables

use super::syntax::{has_ancestor, CallSite, Preorder, Symbol};
use crate::entry::EntryKind;
use tree_sitter::{Node, Tree};

const NESTING_SCOPES: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "function_expression",
    "function",
    "generator_function",
    "arrow_function",
    "method_definition",
    "class_body",
];

const CLASS_KINDS: &[&str] = &["class_declaration", "abstract_class_declaration"];

const FUNCTION_KINDS: &[&str] = &["function_declaration", "generator_function_declaration"];

/// Values that make a variable declarator a function definition
const FUNCTION_VALUES: &[&str] = &["arrow_function", "function_expression", "function", "generator_function"];

pub(super) fn definitions<'t>(tree: &'t Tree, kind: EntryKind) -> impl Iterator<Item = Symbol<'t>> + 't {
    Preorder::new(tree)
        .filter_map(move |node| match kind {
            EntryKind::Class => class_symbol(node),
            _ => function_symbol(node),
        })
        .filter(|symbol| !has_ancestor(&symbol.node, NESTING_SCOPES))
}

fn class_symbol(node: Node<'_>) -> Option<Symbol<'_>> {
    if !CLASS_KINDS.contains(&node.kind()) {
        return None;
    }
    Some(Symbol {
        node,
        name: node.child_by_field_name("name")?,
    })
}

fn function_symbol(node: Node<'_>) -> Option<Symbol<'_>> {
    if FUNCTION_KINDS.contains(&node.kind()) {
        return Some(Symbol {
            node,
            name: node.child_by_field_name("name")?,
        });
    }

    if node.kind() != "variable_declarator" {
        return None;
    }
    let value = node.child_by_field_name("value")?;
    let name = node.child_by_field_name("name")?;
    if !FUNCTION_VALUES.contains(&value.kind()) || name.kind() != "identifier" {
        return None;
    }
    // The whole `const f = () => ...` statement is the source
    Some(Symbol {
        node: node.parent().unwrap_or(node),
        name,
    })
}

pub(super) fn call_sites(tree: &Tree) -> impl Iterator<Item = CallSite<'_>> {
    Preorder::new(tree)
        .filter(|node| node.kind() == "call_expression")
        .filter_map(|call| {
            let callee = call.child_by_field_name("function")?;
            let target = match callee.kind() {
                "identifier" => callee,
                "member_expression" => callee
                    .child_by_field_name("object")
                    .filter(|object| object.kind() == "identifier")?,
                _ => return None,
            };
            Some(CallSite { call, callee, target })
        })
}
