//! C and C++: class/struct definitions and free function definitions

use super::syntax::{has_ancestor, Preorder, Symbol};
use crate::entry::EntryKind;
use tree_sitter::{Node, Tree};

const CLASS_KINDS: &[&str] = &["class_specifier", "struct_specifier"];

pub(super) fn definitions<'t>(tree: &'t Tree, kind: EntryKind) -> impl Iterator<Item = Symbol<'t>> + 't {
    Preorder::new(tree).filter_map(move |node| match kind {
        EntryKind::Class => class_symbol(node),
        _ => function_symbol(node),
    })
}

fn class_symbol(node: Node<'_>) -> Option<Symbol<'_>> {
    if !CLASS_KINDS.contains(&node.kind()) {
        return None;
    }
    // `struct stat st;` names a type without defining it
    node.child_by_field_name("body")?;
    if has_ancestor(&node, &["function_definition"]) {
        return None;
    }
    Some(Symbol {
        node,
        name: node.child_by_field_name("name")?,
    })
}

fn function_symbol(node: Node<'_>) -> Option<Symbol<'_>> {
    if node.kind() != "function_definition" {
        return None;
    }
    // Inline member functions are methods, not free functions
    if has_ancestor(&node, &["field_declaration_list"]) {
        return None;
    }
    let declarator = function_declarator(node.child_by_field_name("declarator")?)?;
    Some(Symbol {
        node,
        name: unqualified_name(declarator.child_by_field_name("declarator")?)?,
    })
}

/// Unwrap pointer/reference/parenthesized declarators down to the function
/// declarator, e.g. for `int *make()` or `Foo &get()`
fn function_declarator(mut node: Node<'_>) -> Option<Node<'_>> {
    loop {
        match node.kind() {
            "function_declarator" => return Some(node),
            "pointer_declarator" | "reference_declarator" | "parenthesized_declarator" => {
                node = match node.child_by_field_name("declarator") {
                    Some(inner) => inner,
                    None => {
                        let mut cursor = node.walk();
                        let inner = node.named_children(&mut cursor).last()?;
                        inner
                    }
                };
            }
            _ => return None,
        }
    }
}

/// `ns::Outer::run` -> `run`; operators and destructors yield nothing
fn unqualified_name(mut node: Node<'_>) -> Option<Node<'_>> {
    loop {
        match node.kind() {
            "identifier" => return Some(node),
            "qualified_identifier" => node = node.child_by_field_name("name")?,
            _ => return None,
        }
    }
}
