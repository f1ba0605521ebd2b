//! Generic rewrite algorithms.
//!
//! These drive the recursive part of code generation on top of the
//! dispatch engine: a rule "suspends into" a child by calling one of
//! these, which re-enters [`Visitor::invoke`] and interprets the child's
//! result. The splicing algorithm in [`visit_multiple`] decides, child by
//! child, how static runs and rewritten children of a list-valued field
//! merge back together.

use sable_ir::{FieldValue, NodeRef};

use crate::accumulator::Accumulator;
use crate::collector::{ChildrenCollector, CommandCollector};
use crate::error::CodegenError;
use crate::{CodegenVisitor, Fragments};

/// Compile one child node, expecting at most one fragment.
///
/// `Ok(None)` means the child is unchanged and the caller must reuse the
/// original node. More than one fragment for a single-child position is a
/// compiler defect surfaced as [`CodegenError::FragmentArity`].
pub fn visit_single(
    visitor: &CodegenVisitor,
    node: &NodeRef,
    acc: &mut Accumulator,
) -> Result<Option<String>, CodegenError> {
    match visitor.invoke(node, acc)? {
        None => Ok(None),
        Some(mut fragments) => {
            if fragments.len() != 1 {
                return Err(CodegenError::FragmentArity {
                    kind: node.kind(),
                    got: fragments.len(),
                });
            }
            Ok(fragments.pop())
        }
    }
}

/// Compile one child node in a position that cannot be elided.
pub fn visit_required(
    visitor: &CodegenVisitor,
    node: &NodeRef,
    acc: &mut Accumulator,
) -> Result<String, CodegenError> {
    visit_single(visitor, node, acc)?.ok_or(CodegenError::MissingResult { kind: node.kind() })
}

/// Run the splicing algorithm over an ordered child sequence.
///
/// Children are compiled left to right. While every child is unchanged no
/// collector exists; the first rewritten child creates one anchored at
/// the buffer position where the field began. For each rewritten child,
/// the statements it just emitted are temporarily detached so the static
/// run before it can be registered first, keeping side effects in source
/// order while collapsing unchanged runs into bulk operations. Returns
/// `Ok(None)` when no child changed: the caller reuses the original list
/// by reference, zero-copy.
pub fn visit_multiple<C: ChildrenCollector>(
    visitor: &CodegenVisitor,
    children: &[NodeRef],
    acc: &mut Accumulator,
) -> Result<Option<String>, CodegenError> {
    let mut consumed = 0;
    let mut collector: Option<C> = None;
    let mut index = acc.lines_len();

    for (i, child) in children.iter().enumerate() {
        let Some(fragments) = visitor.invoke(child, acc)? else {
            continue;
        };
        let collector = collector.get_or_insert_with(|| C::new(index));

        let emitted = acc.split_off_lines(index);
        collector.add_static(acc, &children[consumed..i]);
        acc.append_lines(emitted);
        collector.add_dynamic(acc, &fragments);

        consumed = i + 1;
        index = acc.lines_len();
    }

    match collector {
        Some(mut collector) => {
            collector.add_static(acc, &children[consumed..]);
            Ok(Some(collector.flush(acc)))
        }
        None => Ok(None),
    }
}

/// Recursively compile every field of `node`.
///
/// Child-sequence fields go through [`visit_multiple`], single-child
/// fields through [`visit_single`] (absence allowed). When nothing
/// changed the node is reported unchanged, preserving full structural
/// sharing; otherwise the result is a `replace` expression overriding
/// exactly the changed fields.
pub fn visit_generic<C: ChildrenCollector>(
    visitor: &CodegenVisitor,
    node: &NodeRef,
    acc: &mut Accumulator,
) -> Result<Option<String>, CodegenError> {
    let mut replaced: Vec<(&str, String)> = Vec::new();

    for field in node.fields() {
        let result = match &field.value {
            FieldValue::Leaf(_) => None,
            FieldValue::Node(child) => visit_single(visitor, child, acc)?,
            FieldValue::Children(children) => visit_multiple::<C>(visitor, children, acc)?,
        };
        if let Some(fragment) = result {
            replaced.push((field.name, fragment));
        }
    }

    if replaced.is_empty() {
        return Ok(None);
    }
    let reference = acc.make_ref(node);
    Ok(Some(acc.replace(&reference, &replaced)))
}

/// Emit a node's command sequence into the ambient runtime buffer.
///
/// A fully static body collapses into one bulk `extend` of the original
/// sequence by reference, with no per-command work.
pub fn visit_body(
    visitor: &CodegenVisitor,
    node: &NodeRef,
    acc: &mut Accumulator,
) -> Result<(), CodegenError> {
    let commands = node.children("commands").unwrap_or(&[]);
    if visit_multiple::<CommandCollector>(visitor, commands, acc)?.is_none() {
        let reference = acc.make_ref(node);
        acc.statement(format!("_sable_runtime.commands.extend({reference}.commands)"));
    }
    Ok(())
}

/// Wrap a fragment list as the result of a rule that produced one
/// expression.
pub(crate) fn one(fragment: String) -> Fragments {
    Some(vec![fragment])
}
