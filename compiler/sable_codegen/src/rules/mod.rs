//! The transpiler rule set.
//!
//! One dispatch rule per syntactic form, each a thin consumer of the
//! rewrite algorithms in [`crate::visit`]. Statement rules emit lines
//! into the accumulator and return an empty fragment list ("changed, no
//! expression"); expression rules return exactly one fragment.
//!
//! The kind-any fallback makes the rule set total: node kinds without a
//! dedicated rule (command arguments, mostly) are traversed generically
//! and reported unchanged unless something beneath them was rewritten.

mod expressions;
mod statements;

use std::rc::Rc;

use rustc_hash::FxHashSet;
use sable_dispatch::Rule;
use sable_ir::{NodeKind, NodeRef, Value};

use crate::accumulator::Accumulator;
use crate::collector::{GenericCollector, RootCommandCollector};
use crate::visit::visit_generic;
use crate::{CodegenVisitor, CompileResult};

/// Register the full rule set.
pub(crate) fn register(visitor: &mut CodegenVisitor, converters: Rc<FxHashSet<String>>) {
    visitor.add_rule(Rule::new(fallback));
    visitor.add_rule(Rule::for_kind(NodeKind::Root, root));
    statements::register(visitor);
    expressions::register(visitor, converters);
}

fn fallback(visitor: &CodegenVisitor, node: &NodeRef, acc: &mut Accumulator) -> CompileResult {
    Ok(visit_generic::<GenericCollector>(visitor, node, acc)?.map(|fragment| vec![fragment]))
}

fn root(visitor: &CodegenVisitor, node: &NodeRef, acc: &mut Accumulator) -> CompileResult {
    Ok(visit_generic::<RootCommandCollector>(visitor, node, acc)?.map(|fragment| vec![fragment]))
}

/// A child field the producer contract guarantees.
///
/// # Panics
///
/// Panics on a malformed tree; upstream validation owns that invariant.
fn expect_child<'a>(node: &'a NodeRef, name: &str) -> &'a NodeRef {
    match node.child(name) {
        Some(child) => child,
        None => panic!("{:?} node missing `{name}` child", node.kind()),
    }
}

/// A leaf field the producer contract guarantees.
fn expect_leaf<'a>(node: &'a NodeRef, name: &str) -> &'a Value {
    match node.leaf(name) {
        Some(value) => value,
        None => panic!("{:?} node missing `{name}` leaf", node.kind()),
    }
}

/// A string leaf field the producer contract guarantees.
fn expect_str<'a>(node: &'a NodeRef, name: &str) -> &'a str {
    match expect_leaf(node, name).as_str() {
        Some(text) => text,
        None => panic!("{:?} node `{name}` leaf is not a string", node.kind()),
    }
}
