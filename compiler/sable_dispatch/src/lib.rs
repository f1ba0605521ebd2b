//! Rule-Based Tree Dispatch
//!
//! This crate provides the generic dispatch engine the Sable pipeline
//! stages are built on. A [`Visitor`] holds an ordered collection of
//! [`Rule`]s; invoking a node runs the single best-matching rule, and that
//! rule's handler may recurse by invoking child nodes back through the
//! same visitor.
//!
//! # Rule resolution
//!
//! Among the rules whose filters all match a node:
//! 1. a rule naming the node's kind beats a kind-any rule;
//! 2. more field constraints beat fewer;
//! 3. ties go to the most recently registered rule, so rule sets merged
//!    with [`Visitor::extend`] override earlier ones at equal specificity.
//!
//! Rules are kept sorted by this order at registration time; lookup is a
//! scan for the first match.
//!
//! # Recursion
//!
//! Handlers receive the visitor itself and recurse with ordinary calls to
//! [`Visitor::invoke`]. Nesting is strictly LIFO; there is no suspension
//! state beyond the call stack. The `C` type parameter threads exclusive
//! per-traversal state (an accumulator, a collection pass's output)
//! through every handler; `R` is whatever result type the rule set
//! produces.
//!
//! The engine knows the node model and nothing else; code generation,
//! linting, and transformation are rule sets layered on top.

use std::rc::Rc;

use sable_ir::{FieldValue, NodeKind, NodeRef, Value};

#[cfg(test)]
mod tests;

/// Handler invoked for a matched node.
pub type HandlerFn<C, R> = Rc<dyn Fn(&Visitor<C, R>, &NodeRef, &mut C) -> R>;

/// A dispatch rule: a node filter plus a handler.
pub struct Rule<C, R> {
    kind: Option<NodeKind>,
    constraints: Vec<(&'static str, Value)>,
    handler: HandlerFn<C, R>,
    seq: u64,
}

impl<C, R> Clone for Rule<C, R> {
    fn clone(&self) -> Self {
        Rule {
            kind: self.kind,
            constraints: self.constraints.clone(),
            handler: Rc::clone(&self.handler),
            seq: self.seq,
        }
    }
}

impl<C, R> Rule<C, R> {
    /// A kind-any rule; matches every node. Least specific, so this is
    /// how a fallback is written.
    pub fn new(handler: impl Fn(&Visitor<C, R>, &NodeRef, &mut C) -> R + 'static) -> Self {
        Rule {
            kind: None,
            constraints: Vec::new(),
            handler: Rc::new(handler),
            seq: 0,
        }
    }

    /// A rule matching one node kind.
    pub fn for_kind(
        kind: NodeKind,
        handler: impl Fn(&Visitor<C, R>, &NodeRef, &mut C) -> R + 'static,
    ) -> Self {
        Rule {
            kind: Some(kind),
            ..Rule::new(handler)
        }
    }

    /// Require a leaf field to hold an exact value.
    ///
    /// Each constraint makes the rule more specific than its siblings on
    /// the same kind.
    pub fn constrain(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.constraints.push((field, value.into()));
        self
    }

    fn matches(&self, node: &NodeRef) -> bool {
        if let Some(kind) = self.kind {
            if node.kind() != kind {
                return false;
            }
        }
        self.constraints
            .iter()
            .all(|(field, value)| node.leaf(field) == Some(value))
    }

    fn sort_key(&self) -> (bool, usize, u64) {
        (self.kind.is_some(), self.constraints.len(), self.seq)
    }
}

/// An ordered, composable collection of dispatch rules.
pub struct Visitor<C, R> {
    rules: Vec<Rule<C, R>>,
    next_seq: u64,
}

impl<C, R> Default for Visitor<C, R> {
    fn default() -> Self {
        Visitor::new()
    }
}

impl<C, R> Visitor<C, R> {
    /// An empty visitor. Invoking anything panics until rules are added;
    /// register a kind-any fallback to make the visitor total.
    pub fn new() -> Self {
        Visitor {
            rules: Vec::new(),
            next_seq: 0,
        }
    }

    /// Register a rule. Later registrations win specificity ties.
    pub fn add_rule(&mut self, mut rule: Rule<C, R>) {
        rule.seq = self.next_seq;
        self.next_seq += 1;
        let key = rule.sort_key();
        let pos = self.rules.partition_point(|r| r.sort_key() > key);
        self.rules.insert(pos, rule);
    }

    /// Absorb another visitor's rules, after this visitor's own equally
    /// specific rules in recency order.
    pub fn extend(&mut self, other: Visitor<C, R>) {
        let mut incoming = other.rules;
        incoming.sort_by_key(|r| r.seq);
        for rule in incoming {
            self.add_rule(rule);
        }
    }

    /// Run the best-matching rule for `node`.
    ///
    /// # Panics
    ///
    /// Panics when no rule matches: that is a rule-set configuration
    /// defect, not a runtime condition.
    pub fn invoke(&self, node: &NodeRef, ctx: &mut C) -> R {
        let rule = self
            .rules
            .iter()
            .find(|rule| rule.matches(node))
            .unwrap_or_else(|| panic!("no dispatch rule matches {:?} node", node.kind()));
        (rule.handler)(self, node, ctx)
    }
}

impl<C, R: Default> Visitor<C, R> {
    /// A visitor pre-loaded with a kind-any fallback that walks into every
    /// child and discards results. User rules beat it at any specificity,
    /// so this is the base for analysis passes that only care about some
    /// node kinds.
    pub fn walking() -> Self {
        let mut visitor = Visitor::new();
        visitor.add_rule(Rule::new(|v, node, ctx| {
            walk_children(v, node, ctx);
            R::default()
        }));
        visitor
    }
}

/// Invoke every child of `node` in field order, discarding results.
///
/// The building block for fallback rules: rule sets not specialized for a
/// kind still traverse through it.
pub fn walk_children<C, R>(visitor: &Visitor<C, R>, node: &NodeRef, ctx: &mut C) {
    for field in node.fields() {
        match &field.value {
            FieldValue::Leaf(_) => {}
            FieldValue::Node(child) => {
                visitor.invoke(child, ctx);
            }
            FieldValue::Children(children) => {
                for child in children.iter() {
                    visitor.invoke(child, ctx);
                }
            }
        }
    }
}
