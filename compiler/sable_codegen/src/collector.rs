//! Children collectors.
//!
//! A collector is created lazily by the splicing algorithm (see
//! [`crate::visit::visit_multiple`]) the first time a list-valued field
//! turns out to contain a child that must be rewritten. It receives the
//! field's children partitioned into static runs and dynamic replacement
//! fragments, and finalizes into the expression (or side effects)
//! reproducing the whole list at run time.
//!
//! Three strategies exist:
//! - [`GenericCollector`] rebuilds an ordinary field list as one
//!   `children` helper call mixing node references and inline fragments.
//! - [`CommandCollector`] feeds a nested command sequence into the
//!   ambient runtime command buffer, collapsing static runs into a single
//!   bulk `extend` of a reference-table slice.
//! - [`RootCommandCollector`] additionally wraps a standalone program's
//!   statements in a fresh runtime scope so the buffer itself becomes the
//!   program's value.

use sable_ir::NodeRef;

use crate::accumulator::{Accumulator, Helper};

/// Splicing strategy for one list-valued field.
pub trait ChildrenCollector {
    /// Create a collector anchored at the statement-buffer position where
    /// the field's code begins.
    fn new(start: usize) -> Self;

    /// Record a run of children that need no rewriting.
    fn add_static(&mut self, acc: &mut Accumulator, nodes: &[NodeRef]);

    /// Record replacement fragments for a rewritten child.
    fn add_dynamic(&mut self, acc: &mut Accumulator, fragments: &[String]);

    /// Finalize, returning the expression representing the whole field.
    fn flush(self, acc: &mut Accumulator) -> String;
}

/// Generic field-list collector.
pub struct GenericCollector {
    children: Vec<String>,
}

impl ChildrenCollector for GenericCollector {
    fn new(_start: usize) -> Self {
        GenericCollector {
            children: Vec::new(),
        }
    }

    fn add_static(&mut self, acc: &mut Accumulator, nodes: &[NodeRef]) {
        self.children.extend(nodes.iter().map(|node| acc.make_ref(node)));
    }

    fn add_dynamic(&mut self, _acc: &mut Accumulator, fragments: &[String]) {
        self.children.extend(fragments.iter().cloned());
    }

    fn flush(self, acc: &mut Accumulator) -> String {
        acc.children(&self.children)
    }
}

fn extend_commands_static(acc: &mut Accumulator, nodes: &[NodeRef]) {
    if nodes.len() > 1 {
        let slice = acc.make_ref_slice(nodes);
        acc.statement(format!("_sable_runtime.commands.extend({slice})"));
    } else if let Some(node) = nodes.first() {
        let reference = acc.make_ref(node);
        acc.statement(format!("_sable_runtime.commands.append({reference})"));
    }
}

fn append_commands_dynamic(acc: &mut Accumulator, fragments: &[String]) {
    for fragment in fragments {
        acc.statement(format!("_sable_runtime.commands.append({fragment})"));
    }
}

/// Collector for a nested command sequence.
pub struct CommandCollector;

impl ChildrenCollector for CommandCollector {
    fn new(_start: usize) -> Self {
        CommandCollector
    }

    fn add_static(&mut self, acc: &mut Accumulator, nodes: &[NodeRef]) {
        extend_commands_static(acc, nodes);
    }

    fn add_dynamic(&mut self, acc: &mut Accumulator, fragments: &[String]) {
        append_commands_dynamic(acc, fragments);
    }

    fn flush(self, acc: &mut Accumulator) -> String {
        acc.children(&[])
    }
}

/// Collector for the commands of a standalone root node.
pub struct RootCommandCollector {
    start: usize,
}

impl ChildrenCollector for RootCommandCollector {
    fn new(start: usize) -> Self {
        RootCommandCollector { start }
    }

    fn add_static(&mut self, acc: &mut Accumulator, nodes: &[NodeRef]) {
        extend_commands_static(acc, nodes);
    }

    fn add_dynamic(&mut self, acc: &mut Accumulator, fragments: &[String]) {
        append_commands_dynamic(acc, fragments);
    }

    /// Retroactively wrap everything emitted since this collector's start
    /// in a fresh runtime scope; the scope's buffer becomes the value.
    fn flush(self, acc: &mut Accumulator) -> String {
        let commands = acc.make_variable();
        acc.indent_lines_from(self.start);
        let header = format!(
            "{}with _sable_runtime.scope() as {commands}:\n",
            acc.indentation()
        );
        acc.insert_line(self.start, header);
        acc.helper(Helper::Children, &[commands.as_str()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sable_ir::{Node, NodeKind};

    fn say(text: &str) -> NodeRef {
        Node::build(NodeKind::Command)
            .leaf("identifier", "say:message")
            .children(
                "arguments",
                [Node::build(NodeKind::MessageText).leaf("value", text).done()],
            )
            .done()
    }

    #[test]
    fn generic_collector_preserves_positions() {
        let mut acc = Accumulator::new();
        let mut collector = GenericCollector::new(0);
        collector.add_static(&mut acc, &[say("a")]);
        collector.add_dynamic(&mut acc, &["dynamic".to_string()]);
        collector.add_static(&mut acc, &[say("c")]);

        let expression = collector.flush(&mut acc);
        assert_eq!(
            expression,
            "_sable_helper_children([_sable_refs[0], dynamic, _sable_refs[1]])"
        );
        assert_eq!(acc.lines_len(), 0);
    }

    #[test]
    fn command_collector_bulks_static_runs() {
        let mut acc = Accumulator::new();
        let mut collector = CommandCollector::new(0);
        collector.add_static(&mut acc, &[say("a"), say("b")]);
        collector.add_dynamic(&mut acc, &["dynamic".to_string()]);
        collector.add_static(&mut acc, &[say("d")]);
        collector.flush(&mut acc);

        assert_eq!(
            acc.split_off_lines(0).concat(),
            "_sable_runtime.commands.extend(_sable_refs[0:2])\n\
             _sable_runtime.commands.append(dynamic)\n\
             _sable_runtime.commands.append(_sable_refs[2])\n"
        );
    }

    #[test]
    fn root_collector_wraps_in_scope() {
        let mut acc = Accumulator::new();
        acc.statement("before = 1");
        let start = acc.lines_len();
        let mut collector = RootCommandCollector::new(start);
        collector.add_dynamic(&mut acc, &["dynamic".to_string()]);

        let expression = collector.flush(&mut acc);
        assert_eq!(expression, "_sable_helper_children(_sable_var0)");
        assert_eq!(
            acc.split_off_lines(0).concat(),
            "before = 1\n\
             with _sable_runtime.scope() as _sable_var0:\n    \
             _sable_runtime.commands.append(dynamic)\n"
        );
    }
}
